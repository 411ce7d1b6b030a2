// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file. Every field has a default, so a
//! partial file (or no file at all) is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV_VAR: &str = "QRLINK_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "qrlink.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Side of the square box placed around a clicked point.
    pub object_box_size: f64,
    /// Side of the square box placed at a decoded symbol's corner.
    pub qr_box_size: f64,
    /// Identical QR content decoded within this window is dropped.
    pub duplicate_window_ms: i64,
    /// Rate at which the decoder is asked to emit results.
    pub scan_fps: u32,
    /// How long a notification stays on screen.
    pub notification_secs: u64,
    pub object_label_width: f64,
    pub qr_label_min_width: f64,
    pub label_height: f64,
    pub qr_label_max_chars: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            object_box_size: 50.0,
            qr_box_size: 100.0,
            duplicate_window_ms: 2000,
            scan_fps: 10,
            notification_secs: 4,
            object_label_width: 80.0,
            qr_label_min_width: 120.0,
            label_height: 20.0,
            qr_label_max_chars: 15,
        }
    }
}

impl TrackerConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Resolve the config path from the environment and load it, falling
    /// back to defaults when the file is absent or unreadable.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }
}
