// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session export.
//!
//! This module writes session snapshots as pretty-printed JSON (the
//! primary format) or YAML with the same layout.

use crate::models::session::SessionSnapshot;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Suggested export file name, e.g. `object_tracking_session_2025-03-01.json`.
pub fn default_export_filename(now: DateTime<Utc>, extension: &str) -> String {
    format!(
        "object_tracking_session_{}.{}",
        now.format("%Y-%m-%d"),
        extension
    )
}

/// Render a snapshot as pretty-printed JSON.
pub fn snapshot_to_json(snapshot: &SessionSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Export a session snapshot to JSON format.
pub fn export_json(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    std::fs::write(path, snapshot_to_json(snapshot)?)?;
    Ok(())
}

/// Export a session snapshot to YAML format.
pub fn export_yaml(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(snapshot)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export by file extension: `.yaml`/`.yml` as YAML, anything else as JSON.
pub fn export_auto(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => export_yaml(snapshot, path),
        _ => export_json(snapshot, path),
    }
}
