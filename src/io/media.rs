// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sources.
//!
//! A frame source supplies the picture the user annotates and reports its
//! native size, which anchors every stored coordinate. The bundled source
//! serves a single still image; a live camera would implement the same
//! trait.

use crate::error::DeviceError;
use std::path::Path;

/// RGBA8 pixels of one captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Anything that can feed frames to the canvas and the decoder.
pub trait FrameSource {
    /// Human-readable device name.
    fn label(&self) -> &str;

    /// Native frame size, or `None` until the first frame is known.
    fn native_size(&self) -> Option<(u32, u32)>;

    /// The latest frame if it changed since the previous call.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// A frame source backed by one image file.
#[derive(Debug)]
pub struct StillImageSource {
    label: String,
    frame: Frame,
    delivered: bool,
}

impl StillImageSource {
    /// Load an image file and convert it to RGBA8.
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();
        log::info!("Loaded frame source {} ({}x{})", path.display(), width, height);

        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_frame(
            label,
            Frame {
                width,
                height,
                pixels: img.into_raw(),
            },
        ))
    }

    pub fn from_frame(label: impl Into<String>, frame: Frame) -> Self {
        Self {
            label: label.into(),
            frame,
            delivered: false,
        }
    }
}

impl FrameSource for StillImageSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn native_size(&self) -> Option<(u32, u32)> {
        if self.frame.width == 0 || self.frame.height == 0 {
            None
        } else {
            Some((self.frame.width, self.frame.height))
        }
    }

    fn next_frame(&mut self) -> Option<Frame> {
        if self.delivered {
            return None;
        }
        self.delivered = true;
        Some(self.frame.clone())
    }
}
