// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Symbol decoders.
//!
//! A decoder watches a frame source and reports every symbol it reads as
//! a [`DecodeEvent`] on a channel. Frames without a symbol produce nothing.
//! The bundled [`ReplayDecoder`] plays back a recorded decode log, one
//! JSON object per line, on a background thread.

use crate::error::DeviceError;
use crate::io::media::FrameSource;
use crate::models::entity::QrLocation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// One successful decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeEvent {
    pub text: String,
    #[serde(default)]
    pub location: Option<QrLocation>,
    #[serde(default)]
    pub format: Option<String>,
}

impl DecodeEvent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            location: None,
            format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Frames per second the decoder should examine.
    pub fps: u32,
}

/// Interface to an external symbol decoder.
pub trait SymbolDecoder {
    /// Begin decoding frames from `source`; results arrive on the returned
    /// channel until the decoder stops.
    fn start(
        &mut self,
        source: &dyn FrameSource,
        options: ScanOptions,
    ) -> Result<Receiver<DecodeEvent>, DeviceError>;

    /// Stop decoding. Returns only once the decoder has fully shut down.
    fn stop(&mut self) -> Result<(), DeviceError>;
}

/// A line of a decode log: an event seen on `frames` consecutive frames.
#[derive(Debug, Deserialize)]
struct ReplayLine {
    #[serde(flatten)]
    event: DecodeEvent,
    #[serde(default = "one_frame")]
    frames: u32,
}

fn one_frame() -> u32 {
    1
}

/// Parse a decode log into the per-frame event sequence.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_decode_log(text: &str) -> Result<Vec<DecodeEvent>, DeviceError> {
    let mut events = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let entry: ReplayLine = serde_json::from_str(line)
            .map_err(|e| DeviceError::Decoder(format!("line {}: {}", idx + 1, e)))?;
        for _ in 0..entry.frames {
            events.push(entry.event.clone());
        }
    }
    Ok(events)
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Decoder that replays a recorded decode log at the scan rate.
pub struct ReplayDecoder {
    log_path: Option<PathBuf>,
    worker: Option<Worker>,
}

impl Default for ReplayDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayDecoder {
    pub fn new() -> Self {
        Self {
            log_path: None,
            worker: None,
        }
    }

    /// Choose the log played by the next `start`.
    pub fn set_log(&mut self, path: &Path) {
        self.log_path = Some(path.to_path_buf());
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }
}

impl SymbolDecoder for ReplayDecoder {
    fn start(
        &mut self,
        source: &dyn FrameSource,
        options: ScanOptions,
    ) -> Result<Receiver<DecodeEvent>, DeviceError> {
        if self.worker.is_some() {
            return Err(DeviceError::AlreadyScanning);
        }
        if source.native_size().is_none() {
            return Err(DeviceError::SourceNotReady);
        }
        let path = self
            .log_path
            .clone()
            .ok_or_else(|| DeviceError::Decoder("no decode log loaded".to_string()))?;
        let events = parse_decode_log(&std::fs::read_to_string(&path)?)?;
        log::info!(
            "Replaying {} decode frame(s) from {} on {}",
            events.len(),
            path.display(),
            source.label()
        );

        let period = Duration::from_millis(1000 / u64::from(options.fps.max(1)));
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let (sender, receiver) = channel();

        let handle = std::thread::spawn(move || {
            for event in events {
                if stop_flag.load(Ordering::Acquire) {
                    return;
                }
                if sender.send(event).is_err() {
                    return;
                }
                std::thread::sleep(period);
            }
        });

        self.worker = Some(Worker { stop, handle });
        Ok(receiver)
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        worker.stop.store(true, Ordering::Release);
        worker.handle.join().map_err(|_| DeviceError::StopFailed)
    }
}

impl Drop for ReplayDecoder {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Error stopping replay decoder: {}", e);
        }
    }
}
