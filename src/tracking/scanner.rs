// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! QR scanner controller.
//!
//! Owns a [`SymbolDecoder`] and makes sure there is never more than one
//! running instance: a scan can only start once the previous one has
//! fully stopped.

use crate::error::DeviceError;
use crate::io::decoder::{DecodeEvent, ScanOptions, SymbolDecoder};
use crate::io::media::FrameSource;
use std::sync::mpsc::{Receiver, TryRecvError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    Idle,
    Scanning,
    Failed,
}

pub struct QrScanner<D: SymbolDecoder> {
    decoder: D,
    events: Option<Receiver<DecodeEvent>>,
    state: ScannerState,
}

impl<D: SymbolDecoder> QrScanner<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            events: None,
            state: ScannerState::Idle,
        }
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScannerState::Scanning
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn decoder_mut(&mut self) -> &mut D {
        &mut self.decoder
    }

    /// Start decoding frames from `source`.
    pub fn start(
        &mut self,
        source: Option<&dyn FrameSource>,
        options: ScanOptions,
    ) -> Result<(), DeviceError> {
        if self.is_scanning() {
            return Err(DeviceError::AlreadyScanning);
        }
        let source = source.ok_or(DeviceError::NoSource)?;

        match self.decoder.start(source, options) {
            Ok(events) => {
                self.events = Some(events);
                self.state = ScannerState::Scanning;
                log::info!("QR scanning started on {}", source.label());
                Ok(())
            }
            Err(e) => {
                self.state = ScannerState::Failed;
                log::error!("Failed to start QR scanning: {}", e);
                Err(e)
            }
        }
    }

    /// Stop decoding and wait for the decoder to acknowledge. On failure
    /// the scanner stays in the scanning state so the stop can be retried.
    pub fn stop(&mut self) -> Result<(), DeviceError> {
        if !self.is_scanning() {
            return Ok(());
        }
        if let Err(e) = self.decoder.stop() {
            log::warn!("Error stopping QR scanner: {}", e);
            return Err(e);
        }
        self.events = None;
        self.state = ScannerState::Idle;
        log::info!("QR scanning stopped");
        Ok(())
    }

    /// Drain every result decoded since the last poll.
    ///
    /// When the decoder ends on its own the scanner returns to idle.
    pub fn poll(&mut self) -> Vec<DecodeEvent> {
        let mut drained = Vec::new();
        let Some(events) = &self.events else {
            return drained;
        };

        let finished = loop {
            match events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        if finished {
            log::info!("Decoder finished");
            if let Err(e) = self.stop() {
                self.state = ScannerState::Failed;
                self.events = None;
                log::error!("Decoder ended but did not shut down cleanly: {}", e);
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::{Frame, StillImageSource};
    use std::sync::mpsc::{channel, Sender};

    /// Decoder double that hands out a sender per run.
    #[derive(Default)]
    struct FakeDecoder {
        running: usize,
        max_running: usize,
        senders: Vec<Sender<DecodeEvent>>,
        fail_start: bool,
        fail_stop: bool,
    }

    impl SymbolDecoder for FakeDecoder {
        fn start(
            &mut self,
            _source: &dyn FrameSource,
            _options: ScanOptions,
        ) -> Result<Receiver<DecodeEvent>, DeviceError> {
            if self.fail_start {
                return Err(DeviceError::Decoder("camera busy".to_string()));
            }
            self.running += 1;
            self.max_running = self.max_running.max(self.running);
            let (tx, rx) = channel();
            self.senders.push(tx);
            Ok(rx)
        }

        fn stop(&mut self) -> Result<(), DeviceError> {
            if self.fail_stop {
                return Err(DeviceError::StopFailed);
            }
            self.running = self.running.saturating_sub(1);
            Ok(())
        }
    }

    fn source() -> StillImageSource {
        StillImageSource::from_frame(
            "cam",
            Frame {
                width: 2,
                height: 2,
                pixels: vec![0; 16],
            },
        )
    }

    const OPTIONS: ScanOptions = ScanOptions { fps: 10 };

    #[test]
    fn test_start_requires_source() {
        let mut scanner = QrScanner::new(FakeDecoder::default());
        let err = scanner.start(None, OPTIONS).unwrap_err();
        assert!(matches!(err, DeviceError::NoSource));
        assert_eq!(scanner.state(), ScannerState::Idle);
    }

    #[test]
    fn test_never_two_decoders_at_once() {
        let src = source();
        let mut scanner = QrScanner::new(FakeDecoder::default());
        scanner.start(Some(&src), OPTIONS).unwrap();
        assert!(matches!(
            scanner.start(Some(&src), OPTIONS),
            Err(DeviceError::AlreadyScanning)
        ));

        scanner.stop().unwrap();
        scanner.start(Some(&src), OPTIONS).unwrap();
        assert_eq!(scanner.decoder().max_running, 1);
    }

    #[test]
    fn test_failed_stop_blocks_restart() {
        let src = source();
        let mut scanner = QrScanner::new(FakeDecoder::default());
        scanner.start(Some(&src), OPTIONS).unwrap();

        scanner.decoder_mut().fail_stop = true;
        assert!(scanner.stop().is_err());
        assert!(scanner.is_scanning());
        assert!(scanner.start(Some(&src), OPTIONS).is_err());

        scanner.decoder_mut().fail_stop = false;
        scanner.stop().unwrap();
        scanner.start(Some(&src), OPTIONS).unwrap();
        assert_eq!(scanner.decoder().max_running, 1);
    }

    #[test]
    fn test_failed_start_marks_failed() {
        let src = source();
        let mut scanner = QrScanner::new(FakeDecoder {
            fail_start: true,
            ..Default::default()
        });
        assert!(scanner.start(Some(&src), OPTIONS).is_err());
        assert_eq!(scanner.state(), ScannerState::Failed);

        scanner.decoder_mut().fail_start = false;
        scanner.start(Some(&src), OPTIONS).unwrap();
        assert!(scanner.is_scanning());
    }

    #[test]
    fn test_poll_drains_and_detects_end() {
        let src = source();
        let mut scanner = QrScanner::new(FakeDecoder::default());
        scanner.start(Some(&src), OPTIONS).unwrap();
        assert!(scanner.poll().is_empty());

        let tx = scanner.decoder_mut().senders.pop().unwrap();
        tx.send(DecodeEvent::new("A")).unwrap();
        tx.send(DecodeEvent::new("B")).unwrap();
        let texts: Vec<_> = scanner.poll().into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["A", "B"]);
        assert!(scanner.is_scanning());

        drop(tx);
        assert!(scanner.poll().is_empty());
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert_eq!(scanner.decoder().running, 0);
    }
}
