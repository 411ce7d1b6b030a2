// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for store mutations and capture devices.
//!
//! None of these are fatal: every failure is local to one user action and
//! is reported as a notification, leaving state unchanged.

use crate::models::entity::{ObjectId, QrCodeId};
use thiserror::Error;

/// Rejections from [`SessionStore`](crate::models::store::SessionStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Please select both a QR code and an object")]
    MissingSelection,
    #[error("Object {0} does not exist")]
    UnknownObject(ObjectId),
    #[error("QR code {0} does not exist")]
    UnknownQrCode(QrCodeId),
    #[error("This association already exists")]
    DuplicateAssociation {
        object_id: ObjectId,
        qr_code_id: QrCodeId,
    },
}

impl StoreError {
    /// Operator error: nothing (or nothing live) was selected.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::MissingSelection
                | StoreError::UnknownObject(_)
                | StoreError::UnknownQrCode(_)
        )
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateAssociation { .. })
    }
}

/// Failures of the frame source or the symbol decoder.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Camera must be started first")]
    NoSource,
    #[error("Frame source has no dimensions yet")]
    SourceNotReady,
    #[error("QR scanner is already running")]
    AlreadyScanning,
    #[error("failed to load frame: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decoder error: {0}")]
    Decoder(String),
    #[error("decoder did not acknowledge stop")]
    StopFailed,
}
