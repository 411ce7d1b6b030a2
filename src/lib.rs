// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! qrlink - object tracking with QR code association.
//!
//! Users mark regions of interest on a live frame, a decoder reports QR
//! codes it reads, and the user links objects to codes. The session can be
//! exported as a single JSON document.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod tracking;
pub mod ui;
pub mod util;
