// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the qrlink application.

pub mod canvas;
pub mod notifications;
pub mod overlay;
pub mod properties;
pub mod toolbar;
