// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live tracking: event ingestion, the overlay render loop, and the QR
//! scanner controller.

pub mod ingest;
pub mod render_loop;
pub mod scanner;
