// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O collaborators: frame sources, symbol decoders, and session export.

pub mod decoder;
pub mod media;
pub mod serialization;
