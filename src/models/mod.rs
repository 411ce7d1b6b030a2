// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session data model: entities, the store that owns them, and the
//! session lifecycle.

pub mod entity;
pub mod session;
pub mod store;
