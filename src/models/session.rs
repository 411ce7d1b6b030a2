// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session lifecycle and export snapshot.
//!
//! A session starts when the application launches and restarts whenever
//! the user clears it. The snapshot is the complete exported document:
//! session metadata, every entity, and summary statistics.

use super::entity::{Association, QrCode, TrackedObject};
use super::store::SessionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format a millisecond span as `HH:MM:SS`. Hours do not roll over into
/// days; negative spans read as zero.
pub fn format_duration(millis: i64) -> String {
    let millis = millis.max(0);
    let hours = millis / 3_600_000;
    let minutes = (millis % 3_600_000) / 60_000;
    let seconds = (millis % 60_000) / 1_000;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Timing of the current session.
#[derive(Debug, Clone)]
pub struct Session {
    started_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Elapsed time since the session started, as `HH:MM:SS`.
    pub fn elapsed(&self) -> String {
        self.elapsed_at(Utc::now())
    }

    pub fn elapsed_at(&self, now: DateTime<Utc>) -> String {
        format_duration((now - self.started_at).num_milliseconds())
    }

    /// Build the export document for the store's current contents.
    pub fn export_snapshot(&self, store: &SessionStore, current_fps: u32) -> SessionSnapshot {
        self.export_snapshot_at(store, current_fps, Utc::now())
    }

    pub fn export_snapshot_at(
        &self,
        store: &SessionStore,
        current_fps: u32,
        now: DateTime<Utc>,
    ) -> SessionSnapshot {
        let duration = self.elapsed_at(now);
        SessionSnapshot {
            session: SessionInfo {
                start_time: self.started_at,
                duration: duration.clone(),
                timestamp: now,
            },
            objects: store.objects().cloned().collect(),
            qr_codes: store.qr_codes().cloned().collect(),
            associations: store.associations().cloned().collect(),
            statistics: SessionStatistics {
                total_objects: store.object_count(),
                total_qr_codes: store.qr_code_count(),
                total_associations: store.association_count(),
                session_duration: duration,
                average_fps: current_fps,
            },
        }
    }

    /// Empty the store and start a fresh session clock.
    pub fn reset(&mut self, store: &mut SessionStore) {
        self.reset_at(store, Utc::now());
    }

    pub fn reset_at(&mut self, store: &mut SessionStore, now: DateTime<Utc>) {
        store.clear();
        self.started_at = now;
        log::info!("Session reset at {}", now.to_rfc3339());
    }
}

/// `session` block of the export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub start_time: DateTime<Utc>,
    pub duration: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_objects: usize,
    pub total_qr_codes: usize,
    pub total_associations: usize,
    pub session_duration: String,
    pub average_fps: u32,
}

/// Complete exported session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionInfo,
    pub objects: Vec<TrackedObject>,
    pub qr_codes: Vec<QrCode>,
    pub associations: Vec<Association>,
    pub statistics: SessionStatistics,
}
