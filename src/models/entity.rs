// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session entity data structures.
//!
//! This module defines the three kinds of entity a session holds
//! (tracked objects, QR codes, and the associations linking them) along
//! with their typed identifiers and frame geometry. All positions are in
//! native capture-frame units.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbology reported when the decoder does not name one.
pub const DEFAULT_QR_FORMAT: &str = "QR_CODE";

/// Error returned when a string is not a well-formed entity id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct IdParseError {
    kind: &'static str,
    value: String,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(u64);

        impl $name {
            pub(crate) fn from_counter(n: u64) -> Self {
                Self(n)
            }

            /// Position of this id in issue order, starting at 1.
            pub fn ordinal(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.strip_prefix(concat!($prefix, "_"))
                    .and_then(|n| n.parse::<u64>().ok())
                    .filter(|n| *n > 0)
                    .map(Self)
                    .ok_or_else(|| IdParseError {
                        kind: $prefix,
                        value: s.to_string(),
                    })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

entity_id!(
    /// Identifier of a tracked object, rendered as `obj_<n>`.
    ObjectId,
    "obj"
);
entity_id!(
    /// Identifier of a detected QR code, rendered as `qr_<n>`.
    QrCodeId,
    "qr"
);
entity_id!(
    /// Identifier of an object/QR association, rendered as `assoc_<n>`.
    AssociationId,
    "assoc"
);

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned box; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A `size`×`size` box centered on `center`, shifted so that its
    /// top-left corner never goes negative.
    pub fn centered_clamped(center: Point, size: f64) -> Self {
        let half = size / 2.0;
        Self::new(
            (center.x - half).max(0.0),
            (center.y - half).max(0.0),
            size,
            size,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// How a tracked object came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    ManualSelection,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::ManualSelection => "manual_selection",
        }
    }
}

/// A region of interest marked by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObject {
    pub id: ObjectId,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub position: BoundingBox,
    pub timestamp: DateTime<Utc>,
    pub confidence: f64,
    pub properties: BTreeMap<String, String>,
}

impl TrackedObject {
    /// A manually selected object: a box of `size` centered on the click.
    pub fn manual(id: ObjectId, center: Point, size: f64, timestamp: DateTime<Utc>) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("tracking_method".to_string(), "click_selection".to_string());
        properties.insert(
            "created_at".to_string(),
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        Self {
            id,
            kind: ObjectKind::ManualSelection,
            position: BoundingBox::centered_clamped(center, size),
            timestamp,
            confidence: 1.0,
            properties,
        }
    }

    /// Short display name, e.g. `Object 3`.
    pub fn display_name(&self) -> String {
        format!("Object {}", self.id.ordinal())
    }
}

/// Where the decoder saw a symbol: the top-left corner in frame units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QrLocation {
    pub x: f64,
    pub y: f64,
}

/// A decoded QR symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    pub id: QrCodeId,
    pub content: String,
    pub position: BoundingBox,
    pub timestamp: DateTime<Utc>,
    pub format: String,
}

/// A user-confirmed link between one object and one QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub id: AssociationId,
    pub object_id: ObjectId,
    pub qr_code_id: QrCodeId,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
    pub confidence: f64,
}

/// Truncate `text` to at most `max_chars` characters, appending `...`
/// when anything was cut.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
