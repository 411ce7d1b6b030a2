// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module maps between native capture-frame coordinates (what the
//! store records) and display coordinates (where the frame is drawn).
//! Source and display sizes change independently, so a mapper is cheap to
//! rebuild every frame.

use crate::models::entity::{BoundingBox, Point};

/// Scale between a native frame size and its on-screen size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMapper {
    native_width: f64,
    native_height: f64,
    display_width: f64,
    display_height: f64,
}

impl ScaleMapper {
    pub fn new(native_width: f64, native_height: f64, display_width: f64, display_height: f64) -> Self {
        Self {
            native_width,
            native_height,
            display_width,
            display_height,
        }
    }

    /// Identity mapping for a frame drawn at its native size.
    pub fn identity(width: f64, height: f64) -> Self {
        Self::new(width, height, width, height)
    }

    /// Whether the native frame size is known. Clicks should be ignored
    /// until it is.
    pub fn is_ready(&self) -> bool {
        self.native_width > 0.0 && self.native_height > 0.0
    }

    /// `(display/native)` per axis; 1.0 on any axis with an unknown size.
    pub fn scale(&self) -> (f64, f64) {
        (
            ratio(self.display_width, self.native_width),
            ratio(self.display_height, self.native_height),
        )
    }

    /// `(native/display)` per axis; 1.0 on any axis with an unknown size.
    pub fn inverse_scale(&self) -> (f64, f64) {
        (
            ratio(self.native_width, self.display_width),
            ratio(self.native_height, self.display_height),
        )
    }

    pub fn to_display_point(&self, point: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(point.x * sx, point.y * sy)
    }

    pub fn to_native_point(&self, point: Point) -> Point {
        let (sx, sy) = self.inverse_scale();
        Point::new(point.x * sx, point.y * sy)
    }

    pub fn to_display_box(&self, b: &BoundingBox) -> BoundingBox {
        let (sx, sy) = self.scale();
        BoundingBox::new(b.x * sx, b.y * sy, b.width * sx, b.height * sy)
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 && num > 0.0 {
        num / den
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_native_roundtrip() {
        let mapper = ScaleMapper::new(1280.0, 720.0, 640.0, 480.0);
        let click = Point::new(320.0, 240.0);

        let native = mapper.to_native_point(click);
        assert!((native.x - 640.0).abs() < 0.0001);
        assert!((native.y - 360.0).abs() < 0.0001);

        let back = mapper.to_display_point(native);
        assert!((back.x - click.x).abs() < 0.0001);
        assert!((back.y - click.y).abs() < 0.0001);
    }

    #[test]
    fn test_box_scaling_is_per_axis() {
        let mapper = ScaleMapper::new(1000.0, 500.0, 500.0, 500.0);
        let b = mapper.to_display_box(&BoundingBox::new(100.0, 100.0, 50.0, 50.0));
        assert_eq!(b, BoundingBox::new(50.0, 100.0, 25.0, 50.0));
    }

    #[test]
    fn test_unknown_native_size_degrades_to_identity() {
        let mapper = ScaleMapper::new(0.0, 0.0, 640.0, 480.0);
        assert!(!mapper.is_ready());
        assert_eq!(mapper.scale(), (1.0, 1.0));
        assert_eq!(mapper.inverse_scale(), (1.0, 1.0));
        assert_eq!(mapper.to_native_point(Point::new(5.0, 6.0)), Point::new(5.0, 6.0));
    }

    #[test]
    fn test_identity() {
        let mapper = ScaleMapper::identity(1920.0, 1080.0);
        assert!(mapper.is_ready());
        assert_eq!(mapper.scale(), (1.0, 1.0));
    }
}
