// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay construction.
//!
//! Turns the store's contents into a flat list of draw commands in
//! display coordinates. The list is rebuilt from scratch every frame and
//! carries everything a painter needs, so the canvas can paint it without
//! touching the store.

use crate::config::TrackerConfig;
use crate::models::entity::{truncate_label, BoundingBox, Point};
use crate::models::store::SessionStore;
use crate::util::geometry::ScaleMapper;

/// Which entity a shape belongs to; the painter picks the color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayLayer {
    Object,
    QrCode,
    Association,
}

/// A single, stateless draw instruction in display coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    /// Stroked, unfilled rectangle.
    Box {
        rect: BoundingBox,
        layer: OverlayLayer,
        stroke_width: f64,
    },
    /// Filled chip with white text, anchored at its top-left corner.
    Label {
        rect: BoundingBox,
        text: String,
        layer: OverlayLayer,
    },
    /// Dashed line segment.
    Link {
        from: Point,
        to: Point,
        layer: OverlayLayer,
        stroke_width: f64,
        dash: f64,
    },
}

/// Label sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub object_width: f64,
    pub qr_min_width: f64,
    pub height: f64,
    pub qr_max_chars: usize,
    /// Horizontal room around the text inside a chip.
    pub padding: f64,
}

impl LabelStyle {
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self {
            object_width: config.object_label_width,
            qr_min_width: config.qr_label_min_width,
            height: config.label_height,
            qr_max_chars: config.qr_label_max_chars,
            padding: 10.0,
        }
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self::from_config(&TrackerConfig::default())
    }
}

const BOX_STROKE: f64 = 2.0;
const LINK_STROKE: f64 = 3.0;
const LINK_DASH: f64 = 5.0;

/// Build this frame's overlay.
///
/// Objects come first, then QR codes, then association links so that
/// links are never hidden under a box. `measure` returns the rendered
/// width of a label string.
pub fn build_overlay<F>(
    store: &SessionStore,
    mapper: &ScaleMapper,
    style: &LabelStyle,
    measure: F,
) -> Vec<OverlayShape>
where
    F: Fn(&str) -> f64,
{
    let mut shapes = Vec::with_capacity(
        2 * (store.object_count() + store.qr_code_count()) + store.association_count(),
    );

    for obj in store.objects() {
        let rect = mapper.to_display_box(&obj.position);
        shapes.push(OverlayShape::Box {
            rect,
            layer: OverlayLayer::Object,
            stroke_width: BOX_STROKE,
        });
        shapes.push(OverlayShape::Label {
            rect: label_rect(&rect, style.object_width, style.height),
            text: obj.display_name(),
            layer: OverlayLayer::Object,
        });
    }

    for qr in store.qr_codes() {
        let rect = mapper.to_display_box(&qr.position);
        let text = truncate_label(&qr.content, style.qr_max_chars);
        let width = style.qr_min_width.max(measure(&text) + style.padding);
        shapes.push(OverlayShape::Box {
            rect,
            layer: OverlayLayer::QrCode,
            stroke_width: BOX_STROKE,
        });
        shapes.push(OverlayShape::Label {
            rect: label_rect(&rect, width, style.height),
            text,
            layer: OverlayLayer::QrCode,
        });
    }

    for assoc in store.associations() {
        let (Some(obj), Some(qr)) = (store.object(&assoc.object_id), store.qr_code(&assoc.qr_code_id))
        else {
            continue;
        };
        shapes.push(OverlayShape::Link {
            from: mapper.to_display_point(obj.position.center()),
            to: mapper.to_display_point(qr.position.center()),
            layer: OverlayLayer::Association,
            stroke_width: LINK_STROKE,
            dash: LINK_DASH,
        });
    }

    shapes
}

/// Chip sitting directly above the box's top-left corner.
fn label_rect(anchor: &BoundingBox, width: f64, height: f64) -> BoundingBox {
    BoundingBox::new(anchor.x, anchor.y - height, width, height)
}
