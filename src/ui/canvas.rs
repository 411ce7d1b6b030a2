// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame canvas with the tracking overlay.
//!
//! This module provides the main canvas area: it fits the current frame
//! into the available space, paints the overlay built by
//! [`overlay`](super::overlay) on top, and reports clicks on the frame.

use super::overlay::{build_overlay, LabelStyle, OverlayLayer, OverlayShape};
use crate::models::entity::{BoundingBox, Point};
use crate::models::store::SessionStore;
use crate::util::geometry::ScaleMapper;

const LABEL_FONT_SIZE: f32 = 12.0;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Click in display pixels relative to the frame's top-left corner,
    /// plus the mapping in effect when it happened.
    Click(Point, ScaleMapper),
}

/// Display the frame and overlay and handle mouse interactions.
pub fn show(
    ui: &mut egui::Ui,
    store: &SessionStore,
    frame_texture: &Option<egui::TextureHandle>,
    frame_size: Option<(u32, u32)>,
    tracking: bool,
    draw_overlay: bool,
    style: &LabelStyle,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some((frame_width, frame_height))) = (frame_texture, frame_size) else {
            show_placeholder(ui);
            return;
        };

        // Fit the frame into the available space, preserving aspect ratio
        let available = ui.available_size();
        let frame_aspect = frame_width as f32 / frame_height.max(1) as f32;
        let available_aspect = available.x / available.y.max(1.0);

        let (display_width, display_height) = if frame_aspect > available_aspect {
            (available.x, available.x / frame_aspect)
        } else {
            (available.y * frame_aspect, available.y)
        };

        let x_offset = (available.x - display_width) / 2.0;
        let y_offset = (available.y - display_height) / 2.0;
        let frame_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, y_offset),
            egui::vec2(display_width, display_height),
        );

        let mapper = ScaleMapper::new(
            frame_width as f64,
            frame_height as f64,
            display_width as f64,
            display_height as f64,
        );

        let sense = if tracking {
            egui::Sense::click()
        } else {
            egui::Sense::hover()
        };
        let mut response = ui.allocate_rect(frame_rect, sense);
        if tracking {
            response = response.on_hover_cursor(egui::CursorIcon::Crosshair);
        }
        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if frame_rect.contains(pos) {
                    let rel = pos - frame_rect.min;
                    action = CanvasAction::Click(Point::new(rel.x as f64, rel.y as f64), mapper);
                }
            }
        }

        let painter = ui.painter_at(frame_rect);
        painter.image(
            texture.id(),
            frame_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        if draw_overlay {
            let shapes = build_overlay(store, &mapper, style, |text| {
                painter
                    .layout_no_wrap(
                        text.to_string(),
                        egui::FontId::proportional(LABEL_FONT_SIZE),
                        egui::Color32::WHITE,
                    )
                    .size()
                    .x as f64
            });
            paint_shapes(&painter, &shapes, frame_rect.min);
        }
    });

    action
}

fn show_placeholder(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(20.0);
            ui.heading(
                egui::RichText::new("qrlink")
                    .size(32.0)
                    .color(egui::Color32::from_gray(200)),
            );
            ui.label(
                egui::RichText::new("Object tracking with QR code association")
                    .size(14.0)
                    .color(egui::Color32::from_gray(150)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Start a camera to begin tracking")
                    .color(egui::Color32::from_gray(180)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → Open Frame Source...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}

fn layer_color(layer: OverlayLayer) -> egui::Color32 {
    match layer {
        OverlayLayer::Object => egui::Color32::from_rgb(0x25, 0x63, 0xeb),
        OverlayLayer::QrCode => egui::Color32::from_rgb(0x16, 0xa3, 0x4a),
        OverlayLayer::Association => egui::Color32::from_rgb(0xea, 0x58, 0x0c),
    }
}

fn to_screen_rect(b: &BoundingBox, origin: egui::Pos2) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(b.x as f32, b.y as f32),
        egui::vec2(b.width as f32, b.height as f32),
    )
}

fn to_screen_pos(p: &Point, origin: egui::Pos2) -> egui::Pos2 {
    origin + egui::vec2(p.x as f32, p.y as f32)
}

/// Paint overlay shapes, offset so that `(0, 0)` lands on `origin`.
fn paint_shapes(painter: &egui::Painter, shapes: &[OverlayShape], origin: egui::Pos2) {
    for shape in shapes {
        match shape {
            OverlayShape::Box {
                rect,
                layer,
                stroke_width,
            } => {
                painter.rect_stroke(
                    to_screen_rect(rect, origin),
                    0.0,
                    egui::Stroke::new(*stroke_width as f32, layer_color(*layer)),
                );
            }
            OverlayShape::Label { rect, text, layer } => {
                let chip = to_screen_rect(rect, origin);
                painter.rect_filled(chip, 0.0, layer_color(*layer));
                painter.text(
                    egui::pos2(chip.left() + 5.0, chip.center().y),
                    egui::Align2::LEFT_CENTER,
                    text,
                    egui::FontId::proportional(LABEL_FONT_SIZE),
                    egui::Color32::WHITE,
                );
            }
            OverlayShape::Link {
                from,
                to,
                layer,
                stroke_width,
                dash,
            } => {
                painter.extend(egui::Shape::dashed_line(
                    &[to_screen_pos(from, origin), to_screen_pos(to, origin)],
                    egui::Stroke::new(*stroke_width as f32, layer_color(*layer)),
                    *dash as f32,
                    *dash as f32,
                ));
            }
        }
    }
}
