// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and status bar.
//!
//! This module provides the device controls (camera, tracking, QR
//! scanning), their status indicators, and the session statistics line.

/// Severity shown by a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

impl StatusLevel {
    fn color(self) -> egui::Color32 {
        match self {
            StatusLevel::Info => egui::Color32::from_gray(170),
            StatusLevel::Success => egui::Color32::from_rgb(0x16, 0xa3, 0x4a),
            StatusLevel::Error => egui::Color32::from_rgb(0xdc, 0x26, 0x26),
        }
    }
}

/// A labelled device status, e.g. `Camera: Connected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: &'static str,
    pub level: StatusLevel,
}

impl Status {
    pub const fn new(text: &'static str, level: StatusLevel) -> Self {
        Self { text, level }
    }
}

/// Everything the toolbar displays.
pub struct ToolbarView<'a> {
    pub camera: &'a Status,
    pub scanner: &'a Status,
    pub tracking: &'a Status,
    pub has_source: bool,
    pub is_tracking: bool,
    pub is_scanning: bool,
    pub can_associate: bool,
}

/// Button pressed on the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    StartCamera,
    StopCamera,
    StartTracking,
    StopTracking,
    StartScan,
    StopScan,
    CreateAssociation,
}

fn status_label(ui: &mut egui::Ui, name: &str, status: &Status) {
    ui.label(egui::RichText::new(format!("{}: {}", name, status.text)).color(status.level.color()));
}

/// Display the toolbar with device controls.
pub fn show(ui: &mut egui::Ui, view: &ToolbarView) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.add_enabled(!view.has_source, egui::Button::new("▶ Start Camera")).clicked() {
            action = ToolbarAction::StartCamera;
        }
        if ui.add_enabled(view.has_source, egui::Button::new("■ Stop Camera")).clicked() {
            action = ToolbarAction::StopCamera;
        }

        ui.separator();

        let tracking_button = if view.is_tracking {
            "Stop Tracking"
        } else {
            "⌖ Start Tracking"
        };
        if ui.add_enabled(view.has_source, egui::Button::new(tracking_button)).clicked() {
            action = if view.is_tracking {
                ToolbarAction::StopTracking
            } else {
                ToolbarAction::StartTracking
            };
        }

        ui.separator();

        if ui
            .add_enabled(view.has_source && !view.is_scanning, egui::Button::new("Start QR Scan"))
            .clicked()
        {
            action = ToolbarAction::StartScan;
        }
        if ui.add_enabled(view.is_scanning, egui::Button::new("Stop QR Scan")).clicked() {
            action = ToolbarAction::StopScan;
        }

        ui.separator();

        if ui
            .add_enabled(view.can_associate, egui::Button::new("🔗 Create Association"))
            .clicked()
        {
            action = ToolbarAction::CreateAssociation;
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            status_label(ui, "Tracking", view.tracking);
            status_label(ui, "QR Scanner", view.scanner);
            status_label(ui, "Camera", view.camera);
        });
    });

    if view.is_tracking {
        ui.label(
            egui::RichText::new("Click on the frame to track an object")
                .italics()
                .weak(),
        );
    }

    action
}

/// Session statistics shown along the bottom edge.
pub struct SessionStats {
    pub elapsed: String,
    pub objects: usize,
    pub qr_codes: usize,
    pub associations: usize,
    pub fps: u32,
}

/// Display the status bar.
pub fn show_status_bar(ui: &mut egui::Ui, stats: &SessionStats) {
    ui.horizontal(|ui| {
        ui.label(format!("Session: {}", stats.elapsed));
        ui.separator();
        ui.label(format!("Objects: {}", stats.objects));
        ui.separator();
        ui.label(format!("QR Codes: {}", stats.qr_codes));
        ui.separator();
        ui.label(format!("Associations: {}", stats.associations));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(format!("FPS: {}", stats.fps));
        });
    });
}
