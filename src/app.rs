// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait. It owns the session store and routes toolbar,
//! canvas, panel and decoder events into it.

use crate::config::TrackerConfig;
use crate::error::DeviceError;
use crate::io::decoder::{ReplayDecoder, ScanOptions};
use crate::io::media::{FrameSource, StillImageSource};
use crate::io::serialization;
use crate::models::entity::truncate_label;
use crate::models::session::Session;
use crate::models::store::SessionStore;
use crate::tracking::ingest;
use crate::tracking::render_loop::RenderLoop;
use crate::tracking::scanner::{QrScanner, ScannerState};
use crate::ui::notifications::Notifications;
use crate::ui::overlay::LabelStyle;
use crate::ui::properties::{self, AssociationForm, FormAction, PropertiesAction};
use crate::ui::toolbar::{self, SessionStats, Status, StatusLevel, ToolbarAction, ToolbarView};
use crate::ui::canvas;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const CAMERA_DISCONNECTED: Status = Status::new("Disconnected", StatusLevel::Info);
const SCANNER_IDLE: Status = Status::new("Idle", StatusLevel::Info);
const TRACKING_INACTIVE: Status = Status::new("Inactive", StatusLevel::Info);

/// Main application state.
pub struct TrackerApp {
    config: TrackerConfig,

    /// All objects, QR codes and associations of the session
    store: SessionStore,

    /// Session clock
    session: Session,

    /// Store revision the view last saw
    seen_revision: u64,

    /// Active frame source, if a camera is running
    source: Option<Box<dyn FrameSource>>,

    /// Receiver for background frame source loading
    source_loader: Option<Receiver<Result<StillImageSource, DeviceError>>>,

    /// Loading state message
    loading_message: Option<String>,

    /// Latest frame uploaded for display
    frame_texture: Option<egui::TextureHandle>,

    /// Native frame dimensions (width, height)
    frame_size: Option<(u32, u32)>,

    render_loop: RenderLoop,
    scanner: QrScanner<ReplayDecoder>,

    camera_status: Status,
    scanner_status: Status,
    tracking_status: Status,

    association_form: AssociationForm,
    confirm_clear: bool,
    notifications: Notifications,
    label_style: LabelStyle,
}

impl Default for TrackerApp {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl TrackerApp {
    /// Create a new application instance.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            store: SessionStore::new(&config),
            session: Session::new(),
            seen_revision: 0,
            source: None,
            source_loader: None,
            loading_message: None,
            frame_texture: None,
            frame_size: None,
            render_loop: RenderLoop::new(),
            scanner: QrScanner::new(ReplayDecoder::new()),
            camera_status: CAMERA_DISCONNECTED,
            scanner_status: SCANNER_IDLE,
            tracking_status: TRACKING_INACTIVE,
            association_form: AssociationForm::default(),
            confirm_clear: false,
            notifications: Notifications::new(Duration::from_secs(config.notification_secs)),
            label_style: LabelStyle::from_config(&config),
            config,
        }
    }

    /// Open an image file as the frame source (asynchronously).
    fn start_camera(&mut self, path: PathBuf) {
        let (sender, receiver) = channel();
        self.source_loader = Some(receiver);
        self.loading_message = Some("Starting camera...".to_string());

        std::thread::spawn(move || {
            let _ = sender.send(StillImageSource::open(&path));
        });
    }

    fn stop_camera(&mut self) {
        self.stop_scan();
        self.stop_tracking();
        self.source = None;
        self.frame_texture = None;
        self.frame_size = None;
        self.camera_status = CAMERA_DISCONNECTED;
        log::info!("Camera stopped");
    }

    fn start_tracking(&mut self, ctx: &egui::Context) {
        if self.source.is_none() {
            self.notifications.error(DeviceError::NoSource.to_string());
            return;
        }
        self.render_loop.start(ctx);
        self.tracking_status = Status::new("Active", StatusLevel::Success);
        self.notifications
            .success("Object tracking started. Click on objects to track them.");
    }

    fn stop_tracking(&mut self) {
        self.render_loop.stop();
        self.tracking_status = TRACKING_INACTIVE;
    }

    fn start_scan(&mut self) {
        let options = ScanOptions {
            fps: self.config.scan_fps,
        };
        match self.scanner.start(self.source.as_deref(), options) {
            Ok(()) => {
                self.scanner_status = Status::new("Scanning", StatusLevel::Success);
                self.notifications.success("QR code scanning started");
            }
            Err(DeviceError::NoSource) => {
                self.notifications.error(DeviceError::NoSource.to_string());
            }
            Err(e) => {
                self.scanner_status = Status::new("Failed", StatusLevel::Error);
                self.notifications
                    .error(format!("Failed to start QR scanning: {}", e));
            }
        }
    }

    fn stop_scan(&mut self) {
        match self.scanner.stop() {
            Ok(()) => self.scanner_status = SCANNER_IDLE,
            Err(e) => {
                self.scanner_status = Status::new("Failed", StatusLevel::Error);
                self.notifications
                    .error(format!("Failed to stop QR scanning: {}", e));
            }
        }
    }

    fn load_decode_log(&mut self, path: PathBuf) {
        self.scanner.decoder_mut().set_log(&path);
        log::info!("Decode log set to {}", path.display());
        if self.scanner.is_scanning() {
            self.notifications
                .success("Decode log loaded; restart scanning to use it");
        } else {
            self.notifications.success("Decode log loaded");
        }
    }

    fn export_session(&mut self, extension: &str) {
        let now = Utc::now();
        let Some(path) = rfd::FileDialog::new()
            .add_filter(extension.to_uppercase(), &[extension])
            .set_file_name(serialization::default_export_filename(now, extension))
            .save_file()
        else {
            return;
        };

        let snapshot = self
            .session
            .export_snapshot_at(&self.store, self.render_loop.fps(), now);
        match serialization::export_auto(&snapshot, &path) {
            Ok(()) => {
                log::info!("Exported session to {}", path.display());
                self.notifications.success("Session data exported successfully");
            }
            Err(e) => self
                .notifications
                .error(format!("Failed to export session: {:#}", e)),
        }
    }

    fn clear_session(&mut self) {
        self.session.reset(&mut self.store);
        self.association_form.close();
        self.notifications.success("Session data cleared");
    }

    fn save_association(&mut self) {
        let form = &self.association_form;
        match ingest::confirm_association(&mut self.store, form.object, form.qr_code, &form.notes) {
            Ok(_) => {
                self.association_form.close();
                self.notifications.success("Association created successfully");
            }
            Err(e) => self.notifications.error(e.to_string()),
        }
    }

    /// Pick up a finished background load, if any.
    fn poll_source_loader(&mut self) {
        let Some(receiver) = &self.source_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.source_loader = None;
        self.loading_message = None;

        match result {
            Ok(source) => {
                self.source = Some(Box::new(source));
                self.camera_status = Status::new("Connected", StatusLevel::Success);
                self.notifications.success("Camera started successfully");
            }
            Err(e) => {
                self.camera_status = Status::new("Failed", StatusLevel::Error);
                self.notifications.error(format!("Failed to start camera: {}", e));
            }
        }
    }

    /// Upload a new frame from the source when one is available.
    fn refresh_frame(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.source.as_mut().and_then(|s| s.next_frame()) else {
            return;
        };
        let size = [frame.width as usize, frame.height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &frame.pixels);
        self.frame_texture = Some(ctx.load_texture("frame", color_image, egui::TextureOptions::LINEAR));
        self.frame_size = Some((frame.width, frame.height));
    }

    /// Feed decoder results into the store.
    fn poll_scanner(&mut self, ctx: &egui::Context) {
        let was_scanning = self.scanner.is_scanning();
        for event in self.scanner.poll() {
            if let Some(qr) = ingest::handle_decode(&mut self.store, &event) {
                self.notifications.success(format!(
                    "QR code detected: {}",
                    truncate_label(&qr.content, 30)
                ));
            }
        }

        if was_scanning {
            match self.scanner.state() {
                ScannerState::Scanning => ctx.request_repaint_after(Duration::from_millis(50)),
                ScannerState::Idle => self.scanner_status = SCANNER_IDLE,
                ScannerState::Failed => {
                    self.scanner_status = Status::new("Failed", StatusLevel::Error)
                }
            }
        }
    }

    /// React to store changes made since the last frame.
    fn sync_view(&mut self, ctx: &egui::Context) {
        let revision = self.store.revision();
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.association_form.drop_stale(&self.store);
            ctx.request_repaint();
        }
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_source_loader();
        self.refresh_frame(ctx);
        self.poll_scanner(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Frame Source...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                            .pick_file()
                        {
                            self.start_camera(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Load Decode Log...").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Decode logs", &["jsonl", "json", "txt"])
                            .pick_file()
                        {
                            self.load_decode_log(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export Session", |ui| {
                        if ui.button("Export as JSON...").clicked() {
                            self.export_session("json");
                            ui.close_menu();
                        }
                        if ui.button("Export as YAML...").clicked() {
                            self.export_session("yaml");
                            ui.close_menu();
                        }
                    });
                    if ui.button("Clear Session...").clicked() {
                        self.confirm_clear = true;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    &ToolbarView {
                        camera: &self.camera_status,
                        scanner: &self.scanner_status,
                        tracking: &self.tracking_status,
                        has_source: self.source.is_some(),
                        is_tracking: self.render_loop.is_running(),
                        is_scanning: self.scanner.is_scanning(),
                        can_associate: self.store.can_associate(),
                    },
                )
            })
            .inner;

        match toolbar_action {
            ToolbarAction::StartCamera => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif"])
                    .pick_file()
                {
                    self.start_camera(path);
                }
            }
            ToolbarAction::StopCamera => self.stop_camera(),
            ToolbarAction::StartTracking => self.start_tracking(ctx),
            ToolbarAction::StopTracking => self.stop_tracking(),
            ToolbarAction::StartScan => self.start_scan(),
            ToolbarAction::StopScan => self.stop_scan(),
            ToolbarAction::CreateAssociation => self.association_form.open(),
            ToolbarAction::None => {}
        }

        // Status bar; the session clock ticks once a second
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            toolbar::show_status_bar(
                ui,
                &SessionStats {
                    elapsed: self.session.elapsed(),
                    objects: self.store.object_count(),
                    qr_codes: self.store.qr_code_count(),
                    associations: self.store.association_count(),
                    fps: self.render_loop.fps(),
                },
            );
        });
        ctx.request_repaint_after(Duration::from_secs(1));

        // Session panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| properties::show(ui, &self.store))
            .inner;

        match properties_action {
            PropertiesAction::RemoveObject(id) => self.store.remove_object(&id),
            PropertiesAction::RemoveQrCode(id) => self.store.remove_qr_code(&id),
            PropertiesAction::RemoveAssociation(id) => self.store.remove_association(&id),
            PropertiesAction::None => {}
        }

        // Main canvas (center)
        let draw_overlay = self.render_loop.tick(ctx);
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    canvas::CanvasAction::None
                } else {
                    canvas::show(
                        ui,
                        &self.store,
                        &self.frame_texture,
                        self.frame_size,
                        self.render_loop.is_running(),
                        draw_overlay,
                        &self.label_style,
                    )
                }
            })
            .inner;

        if let canvas::CanvasAction::Click(point, mapper) = canvas_action {
            let tracking = self.render_loop.is_running();
            if let Some(obj) = ingest::handle_pointer_click(&mut self.store, &mapper, tracking, point) {
                self.notifications
                    .success(format!("Object {} added for tracking", obj.id.ordinal()));
            }
        }

        // Association form
        match properties::show_association_form(ctx, &mut self.association_form, &self.store) {
            FormAction::Save => self.save_association(),
            FormAction::Cancel => self.association_form.close(),
            FormAction::None => {}
        }

        // Clear confirmation
        if self.confirm_clear {
            egui::Window::new("Clear Session")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("Are you sure you want to clear all session data?");
                    ui.horizontal(|ui| {
                        if ui.button("Clear").clicked() {
                            self.clear_session();
                            self.confirm_clear = false;
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_clear = false;
                        }
                    });
                });
        }

        self.sync_view(ctx);
        self.notifications.show(ctx);
    }
}
