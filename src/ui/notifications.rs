// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Transient toast notifications.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    created: Instant,
}

/// Queue of on-screen messages, each shown for a fixed time.
#[derive(Debug)]
pub struct Notifications {
    items: Vec<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push_at(message.into(), NotificationKind::Success, Instant::now());
    }

    /// Show an error; errors are also logged.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{}", message);
        self.push_at(message, NotificationKind::Error, Instant::now());
    }

    fn push_at(&mut self, message: String, kind: NotificationKind, now: Instant) {
        self.items.push(Notification {
            message,
            kind,
            created: now,
        });
    }

    /// Drop notifications older than the time-to-live.
    pub fn prune_at(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created) < ttl);
    }

    pub fn visible(&self) -> &[Notification] {
        &self.items
    }

    /// Paint the current notifications in the top-right corner.
    pub fn show(&mut self, ctx: &egui::Context) {
        self.prune_at(Instant::now());
        if self.items.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("notifications"))
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-20.0, 20.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(300.0);
                for notification in &self.items {
                    let fill = match notification.kind {
                        NotificationKind::Success => egui::Color32::from_rgb(0x16, 0xa3, 0x4a),
                        NotificationKind::Error => egui::Color32::from_rgb(0xdc, 0x26, 0x26),
                    };
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(8.0)
                        .inner_margin(egui::Margin::symmetric(16.0, 12.0))
                        .show(ui, |ui| {
                            ui.label(
                                egui::RichText::new(&notification.message)
                                    .color(egui::Color32::WHITE)
                                    .strong(),
                            );
                        });
                    ui.add_space(6.0);
                }
            });

        // Keep repainting so expired toasts disappear on time
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}
