// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session panel and association form.
//!
//! This module lists the session's QR codes, tracked objects and
//! associations with per-entry remove buttons, and provides the modal
//! form used to link an object to a QR code.

use crate::models::entity::{
    truncate_label, AssociationId, ObjectId, QrCode, QrCodeId, TrackedObject,
};
use crate::models::store::SessionStore;
use chrono::{DateTime, Local, Utc};

/// Result of session panel interaction.
pub enum PropertiesAction {
    None,
    RemoveObject(ObjectId),
    RemoveQrCode(QrCodeId),
    RemoveAssociation(AssociationId),
}

fn local_time(t: &DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn qr_choice_label(qr: &QrCode, max_chars: usize) -> String {
    truncate_label(&qr.content, max_chars)
}

fn object_choice_label(obj: &TrackedObject) -> String {
    format!("{} ({})", obj.display_name(), obj.kind.as_str())
}

/// One list row: title, subtitle, and a remove button.
fn data_item(ui: &mut egui::Ui, title: &str, subtitle: &str) -> bool {
    let mut remove = false;
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(title).strong());
            ui.label(egui::RichText::new(subtitle).small().weak());
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            remove = ui.small_button("Remove").clicked();
        });
    });
    ui.separator();
    remove
}

/// Display the session panel.
pub fn show(ui: &mut egui::Ui, store: &SessionStore) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("QR Codes");
        if store.qr_code_count() == 0 {
            ui.label(egui::RichText::new("No QR codes detected").weak());
        }
        for qr in store.qr_codes() {
            let title = truncate_label(&qr.content, 25);
            let subtitle = format!("{} • {}", qr.format, local_time(&qr.timestamp));
            if data_item(ui, &title, &subtitle) {
                action = PropertiesAction::RemoveQrCode(qr.id);
            }
        }

        ui.add_space(12.0);
        ui.heading("Tracked Objects");
        if store.object_count() == 0 {
            ui.label(egui::RichText::new("No objects being tracked").weak());
        }
        for obj in store.objects() {
            let subtitle = format!("{} • {}", obj.kind.as_str(), local_time(&obj.timestamp));
            if data_item(ui, &obj.display_name(), &subtitle) {
                action = PropertiesAction::RemoveObject(obj.id);
            }
        }

        ui.add_space(12.0);
        ui.heading("Associations");
        if store.association_count() == 0 {
            ui.label(egui::RichText::new("No associations created").weak());
        }
        for assoc in store.associations() {
            let object_name = store
                .object(&assoc.object_id)
                .map(TrackedObject::display_name)
                .unwrap_or_else(|| "Unknown Object".to_string());
            let qr_name = store
                .qr_code(&assoc.qr_code_id)
                .map(|qr| truncate_label(&qr.content, 20))
                .unwrap_or_else(|| "Unknown QR".to_string());

            let title = format!("{} ↔ {}", object_name, qr_name);
            let mut subtitle = local_time(&assoc.timestamp);
            if !assoc.notes.is_empty() {
                subtitle.push_str(" • ");
                subtitle.push_str(&truncate_label(&assoc.notes, 30));
            }
            if data_item(ui, &title, &subtitle) {
                action = PropertiesAction::RemoveAssociation(assoc.id);
            }
        }
    });

    action
}

/// State of the association form.
#[derive(Debug, Default)]
pub struct AssociationForm {
    pub open: bool,
    pub object: Option<ObjectId>,
    pub qr_code: Option<QrCodeId>,
    pub notes: String,
}

impl AssociationForm {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the form and clear its fields.
    pub fn close(&mut self) {
        *self = Self::default();
    }

    /// Forget selections that no longer exist in the store.
    pub fn drop_stale(&mut self, store: &SessionStore) {
        if self.object.is_some_and(|id| store.object(&id).is_none()) {
            self.object = None;
        }
        if self.qr_code.is_some_and(|id| store.qr_code(&id).is_none()) {
            self.qr_code = None;
        }
    }
}

/// Button pressed in the association form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Save,
    Cancel,
}

/// Display the association form as a modal window while it is open.
pub fn show_association_form(
    ctx: &egui::Context,
    form: &mut AssociationForm,
    store: &SessionStore,
) -> FormAction {
    if !form.open {
        return FormAction::None;
    }

    let mut action = FormAction::None;
    let mut window_open = true;

    egui::Window::new("Create Association")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .open(&mut window_open)
        .show(ctx, |ui| {
            let qr_text = form
                .qr_code
                .and_then(|id| store.qr_code(&id))
                .map(|qr| qr_choice_label(qr, 40))
                .unwrap_or_else(|| "Select QR Code".to_string());
            egui::ComboBox::from_label("QR Code")
                .selected_text(qr_text)
                .show_ui(ui, |ui| {
                    for qr in store.qr_codes() {
                        ui.selectable_value(&mut form.qr_code, Some(qr.id), qr_choice_label(qr, 40));
                    }
                });

            let object_text = form
                .object
                .and_then(|id| store.object(&id))
                .map(object_choice_label)
                .unwrap_or_else(|| "Select Object".to_string());
            egui::ComboBox::from_label("Object")
                .selected_text(object_text)
                .show_ui(ui, |ui| {
                    for obj in store.objects() {
                        ui.selectable_value(&mut form.object, Some(obj.id), object_choice_label(obj));
                    }
                });

            ui.label("Notes");
            ui.text_edit_multiline(&mut form.notes);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Save Association").clicked() {
                    action = FormAction::Save;
                }
                if ui.button("Cancel").clicked() {
                    action = FormAction::Cancel;
                }
            });
        });

    if !window_open {
        action = FormAction::Cancel;
    }
    action
}
