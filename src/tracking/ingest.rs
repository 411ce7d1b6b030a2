// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Event ingestion.
//!
//! Translates the outside world's signals (pointer clicks on the frame,
//! decoder results, the association form) into store mutations.

use crate::error::StoreError;
use crate::io::decoder::DecodeEvent;
use crate::models::entity::{Association, ObjectId, Point, QrCode, QrCodeId, TrackedObject};
use crate::models::store::SessionStore;
use crate::util::geometry::ScaleMapper;
use chrono::{DateTime, Utc};

/// Handle a click at display coordinates relative to the frame's top-left
/// corner. Clicks only count while tracking is active and the frame size
/// is known.
pub fn handle_pointer_click(
    store: &mut SessionStore,
    mapper: &ScaleMapper,
    tracking_active: bool,
    click: Point,
) -> Option<TrackedObject> {
    if !tracking_active {
        return None;
    }
    if !mapper.is_ready() {
        log::debug!("Ignoring click before frame size is known");
        return None;
    }
    let native = mapper.to_native_point(click);
    Some(store.add_object(native.x, native.y))
}

/// Handle one decoder result. `None` means the content was seen moments
/// ago and nothing was recorded.
pub fn handle_decode(store: &mut SessionStore, event: &DecodeEvent) -> Option<QrCode> {
    handle_decode_at(store, event, Utc::now())
}

pub fn handle_decode_at(
    store: &mut SessionStore,
    event: &DecodeEvent,
    now: DateTime<Utc>,
) -> Option<QrCode> {
    store.add_qr_code_at(&event.text, event.location, event.format.as_deref(), now)
}

/// Create an association from the form's current selection.
pub fn confirm_association(
    store: &mut SessionStore,
    object_id: Option<ObjectId>,
    qr_code_id: Option<QrCodeId>,
    notes: &str,
) -> Result<Association, StoreError> {
    let (Some(object_id), Some(qr_code_id)) = (object_id, qr_code_id) else {
        return Err(StoreError::MissingSelection);
    };
    store.add_association(object_id, qr_code_id, notes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::{BoundingBox, QrLocation};
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_click_ignored_when_not_tracking() {
        let mut store = SessionStore::default();
        let mapper = ScaleMapper::identity(640.0, 480.0);
        assert!(handle_pointer_click(&mut store, &mapper, false, Point::new(10.0, 10.0)).is_none());
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn test_click_ignored_without_frame_size() {
        let mut store = SessionStore::default();
        let mapper = ScaleMapper::new(0.0, 0.0, 640.0, 480.0);
        assert!(handle_pointer_click(&mut store, &mapper, true, Point::new(10.0, 10.0)).is_none());
        assert_eq!(store.object_count(), 0);
    }

    #[test]
    fn test_click_maps_to_native_frame() {
        let mut store = SessionStore::default();
        // 1280x720 frame shown at half size
        let mapper = ScaleMapper::new(1280.0, 720.0, 640.0, 360.0);
        let obj = handle_pointer_click(&mut store, &mapper, true, Point::new(100.0, 50.0)).unwrap();
        assert_eq!(obj.position, BoundingBox::new(175.0, 75.0, 50.0, 50.0));
    }

    #[test]
    fn test_decode_duplicates_are_quiet() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut store = SessionStore::default();
        let mut event = DecodeEvent::new("PALLET-7");
        event.location = Some(QrLocation { x: 40.0, y: 60.0 });

        let qr = handle_decode_at(&mut store, &event, t).unwrap();
        assert_eq!(qr.position, BoundingBox::new(40.0, 60.0, 100.0, 100.0));
        for i in 1..10 {
            assert!(handle_decode_at(&mut store, &event, t + Duration::milliseconds(i * 100)).is_none());
        }
        assert_eq!(store.qr_code_count(), 1);
    }

    #[test]
    fn test_confirm_requires_both_selections() {
        let mut store = SessionStore::default();
        let obj = store.add_object(100.0, 100.0);
        let err = confirm_association(&mut store, Some(obj.id), None, "").unwrap_err();
        assert_eq!(err, StoreError::MissingSelection);

        let qr = store.add_qr_code("A", None, None).unwrap();
        let assoc = confirm_association(&mut store, Some(obj.id), Some(qr.id), " note ").unwrap();
        assert_eq!(assoc.notes, "note");

        let err = confirm_association(&mut store, Some(obj.id), Some(qr.id), "").unwrap_err();
        assert!(err.is_duplicate());
    }
}
