//! Integration test: drive a session through clicks, decoder results and
//! the association form, then export it and check the document.

use chrono::{Duration, TimeZone, Utc};
use qrlink::io::decoder::{parse_decode_log, DecodeEvent};
use qrlink::io::serialization::snapshot_to_json;
use qrlink::models::entity::{BoundingBox, Point};
use qrlink::models::session::Session;
use qrlink::models::store::SessionStore;
use qrlink::tracking::ingest;
use qrlink::util::geometry::ScaleMapper;

#[test]
fn tracked_session_exports_consistent_document() {
    let t0 = Utc.with_ymd_and_hms(2025, 3, 1, 14, 0, 0).unwrap();
    let mut store = SessionStore::default();
    let session = Session::started_at(t0);

    // 1280x720 capture shown at 640x360
    let mapper = ScaleMapper::new(1280.0, 720.0, 640.0, 360.0);
    let first = ingest::handle_pointer_click(&mut store, &mapper, true, Point::new(50.0, 50.0))
        .expect("click while tracking creates an object");
    assert_eq!(first.position, BoundingBox::new(75.0, 75.0, 50.0, 50.0));
    ingest::handle_pointer_click(&mut store, &mapper, true, Point::new(5.0, 5.0))
        .expect("second object");
    assert!(ingest::handle_pointer_click(&mut store, &mapper, false, Point::new(9.0, 9.0)).is_none());
    assert_eq!(store.object_count(), 2);

    // Decoder sees the same label for ten frames at 10 fps, then another
    let log = r#"
{"text": "PALLET-7", "location": {"x": 400.0, "y": 120.0}, "frames": 10}
{"text": "PALLET-8"}
"#;
    let events = parse_decode_log(log).expect("valid log");
    let mut now = t0;
    for event in &events {
        ingest::handle_decode_at(&mut store, event, now);
        now = now + Duration::milliseconds(100);
    }
    assert_eq!(store.qr_code_count(), 2);

    // Seen again long after the window closed
    now = now + Duration::milliseconds(2100);
    assert!(ingest::handle_decode_at(&mut store, &DecodeEvent::new("PALLET-7"), now).is_some());
    assert_eq!(store.qr_code_count(), 3);

    let pallet = store.qr_codes().next().map(|q| q.id).expect("first QR");
    let assoc = ingest::confirm_association(&mut store, Some(first.id), Some(pallet), "front left")
        .expect("association created");
    assert_eq!(assoc.id.to_string(), "assoc_1");
    assert!(ingest::confirm_association(&mut store, Some(first.id), Some(pallet), "").is_err());
    assert_eq!(store.association_count(), 1);

    let snapshot = session.export_snapshot_at(&store, 24, t0 + Duration::seconds(75));
    assert_eq!(snapshot.statistics.total_objects, 2);
    assert_eq!(snapshot.statistics.total_qr_codes, 3);
    assert_eq!(snapshot.statistics.total_associations, 1);

    let json = snapshot_to_json(&snapshot).expect("serializable");
    let doc: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(doc["session"]["duration"], "00:01:15");
    assert_eq!(doc["statistics"]["average_fps"], 24);
    assert_eq!(doc["associations"][0]["object_id"], "obj_1");
    assert_eq!(doc["associations"][0]["qr_code_id"], "qr_1");
    assert_eq!(doc["associations"][0]["notes"], "front left");
    assert_eq!(doc["qr_codes"][0]["position"]["x"], 400.0);
    assert_eq!(doc["qr_codes"][1]["format"], "QR_CODE");

    // Removing the object takes its association with it
    store.remove_object(&first.id);
    assert_eq!(store.association_count(), 0);
    assert_eq!(store.qr_code_count(), 3);
    assert!(store.qr_code(&pallet).is_some());
}
