// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory session store.
//!
//! The store owns every tracked object, QR code and association of the
//! current session and keeps them consistent: associations only ever
//! point at live entities, and each (object, QR code) pair is linked at
//! most once. Collections are keyed by id, so iteration follows creation
//! order.

use super::entity::{
    Association, AssociationId, BoundingBox, ObjectId, Point, QrCode, QrCodeId, QrLocation,
    TrackedObject, DEFAULT_QR_FORMAT,
};
use crate::config::TrackerConfig;
use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Owner of all session entities.
#[derive(Debug, Clone)]
pub struct SessionStore {
    objects: BTreeMap<ObjectId, TrackedObject>,
    qr_codes: BTreeMap<QrCodeId, QrCode>,
    associations: BTreeMap<AssociationId, Association>,

    object_counter: u64,
    qr_counter: u64,
    association_counter: u64,

    /// Bumped on every mutation so views know when to refresh
    revision: u64,

    object_box_size: f64,
    qr_box_size: f64,
    duplicate_window: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(&TrackerConfig::default())
    }
}

impl SessionStore {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            objects: BTreeMap::new(),
            qr_codes: BTreeMap::new(),
            associations: BTreeMap::new(),
            object_counter: 0,
            qr_counter: 0,
            association_counter: 0,
            revision: 0,
            object_box_size: config.object_box_size,
            qr_box_size: config.qr_box_size,
            duplicate_window: Duration::milliseconds(config.duplicate_window_ms),
        }
    }

    pub fn objects(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }

    pub fn qr_codes(&self) -> impl Iterator<Item = &QrCode> {
        self.qr_codes.values()
    }

    pub fn associations(&self) -> impl Iterator<Item = &Association> {
        self.associations.values()
    }

    pub fn object(&self, id: &ObjectId) -> Option<&TrackedObject> {
        self.objects.get(id)
    }

    pub fn qr_code(&self, id: &QrCodeId) -> Option<&QrCode> {
        self.qr_codes.get(id)
    }

    pub fn association(&self, id: &AssociationId) -> Option<&Association> {
        self.associations.get(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn qr_code_count(&self) -> usize {
        self.qr_codes.len()
    }

    pub fn association_count(&self) -> usize {
        self.associations.len()
    }

    /// Whether the association form has anything to pair up.
    pub fn can_associate(&self) -> bool {
        !self.objects.is_empty() && !self.qr_codes.is_empty()
    }

    /// Mutation counter; changes whenever the store changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Track a new object centered on `(x, y)` in frame coordinates.
    pub fn add_object(&mut self, x: f64, y: f64) -> TrackedObject {
        self.add_object_at(x, y, Utc::now())
    }

    pub fn add_object_at(&mut self, x: f64, y: f64, now: DateTime<Utc>) -> TrackedObject {
        self.object_counter += 1;
        let id = ObjectId::from_counter(self.object_counter);
        let object = TrackedObject::manual(id, Point::new(x, y), self.object_box_size, now);

        self.objects.insert(id, object.clone());
        self.touch();
        log::info!(
            "Added {} at ({:.1}, {:.1}), total objects: {}",
            id,
            object.position.x,
            object.position.y,
            self.objects.len()
        );
        object
    }

    /// Record a decoded QR code.
    ///
    /// Returns `None` when a code with identical content was stored less
    /// than the duplicate window ago; that is the normal outcome of a
    /// decoder reporting the same symbol frame after frame.
    pub fn add_qr_code(
        &mut self,
        content: &str,
        location: Option<QrLocation>,
        format: Option<&str>,
    ) -> Option<QrCode> {
        self.add_qr_code_at(content, location, format, Utc::now())
    }

    pub fn add_qr_code_at(
        &mut self,
        content: &str,
        location: Option<QrLocation>,
        format: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<QrCode> {
        let recent = self
            .qr_codes
            .values()
            .any(|qr| qr.content == content && now - qr.timestamp < self.duplicate_window);
        if recent {
            log::debug!("Suppressed duplicate QR content {:?}", content);
            return None;
        }

        self.qr_counter += 1;
        let id = QrCodeId::from_counter(self.qr_counter);
        let position = match location {
            Some(loc) => BoundingBox::new(loc.x, loc.y, self.qr_box_size, self.qr_box_size),
            None => BoundingBox::new(0.0, 0.0, self.qr_box_size, self.qr_box_size),
        };
        let qr = QrCode {
            id,
            content: content.to_string(),
            position,
            timestamp: now,
            format: format.unwrap_or(DEFAULT_QR_FORMAT).to_string(),
        };

        self.qr_codes.insert(id, qr.clone());
        self.touch();
        log::info!("Added {}, total QR codes: {}", id, self.qr_codes.len());
        Some(qr)
    }

    /// Link an object to a QR code.
    pub fn add_association(
        &mut self,
        object_id: ObjectId,
        qr_code_id: QrCodeId,
        notes: &str,
    ) -> Result<Association, StoreError> {
        self.add_association_at(object_id, qr_code_id, notes, Utc::now())
    }

    pub fn add_association_at(
        &mut self,
        object_id: ObjectId,
        qr_code_id: QrCodeId,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<Association, StoreError> {
        if !self.objects.contains_key(&object_id) {
            return Err(StoreError::UnknownObject(object_id));
        }
        if !self.qr_codes.contains_key(&qr_code_id) {
            return Err(StoreError::UnknownQrCode(qr_code_id));
        }
        let exists = self
            .associations
            .values()
            .any(|a| a.object_id == object_id && a.qr_code_id == qr_code_id);
        if exists {
            return Err(StoreError::DuplicateAssociation {
                object_id,
                qr_code_id,
            });
        }

        self.association_counter += 1;
        let id = AssociationId::from_counter(self.association_counter);
        let association = Association {
            id,
            object_id,
            qr_code_id,
            timestamp: now,
            notes: notes.trim().to_string(),
            confidence: 1.0,
        };

        self.associations.insert(id, association.clone());
        self.touch();
        log::info!(
            "Associated {} with {} as {}, total associations: {}",
            object_id,
            qr_code_id,
            id,
            self.associations.len()
        );
        Ok(association)
    }

    /// Remove an object and every association that references it.
    pub fn remove_object(&mut self, id: &ObjectId) {
        if self.objects.remove(id).is_none() {
            return;
        }
        let before = self.associations.len();
        self.associations.retain(|_, a| a.object_id != *id);
        self.touch();
        log::info!(
            "Removed {} and {} association(s), total objects: {}",
            id,
            before - self.associations.len(),
            self.objects.len()
        );
    }

    /// Remove a QR code and every association that references it.
    pub fn remove_qr_code(&mut self, id: &QrCodeId) {
        if self.qr_codes.remove(id).is_none() {
            return;
        }
        let before = self.associations.len();
        self.associations.retain(|_, a| a.qr_code_id != *id);
        self.touch();
        log::info!(
            "Removed {} and {} association(s), total QR codes: {}",
            id,
            before - self.associations.len(),
            self.qr_codes.len()
        );
    }

    pub fn remove_association(&mut self, id: &AssociationId) {
        if self.associations.remove(id).is_some() {
            self.touch();
            log::info!(
                "Removed {}, total associations: {}",
                id,
                self.associations.len()
            );
        }
    }

    /// Drop everything and restart all id sequences at 1.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.qr_codes.clear();
        self.associations.clear();
        self.object_counter = 0;
        self.qr_counter = 0;
        self.association_counter = 0;
        self.touch();
        log::info!("Cleared session store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    /// Every association points at a live object and QR code.
    fn assert_integrity(store: &SessionStore) {
        for a in store.associations() {
            assert!(store.object(&a.object_id).is_some(), "{} dangles", a.id);
            assert!(store.qr_code(&a.qr_code_id).is_some(), "{} dangles", a.id);
        }
    }

    #[test]
    fn test_add_object_centers_box() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(100.0, 100.0, t0());
        assert_eq!(obj.id.to_string(), "obj_1");
        assert_eq!(obj.position, BoundingBox::new(75.0, 75.0, 50.0, 50.0));

        let obj = store.add_object_at(10.0, 10.0, t0());
        assert_eq!(obj.id.to_string(), "obj_2");
        assert_eq!(obj.position, BoundingBox::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(store.object_count(), 2);
    }

    #[test]
    fn test_qr_duplicate_window() {
        let mut store = SessionStore::default();
        assert!(store.add_qr_code_at("A", None, None, t0()).is_some());
        assert!(store.add_qr_code_at("A", None, None, t0() + ms(500)).is_none());
        assert_eq!(store.qr_code_count(), 1);

        let second = store.add_qr_code_at("A", None, None, t0() + ms(2100)).unwrap();
        assert_eq!(second.id.to_string(), "qr_2");
        assert_eq!(store.qr_code_count(), 2);
    }

    #[test]
    fn test_qr_window_boundary_is_exclusive() {
        let mut store = SessionStore::default();
        store.add_qr_code_at("A", None, None, t0());
        assert!(store.add_qr_code_at("A", None, None, t0() + ms(1999)).is_none());
        assert!(store.add_qr_code_at("A", None, None, t0() + ms(2000)).is_some());
    }

    #[test]
    fn test_qr_duplicates_ignore_position() {
        let mut store = SessionStore::default();
        let loc = QrLocation { x: 300.0, y: 40.0 };
        store.add_qr_code_at("A", None, None, t0());
        assert!(store.add_qr_code_at("A", Some(loc), None, t0() + ms(10)).is_none());
        assert!(store.add_qr_code_at("B", Some(loc), None, t0() + ms(10)).is_some());
    }

    #[test]
    fn test_qr_position_and_format_defaults() {
        let mut store = SessionStore::default();
        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();
        assert_eq!(qr.position, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(qr.format, "QR_CODE");

        let loc = QrLocation { x: 12.0, y: 34.0 };
        let qr = store
            .add_qr_code_at("B", Some(loc), Some("DATA_MATRIX"), t0())
            .unwrap();
        assert_eq!(qr.position, BoundingBox::new(12.0, 34.0, 100.0, 100.0));
        assert_eq!(qr.format, "DATA_MATRIX");
    }

    #[test]
    fn test_association_lifecycle() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(200.0, 200.0, t0());
        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();

        let assoc = store
            .add_association_at(obj.id, qr.id, "  pallet 7  ", t0())
            .unwrap();
        assert_eq!(assoc.id.to_string(), "assoc_1");
        assert_eq!(assoc.notes, "pallet 7");
        assert_eq!(assoc.confidence, 1.0);

        store.remove_object(&obj.id);
        assert_eq!(store.association_count(), 0);
        assert_eq!(store.object_count(), 0);
        assert!(store.qr_code(&qr.id).is_some());
    }

    #[test]
    fn test_duplicate_association_rejected_without_mutation() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(200.0, 200.0, t0());
        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();
        store.add_association_at(obj.id, qr.id, "", t0()).unwrap();
        let revision = store.revision();

        let err = store.add_association_at(obj.id, qr.id, "again", t0()).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.association_count(), 1);
        assert_eq!(store.revision(), revision);

        // The failed attempt does not consume an id.
        let obj2 = store.add_object_at(50.0, 50.0, t0());
        let next = store.add_association_at(obj2.id, qr.id, "", t0()).unwrap();
        assert_eq!(next.id.to_string(), "assoc_2");
    }

    #[test]
    fn test_association_requires_live_entities() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(200.0, 200.0, t0());
        let ghost_qr = QrCodeId::from_counter(9);
        let err = store.add_association_at(obj.id, ghost_qr, "", t0()).unwrap_err();
        assert_eq!(err, StoreError::UnknownQrCode(ghost_qr));
        assert!(err.is_validation());

        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();
        store.remove_object(&obj.id);
        let err = store.add_association_at(obj.id, qr.id, "", t0()).unwrap_err();
        assert_eq!(err, StoreError::UnknownObject(obj.id));
        assert_eq!(store.association_count(), 0);
    }

    #[test]
    fn test_remove_cascades_only_matching_associations() {
        let mut store = SessionStore::default();
        let o1 = store.add_object_at(100.0, 100.0, t0());
        let o2 = store.add_object_at(300.0, 100.0, t0());
        let q1 = store.add_qr_code_at("A", None, None, t0()).unwrap();
        let q2 = store.add_qr_code_at("B", None, None, t0()).unwrap();

        store.add_association_at(o1.id, q1.id, "", t0()).unwrap();
        store.add_association_at(o1.id, q2.id, "", t0()).unwrap();
        let keep = store.add_association_at(o2.id, q1.id, "", t0()).unwrap();

        store.remove_object(&o1.id);
        let remaining: Vec<_> = store.associations().map(|a| a.id).collect();
        assert_eq!(remaining, vec![keep.id]);
        assert_integrity(&store);

        store.remove_qr_code(&q1.id);
        assert_eq!(store.association_count(), 0);
        assert_eq!(store.qr_code_count(), 1);
        assert_integrity(&store);
    }

    #[test]
    fn test_removals_are_idempotent() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(100.0, 100.0, t0());
        store.remove_object(&obj.id);
        let revision = store.revision();

        store.remove_object(&obj.id);
        store.remove_qr_code(&QrCodeId::from_counter(1));
        store.remove_association(&AssociationId::from_counter(1));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut store = SessionStore::default();
        let obj = store.add_object_at(100.0, 100.0, t0());
        store.add_object_at(120.0, 100.0, t0());
        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();
        store.add_association_at(obj.id, qr.id, "", t0()).unwrap();

        store.clear();
        assert_eq!(store.object_count(), 0);
        assert_eq!(store.qr_code_count(), 0);
        assert_eq!(store.association_count(), 0);

        let obj = store.add_object_at(100.0, 100.0, t0());
        let qr = store.add_qr_code_at("A", None, None, t0()).unwrap();
        let assoc = store.add_association_at(obj.id, qr.id, "", t0()).unwrap();
        assert_eq!(obj.id.to_string(), "obj_1");
        assert_eq!(qr.id.to_string(), "qr_1");
        assert_eq!(assoc.id.to_string(), "assoc_1");
    }

    #[test]
    fn test_integrity_over_mixed_sequence() {
        let mut store = SessionStore::default();
        let mut now = t0();
        let mut objects = Vec::new();
        let mut codes = Vec::new();

        for i in 0..12 {
            now = now + ms(700);
            objects.push(store.add_object_at(i as f64 * 40.0, 80.0, now).id);
            if let Some(qr) = store.add_qr_code_at(&format!("code-{}", i % 5), None, None, now) {
                codes.push(qr.id);
            }
            for (j, obj) in objects.iter().enumerate() {
                if let Some(qr) = codes.get(j % codes.len().max(1)) {
                    let _ = store.add_association_at(*obj, *qr, "", now);
                }
            }
            assert_integrity(&store);

            if i % 3 == 2 {
                store.remove_object(&objects[i / 2]);
                assert_integrity(&store);
            }
            if i % 4 == 3 {
                store.remove_qr_code(&codes[0]);
                assert_integrity(&store);
            }
        }
        assert!(store.association_count() > 0);
    }
}
