//! In-memory record store: the canonical, ordered list of profiles.
//!
//! Process lifetime only. Every operation takes the lock for its own duration,
//! so the store is safe to share across handlers, but read-modify-write
//! sequences spanning several calls are not atomic: the last writer wins.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{Descriptions, LanguageFlags, Photo, ProfileFields, ProfileRecord};

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Profile {0} already exists")]
    DuplicateId(Uuid),
}

#[derive(Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<ProfileRecord>>>,
}

impl RecordStore {
    pub fn new(seed: Vec<ProfileRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(seed)),
        }
    }

    /// All records in insertion order.
    pub fn list(&self) -> Vec<ProfileRecord> {
        self.read().clone()
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<ProfileRecord> {
        self.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Appends a record. Identifiers are unique within the store.
    pub fn insert(&self, record: ProfileRecord) -> Result<(), StoreError> {
        let mut records = self.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        info!("Inserted profile {}", record.id);
        records.push(record);
        Ok(())
    }

    /// Replaces the fields and photos of the record with `id`, keeping its
    /// identifier and position. Returns the replaced record, or `None` if no
    /// such record exists.
    pub fn update(
        &self,
        id: Uuid,
        fields: ProfileFields,
        photos: Vec<Photo>,
    ) -> Option<ProfileRecord> {
        let mut records = self.write();
        let record = records.iter_mut().find(|r| r.id == id)?;
        let previous = std::mem::replace(record, ProfileRecord { id, fields, photos });
        info!("Updated profile {id}");
        Some(previous)
    }

    /// Deletes the record with `id`. Returns `false` if it was not present.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut records = self.write();
        let before = records.len();
        records.retain(|r| r.id != id);
        let removed = records.len() != before;
        if removed {
            info!("Removed profile {id}");
        }
        removed
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<ProfileRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ProfileRecord>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Demo profiles loaded at startup when seeding is enabled.
pub fn seed_records() -> Vec<ProfileRecord> {
    let sophie = ProfileRecord {
        id: Uuid::new_v4(),
        fields: ProfileFields {
            name: "Sophie".into(),
            age: 24,
            height: 168,
            weight: 55,
            hair_colour: "blonde".into(),
            eye_colour: "blue".into(),
            bust: "75b".into(),
            breast_type: "natural".into(),
            clothing_size: 36,
            shoe_size: 38.0,
            private_hair: "shaved".into(),
            nationality: "German".into(),
            languages: LanguageFlags {
                de: true,
                en: true,
                ..Default::default()
            },
            descriptions: Descriptions {
                en: "Warm, curious and always up for a good conversation.".into(),
                de: "Herzlich, neugierig und immer für ein gutes Gespräch zu haben.".into(),
                fr: None,
                it: None,
            },
            ..ProfileFields::form_defaults()
        },
        photos: vec![Photo {
            is_primary: true,
            ..Photo::new("https://placehold.co/600x800?text=Sophie", "Sophie")
        }],
    };

    let elena = ProfileRecord {
        id: Uuid::new_v4(),
        fields: ProfileFields {
            name: "Elena".into(),
            age: 29,
            height: 172,
            weight: 58,
            hair_colour: "brown".into(),
            eye_colour: "green".into(),
            bust: "80c".into(),
            breast_type: "natural".into(),
            clothing_size: 38,
            shoe_size: 39.0,
            private_hair: "trimmed".into(),
            smoker: true,
            nationality: "Italian".into(),
            languages: LanguageFlags {
                it: true,
                en: true,
                fr: true,
                ..Default::default()
            },
            descriptions: Descriptions {
                en: "Elegant company for dinners, events and quiet evenings.".into(),
                de: "Elegante Begleitung für Dinner, Events und ruhige Abende.".into(),
                fr: Some("Une compagnie élégante pour dîners, événements et soirées calmes.".into()),
                it: Some("Compagnia elegante per cene, eventi e serate tranquille.".into()),
            },
            ..ProfileFields::form_defaults()
        },
        photos: vec![],
    };

    vec![sophie, elena]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ProfileRecord {
        ProfileRecord {
            id: Uuid::new_v4(),
            fields: ProfileFields {
                name: name.into(),
                ..ProfileFields::form_defaults()
            },
            photos: vec![],
        }
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = RecordStore::default();
        store.insert(record("a")).unwrap();
        store.insert(record("b")).unwrap();
        store.insert(record("c")).unwrap();
        let names: Vec<_> = store.list().into_iter().map(|r| r.fields.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let store = RecordStore::default();
        let r = record("a");
        store.insert(r.clone()).unwrap();
        assert_eq!(store.insert(r.clone()), Err(StoreError::DuplicateId(r.id)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_keeps_id_and_position() {
        let first = record("a");
        let second = record("b");
        let store = RecordStore::new(vec![first.clone(), second.clone()]);

        let mut fields = first.fields.clone();
        fields.name = "renamed".into();
        let previous = store.update(first.id, fields, vec![]).unwrap();
        assert_eq!(previous, first);

        let records = store.list();
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[0].fields.name, "renamed");
        assert_eq!(records[1], second);
    }

    #[test]
    fn test_update_missing_is_noop() {
        let store = RecordStore::new(vec![record("a")]);
        let before = store.list();
        assert!(store
            .update(Uuid::new_v4(), ProfileFields::default(), vec![])
            .is_none());
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_remove_then_find_reports_not_found() {
        let target = record("x");
        let store = RecordStore::new(vec![record("a"), target.clone()]);
        assert!(store.remove(target.id));
        assert_eq!(store.len(), 1);
        assert!(store.find_by_id(target.id).is_none());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let store = RecordStore::new(vec![record("a")]);
        assert!(!store.remove(Uuid::new_v4()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_seed_records_are_valid() {
        use validator::Validate;
        for record in seed_records() {
            assert!(record.fields.validate().is_ok(), "{} invalid", record.fields.name);
        }
    }
}
