//! Read-only projections over the record store: the searchable list and the
//! single-profile preview with its photo carousel.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Photo, ProfileRecord};
use crate::profiles::photos;

/// One row of the profile list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub nationality: String,
    pub height: u32,
    pub languages: Vec<&'static str>,
    pub primary_photo: Option<Photo>,
}

impl From<&ProfileRecord> for ProfileSummary {
    fn from(record: &ProfileRecord) -> Self {
        Self {
            id: record.id,
            name: record.fields.name.clone(),
            age: record.fields.age,
            nationality: record.fields.nationality.clone(),
            height: record.fields.height,
            languages: record.fields.languages.enabled_labels(),
            primary_photo: photos::primary(&record.photos).cloned(),
        }
    }
}

/// Records whose name or nationality contains `query`, ignoring case.
/// An empty query matches everything.
pub fn search<'a>(records: &'a [ProfileRecord], query: &str) -> Vec<&'a ProfileRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.fields.name.to_lowercase().contains(&needle)
                || r.fields.nationality.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Cyclic position over a photo sequence. Stepping past either end wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    /// Positions the carousel at `index`, wrapped into range. With no photos
    /// the index is always 0.
    pub fn new(len: usize, index: usize) -> Self {
        let index = if len == 0 { 0 } else { index % len };
        Self { len, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn next(self) -> Self {
        Self::new(self.len, self.index + 1)
    }

    pub fn prev(self) -> Self {
        if self.len == 0 {
            return self;
        }
        Self::new(self.len, self.index + self.len - 1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedExtra {
    pub label: &'static str,
    pub price: f64,
}

/// Everything the preview page shows for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePreview {
    pub record: ProfileRecord,
    pub photo_count: usize,
    pub photo_index: usize,
    pub previous_index: usize,
    pub next_index: usize,
    pub current_photo: Option<Photo>,
    pub languages: Vec<&'static str>,
    pub included_services: Vec<&'static str>,
    pub extras: Vec<PricedExtra>,
}

pub fn preview(record: ProfileRecord, photo_index: usize) -> ProfilePreview {
    let carousel = Carousel::new(record.photos.len(), photo_index);
    let current_photo = record.photos.get(carousel.index()).cloned();
    let fields = &record.fields;

    ProfilePreview {
        photo_count: record.photos.len(),
        photo_index: carousel.index(),
        previous_index: carousel.prev().index(),
        next_index: carousel.next().index(),
        current_photo,
        languages: fields.languages.enabled_labels(),
        included_services: fields.services.enabled_labels(),
        extras: fields
            .extras
            .priced()
            .into_iter()
            .map(|(label, price)| PricedExtra { label, price })
            .collect(),
        record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageFlags, ProfileFields};
    use crate::profiles::fixtures::valid_fields;

    fn record(name: &str, nationality: &str, photos: usize) -> ProfileRecord {
        ProfileRecord {
            id: Uuid::new_v4(),
            fields: ProfileFields {
                name: name.into(),
                nationality: nationality.into(),
                ..valid_fields()
            },
            photos: (0..photos)
                .map(|i| Photo::new(format!("https://cdn.test/{i}.jpg"), format!("{i}")))
                .collect(),
        }
    }

    #[test]
    fn test_search_matches_name_and_nationality_case_insensitive() {
        let records = vec![
            record("Anna", "Austrian", 0),
            record("Bea", "German", 0),
            record("Carla", "Italian", 0),
        ];
        let names = |q: &str| -> Vec<String> {
            search(&records, q)
                .into_iter()
                .map(|r| r.fields.name.clone())
                .collect()
        };
        assert_eq!(names("ANN"), vec!["Anna"]);
        assert_eq!(names("german"), vec!["Bea"]);
        assert_eq!(names("an"), vec!["Anna", "Bea", "Carla"]);
        assert_eq!(names(""), vec!["Anna", "Bea", "Carla"]);
        assert!(names("xyz").is_empty());
    }

    #[test]
    fn test_summary_primary_photo() {
        let mut with_photos = record("Anna", "Austrian", 2);
        with_photos.photos[1].is_primary = true;
        let summary = ProfileSummary::from(&with_photos);
        assert_eq!(summary.primary_photo.unwrap().alt, "1");

        // Nothing flagged: fall back to the first photo.
        let unflagged = record("Bea", "German", 2);
        assert_eq!(ProfileSummary::from(&unflagged).primary_photo.unwrap().alt, "0");

        assert!(ProfileSummary::from(&record("Carla", "Italian", 0))
            .primary_photo
            .is_none());
    }

    #[test]
    fn test_summary_languages() {
        let mut r = record("Anna", "Austrian", 0);
        r.fields.languages = LanguageFlags {
            de: true,
            other: true,
            ..Default::default()
        };
        assert_eq!(ProfileSummary::from(&r).languages, vec!["DE", "Other"]);
    }

    #[test]
    fn test_carousel_next_wraps_to_start() {
        let carousel = Carousel::new(3, 2);
        assert_eq!(carousel.next().index(), 0);
    }

    #[test]
    fn test_carousel_prev_wraps_to_end() {
        let carousel = Carousel::new(3, 0);
        assert_eq!(carousel.prev().index(), 2);
        assert_eq!(carousel.prev().next(), carousel);
    }

    #[test]
    fn test_carousel_normalizes_out_of_range_index() {
        assert_eq!(Carousel::new(3, 7).index(), 1);
    }

    #[test]
    fn test_carousel_without_photos_stays_at_zero() {
        let carousel = Carousel::new(0, 5);
        assert_eq!(carousel.index(), 0);
        assert_eq!(carousel.next().index(), 0);
        assert_eq!(carousel.prev().index(), 0);
    }

    #[test]
    fn test_preview_positions_carousel() {
        let r = record("Anna", "Austrian", 3);
        let p = preview(r.clone(), 2);
        assert_eq!(p.photo_index, 2);
        assert_eq!(p.next_index, 0);
        assert_eq!(p.previous_index, 1);
        assert_eq!(p.current_photo, Some(r.photos[2].clone()));
    }

    #[test]
    fn test_preview_without_photos() {
        let p = preview(record("Anna", "Austrian", 0), 0);
        assert_eq!(p.photo_count, 0);
        assert!(p.current_photo.is_none());
    }
}
