//! Primary-photo bookkeeping for a profile's photo sequence.
//!
//! Invariant: a non-empty sequence has exactly one photo with `is_primary`.

use uuid::Uuid;

use crate::models::Photo;

/// Appends an uploaded photo. The first photo of an empty set becomes primary.
pub fn add(photos: &mut Vec<Photo>, mut photo: Photo) {
    photo.is_primary = photos.is_empty();
    photos.push(photo);
}

/// Removes the photo with `id`. If it was primary, the first remaining photo
/// is promoted.
pub fn remove(photos: &mut Vec<Photo>, id: Uuid) -> Option<Photo> {
    let index = photos.iter().position(|p| p.id == id)?;
    let removed = photos.remove(index);
    if removed.is_primary {
        if let Some(first) = photos.first_mut() {
            first.is_primary = true;
        }
    }
    Some(removed)
}

/// Makes `id` the only primary photo. Returns `false` and leaves the set
/// untouched if no photo has that id.
pub fn set_primary(photos: &mut [Photo], id: Uuid) -> bool {
    if !photos.iter().any(|p| p.id == id) {
        return false;
    }
    for photo in photos.iter_mut() {
        photo.is_primary = photo.id == id;
    }
    true
}

/// The photo to display for a record: the flagged one, else the first.
pub fn primary(photos: &[Photo]) -> Option<&Photo> {
    photos.iter().find(|p| p.is_primary).or_else(|| photos.first())
}

/// Restores the invariant on a sequence from an untrusted source. The first
/// flagged photo stays primary; with none flagged the first photo is chosen.
pub fn normalize(photos: &mut [Photo]) {
    let keep = photos.iter().position(|p| p.is_primary).unwrap_or(0);
    for (index, photo) in photos.iter_mut().enumerate() {
        photo.is_primary = index == keep;
    }
}
