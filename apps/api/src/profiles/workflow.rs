//! Create/update workflow: binds a form session ("draft") to the record store.
//!
//! A draft is either a blank create form or a copy of an existing record. It
//! collects field edits, photo changes and AI rewrites, and touches the store
//! only on submit, after the whole form validates.
//!
//! Collaborator calls (upload, delete, rewrite) never run while the registry
//! lock is held. The draft is looked up again once the call returns, so a
//! draft submitted or discarded in the meantime simply drops the result.
//!
//! Stored images are deleted only once nothing can refer to them any more:
//! photos removed from a draft are released when the draft is committed, and
//! photos uploaded into a draft are released when it is discarded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Photo, ProfileFields, ProfileRecord};
use crate::profiles::photos;
use crate::profiles::validation::{validate_fields, FieldErrors};
use crate::rewrite::{RewrittenDescriptions, TextRewriter};
use crate::storage::{PhotoUploader, UploadRequest};
use crate::store::RecordStore;

/// In-progress form state for one create or edit.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileDraft {
    pub id: Uuid,
    /// The record being edited; `None` when creating.
    pub record_id: Option<Uuid>,
    pub fields: ProfileFields,
    pub photos: Vec<Photo>,
    /// Set while an AI rewrite for this draft is in flight.
    pub rewrite_pending: bool,
    /// URLs of photos removed from this draft, released on commit.
    #[serde(skip)]
    removed_urls: Vec<String>,
}

/// Outcome of a successful commit.
#[derive(Debug)]
pub struct Committed {
    pub record: ProfileRecord,
    /// Image URLs the record no longer refers to.
    pub released: Vec<String>,
}

impl ProfileDraft {
    pub fn for_new_record() -> Self {
        Self {
            id: Uuid::new_v4(),
            record_id: None,
            fields: ProfileFields::form_defaults(),
            photos: Vec::new(),
            rewrite_pending: false,
            removed_urls: Vec::new(),
        }
    }

    pub fn for_existing(record: ProfileRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            record_id: Some(record.id),
            fields: record.fields,
            photos: record.photos,
            rewrite_pending: false,
            removed_urls: Vec::new(),
        }
    }

    /// Replaces the whole form, as a direct create or update submits it.
    pub fn with_contents(mut self, fields: ProfileFields, photos: Vec<Photo>) -> Self {
        self.fields = fields;
        self.photos = photos;
        self
    }

    /// Overwrites all four descriptions with a finished rewrite.
    fn apply_rewrite(&mut self, rewritten: RewrittenDescriptions) {
        let descriptions = &mut self.fields.descriptions;
        descriptions.en = rewritten.english;
        descriptions.de = rewritten.german;
        descriptions.it = Some(rewritten.italian);
        descriptions.fr = Some(rewritten.french);
    }

    /// Validates the form and writes it to the store: a fresh identifier for
    /// a create, the original one for an edit. Nothing is written unless the
    /// whole form is valid.
    pub fn commit(&self, store: &RecordStore) -> Result<Committed, AppError> {
        validate_fields(&self.fields).map_err(AppError::InvalidForm)?;

        let mut photo_set = self.photos.clone();
        photos::normalize(&mut photo_set);

        let (record, previous_photos) = match self.record_id {
            Some(id) => {
                let previous = store
                    .update(id, self.fields.clone(), photo_set.clone())
                    .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
                let record = ProfileRecord {
                    id,
                    fields: self.fields.clone(),
                    photos: photo_set,
                };
                (record, previous.photos)
            }
            None => {
                let record = ProfileRecord {
                    id: Uuid::new_v4(),
                    fields: self.fields.clone(),
                    photos: photo_set,
                };
                store.insert(record.clone())?;
                (record, Vec::new())
            }
        };

        let released = unreferenced(
            previous_photos
                .iter()
                .map(|p| p.url.as_str())
                .chain(self.removed_urls.iter().map(String::as_str)),
            &record.photos,
        );
        Ok(Committed { record, released })
    }
}

/// Distinct URLs from `candidates` that none of `kept` points at.
fn unreferenced<'a>(candidates: impl IntoIterator<Item = &'a str>, kept: &[Photo]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in candidates {
        if !kept.iter().any(|p| p.url == url) && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Deletes images nothing refers to any more. Failures only leave an orphaned
/// object behind, so they are logged rather than returned.
pub async fn release_images(uploader: &PhotoUploader, urls: &[String]) {
    for url in urls {
        match uploader.delete(url).await {
            Ok(true) => {}
            Ok(false) => warn!("Image store refused to delete {url}"),
            Err(e) => warn!("Failed to delete image {url}: {e}"),
        }
    }
}

/// Commits `draft` and releases the images it dropped.
pub async fn save(
    store: &RecordStore,
    uploader: &PhotoUploader,
    draft: &ProfileDraft,
) -> Result<ProfileRecord, AppError> {
    let committed = draft.commit(store)?;
    release_images(uploader, &committed.released).await;
    Ok(committed.record)
}

/// Open drafts, keyed by draft id.
#[derive(Clone, Default)]
pub struct DraftRegistry {
    drafts: Arc<Mutex<HashMap<Uuid, ProfileDraft>>>,
}

impl DraftRegistry {
    pub fn open(&self, draft: ProfileDraft) -> ProfileDraft {
        self.lock().insert(draft.id, draft.clone());
        draft
    }

    pub fn get(&self, id: Uuid) -> Result<ProfileDraft, AppError> {
        self.with_draft(id, |draft| Ok(draft.clone()))
    }

    /// Runs `f` against the draft under the registry lock.
    fn with_draft<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ProfileDraft) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut drafts = self.lock();
        let draft = drafts.get_mut(&id).ok_or_else(|| draft_not_found(id))?;
        f(draft)
    }

    /// Runs `f` against the draft and closes it if `f` succeeds. The lock is
    /// held throughout, so a draft is closed at most once.
    fn close_with<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&ProfileDraft) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut drafts = self.lock();
        let draft = drafts.get(&id).ok_or_else(|| draft_not_found(id))?;
        let value = f(draft)?;
        drafts.remove(&id);
        Ok(value)
    }

    fn take(&self, id: Uuid) -> Option<ProfileDraft> {
        self.lock().remove(&id)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, ProfileDraft>> {
        self.drafts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn draft_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Draft {id} not found"))
}

/// Clears a draft's `rewrite_pending` flag when dropped, whether the rewrite
/// finished, failed or its request was abandoned mid-call.
struct RewriteInFlight<'a> {
    drafts: &'a DraftRegistry,
    draft_id: Uuid,
}

impl Drop for RewriteInFlight<'_> {
    fn drop(&mut self) {
        if let Some(draft) = self.drafts.lock().get_mut(&self.draft_id) {
            draft.rewrite_pending = false;
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow operations
// ────────────────────────────────────────────────────────────────────────────

/// Opens a create draft, or an edit draft populated from `record_id`.
pub fn open_draft(
    store: &RecordStore,
    drafts: &DraftRegistry,
    record_id: Option<Uuid>,
) -> Result<ProfileDraft, AppError> {
    let draft = match record_id {
        Some(id) => {
            let record = store
                .find_by_id(id)
                .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))?;
            ProfileDraft::for_existing(record)
        }
        None => ProfileDraft::for_new_record(),
    };
    info!("Opened draft {} (record: {:?})", draft.id, draft.record_id);
    Ok(drafts.open(draft))
}

/// Replaces the form values. Validation is deferred to submit.
pub fn update_fields(
    drafts: &DraftRegistry,
    draft_id: Uuid,
    fields: ProfileFields,
) -> Result<ProfileDraft, AppError> {
    drafts.with_draft(draft_id, |draft| {
        draft.fields = fields;
        Ok(draft.clone())
    })
}

/// Uploads an image and attaches it to the draft. If the draft can no longer
/// take it once the upload returns, the stored object is deleted again.
pub async fn add_photo(
    drafts: &DraftRegistry,
    uploader: &PhotoUploader,
    draft_id: Uuid,
    upload: UploadRequest,
    max_photos: usize,
) -> Result<ProfileDraft, AppError> {
    drafts.with_draft(draft_id, |draft| check_photo_capacity(draft, max_photos))?;

    let photo = uploader.upload(upload).await?;
    let url = photo.url.clone();

    let attached = drafts.with_draft(draft_id, |draft| {
        // Another upload may have filled the last slot meanwhile.
        check_photo_capacity(draft, max_photos)?;
        photos::add(&mut draft.photos, photo);
        Ok(draft.clone())
    });
    if attached.is_err() {
        release_images(uploader, &[url]).await;
    }
    attached
}

fn check_photo_capacity(draft: &ProfileDraft, max_photos: usize) -> Result<(), AppError> {
    if draft.photos.len() >= max_photos {
        return Err(AppError::BadRequest(format!(
            "You can only upload a maximum of {max_photos} photos."
        )));
    }
    Ok(())
}

/// Drops a photo from the draft. The stored image stays until the draft is
/// committed, since the record may still show it.
pub fn remove_photo(
    drafts: &DraftRegistry,
    draft_id: Uuid,
    photo_id: Uuid,
) -> Result<ProfileDraft, AppError> {
    drafts.with_draft(draft_id, |draft| {
        let photo = photos::remove(&mut draft.photos, photo_id)
            .ok_or_else(|| AppError::NotFound(format!("Photo {photo_id} not found")))?;
        draft.removed_urls.push(photo.url);
        Ok(draft.clone())
    })
}

pub fn set_primary_photo(
    drafts: &DraftRegistry,
    draft_id: Uuid,
    photo_id: Uuid,
) -> Result<ProfileDraft, AppError> {
    drafts.with_draft(draft_id, |draft| {
        if !photos::set_primary(&mut draft.photos, photo_id) {
            return Err(AppError::NotFound(format!("Photo {photo_id} not found")));
        }
        Ok(draft.clone())
    })
}

/// Rewrites the English description and fills in all four locales.
///
/// The English text is trimmed before it is sent, and an empty result is a
/// form error that never reaches the rewriter. A second trigger while one is
/// pending is rejected. On failure the draft's descriptions are left exactly
/// as they were.
pub async fn rewrite_descriptions(
    drafts: &DraftRegistry,
    rewriter: &dyn TextRewriter,
    draft_id: Uuid,
) -> Result<ProfileDraft, AppError> {
    let original = drafts.with_draft(draft_id, |draft| {
        let english = draft.fields.descriptions.en.trim();
        if english.is_empty() {
            return Err(AppError::InvalidForm(FieldErrors::single(
                "descriptions.en",
                "Please enter some text in the English description field first.",
            )));
        }
        if draft.rewrite_pending {
            return Err(AppError::Conflict(
                "A rewrite for this draft is already in progress".to_string(),
            ));
        }
        draft.rewrite_pending = true;
        Ok(english.to_string())
    })?;
    let _in_flight = RewriteInFlight { drafts, draft_id };

    info!("AI rewrite started for draft {draft_id}");
    let result = rewriter.rewrite_and_translate(&original).await;

    let outcome = drafts.with_draft(draft_id, |draft| {
        draft.rewrite_pending = false;
        match result {
            Ok(rewritten) => {
                draft.apply_rewrite(rewritten);
                Ok(draft.clone())
            }
            Err(e) => Err(AppError::from(e)),
        }
    });

    match &outcome {
        Ok(_) => info!("AI rewrite applied to draft {draft_id}"),
        Err(AppError::NotFound(_)) => {
            warn!("Draft {draft_id} closed before its rewrite finished; result dropped")
        }
        Err(e) => warn!("AI rewrite failed for draft {draft_id}: {e}"),
    }
    outcome
}

/// Validates and commits the draft, then closes it. An invalid draft stays
/// open so the client can fix the reported fields.
pub async fn submit_draft(
    store: &RecordStore,
    drafts: &DraftRegistry,
    uploader: &PhotoUploader,
    draft_id: Uuid,
) -> Result<ProfileRecord, AppError> {
    let committed = drafts.close_with(draft_id, |draft| draft.commit(store))?;
    release_images(uploader, &committed.released).await;
    info!("Draft {draft_id} submitted as profile {}", committed.record.id);
    Ok(committed.record)
}

/// Closes the draft without saving. Images uploaded into it that the stored
/// record does not show are deleted.
pub async fn discard_draft(
    store: &RecordStore,
    drafts: &DraftRegistry,
    uploader: &PhotoUploader,
    draft_id: Uuid,
) -> Result<(), AppError> {
    let draft = drafts.take(draft_id).ok_or_else(|| draft_not_found(draft_id))?;
    let stored_photos = draft
        .record_id
        .and_then(|id| store.find_by_id(id))
        .map(|record| record.photos)
        .unwrap_or_default();

    let unused = unreferenced(
        draft
            .photos
            .iter()
            .map(|p| p.url.as_str())
            .chain(draft.removed_urls.iter().map(String::as_str)),
        &stored_photos,
    );
    release_images(uploader, &unused).await;
    info!("Discarded draft {draft_id}");
    Ok(())
}
