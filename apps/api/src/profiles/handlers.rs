//! Axum route handlers for profiles and their edit drafts.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Photo, ProfileFields, ProfileRecord};
use crate::profiles::listing::{self, ProfilePreview, ProfileSummary};
use crate::profiles::workflow::{self, ProfileDraft};
use crate::state::AppState;
use crate::storage::UploadRequest;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub photo: usize,
}

/// Full form submission for the direct create/update endpoints.
#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    pub fields: ProfileFields,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpenDraftRequest {
    pub record_id: Option<Uuid>,
}

// ────────────────────────────────────────────────────────────────────────────
// Profiles
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profiles?q=
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<ProfileSummary>> {
    let records = state.store.list();
    Json(
        listing::search(&records, &params.q)
            .into_iter()
            .map(ProfileSummary::from)
            .collect(),
    )
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileRecord>, AppError> {
    find_profile(&state, id).map(Json)
}

/// GET /api/v1/profiles/:id/preview?photo=N
pub async fn handle_preview_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Json<ProfilePreview>, AppError> {
    let record = find_profile(&state, id)?;
    Ok(Json(listing::preview(record, params.photo)))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(body): Json<ProfileBody>,
) -> Result<(StatusCode, Json<ProfileRecord>), AppError> {
    let draft = ProfileDraft::for_new_record().with_contents(body.fields, body.photos);
    let record = workflow::save(&state.store, &state.uploader, &draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/profiles/:id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProfileBody>,
) -> Result<Json<ProfileRecord>, AppError> {
    let existing = find_profile(&state, id)?;
    let draft = ProfileDraft::for_existing(existing).with_contents(body.fields, body.photos);
    workflow::save(&state.store, &state.uploader, &draft)
        .await
        .map(Json)
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.remove(id) {
        return Err(AppError::NotFound(format!("Profile {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn find_profile(state: &AppState, id: Uuid) -> Result<ProfileRecord, AppError> {
    state
        .store
        .find_by_id(id)
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Drafts
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/drafts
pub async fn handle_open_draft(
    State(state): State<AppState>,
    body: Option<Json<OpenDraftRequest>>,
) -> Result<(StatusCode, Json<ProfileDraft>), AppError> {
    let record_id = body.and_then(|Json(req)| req.record_id);
    let draft = workflow::open_draft(&state.store, &state.drafts, record_id)?;
    Ok((StatusCode::CREATED, Json(draft)))
}

/// GET /api/v1/drafts/:id
pub async fn handle_get_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileDraft>, AppError> {
    state.drafts.get(id).map(Json)
}

/// DELETE /api/v1/drafts/:id
pub async fn handle_discard_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    workflow::discard_draft(&state.store, &state.drafts, &state.uploader, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/drafts/:id/fields
pub async fn handle_update_draft_fields(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<ProfileDraft>, AppError> {
    workflow::update_fields(&state.drafts, id, fields).map(Json)
}

/// POST /api/v1/drafts/:id/photos
///
/// Multipart body with a single `file` field.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ProfileDraft>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        upload = Some(UploadRequest {
            file_name,
            content_type,
            data,
        });
    }

    let upload =
        upload.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;
    let draft = workflow::add_photo(
        &state.drafts,
        &state.uploader,
        id,
        upload,
        state.config.max_photos,
    )
    .await?;
    Ok(Json(draft))
}

/// DELETE /api/v1/drafts/:id/photos/:photo_id
pub async fn handle_delete_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProfileDraft>, AppError> {
    workflow::remove_photo(&state.drafts, id, photo_id).map(Json)
}

/// PUT /api/v1/drafts/:id/photos/:photo_id/primary
pub async fn handle_set_primary_photo(
    State(state): State<AppState>,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ProfileDraft>, AppError> {
    workflow::set_primary_photo(&state.drafts, id, photo_id).map(Json)
}

/// POST /api/v1/drafts/:id/rewrite
pub async fn handle_rewrite_descriptions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileDraft>, AppError> {
    workflow::rewrite_descriptions(&state.drafts, state.rewriter.as_ref(), id)
        .await
        .map(Json)
}

/// POST /api/v1/drafts/:id/submit
pub async fn handle_submit_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileRecord>, AppError> {
    workflow::submit_draft(&state.store, &state.drafts, &state.uploader, id)
        .await
        .map(Json)
}
