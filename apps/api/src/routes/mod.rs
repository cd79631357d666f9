pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::profiles::handlers;
use crate::state::AppState;
use crate::storage::MAX_UPLOAD_BYTES;

/// Body limit for the upload route. Larger than the per-image cap so an
/// oversized image reaches the size check and gets a proper error.
const UPLOAD_BODY_LIMIT: usize = 2 * MAX_UPLOAD_BYTES;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route(
            "/api/v1/profiles",
            get(handlers::handle_list_profiles).post(handlers::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/:id",
            get(handlers::handle_get_profile)
                .put(handlers::handle_update_profile)
                .delete(handlers::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:id/preview",
            get(handlers::handle_preview_profile),
        )
        // Drafts
        .route("/api/v1/drafts", post(handlers::handle_open_draft))
        .route(
            "/api/v1/drafts/:id",
            get(handlers::handle_get_draft).delete(handlers::handle_discard_draft),
        )
        .route(
            "/api/v1/drafts/:id/fields",
            put(handlers::handle_update_draft_fields),
        )
        .route(
            "/api/v1/drafts/:id/photos",
            post(handlers::handle_upload_photo).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/v1/drafts/:id/photos/:photo_id",
            delete(handlers::handle_delete_photo),
        )
        .route(
            "/api/v1/drafts/:id/photos/:photo_id/primary",
            put(handlers::handle_set_primary_photo),
        )
        .route(
            "/api/v1/drafts/:id/rewrite",
            post(handlers::handle_rewrite_descriptions),
        )
        .route(
            "/api/v1/drafts/:id/submit",
            post(handlers::handle_submit_draft),
        )
        .with_state(state)
}
