use std::sync::Arc;

use crate::config::Config;
use crate::profiles::workflow::DraftRegistry;
use crate::rewrite::TextRewriter;
use crate::storage::PhotoUploader;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub drafts: DraftRegistry,
    pub uploader: PhotoUploader,
    /// Pluggable description rewriter. Production uses `LlmRewriter`.
    pub rewriter: Arc<dyn TextRewriter>,
    pub config: Config,
}
