//! Profile management: listing and preview, the draft-based create/edit
//! workflow, form validation and photo set rules.

pub mod handlers;
pub mod listing;
pub mod photos;
pub mod validation;
pub mod workflow;
