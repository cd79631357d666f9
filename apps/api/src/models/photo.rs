use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored image attached to a profile.
///
/// Photos are owned by exactly one record's photo sequence. Within a non-empty
/// sequence exactly one photo carries `is_primary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub url: String,
    pub alt: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl Photo {
    /// A freshly uploaded photo. Primary status is decided by the owning set.
    pub fn new(url: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            alt: alt.into(),
            is_primary: false,
        }
    }
}
