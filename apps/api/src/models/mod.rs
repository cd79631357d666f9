pub mod coerce;
pub mod photo;
pub mod profile;

pub use photo::Photo;
pub use profile::{Descriptions, LanguageFlags, ProfileFields, ProfileRecord};
