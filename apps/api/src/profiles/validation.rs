//! Whole-form validation. The schema itself lives on `ProfileFields` as
//! `validator` attributes; this module runs it and flattens the result into a
//! `field path -> message` map the client can render inline.

use std::collections::BTreeMap;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::models::ProfileFields;

/// Field-level validation failures, keyed by dotted field path
/// (`name`, `descriptions.en`, `extras.cum_on_body`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.into(), message.into());
        Self(errors)
    }
}

#[cfg(test)]
impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = BTreeMap::new();
        collect("", &errors, &mut out);
        Self(out)
    }
}

fn collect(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            // Only the first failure per field is shown.
            ValidationErrorsKind::Field(errs) => {
                if let Some(first) = errs.first() {
                    out.insert(path, message_for(first));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn message_for(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("Invalid value ({})", error.code))
}

/// Validates every field at once. Either the whole form passes or the caller
/// gets every failing field; there is no partial result.
pub fn validate_fields(fields: &ProfileFields) -> Result<(), FieldErrors> {
    fields.validate().map_err(FieldErrors::from)
}
