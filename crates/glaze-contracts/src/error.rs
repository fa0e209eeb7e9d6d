use thiserror::Error;

/// A request field (or cross-field rule) failed validation before any
/// network call was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The caller asked for a model-type tag this client does not know about.
///
/// Distinct from [`ValidationError`]: the request never had a field
/// contract to violate in the first place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported model type: {0}")]
pub struct UnsupportedModel(pub String);
