use thiserror::Error;

/// Failures of the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
}

/// Every way a user action on the resume data can be rejected.
///
/// A returned error always means nothing was mutated.
#[derive(Debug, Error)]
pub enum ResumeError {
    /// Missing required field, empty title, malformed URL, unparseable import file.
    #[error("{0}")]
    Validation(String),

    /// The action would break a collection invariant (e.g. leave it empty).
    #[error("{0}")]
    InvariantViolation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ResumeError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Whether the failure should be shown as a warning rather than an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvariantViolation(_))
    }
}

pub type Result<T, E = ResumeError> = std::result::Result<T, E>;
