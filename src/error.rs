use thiserror::Error;

/// Errors raised by the analytics core.
///
/// Sparse records are never an error: a missing score defaults to zero and a
/// missing category groups under the empty string. Only records whose shape
/// cannot be interpreted at all end up here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("invalid record at position {index} (id {id}): {reason}")]
    InvalidRecord {
        index: usize,
        id: String,
        reason: String,
    },

    #[error("palette must contain at least one color")]
    EmptyPalette,
}

impl AnalyticsError {
    pub(crate) fn invalid(index: usize, id: Option<&str>, reason: impl Into<String>) -> Self {
        AnalyticsError::InvalidRecord {
            index,
            id: id.unwrap_or("<unknown>").to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
