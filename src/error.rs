use thiserror::Error;

use crate::store::StoreError;

/// Failure taxonomy for scoring jobs.
///
/// Running out of time is not represented here: the completion tracker
/// reports `Overdue` as a normal terminal outcome with a persisted message.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Plan input or a stored payload could not be read or parsed.
    #[error("could not parse {what}: {detail}")]
    Parse { what: &'static str, detail: String },

    /// Geometry or projection fault that survived the single repair attempt.
    #[error("geometry operation failed: {0}")]
    Geometry(String),

    /// Storage fault. `NotFound` is handled locally where a component
    /// tolerates absence; anything else propagates here without retry.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ScoreError {
    pub(crate) fn parse(what: &'static str, detail: impl ToString) -> Self {
        Self::Parse { what, detail: detail.to_string() }
    }
}

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, ScoreError>;
