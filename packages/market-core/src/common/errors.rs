use thiserror::Error;

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error taxonomy surfaced to presentation callers.
///
/// Every operation fails with exactly one of these kinds; the caller maps
/// kinds to user-facing feedback and never sees a raw upstream exception.
/// Validation and authorization failures are always detected before any
/// write, so they never partially apply.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    Unauthorized(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    /// The remote store or object storage failed for reasons opaque to the
    /// core. Never retried here; retry is a caller decision.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// A multi-step operation (batched reorder, multi-photo commit) applied
    /// some but not all of its writes. The component has already re-fetched
    /// canonical server state before surfacing this.
    #[error("{operation} not fully applied ({applied}/{total} writes confirmed)")]
    Partial {
        operation: &'static str,
        applied: usize,
        total: usize,
    },
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        CoreError::Conflict(msg.into())
    }

    /// Stable machine-readable kind, for callers that key feedback off it.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::Unauthorized(_) => "unauthorized",
            CoreError::NotFound { .. } => "not_found",
            CoreError::Conflict(_) => "conflict",
            CoreError::Upstream(_) => "upstream",
            CoreError::Partial { .. } => "partial",
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound {
                entity: "record",
                id: "unknown".to_string(),
            },
            other => CoreError::Upstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(CoreError::validation("x").kind(), "validation");
        assert_eq!(CoreError::not_found("listing", 3).kind(), "not_found");
        assert_eq!(
            CoreError::Partial {
                operation: "reorder",
                applied: 1,
                total: 3
            }
            .kind(),
            "partial"
        );
    }

    #[test]
    fn partial_message_names_progress() {
        let err = CoreError::Partial {
            operation: "category reorder",
            applied: 2,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "category reorder not fully applied (2/5 writes confirmed)"
        );
    }
}
