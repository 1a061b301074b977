use tagwatch_schema::FormatError;
use thiserror::Error;

/// Fatal comparison failures. Per-variable regressions are not errors; they
/// are reported as outcomes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompareError {
    #[error("invalid snapshot format: {0}")]
    Format(#[from] FormatError),

    #[error("execution stopped: page `{page}` was not found in the observed snapshot")]
    PageNotFound { page: String },
}
