//! Externally observable errors.

use thiserror::Error;

/// Failure of the caller-supplied refresh operation.
///
/// For dismissal purposes a failed operation behaves exactly like a
/// successful one (the indicator still animates to `Done`); the error is
/// logged and forwarded through the completion handle so callers can react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("refresh operation failed: {0}")]
    Operation(String),
}
