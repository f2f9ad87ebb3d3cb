//! Error taxonomy shared by every resource front-end.

use thiserror::Error;

use crate::api::ApiError;
use crate::wait::WaitError;

/// Errors raised by resource CRUD entry points.
///
/// Not-found is deliberately absent: reads and deletes translate it into
/// `Ok(None)` / success so the engine clears local state instead of
/// failing.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ResourceError {
    /// Raised before the API is reached, when a request violates an
    /// option constraint or misses a required field. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),
    /// Raised when a convergence wait fails.
    #[error(transparent)]
    Wait(#[from] WaitError),
    /// Raised when an API call fails outside a wait loop.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ResourceError {
    /// Shorthand for a missing/empty required field.
    pub(crate) fn missing_field(name: &str) -> Self {
        Self::Validation(format!("missing or empty field: {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_the_field() {
        let error = ResourceError::missing_field("namespace_id");
        assert_eq!(
            error.to_string(),
            "invalid request: missing or empty field: namespace_id"
        );
    }
}
