//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::SessionStoreError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format, caught before anything is sent.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] vastraverse_core::EmailError),

    /// A required field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The operation needs a signed-in shopper.
    #[error("not logged in")]
    NotAuthenticated,

    /// The backend call failed or was refused.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be persisted.
    #[error("session storage error: {0}")]
    Session(#[from] SessionStoreError),
}
