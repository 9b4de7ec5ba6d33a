//! Blog error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur in blog operations.
#[derive(Debug, Error)]
pub enum BlogError {
    /// A required input was empty after trimming.
    #[error("{0}")]
    Validation(&'static str),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ultre_core::EmailError),

    /// No writer record exists for the email.
    #[error("no verification request found for that email")]
    NoVerificationRequest,

    /// The verification window has elapsed (or no code is outstanding).
    #[error("verification code expired; request a new one")]
    ExpiredCode,

    /// The submitted code does not match the outstanding one.
    #[error("invalid code")]
    InvalidCode,

    /// The authoring email does not resolve to a verified writer.
    #[error("email not verified for publishing")]
    UnverifiedWriter,

    /// No post exists under the requested ID.
    #[error("post not found")]
    PostNotFound,

    /// Persisting a record failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
