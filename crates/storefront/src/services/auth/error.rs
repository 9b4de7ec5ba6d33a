//! Authentication error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required input was empty after trimming.
    #[error("{0}")]
    Validation(&'static str),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ultre_core::EmailError),

    /// An account with this email already exists (any casing).
    #[error("account already exists")]
    DuplicateAccount,

    /// No account matches the email.
    #[error("no account found")]
    NotFound,

    /// Password digest does not match the stored hash.
    #[error("incorrect password")]
    InvalidCredentials,

    /// Persisting the session state failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
