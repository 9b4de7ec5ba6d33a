//! Unified error handling at the UI-binding boundary.
//!
//! Provides a unified `AppError` that every dispatch handler returns.
//! Domain errors never escape the dispatch boundary: the binder converts
//! them into a transient notification with a user-facing message, and
//! internal details stay in the logs.

use thiserror::Error;

use crate::dom::Notification;
use crate::services::auth::AuthError;
use crate::services::blog::BlogError;
use crate::services::commerce::CommerceError;
use crate::services::preferences::PreferencesError;
use crate::storage::StorageError;

/// Application-level error type for the state engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Settings operation failed.
    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    /// Cart/wishlist/comparison operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Blog operation failed.
    #[error("Blog error: {0}")]
    Blog(#[from] BlogError),

    /// Storage write failed outside any service.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// The message shown in the notification surface.
    ///
    /// Domain errors speak in the page's own words; anything storage-shaped
    /// collapses to a generic line so internals never reach the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation(msg) => (*msg).to_owned(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_owned(),
                AuthError::DuplicateAccount => "Account already exists".to_owned(),
                AuthError::NotFound => "No account found".to_owned(),
                AuthError::InvalidCredentials => "Incorrect password".to_owned(),
                AuthError::Storage(_) => GENERIC_FAILURE.to_owned(),
            },
            Self::Commerce(err) => match err {
                CommerceError::ComparisonFull | CommerceError::NotEnoughItems => err.to_string(),
                CommerceError::Storage(_) => GENERIC_FAILURE.to_owned(),
            },
            Self::Blog(err) => match err {
                BlogError::Validation(msg) => (*msg).to_owned(),
                BlogError::InvalidEmail(_) => "Invalid email address".to_owned(),
                BlogError::NoVerificationRequest => {
                    "No verification request found for that email".to_owned()
                }
                BlogError::ExpiredCode => {
                    "Verification code expired; request a new one".to_owned()
                }
                BlogError::InvalidCode => "Invalid code".to_owned(),
                BlogError::UnverifiedWriter => {
                    "Email not verified for publishing. Please verify first.".to_owned()
                }
                BlogError::PostNotFound => "Post not found".to_owned(),
                BlogError::Storage(_) => GENERIC_FAILURE.to_owned(),
            },
            Self::Preferences(PreferencesError::Storage(_)) | Self::Storage(_) => {
                GENERIC_FAILURE.to_owned()
            }
        }
    }

    /// Build the error notification for the message surface.
    #[must_use]
    pub fn notification(&self) -> Notification {
        Notification::error(self.user_message())
    }
}

const GENERIC_FAILURE: &str = "Something went wrong; please try again";

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use crate::dom::Severity;

    #[test]
    fn test_domain_errors_speak_plainly() {
        let err = AppError::from(AuthError::DuplicateAccount);
        assert_eq!(err.user_message(), "Account already exists");

        let err = AppError::from(CommerceError::ComparisonFull);
        assert_eq!(
            err.user_message(),
            "Maximum 4 items can be compared at once"
        );
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let err = AppError::from(StorageError::Write {
            key: "cart_items".to_owned(),
            reason: "quota exceeded".to_owned(),
        });
        assert!(!err.user_message().contains("quota"));
    }

    #[test]
    fn test_notification_is_error_styled() {
        let err = AppError::from(AuthError::NotFound);
        assert_eq!(err.notification().severity, Severity::Error);
        assert_eq!(err.notification().text, "No account found");
    }
}
