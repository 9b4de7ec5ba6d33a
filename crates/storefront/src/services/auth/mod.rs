//! Session management.
//!
//! Owns signup, signin, signout, and the derived session state: the raw
//! `"true"`/`"false"` logged-in flag plus a mirrored copy of the current
//! user record, duplicated into cookies for redundancy. The flag is the
//! authoritative input for every visibility decision.
//!
//! Passwords are digested with a single unsalted round of SHA-256,
//! explicitly a demo-grade scheme. A production system must replace this
//! with a salted, iterated or memory-hard scheme and must not keep any
//! password-equivalent in client-side storage at all.

mod error;

pub use error::AuthError;

use sha2::{Digest, Sha256};

use ultre_core::{Email, UserId};

use crate::models::user::User;
use crate::storage::cookies::{CookieJar, SESSION_COOKIE_DAYS, names};
use crate::storage::{KeyValueStore, keys};

/// Session management service.
pub struct AuthService<'a> {
    store: &'a KeyValueStore,
    cookies: &'a CookieJar,
}

impl<'a> AuthService<'a> {
    /// Create a new session service over the shared stores.
    #[must_use]
    pub const fn new(store: &'a KeyValueStore, cookies: &'a CookieJar) -> Self {
        Self { store, cookies }
    }

    /// Register a new account and establish a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if either field is empty after
    /// trimming, [`AuthError::InvalidEmail`] if the email does not parse,
    /// and [`AuthError::DuplicateAccount`] on a case-insensitive email
    /// match against an existing user.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let password = password.trim();
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Email and password required"));
        }

        let email = Email::parse(email)?;

        let mut users = self.users();
        if users.iter().any(|u| u.email.eq_ignore_case(&email)) {
            return Err(AuthError::DuplicateAccount);
        }

        let user = User {
            id: UserId::generate(),
            display_name: email.local_part().to_owned(),
            password_hash: password_digest(password),
            email,
        };
        users.push(user.clone());
        self.store.set(keys::USERS, &users)?;

        self.establish_session(&user)?;
        tracing::info!(user = %user.id, "account created");
        Ok(user)
    }

    /// Sign in with an existing account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] on empty fields,
    /// [`AuthError::NotFound`] if no account matches the email, and
    /// [`AuthError::InvalidCredentials`] if the password digest does not
    /// match.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let password = password.trim();
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation("Provide email and password"));
        }

        let email = Email::parse(email)?;

        let user = self
            .users()
            .into_iter()
            .find(|u| u.email.eq_ignore_case(&email))
            .ok_or(AuthError::NotFound)?;

        if password_digest(password) != user.password_hash {
            return Err(AuthError::InvalidCredentials);
        }

        self.establish_session(&user)?;
        Ok(user)
    }

    /// Tear down the current session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the flag cannot be persisted.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.store.set_raw(keys::IS_LOGGED_IN, "false")?;
        self.store.remove(keys::CURRENT_USER);
        self.cookies.delete(names::SESSION_EMAIL);
        self.cookies.delete(names::LOGGED_IN);
        Ok(())
    }

    /// Whether a session is established.
    ///
    /// Reads the authoritative flag; every component gates visibility on
    /// this.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.store.get_raw(keys::IS_LOGGED_IN).as_deref() == Some("true")
    }

    /// The mirrored current-user record, if a session is established.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.store.get(keys::CURRENT_USER, None)
    }

    /// All registered users.
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        self.store.get(keys::USERS, Vec::new())
    }

    /// Mark the session logged-in and mirror it into cookies.
    fn establish_session(&self, user: &User) -> Result<(), AuthError> {
        self.store.set_raw(keys::IS_LOGGED_IN, "true")?;
        self.store.set(keys::CURRENT_USER, user)?;
        self.cookies.set(
            names::SESSION_EMAIL,
            user.email.as_str(),
            Some(SESSION_COOKIE_DAYS),
        );
        self.cookies
            .set(names::LOGGED_IN, "true", Some(SESSION_COOKIE_DAYS));
        Ok(())
    }
}

/// Hex-encoded SHA-256 digest of the UTF-8 password bytes.
///
/// Unsalted and single-round on purpose; see the module docs.
fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fixture() -> (KeyValueStore, CookieJar) {
        (KeyValueStore::in_memory(), CookieJar::new())
    }

    #[test]
    fn test_password_digest_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            password_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sign_up_then_sign_in_round_trips() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        auth.sign_up("User@Example.com", "hunter22").unwrap();
        auth.sign_out().unwrap();

        let user = auth.sign_in("user@example.COM", "hunter22").unwrap();
        assert!(auth.is_logged_in());
        assert!(
            user.email
                .eq_ignore_case(&Email::parse("User@Example.com").unwrap())
        );
        assert_eq!(
            auth.current_user().unwrap().email.as_str(),
            "User@Example.com"
        );
    }

    #[test]
    fn test_sign_up_derives_display_name() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        let user = auth.sign_up("ada.lovelace@example.com", "pw").unwrap();
        assert_eq!(user.display_name, "ada.lovelace");
    }

    #[test]
    fn test_duplicate_email_any_casing_is_rejected() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        auth.sign_up("user@example.com", "pw").unwrap();
        let err = auth.sign_up("USER@EXAMPLE.COM", "other").unwrap_err();

        assert!(matches!(err, AuthError::DuplicateAccount));
        assert_eq!(auth.users().len(), 1);
    }

    #[test]
    fn test_wrong_password_leaves_flag_untouched() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        auth.sign_up("user@example.com", "right").unwrap();
        auth.sign_out().unwrap();

        let err = auth.sign_in("user@example.com", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_unknown_email_is_not_found() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        let err = auth.sign_in("nobody@example.com", "pw").unwrap_err();
        assert!(matches!(err, AuthError::NotFound));
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        assert!(matches!(
            auth.sign_up("  ", "pw"),
            Err(AuthError::Validation(_))
        ));
        assert!(matches!(
            auth.sign_in("user@example.com", "   "),
            Err(AuthError::Validation(_))
        ));
    }

    #[test]
    fn test_session_is_mirrored_to_cookies() {
        let (store, cookies) = fixture();
        let auth = AuthService::new(&store, &cookies);

        auth.sign_up("user@example.com", "pw").unwrap();
        assert_eq!(
            cookies.get(names::SESSION_EMAIL).as_deref(),
            Some("user@example.com")
        );
        assert_eq!(cookies.get(names::LOGGED_IN).as_deref(), Some("true"));

        auth.sign_out().unwrap();
        assert_eq!(cookies.get(names::SESSION_EMAIL), None);
        assert_eq!(cookies.get(names::LOGGED_IN), None);
        assert_eq!(store.get_raw(keys::IS_LOGGED_IN).as_deref(), Some("false"));
    }
}
