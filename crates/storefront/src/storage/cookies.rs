//! Cookie-style persistence for session hints.
//!
//! The jar is a small, parallel store for values that the source system
//! duplicated into cookies (login flag, session email, remember-me and
//! theme hints). Entries carry an optional day-based expiry; expired
//! entries read as absent. Cookies are redundancy, never the source of
//! truth: [`super::KeyValueStore`] always wins.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Cookie names used by the engine.
pub mod names {
    /// Signed-in user's email, mirrored on session establishment.
    pub const SESSION_EMAIL: &str = "ultre_userEmail";

    /// `"true"` while a session is established.
    pub const LOGGED_IN: &str = "ultre_isLoggedIn";

    /// Remember-me preference, synced on settings save.
    pub const REMEMBER_ME: &str = "ultre_rememberMe";

    /// Dark-mode hint, `'1'`/`'0'`, synced on settings save.
    pub const DARK_MODE: &str = "ultre_darkMode";

    /// Primary accent color, synced on settings save.
    pub const PRIMARY_COLOR: &str = "ultre_primaryColor";
}

/// Expiry for session cookies (email, login flag).
pub const SESSION_COOKIE_DAYS: u32 = 7;

/// Expiry for preference-hint cookies (remember-me, theme, color).
pub const PREFERENCE_COOKIE_DAYS: u32 = 30;

#[derive(Debug, Clone)]
struct Cookie {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Cookie {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process cookie jar.
#[derive(Debug, Default)]
pub struct CookieJar {
    entries: RefCell<HashMap<String, Cookie>>,
}

impl CookieJar {
    /// Create an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`.
    ///
    /// `days` is the time-to-expiry; `None` stores a session cookie that
    /// lives as long as the jar.
    pub fn set(&self, name: &str, value: impl Into<String>, days: Option<u32>) {
        let expires_at = days.map(|d| Utc::now() + Duration::days(i64::from(d)));
        self.entries.borrow_mut().insert(
            name.to_owned(),
            Cookie {
                value: value.into(),
                expires_at,
            },
        );
    }

    /// Read the live value under `name`.
    ///
    /// Expired entries read as `None` and are dropped from the jar.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let now = Utc::now();
        let mut entries = self.entries.borrow_mut();
        match entries.get(name) {
            Some(cookie) if cookie.is_expired(now) => {
                entries.remove(name);
                None
            }
            Some(cookie) => Some(cookie.value.clone()),
            None => None,
        }
    }

    /// Remove `name` if present.
    pub fn delete(&self, name: &str) {
        self.entries.borrow_mut().remove(name);
    }
}
