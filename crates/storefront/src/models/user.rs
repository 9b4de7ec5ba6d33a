//! User domain types.

use serde::{Deserialize, Serialize};

use ultre_core::{Email, UserId};

/// A registered storefront user.
///
/// Created on signup and immutable afterwards; there is no profile editing
/// or re-signup. The same record doubles as the session's current-user
/// copy, mirrored under its own storage key while a session is live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Generated identifier (`u_…`).
    pub id: UserId,
    /// Address used to sign in. Unique, matched case-insensitively.
    pub email: Email,
    /// Hex-encoded SHA-256 digest of the password (demo-grade, unsalted).
    pub password_hash: String,
    /// Display name; defaults to the email local part at signup.
    pub display_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layout_is_camel_case() {
        let user = User {
            id: UserId::new("u_1"),
            email: Email::parse("a@b.c").unwrap(),
            password_hash: "abc123".to_owned(),
            display_name: "a".to_owned(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_some());
        assert!(json.get("displayName").is_some());
        assert!(json.get("password_hash").is_none());
    }
}
