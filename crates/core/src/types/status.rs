//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Visual theme for the storefront.
///
/// Stored in the preferences record as `"light"`/`"dark"`. The dark theme
/// is the first-run default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The persisted string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Whether this is the light theme.
    #[must_use]
    pub const fn is_light(self) -> bool {
        matches!(self, Self::Light)
    }

    /// Map the legacy dark-mode checkbox flag onto a theme.
    #[must_use]
    pub const fn from_dark_flag(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }
}

/// Default visibility for newly published blog posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostVisibility {
    #[default]
    Public,
    Members,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Light).unwrap(), "\"light\"");
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
    }

    #[test]
    fn test_theme_default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_from_dark_flag() {
        assert_eq!(Theme::from_dark_flag(true), Theme::Dark);
        assert_eq!(Theme::from_dark_flag(false), Theme::Light);
    }

    #[test]
    fn test_post_visibility_roundtrip() {
        let json = serde_json::to_string(&PostVisibility::Members).unwrap();
        assert_eq!(json, "\"members\"");
        let parsed: PostVisibility = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PostVisibility::Members);
    }
}
