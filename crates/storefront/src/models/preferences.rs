//! The unified preferences record and the setting-change log entries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use chrono::{DateTime, Utc};
use ultre_core::{PostVisibility, Theme};

/// The single settings record governing theme, account display fields, and
/// feature toggles.
///
/// Known fields are typed; anything else a bound control writes lands in
/// the open `extra` map so foreign keys survive a round-trip. The record is
/// created with the dark theme on first access and never deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Migration watermark; see the preferences service.
    #[serde(default)]
    pub schema_version: u32,
    /// Active theme, `"light"` or `"dark"`.
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations_enabled: Option<bool>,
    /// Legacy mirror of `theme`; kept in agreement by [`Self::apply_field`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remember_me: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_profile: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_orders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_marketing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_blog_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_post_visibility: Option<PostVisibility>,
    /// Open extension map for keys no control schema knows about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Preferences {
    /// Merge one control value into the record.
    ///
    /// `theme` and `darkMode` are two views of the same switch and are kept
    /// in agreement whichever one the control writes. A value that does not
    /// coerce to the known field's type is dropped with a warning rather
    /// than shadowing the typed field from the extension map.
    pub fn apply_field(&mut self, key: &str, value: Value) {
        match key {
            "theme" => match theme_of(&value) {
                Some(theme) => {
                    self.theme = theme;
                    self.dark_mode = Some(!theme.is_light());
                }
                None => drop_uncoercible(key, &value),
            },
            "darkMode" => match bool_of(&value) {
                Some(dark) => {
                    self.dark_mode = Some(dark);
                    self.theme = Theme::from_dark_flag(dark);
                }
                None => drop_uncoercible(key, &value),
            },
            "animationsEnabled" => set_bool(&mut self.animations_enabled, key, &value),
            "primaryColor" => set_string(&mut self.primary_color, key, &value),
            "userFirstName" => set_string(&mut self.user_first_name, key, &value),
            "userLastName" => set_string(&mut self.user_last_name, key, &value),
            "userEmail" => set_string(&mut self.user_email, key, &value),
            "rememberMe" => set_bool(&mut self.remember_me, key, &value),
            "publicProfile" => set_bool(&mut self.public_profile, key, &value),
            "notifyOrders" => set_bool(&mut self.notify_orders, key, &value),
            "notifyMarketing" => set_bool(&mut self.notify_marketing, key, &value),
            "allowBlogNotifications" => set_bool(&mut self.allow_blog_notifications, key, &value),
            "defaultPostVisibility" => {
                match serde_json::from_value::<PostVisibility>(value.clone()) {
                    Ok(visibility) => self.default_post_visibility = Some(visibility),
                    Err(_) => drop_uncoercible(key, &value),
                }
            }
            _ => {
                self.extra.insert(key.to_owned(), value);
            }
        }
    }

    /// Current value of a field as it would appear on the wire.
    ///
    /// Returns `None` for fields that have never been set. Used to record
    /// the old value of a staged change.
    #[must_use]
    pub fn field_value(&self, key: &str) -> Option<Value> {
        match key {
            "theme" => Some(Value::String(self.theme.as_str().to_owned())),
            "darkMode" => self.dark_mode.map(Value::Bool),
            "animationsEnabled" => self.animations_enabled.map(Value::Bool),
            "primaryColor" => self.primary_color.clone().map(Value::String),
            "userFirstName" => self.user_first_name.clone().map(Value::String),
            "userLastName" => self.user_last_name.clone().map(Value::String),
            "userEmail" => self.user_email.clone().map(Value::String),
            "rememberMe" => self.remember_me.map(Value::Bool),
            "publicProfile" => self.public_profile.map(Value::Bool),
            "notifyOrders" => self.notify_orders.map(Value::Bool),
            "notifyMarketing" => self.notify_marketing.map(Value::Bool),
            "allowBlogNotifications" => self.allow_blog_notifications.map(Value::Bool),
            "defaultPostVisibility" => self
                .default_post_visibility
                .and_then(|v| serde_json::to_value(v).ok()),
            _ => self.extra.get(key).cloned(),
        }
    }
}

fn drop_uncoercible(key: &str, value: &Value) {
    tracing::warn!(key, %value, "setting value does not coerce to the field type, dropped");
}

fn set_bool(slot: &mut Option<bool>, key: &str, value: &Value) {
    match bool_of(value) {
        Some(b) => *slot = Some(b),
        None => drop_uncoercible(key, value),
    }
}

fn set_string(slot: &mut Option<String>, key: &str, value: &Value) {
    match value.as_str() {
        Some(s) => *slot = Some(s.to_owned()),
        None => drop_uncoercible(key, value),
    }
}

/// Booleans arrive as JSON booleans from checkboxes and as `"true"`/
/// `"false"` strings from legacy storage.
fn bool_of(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn theme_of(value: &Value) -> Option<Theme> {
    serde_json::from_value(value.clone()).ok()
}

/// An uncommitted edit to a preference field.
///
/// Queued in memory while the settings modal is open; flushed to the
/// persisted change log as a batch when Save fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSettingChange {
    /// Preference field the control is bound to.
    pub key: String,
    /// Wire value before the edit; `null` when the field was unset.
    #[serde(default)]
    pub old_value: Value,
    /// Wire value after the edit.
    pub new_value: Value,
    /// When the control changed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub when: DateTime<Utc>,
    /// Which surface staged the change (e.g. `"settings-modal"`).
    pub source: String,
}

/// A [`PendingSettingChange`] after Save, as stored in the change log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedSettingChange {
    #[serde(flatten)]
    pub change: PendingSettingChange,
    /// When the batch was committed.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub committed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_dark_and_unversioned() {
        let prefs = Preferences::default();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.schema_version, 0);
        assert!(prefs.extra.is_empty());
    }

    #[test]
    fn test_theme_and_dark_mode_stay_in_agreement() {
        let mut prefs = Preferences::default();

        prefs.apply_field("theme", Value::String("light".to_owned()));
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.dark_mode, Some(false));

        prefs.apply_field("darkMode", Value::Bool(true));
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.dark_mode, Some(true));
    }

    #[test]
    fn test_unknown_keys_land_in_extra() {
        let mut prefs = Preferences::default();
        prefs.apply_field("betaFeatures", Value::Bool(true));
        assert_eq!(prefs.extra.get("betaFeatures"), Some(&Value::Bool(true)));
        assert_eq!(prefs.field_value("betaFeatures"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_string_booleans_coerce() {
        let mut prefs = Preferences::default();
        prefs.apply_field("rememberMe", Value::String("true".to_owned()));
        assert_eq!(prefs.remember_me, Some(true));
    }

    #[test]
    fn test_uncoercible_value_does_not_shadow_typed_field() {
        let mut prefs = Preferences::default();
        prefs.apply_field("rememberMe", Value::from(17));
        assert_eq!(prefs.remember_me, None);
        assert!(prefs.extra.is_empty());
    }

    #[test]
    fn test_wire_layout_round_trips_foreign_keys() {
        let raw = r#"{"theme":"light","highContrast":true,"userFirstName":"Ada"}"#;
        let prefs: Preferences = serde_json::from_str(raw).unwrap();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.user_first_name.as_deref(), Some("Ada"));
        assert_eq!(prefs.extra.get("highContrast"), Some(&Value::Bool(true)));

        let back = serde_json::to_value(&prefs).unwrap();
        assert_eq!(back.get("highContrast"), Some(&Value::Bool(true)));
        assert_eq!(back.get("userFirstName").unwrap(), "Ada");
    }

    #[test]
    fn test_committed_change_flattens_and_stamps() {
        let committed = CommittedSettingChange {
            change: PendingSettingChange {
                key: "theme".to_owned(),
                old_value: Value::Null,
                new_value: Value::String("light".to_owned()),
                when: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
                source: "settings-modal".to_owned(),
            },
            committed_at: DateTime::from_timestamp_millis(1_700_000_001_000).unwrap(),
        };

        let json = serde_json::to_value(&committed).unwrap();
        assert_eq!(json.get("key").unwrap(), "theme");
        assert_eq!(json.get("when").unwrap(), 1_700_000_000_000_i64);
        assert_eq!(json.get("committedAt").unwrap(), 1_700_000_001_000_i64);
    }
}
