//! Settings persistence, legacy migration, and theme application.
//!
//! The preferences record is versioned: `load` applies migration steps in
//! order until the record's `schemaVersion` matches [`SCHEMA_VERSION`],
//! then persists the merged result, so the legacy-key sweep runs once
//! instead of on every load. Step 0→1 copies the fixed set of legacy
//! standalone keys into the unified record wherever the field is absent.
//!
//! Field writes persist immediately. The pending/committed split exists
//! only at the UI layer: `stage` applies the change *and* queues a
//! [`PendingSettingChange`]; `save` flushes the queue to the persisted
//! change log as one batch, syncs the cookie subset, re-applies the theme,
//! and broadcasts [`AppEvent::SettingsSaved`].

use std::cell::RefCell;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use crate::dom::{Document, LogoVariant};
use crate::events::{AppEvent, EventBus};
use crate::models::preferences::{CommittedSettingChange, PendingSettingChange, Preferences};
use crate::storage::cookies::{CookieJar, PREFERENCE_COOKIE_DAYS, names};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Version the migration chain currently targets.
pub const SCHEMA_VERSION: u32 = 1;

/// Legacy standalone keys folded into the record by the 0→1 step.
const LEGACY_KEYS: [&str; 10] = [
    "theme",
    "darkMode",
    "animationsEnabled",
    "highContrast",
    "screenReader",
    "userFirstName",
    "userLastName",
    "userEmail",
    "rememberMe",
    "primaryColor",
];

/// Legacy dark-mode flag stored as `'1'`/`'0'` under its own key.
const LEGACY_DARK_MODE_KEY: &str = "ultre_darkMode";

/// Root class marking the light theme.
pub const LIGHT_MODE_CLASS: &str = "light-mode";

/// Root class marking the dark theme.
pub const DARK_MODE_CLASS: &str = "dark-mode";

/// Override block forcing light backgrounds while the light theme is on.
pub const LIGHT_OVERRIDE_CSS: &str = "html,body,section,#main-website-content-wrapper{ background: #ffffff !important; color: #000000 !important; } img.logo-img{ filter: none !important; }";

/// Errors from preference persistence.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Persisting the record or the change log failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Settings service.
pub struct PreferencesService<'a> {
    store: &'a KeyValueStore,
    cookies: &'a CookieJar,
    pending: &'a RefCell<Vec<PendingSettingChange>>,
    events: &'a EventBus,
}

impl<'a> PreferencesService<'a> {
    /// Create a new settings service over the shared state.
    #[must_use]
    pub const fn new(
        store: &'a KeyValueStore,
        cookies: &'a CookieJar,
        pending: &'a RefCell<Vec<PendingSettingChange>>,
        events: &'a EventBus,
    ) -> Self {
        Self {
            store,
            cookies,
            pending,
            events,
        }
    }

    /// Read the preferences record, migrating it if its version is behind.
    ///
    /// A record never materializes as an error: the first access creates
    /// the dark-theme default, and a failed persist of the migrated record
    /// is logged and tolerated (the merge reruns on the next load).
    #[must_use]
    pub fn load(&self) -> Preferences {
        let mut prefs: Preferences = self.store.get(keys::PREFS, Preferences::default());
        let migrated = self.migrate(&mut prefs);

        if migrated {
            if let Err(err) = self.store.set(keys::PREFS, &prefs) {
                tracing::warn!(%err, "failed to persist migrated preferences");
            }
        }

        prefs
    }

    /// Merge one field into the record and persist immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::Storage`] if the record cannot be
    /// written.
    pub fn set(&self, key: &str, value: Value) -> Result<Preferences, PreferencesError> {
        let mut prefs = self.load();
        prefs.apply_field(key, value);
        self.store.set(keys::PREFS, &prefs)?;
        Ok(prefs)
    }

    /// Apply a control change and queue it for the change log.
    ///
    /// The field itself persists immediately (same as [`Self::set`]); only
    /// the log entry waits for [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::Storage`] if the record cannot be
    /// written; nothing is queued in that case.
    pub fn stage(&self, key: &str, value: Value, source: &str) -> Result<(), PreferencesError> {
        let old_value = self.load().field_value(key).unwrap_or(Value::Null);
        self.set(key, value.clone())?;
        self.pending.borrow_mut().push(PendingSettingChange {
            key: key.to_owned(),
            old_value,
            new_value: value,
            when: Utc::now(),
            source: source.to_owned(),
        });
        Ok(())
    }

    /// The queued, not-yet-committed changes.
    #[must_use]
    pub fn pending_changes(&self) -> Vec<PendingSettingChange> {
        self.pending.borrow().clone()
    }

    /// Commit the settings-modal session.
    ///
    /// Syncs the cookie subset, flushes the pending queue to the persisted
    /// change log as one stamped batch, re-applies the theme, and emits
    /// [`AppEvent::SettingsSaved`]. Returns the number of committed
    /// entries.
    ///
    /// # Errors
    ///
    /// Returns [`PreferencesError::Storage`] if the change log cannot be
    /// written; the queue is left intact so a retry can commit it.
    pub fn save(&self, document: &Document) -> Result<usize, PreferencesError> {
        let prefs = self.load();

        if prefs.remember_me.unwrap_or(false) {
            self.cookies
                .set(names::REMEMBER_ME, "true", Some(PREFERENCE_COOKIE_DAYS));
        } else {
            self.cookies.delete(names::REMEMBER_ME);
        }
        if let Some(email) = &prefs.user_email {
            self.cookies
                .set(names::SESSION_EMAIL, email, Some(PREFERENCE_COOKIE_DAYS));
        }
        if let Some(dark) = prefs.dark_mode {
            self.cookies.set(
                names::DARK_MODE,
                if dark { "1" } else { "0" },
                Some(PREFERENCE_COOKIE_DAYS),
            );
        }
        if let Some(color) = &prefs.primary_color {
            self.cookies
                .set(names::PRIMARY_COLOR, color, Some(PREFERENCE_COOKIE_DAYS));
        }

        let committed = {
            let queued = self.pending.borrow().clone();
            if queued.is_empty() {
                0
            } else {
                let committed_at = Utc::now();
                let mut log = self.change_log();
                log.extend(queued.iter().cloned().map(|change| CommittedSettingChange {
                    change,
                    committed_at,
                }));
                self.store.set(keys::SETTING_CHANGE_LOG, &log)?;
                self.pending.borrow_mut().clear();
                queued.len()
            }
        };

        self.apply_theme(document);
        self.events.emit(&AppEvent::SettingsSaved { when: Utc::now() });
        Ok(committed)
    }

    /// The persisted log of committed changes.
    #[must_use]
    pub fn change_log(&self) -> Vec<CommittedSettingChange> {
        self.store.get(keys::SETTING_CHANGE_LOG, Vec::new())
    }

    /// Project the persisted theme onto the document.
    ///
    /// Idempotent: with unchanged preferences, a second call leaves the
    /// document byte-for-byte where the first one did.
    pub fn apply_theme(&self, document: &Document) {
        if self.load().theme.is_light() {
            document.add_root_class(LIGHT_MODE_CLASS);
            document.remove_root_class(DARK_MODE_CLASS);
            document.set_style_override(LIGHT_OVERRIDE_CSS);
            document.set_logo_variant(LogoVariant::Light);
        } else {
            document.remove_root_class(LIGHT_MODE_CLASS);
            document.add_root_class(DARK_MODE_CLASS);
            document.clear_style_override();
            document.set_logo_variant(LogoVariant::Dark);
        }
    }

    /// Run migration steps until the record is current.
    ///
    /// Returns whether anything changed (including the version bump).
    fn migrate(&self, prefs: &mut Preferences) -> bool {
        let mut changed = false;
        while prefs.schema_version < SCHEMA_VERSION {
            match prefs.schema_version {
                0 => self.migrate_legacy_keys(prefs),
                version => {
                    // A record from a newer build than this migration chain
                    // knows about; leave it alone.
                    tracing::warn!(version, "no migration step for preferences version");
                    break;
                }
            }
            prefs.schema_version += 1;
            changed = true;
            tracing::info!(version = prefs.schema_version, "migrated preferences record");
        }
        changed
    }

    /// Step 0→1: fold legacy standalone keys into the unified record.
    ///
    /// A field already present on the persisted record wins over the
    /// legacy copy; `"true"`/`"false"` strings decode to booleans.
    fn migrate_legacy_keys(&self, prefs: &mut Preferences) {
        // Presence is judged against the raw persisted document, not the
        // typed record, so defaulted fields (theme) still migrate.
        let present: serde_json::Map<String, Value> = self
            .store
            .get_raw(keys::PREFS)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        for key in LEGACY_KEYS {
            if present.contains_key(key) {
                continue;
            }
            if let Some(raw) = self.store.get_raw(key) {
                let value = match raw.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::String(raw),
                };
                prefs.apply_field(key, value);
            }
        }

        if !present.contains_key("darkMode") {
            if let Some(raw) = self.store.get_raw(LEGACY_DARK_MODE_KEY) {
                prefs.apply_field("darkMode", Value::Bool(raw == "1"));
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use ultre_core::Theme;

    struct Fixture {
        store: KeyValueStore,
        cookies: CookieJar,
        pending: RefCell<Vec<PendingSettingChange>>,
        events: EventBus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: KeyValueStore::in_memory(),
                cookies: CookieJar::new(),
                pending: RefCell::new(Vec::new()),
                events: EventBus::new(),
            }
        }

        fn service(&self) -> PreferencesService<'_> {
            PreferencesService::new(&self.store, &self.cookies, &self.pending, &self.events)
        }
    }

    #[test]
    fn test_first_load_creates_dark_default() {
        let fx = Fixture::new();
        let prefs = fx.service().load();
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_legacy_keys_fold_in_once() {
        let fx = Fixture::new();
        fx.store.set_raw("theme", "light").unwrap();
        fx.store.set_raw("rememberMe", "true").unwrap();
        fx.store.set_raw("highContrast", "true").unwrap();
        fx.store.set_raw(LEGACY_DARK_MODE_KEY, "0").unwrap();

        let prefs = fx.service().load();
        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.remember_me, Some(true));
        assert_eq!(prefs.extra.get("highContrast"), Some(&Value::Bool(true)));
        assert_eq!(prefs.dark_mode, Some(false));

        // Migrated record is persisted; a changed legacy key no longer wins.
        fx.store.set_raw("theme", "dark").unwrap();
        let again = fx.service().load();
        assert_eq!(again.theme, Theme::Light);
        assert_eq!(again.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_persisted_field_beats_legacy_copy() {
        let fx = Fixture::new();
        fx.store
            .set_raw(keys::PREFS, r#"{"theme":"dark"}"#)
            .unwrap();
        fx.store.set_raw("theme", "light").unwrap();

        let prefs = fx.service().load();
        assert_eq!(prefs.theme, Theme::Dark);
    }

    #[test]
    fn test_set_persists_immediately() {
        let fx = Fixture::new();
        fx.service()
            .set("userFirstName", Value::String("Ada".to_owned()))
            .unwrap();

        let reloaded = fx.service().load();
        assert_eq!(reloaded.user_first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_stage_queues_and_save_flushes_to_log() {
        let fx = Fixture::new();
        let document = Document::new();

        let svc = fx.service();
        svc.stage("theme", Value::String("light".to_owned()), "settings-modal")
            .unwrap();
        svc.stage("rememberMe", Value::Bool(true), "settings-modal")
            .unwrap();
        assert_eq!(svc.pending_changes().len(), 2);

        let committed = svc.save(&document).unwrap();
        assert_eq!(committed, 2);
        assert!(svc.pending_changes().is_empty());

        let log = svc.change_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].change.key, "theme");
        assert_eq!(log[0].change.old_value, Value::String("dark".to_owned()));

        // Second save commits nothing new.
        assert_eq!(svc.save(&document).unwrap(), 0);
        assert_eq!(svc.change_log().len(), 2);
    }

    #[test]
    fn test_save_syncs_cookie_subset() {
        let fx = Fixture::new();
        let document = Document::new();

        let svc = fx.service();
        svc.set("rememberMe", Value::Bool(true)).unwrap();
        svc.set("userEmail", Value::String("ada@example.com".to_owned()))
            .unwrap();
        svc.set("darkMode", Value::Bool(true)).unwrap();
        svc.set("primaryColor", Value::String("#2563EB".to_owned()))
            .unwrap();
        svc.save(&document).unwrap();

        assert_eq!(fx.cookies.get(names::REMEMBER_ME).as_deref(), Some("true"));
        assert_eq!(
            fx.cookies.get(names::SESSION_EMAIL).as_deref(),
            Some("ada@example.com")
        );
        assert_eq!(fx.cookies.get(names::DARK_MODE).as_deref(), Some("1"));
        assert_eq!(
            fx.cookies.get(names::PRIMARY_COLOR).as_deref(),
            Some("#2563EB")
        );

        svc.set("rememberMe", Value::Bool(false)).unwrap();
        svc.save(&document).unwrap();
        assert_eq!(fx.cookies.get(names::REMEMBER_ME), None);
    }

    #[test]
    fn test_save_emits_settings_saved() {
        let fx = Fixture::new();
        let document = Document::new();
        let seen = std::rc::Rc::new(std::cell::Cell::new(false));

        let flag = std::rc::Rc::clone(&seen);
        fx.events.subscribe(move |event| {
            if matches!(event, AppEvent::SettingsSaved { .. }) {
                flag.set(true);
            }
        });

        fx.service().save(&document).unwrap();
        assert!(seen.get());
    }

    #[test]
    fn test_apply_theme_light_then_dark() {
        let fx = Fixture::new();
        let document = Document::new();
        let svc = fx.service();

        svc.set("theme", Value::String("light".to_owned())).unwrap();
        svc.apply_theme(&document);
        assert!(document.has_root_class(LIGHT_MODE_CLASS));
        assert!(!document.has_root_class(DARK_MODE_CLASS));
        assert_eq!(document.style_override().as_deref(), Some(LIGHT_OVERRIDE_CSS));
        assert_eq!(document.logo_variant(), LogoVariant::Light);

        svc.set("theme", Value::String("dark".to_owned())).unwrap();
        svc.apply_theme(&document);
        assert!(!document.has_root_class(LIGHT_MODE_CLASS));
        assert!(document.has_root_class(DARK_MODE_CLASS));
        assert_eq!(document.style_override(), None);
        assert_eq!(document.logo_variant(), LogoVariant::Dark);
    }

    #[test]
    fn test_apply_theme_is_idempotent() {
        let fx = Fixture::new();
        let document = Document::new();
        let svc = fx.service();
        svc.set("theme", Value::String("light".to_owned())).unwrap();

        svc.apply_theme(&document);
        let first = document.theme_state();
        svc.apply_theme(&document);
        assert_eq!(document.theme_state(), first);
    }
}
