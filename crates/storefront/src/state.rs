//! Application state shared across the engine.
//!
//! [`App`] owns the single source of truth (the key-value store) plus the
//! cookie jar, document facade, event bus, and the process-wide pending
//! settings queue. Services are short-lived handles borrowing from it, so
//! the in-memory view is always re-derived from storage rather than cached
//! across calls.
//!
//! The engine is single-threaded by design; `App` clones share one state
//! via `Rc` and the whole structure is deliberately `!Send`/`!Sync`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::EngineConfig;
use crate::dom::Document;
use crate::events::EventBus;
use crate::models::blog::BlogPost;
use crate::models::preferences::PendingSettingChange;
use crate::services::auth::AuthService;
use crate::services::blog::{BlogService, CodeDelivery, TracingCodeDelivery};
use crate::services::commerce::CommerceService;
use crate::services::preferences::PreferencesService;
use crate::storage::cookies::CookieJar;
use crate::storage::{JsonFileBackend, KeyValueStore, StorageError};

/// Application state shared across all dispatch handlers.
///
/// Cheaply cloneable via `Rc`.
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

struct AppInner {
    config: EngineConfig,
    store: KeyValueStore,
    cookies: CookieJar,
    document: Document,
    events: EventBus,
    pending: RefCell<Vec<PendingSettingChange>>,
    static_posts: Vec<BlogPost>,
    code_delivery: Box<dyn CodeDelivery>,
}

/// Non-owning handle to the application state.
///
/// Event listeners that need the state back must hold one of these instead
/// of an [`App`]: a listener lives inside the event bus, which the state
/// owns, so an owning clone would keep the whole structure alive forever.
#[derive(Clone)]
pub struct WeakApp {
    inner: Weak<AppInner>,
}

impl WeakApp {
    /// Recover the state if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<App> {
        self.inner.upgrade().map(|inner| App { inner })
    }
}

impl App {
    /// Create the application state with default collaborators: no static
    /// post set and the tracing-backed demo code delivery.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the configured state file cannot be
    /// opened.
    pub fn new(config: EngineConfig) -> Result<Self, StorageError> {
        Self::with_collaborators(config, Vec::new(), Box::new(TracingCodeDelivery))
    }

    /// Create the application state with explicit collaborators.
    ///
    /// `static_posts` is the page-supplied built-in post set merged into
    /// every blog render; `code_delivery` receives writer verification
    /// codes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the configured state file cannot be
    /// opened.
    pub fn with_collaborators(
        config: EngineConfig,
        static_posts: Vec<BlogPost>,
        code_delivery: Box<dyn CodeDelivery>,
    ) -> Result<Self, StorageError> {
        let store = match &config.storage_path {
            Some(path) => KeyValueStore::new(Box::new(JsonFileBackend::open(path)?)),
            None => KeyValueStore::in_memory(),
        };

        let app = Self {
            inner: Rc::new(AppInner {
                store,
                cookies: CookieJar::new(),
                document: Document::new(),
                events: EventBus::new(),
                pending: RefCell::new(Vec::new()),
                static_posts,
                code_delivery,
                config,
            }),
        };

        if app.inner.config.seed_blog {
            // Seeding is best-effort: an unwritable store must not keep the
            // rest of the engine from coming up.
            if let Err(err) = app.blog().seed() {
                tracing::warn!(%err, "failed to seed blog posts");
            }
        }

        Ok(app)
    }

    /// A non-owning handle for event listeners.
    #[must_use]
    pub fn downgrade(&self) -> WeakApp {
        WeakApp {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// The shared key-value store.
    #[must_use]
    pub fn store(&self) -> &KeyValueStore {
        &self.inner.store
    }

    /// The cookie jar.
    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.inner.cookies
    }

    /// The headless document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// The application event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Session service handle.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.inner.store, &self.inner.cookies)
    }

    /// Settings service handle.
    #[must_use]
    pub fn preferences(&self) -> PreferencesService<'_> {
        PreferencesService::new(
            &self.inner.store,
            &self.inner.cookies,
            &self.inner.pending,
            &self.inner.events,
        )
    }

    /// Commerce service handle.
    #[must_use]
    pub fn commerce(&self) -> CommerceService<'_> {
        CommerceService::new(&self.inner.store)
    }

    /// Blog service handle.
    #[must_use]
    pub fn blog(&self) -> BlogService<'_> {
        BlogService::new(
            &self.inner.store,
            self.inner.code_delivery.as_ref(),
            &self.inner.static_posts,
        )
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_seeds_blog_by_default() {
        let app = App::new(EngineConfig::default()).unwrap();
        assert_eq!(app.blog().posts().len(), 3);
    }

    #[test]
    fn test_seeding_can_be_disabled() {
        let config = EngineConfig {
            seed_blog: false,
            ..EngineConfig::default()
        };
        let app = App::new(config).unwrap();
        assert!(app.blog().posts().is_empty());
    }

    #[test]
    fn test_clones_share_one_store() {
        let app = App::new(EngineConfig::default()).unwrap();
        let clone = app.clone();

        app.store().set_raw("probe", "1").unwrap();
        assert_eq!(clone.store().get_raw("probe").as_deref(), Some("1"));
    }
}
