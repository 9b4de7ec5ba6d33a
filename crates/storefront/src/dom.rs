//! Headless document model.
//!
//! The engine never touches a real DOM; it mutates this facade and the
//! excluded rendering layer projects it onto the page. The facade carries
//! exactly what the engine owns: root theme classes, the injected theme
//! override block, logo variant sources, region visibility, the message
//! box, and the render targets the services write into.
//!
//! Region lookups return `Option`: a page that never registered a region
//! gets a no-op, not a panic. That preserves the never-crash-the-page
//! contract without silently swallowing genuine programming errors, since
//! an unknown region is visible as `None` to tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::blog::{BlogPost, PostSummary, RecentlyViewed};
use crate::models::commerce::ComparisonView;

/// Styling applied to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Default display time for a notification.
pub const NOTIFICATION_DURATION_MS: u64 = 2500;

/// A transient, auto-dismissing message.
///
/// Showing a new notification replaces the current one and restarts the
/// dismiss timer, matching the single message box of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    /// How long the renderer keeps the message up.
    pub duration_ms: u64,
}

impl Notification {
    /// A success-styled message with the default duration.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Success,
            duration_ms: NOTIFICATION_DURATION_MS,
        }
    }

    /// An error-styled message with the default duration.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
            duration_ms: NOTIFICATION_DURATION_MS,
        }
    }

    /// Override the display duration.
    #[must_use]
    pub const fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Page regions whose visibility the engine controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Region {
    AccountArea,
    ProfileMenu,
    SignInButtons,
    BlogSection,
    AuthModal,
    ComparisonModal,
    SettingsModal,
    InlinePostViewer,
    RecentlyViewedPanel,
}

impl Region {
    /// Every region of the standard page.
    pub const ALL: [Self; 9] = [
        Self::AccountArea,
        Self::ProfileMenu,
        Self::SignInButtons,
        Self::BlogSection,
        Self::AuthModal,
        Self::ComparisonModal,
        Self::SettingsModal,
        Self::InlinePostViewer,
        Self::RecentlyViewedPanel,
    ];
}

/// Which logo art the themed images point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoVariant {
    #[default]
    Dark,
    Light,
}

/// The theme-affected slice of document state.
///
/// Comparing two of these is how the theme-application idempotence
/// property is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    pub root_classes: BTreeSet<String>,
    pub style_override: Option<String>,
    pub logo_variant: LogoVariant,
}

/// The headless document.
#[derive(Debug)]
pub struct Document {
    root_classes: RefCell<BTreeSet<String>>,
    style_override: RefCell<Option<String>>,
    logo_variant: RefCell<LogoVariant>,
    regions: RefCell<BTreeMap<Region, bool>>,
    message: RefCell<Option<Notification>>,
    blog_list: RefCell<Vec<PostSummary>>,
    comparison: RefCell<Option<ComparisonView>>,
    comparison_count: RefCell<usize>,
    open_post: RefCell<Option<BlogPost>>,
    recently_viewed: RefCell<Vec<RecentlyViewed>>,
}

impl Document {
    /// A document with every standard region registered and hidden.
    #[must_use]
    pub fn new() -> Self {
        let doc = Self::unregistered();
        for region in Region::ALL {
            doc.register(region);
        }
        doc
    }

    /// A document with no regions registered; every visibility call is a
    /// no-op until [`Self::register`] runs.
    #[must_use]
    pub fn unregistered() -> Self {
        Self {
            root_classes: RefCell::new(BTreeSet::new()),
            style_override: RefCell::new(None),
            logo_variant: RefCell::new(LogoVariant::default()),
            regions: RefCell::new(BTreeMap::new()),
            message: RefCell::new(None),
            blog_list: RefCell::new(Vec::new()),
            comparison: RefCell::new(None),
            comparison_count: RefCell::new(0),
            open_post: RefCell::new(None),
            recently_viewed: RefCell::new(Vec::new()),
        }
    }

    /// Register a region, initially hidden.
    pub fn register(&self, region: Region) {
        self.regions.borrow_mut().entry(region).or_insert(false);
    }

    // -- root classes ------------------------------------------------------

    /// Add a class to the document root. Idempotent.
    pub fn add_root_class(&self, class: &str) {
        self.root_classes.borrow_mut().insert(class.to_owned());
    }

    /// Remove a class from the document root. Idempotent.
    pub fn remove_root_class(&self, class: &str) {
        self.root_classes.borrow_mut().remove(class);
    }

    /// Whether the root currently carries `class`.
    #[must_use]
    pub fn has_root_class(&self, class: &str) -> bool {
        self.root_classes.borrow().contains(class)
    }

    // -- theme override block ---------------------------------------------

    /// Install (or refresh) the theme override style block.
    pub fn set_style_override(&self, css: &str) {
        *self.style_override.borrow_mut() = Some(css.to_owned());
    }

    /// Remove the theme override style block.
    pub fn clear_style_override(&self) {
        *self.style_override.borrow_mut() = None;
    }

    /// Current override block contents, if installed.
    #[must_use]
    pub fn style_override(&self) -> Option<String> {
        self.style_override.borrow().clone()
    }

    // -- themed images -----------------------------------------------------

    /// Point themed images at the given logo art.
    pub fn set_logo_variant(&self, variant: LogoVariant) {
        *self.logo_variant.borrow_mut() = variant;
    }

    /// Current logo art.
    #[must_use]
    pub fn logo_variant(&self) -> LogoVariant {
        *self.logo_variant.borrow()
    }

    /// Snapshot of the theme-affected state.
    #[must_use]
    pub fn theme_state(&self) -> ThemeState {
        ThemeState {
            root_classes: self.root_classes.borrow().clone(),
            style_override: self.style_override.borrow().clone(),
            logo_variant: *self.logo_variant.borrow(),
        }
    }

    // -- visibility --------------------------------------------------------

    /// Show or hide a region. No-op when the region is unregistered.
    pub fn set_visible(&self, region: Region, visible: bool) {
        if let Some(slot) = self.regions.borrow_mut().get_mut(&region) {
            *slot = visible;
        }
    }

    /// Visibility of a region; `None` when unregistered.
    #[must_use]
    pub fn is_visible(&self, region: Region) -> Option<bool> {
        self.regions.borrow().get(&region).copied()
    }

    // -- message box -------------------------------------------------------

    /// Show a notification, replacing any current one.
    pub fn show_message(&self, notification: Notification) {
        *self.message.borrow_mut() = Some(notification);
    }

    /// The notification currently on screen.
    #[must_use]
    pub fn current_message(&self) -> Option<Notification> {
        self.message.borrow().clone()
    }

    /// Dismiss the current notification.
    pub fn clear_message(&self) {
        *self.message.borrow_mut() = None;
    }

    // -- render targets ----------------------------------------------------

    /// Replace the rendered blog list.
    pub fn set_blog_list(&self, posts: Vec<PostSummary>) {
        *self.blog_list.borrow_mut() = posts;
    }

    /// The rendered blog list.
    #[must_use]
    pub fn blog_list(&self) -> Vec<PostSummary> {
        self.blog_list.borrow().clone()
    }

    /// Replace the rendered comparison table.
    pub fn set_comparison(&self, view: Option<ComparisonView>) {
        *self.comparison.borrow_mut() = view;
    }

    /// The rendered comparison table.
    #[must_use]
    pub fn comparison(&self) -> Option<ComparisonView> {
        self.comparison.borrow().clone()
    }

    /// Update the compare-button counter.
    pub fn set_comparison_count(&self, count: usize) {
        *self.comparison_count.borrow_mut() = count;
    }

    /// Current compare-button counter.
    #[must_use]
    pub fn comparison_count(&self) -> usize {
        *self.comparison_count.borrow()
    }

    /// Put a post into the inline viewer.
    pub fn set_open_post(&self, post: Option<BlogPost>) {
        *self.open_post.borrow_mut() = post;
    }

    /// The post in the inline viewer.
    #[must_use]
    pub fn open_post(&self) -> Option<BlogPost> {
        self.open_post.borrow().clone()
    }

    /// Replace the recently-read panel contents.
    pub fn set_recently_viewed(&self, entries: Vec<RecentlyViewed>) {
        *self.recently_viewed.borrow_mut() = entries;
    }

    /// The recently-read panel contents.
    #[must_use]
    pub fn recently_viewed(&self) -> Vec<RecentlyViewed> {
        self.recently_viewed.borrow().clone()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
