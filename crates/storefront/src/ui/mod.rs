//! Event-delegation layer binding document controls to the services.
//!
//! Control flow: the page hands the binder a control's attributes (or a
//! ready-made [`Action`]), the binder dispatches to the owning service,
//! the service mutates storage, and the binder re-renders the affected
//! document targets from the just-written state. Errors stop at this
//! boundary: every failure becomes a transient notification, nothing is
//! ever thrown at the page.

mod actions;

pub use actions::{Action, ControlAttrs};

use crate::dom::{Notification, Region};
use crate::error::AppError;
use crate::events::AppEvent;
use crate::state::App;

/// The typed event-delegation layer.
pub struct UiBinder {
    app: App,
}

impl UiBinder {
    /// Bind the dispatch table to the application state.
    ///
    /// Also installs the settings-commit listener that re-syncs logos and
    /// themed styling after every save, the way downstream components
    /// react to the commit broadcast. The listener holds a weak handle;
    /// the bus must not keep the state alive.
    #[must_use]
    pub fn new(app: App) -> Self {
        let fixup = app.downgrade();
        app.events().subscribe(move |event| {
            if matches!(event, AppEvent::SettingsSaved { .. }) {
                if let Some(app) = fixup.upgrade() {
                    app.preferences().apply_theme(app.document());
                }
            }
        });
        Self { app }
    }

    /// Shared application state.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// First render after page load: theme, auth-gated visibility, blog
    /// list, comparison counter, reading history.
    pub fn bootstrap(&self) {
        let document = self.app.document();
        self.app.preferences().apply_theme(document);
        self.refresh_auth_ui();
        document.set_comparison_count(self.app.commerce().comparison().len());
        document.set_recently_viewed(self.app.blog().recently_viewed());
    }

    /// Classify a control and dispatch it.
    ///
    /// Returns whether the control classified as anything; unrecognized
    /// controls are a no-op by policy.
    pub fn handle(&self, attrs: &ControlAttrs) -> bool {
        match Action::classify(attrs) {
            Some(action) => {
                self.dispatch(action);
                true
            }
            None => false,
        }
    }

    /// Execute one action.
    ///
    /// Never panics and never surfaces an error to the caller: failures
    /// are rendered into the notification surface with error styling,
    /// successes with success styling.
    pub fn dispatch(&self, action: Action) {
        tracing::debug!(?action, "dispatching action");
        match self.run(action) {
            Ok(Some(notification)) => self.app.document().show_message(notification),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!(%err, "action failed");
                self.app.document().show_message(err.notification());
            }
        }
    }

    fn run(&self, action: Action) -> Result<Option<Notification>, AppError> {
        let document = self.app.document();

        match action {
            Action::AddToCart(item) => {
                let label = format!("{} (Size: {}) added to cart.", item.name, item.size);
                self.app.commerce().add_to_cart(item)?;
                Ok(Some(Notification::success(label)))
            }

            Action::RemoveFromWishlist(id) => {
                self.app.commerce().remove_from_wishlist(&id)?;
                Ok(Some(Notification::success("Removed from wishlist")))
            }

            Action::ToggleComparison(id) => {
                let toggle = self.app.commerce().toggle_comparison(&id)?;
                document.set_comparison_count(toggle.count());
                let label = match toggle {
                    crate::services::commerce::ComparisonToggle::Added { .. } => {
                        "Added to comparison"
                    }
                    crate::services::commerce::ComparisonToggle::Removed { .. } => {
                        "Removed from comparison"
                    }
                };
                Ok(Some(Notification::success(label)))
            }

            Action::OpenComparison => {
                let view = self.app.commerce().comparison_view()?;
                document.set_comparison(Some(view));
                document.set_visible(Region::ComparisonModal, true);
                Ok(None)
            }

            Action::OpenBlogPost(id) => {
                if !self.app.auth().is_logged_in() {
                    document.set_visible(Region::AuthModal, true);
                    return Ok(None);
                }
                let post = self.app.blog().open_post(&id)?;
                document.set_open_post(Some(post));
                document.set_visible(Region::InlinePostViewer, true);
                document.set_recently_viewed(self.app.blog().recently_viewed());
                Ok(None)
            }

            Action::OpenItemDetail(id) => {
                // The item-detail view belongs to the external renderer.
                self.app.events().emit(&AppEvent::ItemDetailRequested { id });
                Ok(None)
            }

            Action::StageSetting { key, value, source } => {
                self.app.preferences().stage(&key, value, &source)?;
                self.app.preferences().apply_theme(document);
                Ok(Some(Notification::success(
                    "Setting selected (will be logged on Save)",
                )))
            }

            Action::SaveSettings => {
                self.app.preferences().save(document)?;
                Ok(Some(Notification::success("Settings saved")))
            }

            Action::SignUp { email, password } => {
                self.app.auth().sign_up(&email, &password)?;
                self.refresh_auth_ui();
                document.set_visible(Region::AuthModal, false);
                Ok(Some(
                    Notification::success("Signed up and logged in").with_duration(2000),
                ))
            }

            Action::SignIn { email, password } => {
                self.app.auth().sign_in(&email, &password)?;
                self.refresh_auth_ui();
                document.set_visible(Region::AuthModal, false);
                Ok(Some(Notification::success("Signed in").with_duration(1500)))
            }

            Action::SignOut => {
                self.app.auth().sign_out()?;
                self.refresh_auth_ui();
                Ok(Some(Notification::success("Signed out").with_duration(1000)))
            }
        }
    }

    /// Re-apply logged-in visibility from the authoritative flag and
    /// re-render the blog list from storage.
    pub fn refresh_auth_ui(&self) {
        let logged_in = self.app.auth().is_logged_in();
        let document = self.app.document();

        document.set_visible(Region::AccountArea, logged_in);
        document.set_visible(Region::ProfileMenu, logged_in);
        document.set_visible(Region::SignInButtons, !logged_in);
        document.set_visible(Region::BlogSection, logged_in);

        document.set_blog_list(self.app.blog().render_posts(None));
    }
}
