//! Fixed storage keys for persisted records.
//!
//! Every piece of engine state lives under one of these names. The values
//! are JSON documents except [`IS_LOGGED_IN`], which is the raw string
//! `"true"`/`"false"` for compatibility with the persisted layout.

/// Key for the unified preferences record.
pub const PREFS: &str = "ultre_user_preferences_v2";

/// Key for the list of registered users.
pub const USERS: &str = "ultre_users";

/// Key for the list of persisted blog posts.
pub const BLOG_POSTS: &str = "ultre_blog_posts";

/// Key for the list of blog writers and their verification state.
pub const BLOG_WRITERS: &str = "ultre_blog_writers";

/// Key for the raw `"true"`/`"false"` logged-in flag.
pub const IS_LOGGED_IN: &str = "ultre_isLoggedIn";

/// Key for the current-user record mirrored out of the user list.
pub const CURRENT_USER: &str = "ultre_current_user";

/// Key for the wishlist item list.
pub const WISHLIST: &str = "wishlist";

/// Key for the cart record, keyed by item identity.
pub const CART: &str = "cart_items";

/// Key for the ordered comparison-list product IDs.
pub const COMPARISON: &str = "ultre_comparison_items";

/// Key for the recently-viewed blog post history.
pub const RECENTLY_VIEWED: &str = "ultre_recently_viewed";

/// Key for the committed setting-change log.
pub const SETTING_CHANGE_LOG: &str = "ultre_setting_change_logs";

/// Key for the externally supplied product catalog (read-only input).
pub const CATALOG: &str = "ultre_localClothingItems";
