//! Typed actions and their classification from control attributes.
//!
//! The page tags controls with a `data-action` kind plus payload
//! attributes; [`Action::classify`] is the single explicit step mapping
//! those onto the dispatch table. A control that classifies as nothing is
//! ignored by the binder; that is the documented no-op policy, with no
//! chained selector matching anywhere.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde_json::Value;

use ultre_core::{PostId, Price, ProductId};

use crate::models::commerce::{CartItem, DEFAULT_SIZE};

/// Data attributes of the control an event landed on, minus the `data-`
/// prefix (`data-item-id` → `item-id`).
pub type ControlAttrs = BTreeMap<String, String>;

/// Everything the binder knows how to do.
///
/// Implements `Debug` manually so dispatch logging never carries a
/// password.
#[derive(Clone, PartialEq)]
pub enum Action {
    AddToCart(CartItem),
    RemoveFromWishlist(ProductId),
    ToggleComparison(ProductId),
    OpenComparison,
    OpenBlogPost(PostId),
    OpenItemDetail(ProductId),
    StageSetting {
        key: String,
        value: Value,
        source: String,
    },
    SaveSettings,
    SignUp {
        email: String,
        password: String,
    },
    SignIn {
        email: String,
        password: String,
    },
    SignOut,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddToCart(item) => f.debug_tuple("AddToCart").field(item).finish(),
            Self::RemoveFromWishlist(id) => {
                f.debug_tuple("RemoveFromWishlist").field(id).finish()
            }
            Self::ToggleComparison(id) => f.debug_tuple("ToggleComparison").field(id).finish(),
            Self::OpenComparison => f.write_str("OpenComparison"),
            Self::OpenBlogPost(id) => f.debug_tuple("OpenBlogPost").field(id).finish(),
            Self::OpenItemDetail(id) => f.debug_tuple("OpenItemDetail").field(id).finish(),
            Self::StageSetting { key, value, source } => f
                .debug_struct("StageSetting")
                .field("key", key)
                .field("value", value)
                .field("source", source)
                .finish(),
            Self::SaveSettings => f.write_str("SaveSettings"),
            Self::SignUp { email, .. } => f
                .debug_struct("SignUp")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::SignIn { email, .. } => f
                .debug_struct("SignIn")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
            Self::SignOut => f.write_str("SignOut"),
        }
    }
}

impl Action {
    /// Classify a control into an action.
    ///
    /// Returns `None` when the control carries no recognized action kind
    /// or is missing its required payload; the binder treats that as a
    /// no-op. Credential actions ([`Action::SignUp`], [`Action::SignIn`])
    /// come from form handlers directly and never classify from
    /// attributes.
    #[must_use]
    pub fn classify(attrs: &ControlAttrs) -> Option<Self> {
        if let Some(key) = attrs.get("setting-key") {
            return Some(Self::StageSetting {
                key: key.clone(),
                value: control_value(attrs.get("value").map_or("", String::as_str)),
                source: attrs
                    .get("source")
                    .cloned()
                    .unwrap_or_else(|| "inline".to_owned()),
            });
        }

        match attrs.get("action")?.as_str() {
            "add-to-cart" => item_payload(attrs).map(Self::AddToCart),
            "remove-from-wishlist" => {
                attrs.get("item-id").map(|id| Self::RemoveFromWishlist(ProductId::new(id.clone())))
            }
            "toggle-comparison" => {
                attrs.get("item-id").map(|id| Self::ToggleComparison(ProductId::new(id.clone())))
            }
            "open-comparison" => Some(Self::OpenComparison),
            "open-blog-post" => attrs.get("post-id").map(|id| Self::OpenBlogPost(PostId::new(id.clone()))),
            "open-item-detail" => {
                attrs.get("item-id").map(|id| Self::OpenItemDetail(ProductId::new(id.clone())))
            }
            "save-settings" => Some(Self::SaveSettings),
            "sign-out" => Some(Self::SignOut),
            _ => None,
        }
    }
}

/// Snapshot the item payload attributes of a product-card control.
///
/// Missing optional fields take the card defaults: zero price, empty
/// image, size `"M"`.
fn item_payload(attrs: &ControlAttrs) -> Option<CartItem> {
    let id = attrs.get("item-id")?;
    Some(CartItem {
        id: ProductId::new(id.clone()),
        name: attrs.get("item-name").cloned().unwrap_or_default(),
        price: attrs
            .get("item-price")
            .and_then(|p| p.parse::<Decimal>().ok())
            .map_or(Price::ZERO, Price::new),
        image_url: attrs.get("item-image").cloned().unwrap_or_default(),
        size: attrs
            .get("item-size")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SIZE.to_owned()),
    })
}

/// Coerce a control's string value: checkbox states become booleans,
/// everything else stays a string.
fn control_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        other => Value::String(other.to_owned()),
    }
}
