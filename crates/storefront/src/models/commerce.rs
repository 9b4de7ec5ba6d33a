//! Cart, wishlist, comparison, and catalog types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ultre_core::{Price, ProductId};

/// An item saved into the cart.
///
/// A snapshot of the product card at the moment of the action, not a live
/// reference into the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    /// Selected size; card-originated adds default to `"M"`.
    pub size: String,
}

/// Wishlist entries carry the same snapshot shape as cart entries.
pub type WishlistItem = CartItem;

/// The cart record: a map keyed by item identity (`id` + `size`).
///
/// Adding the same product in the same size replaces the entry; different
/// sizes of one product are distinct lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart(BTreeMap<String, CartItem>);

impl Cart {
    /// Identity key for a product/size pair.
    #[must_use]
    pub fn entry_key(id: &ProductId, size: &str) -> String {
        format!("{id}:{size}")
    }

    /// Insert (or replace) an item under its identity key.
    pub fn insert(&mut self, item: CartItem) {
        self.0.insert(Self::entry_key(&item.id, &item.size), item);
    }

    /// Remove the entry for a product/size pair, returning it if present.
    pub fn remove(&mut self, id: &ProductId, size: &str) -> Option<CartItem> {
        self.0.remove(&Self::entry_key(id, size))
    }

    /// Look up the entry for a product/size pair.
    #[must_use]
    pub fn get(&self, id: &ProductId, size: &str) -> Option<&CartItem> {
        self.0.get(&Self::entry_key(id, size))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the cart holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the entries in key order.
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.0.values()
    }

    /// Sum of entry prices.
    #[must_use]
    pub fn total(&self) -> Price {
        self.0.values().map(|i| i.price).fold(Price::ZERO, |a, b| a + b)
    }
}

/// A catalog product as supplied by the external renderer.
///
/// The catalog is foreign data read back out of storage, so every field is
/// defaulted; a record missing fields still resolves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

/// Size taken when an add-to-cart action comes without an explicit size
/// (wishlist, dashboard, comparison columns).
pub const DEFAULT_SIZE: &str = "M";

impl Product {
    /// Snapshot this product into a cart item with the default size.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            size: DEFAULT_SIZE.to_owned(),
        }
    }
}

/// One column of the comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonColumn {
    /// The resolved catalog product.
    pub product: Product,
    /// Prebuilt add-to-cart payload for the column's action button.
    pub add_to_cart: CartItem,
}

/// Read-only comparison view over the selected products.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub columns: Vec<ComparisonColumn>,
}

impl ComparisonView {
    /// The shared-field rows of the table: label plus one cell per column.
    ///
    /// List-valued fields are joined with `", "`, matching how the table
    /// renders them.
    #[must_use]
    pub fn field_rows(&self) -> Vec<(&'static str, Vec<String>)> {
        let cell = |f: &dyn Fn(&Product) -> String| -> Vec<String> {
            self.columns.iter().map(|c| f(&c.product)).collect()
        };

        vec![
            ("Category", cell(&|p| p.category.clone())),
            ("Material", cell(&|p| p.material.clone())),
            ("Style", cell(&|p| p.style.clone())),
            ("Sizes Available", cell(&|p| p.sizes.join(", "))),
            ("Colors", cell(&|p| p.colors.join(", "))),
            ("Features", cell(&|p| p.features.join(", "))),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, size: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: "Tee".to_owned(),
            price: Price::from_cents(1999),
            image_url: "x.png".to_owned(),
            size: size.to_owned(),
        }
    }

    #[test]
    fn test_cart_keys_by_id_and_size() {
        let mut cart = Cart::default();
        cart.insert(item("p1", "M"));
        cart.insert(item("p1", "L"));
        cart.insert(item("p1", "M"));

        assert_eq!(cart.len(), 2);
        assert!(cart.get(&ProductId::new("p1"), "M").is_some());
    }

    #[test]
    fn test_cart_total() {
        let mut cart = Cart::default();
        cart.insert(item("p1", "M"));
        cart.insert(item("p2", "M"));
        assert_eq!(cart.total(), Price::from_cents(3998));
    }

    #[test]
    fn test_cart_serializes_as_plain_map() {
        let mut cart = Cart::default();
        cart.insert(item("p1", "M"));

        let json = serde_json::to_value(&cart).unwrap();
        let entry = json.get("p1:M").unwrap();
        assert_eq!(entry.get("size").unwrap(), "M");
        assert_eq!(entry.get("imageUrl").unwrap(), "x.png");
    }

    #[test]
    fn test_product_tolerates_sparse_records() {
        let product: Product = serde_json::from_str(r#"{"id":"p9"}"#).unwrap();
        assert_eq!(product.id, ProductId::new("p9"));
        assert!(product.sizes.is_empty());
        assert!(!product.in_stock);
    }

    #[test]
    fn test_comparison_field_rows_join_lists() {
        let product = Product {
            id: ProductId::new("p1"),
            name: "Tee".to_owned(),
            sizes: vec!["S".to_owned(), "M".to_owned()],
            ..Product::default()
        };
        let view = ComparisonView {
            columns: vec![ComparisonColumn {
                add_to_cart: product.to_cart_item(),
                product,
            }],
        };

        let rows = view.field_rows();
        let sizes = rows.iter().find(|(label, _)| *label == "Sizes Available");
        assert_eq!(sizes.unwrap().1, vec!["S, M".to_owned()]);
    }
}
