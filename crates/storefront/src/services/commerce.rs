//! Cart, wishlist, and comparison-list state.
//!
//! Every operation reads the current record out of storage, applies one
//! mutation, persists, and returns the new state so the binder can
//! re-render from it. Nothing is cached between calls.

use thiserror::Error;

use ultre_core::ProductId;

use crate::models::commerce::{
    Cart, CartItem, ComparisonColumn, ComparisonView, Product, WishlistItem,
};
use crate::storage::{KeyValueStore, StorageError, keys};

/// Upper bound on the comparison working set.
pub const MAX_COMPARISON_ITEMS: usize = 4;

/// Minimum selection before a comparison view can be built.
pub const MIN_COMPARISON_ITEMS: usize = 2;

/// Errors from commerce mutations.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The comparison list already holds [`MAX_COMPARISON_ITEMS`] entries.
    #[error("Maximum 4 items can be compared at once")]
    ComparisonFull,

    /// Fewer than [`MIN_COMPARISON_ITEMS`] products are selected.
    #[error("Please select at least 2 items to compare")]
    NotEnoughItems,

    /// Persisting the mutated record failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What a comparison toggle did, with the resulting list length for the
/// compare-button counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonToggle {
    Added { count: usize },
    Removed { count: usize },
}

impl ComparisonToggle {
    /// Resulting list length either way.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Added { count } | Self::Removed { count } => count,
        }
    }
}

/// Cart, wishlist, and comparison service.
pub struct CommerceService<'a> {
    store: &'a KeyValueStore,
}

impl<'a> CommerceService<'a> {
    /// Create a new commerce service over the shared store.
    #[must_use]
    pub const fn new(store: &'a KeyValueStore) -> Self {
        Self { store }
    }

    // -- cart --------------------------------------------------------------

    /// The current cart record.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.store.get(keys::CART, Cart::default())
    }

    /// Add an item to the cart, replacing any entry with the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Storage`] if the cart cannot be persisted;
    /// the stored cart is unchanged in that case.
    pub fn add_to_cart(&self, item: CartItem) -> Result<Cart, CommerceError> {
        let mut cart = self.cart();
        cart.insert(item);
        self.store.set(keys::CART, &cart)?;
        Ok(cart)
    }

    /// Remove one cart entry by product and size.
    ///
    /// Removing an absent entry is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Storage`] if the cart cannot be persisted.
    pub fn remove_from_cart(&self, id: &ProductId, size: &str) -> Result<Cart, CommerceError> {
        let mut cart = self.cart();
        cart.remove(id, size);
        self.store.set(keys::CART, &cart)?;
        Ok(cart)
    }

    // -- wishlist ----------------------------------------------------------

    /// The current wishlist.
    #[must_use]
    pub fn wishlist(&self) -> Vec<WishlistItem> {
        self.store.get(keys::WISHLIST, Vec::new())
    }

    /// Add an item to the wishlist; a product already present stays put.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Storage`] if the list cannot be persisted.
    pub fn add_to_wishlist(&self, item: WishlistItem) -> Result<Vec<WishlistItem>, CommerceError> {
        let mut wishlist = self.wishlist();
        if !wishlist.iter().any(|w| w.id == item.id) {
            wishlist.push(item);
            self.store.set(keys::WISHLIST, &wishlist)?;
        }
        Ok(wishlist)
    }

    /// Remove a product from the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Storage`] if the list cannot be persisted.
    pub fn remove_from_wishlist(&self, id: &ProductId) -> Result<Vec<WishlistItem>, CommerceError> {
        let mut wishlist = self.wishlist();
        wishlist.retain(|w| &w.id != id);
        self.store.set(keys::WISHLIST, &wishlist)?;
        Ok(wishlist)
    }

    // -- comparison --------------------------------------------------------

    /// The ordered comparison list.
    #[must_use]
    pub fn comparison(&self) -> Vec<ProductId> {
        self.store.get(keys::COMPARISON, Vec::new())
    }

    /// Toggle a product's membership in the comparison list.
    ///
    /// Present → removed; absent → appended. The list is persisted after
    /// every mutation.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::ComparisonFull`] when adding a fifth item;
    /// the stored list keeps its four entries. Returns
    /// [`CommerceError::Storage`] if the list cannot be persisted.
    pub fn toggle_comparison(&self, id: &ProductId) -> Result<ComparisonToggle, CommerceError> {
        let mut list = self.comparison();

        let toggle = if list.contains(id) {
            list.retain(|x| x != id);
            ComparisonToggle::Removed { count: list.len() }
        } else {
            if list.len() >= MAX_COMPARISON_ITEMS {
                return Err(CommerceError::ComparisonFull);
            }
            list.push(id.clone());
            ComparisonToggle::Added { count: list.len() }
        };

        self.store.set(keys::COMPARISON, &list)?;
        Ok(toggle)
    }

    /// The externally supplied product catalog.
    #[must_use]
    pub fn catalog(&self) -> Vec<Product> {
        self.store.get(keys::CATALOG, Vec::new())
    }

    /// Build the read-only comparison view for the current selection.
    ///
    /// Selected IDs that no longer resolve against the catalog are skipped,
    /// mirroring how the source table silently dropped stale selections.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotEnoughItems`] when fewer than
    /// [`MIN_COMPARISON_ITEMS`] products are selected.
    pub fn comparison_view(&self) -> Result<ComparisonView, CommerceError> {
        let selected = self.comparison();
        if selected.len() < MIN_COMPARISON_ITEMS {
            return Err(CommerceError::NotEnoughItems);
        }

        let catalog = self.catalog();
        let columns = selected
            .iter()
            .filter_map(|id| catalog.iter().find(|p| &p.id == id))
            .map(|product| ComparisonColumn {
                add_to_cart: product.to_cart_item(),
                product: product.clone(),
            })
            .collect();

        Ok(ComparisonView { columns })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use ultre_core::Price;

    fn item(id: &str) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: "Tee".to_owned(),
            price: Price::from_cents(1999),
            image_url: "x.png".to_owned(),
            size: "M".to_owned(),
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            ..Product::default()
        }
    }

    #[test]
    fn test_add_to_cart_creates_single_entry() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        let cart = commerce.add_to_cart(item("p1")).unwrap();
        assert_eq!(cart.len(), 1);

        let entry = cart.get(&ProductId::new("p1"), "M").unwrap();
        assert_eq!(entry.size, "M");
        assert_eq!(entry.price, Price::from_cents(1999));
    }

    #[test]
    fn test_cart_survives_reload_through_storage() {
        let store = KeyValueStore::in_memory();
        CommerceService::new(&store).add_to_cart(item("p1")).unwrap();

        // A fresh service sees the persisted record, not a cached copy.
        let cart = CommerceService::new(&store).cart();
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_wishlist_dedups_by_product() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        commerce.add_to_wishlist(item("p1")).unwrap();
        let wishlist = commerce.add_to_wishlist(item("p1")).unwrap();
        assert_eq!(wishlist.len(), 1);

        let wishlist = commerce.remove_from_wishlist(&ProductId::new("p1")).unwrap();
        assert!(wishlist.is_empty());
    }

    #[test]
    fn test_comparison_caps_at_four() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        for id in ["p1", "p2", "p3", "p4"] {
            commerce.toggle_comparison(&ProductId::new(id)).unwrap();
        }

        let err = commerce.toggle_comparison(&ProductId::new("p5")).unwrap_err();
        assert!(matches!(err, CommerceError::ComparisonFull));
        assert_eq!(commerce.comparison().len(), 4);
    }

    #[test]
    fn test_toggle_twice_restores_membership_and_order() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        for id in ["p1", "p2"] {
            commerce.toggle_comparison(&ProductId::new(id)).unwrap();
        }
        let before = commerce.comparison();

        let toggled = commerce.toggle_comparison(&ProductId::new("p3")).unwrap();
        assert_eq!(toggled, ComparisonToggle::Added { count: 3 });

        let toggled = commerce.toggle_comparison(&ProductId::new("p3")).unwrap();
        assert_eq!(toggled, ComparisonToggle::Removed { count: 2 });
        assert_eq!(commerce.comparison(), before);
    }

    #[test]
    fn test_removed_item_reenters_at_the_tail() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        for id in ["p1", "p2", "p3"] {
            commerce.toggle_comparison(&ProductId::new(id)).unwrap();
        }
        commerce.toggle_comparison(&ProductId::new("p2")).unwrap();
        commerce.toggle_comparison(&ProductId::new("p2")).unwrap();

        assert_eq!(
            commerce.comparison(),
            vec![
                ProductId::new("p1"),
                ProductId::new("p3"),
                ProductId::new("p2"),
            ]
        );
    }

    #[test]
    fn test_comparison_view_needs_two_items() {
        let store = KeyValueStore::in_memory();
        let commerce = CommerceService::new(&store);

        commerce.toggle_comparison(&ProductId::new("p1")).unwrap();
        let err = commerce.comparison_view().unwrap_err();
        assert!(matches!(err, CommerceError::NotEnoughItems));
    }

    #[test]
    fn test_comparison_view_resolves_catalog_columns() {
        let store = KeyValueStore::in_memory();
        store
            .set(keys::CATALOG, &vec![product("p1"), product("p2")])
            .unwrap();

        let commerce = CommerceService::new(&store);
        commerce.toggle_comparison(&ProductId::new("p1")).unwrap();
        commerce.toggle_comparison(&ProductId::new("p2")).unwrap();
        commerce.toggle_comparison(&ProductId::new("gone")).unwrap();

        let view = commerce.comparison_view().unwrap();
        assert_eq!(view.columns.len(), 2);
        assert_eq!(view.columns[0].product.name, "Product p1");
        assert_eq!(view.columns[0].add_to_cart.size, "M");
    }
}
