//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are backed by
//! strings because persisted records carry opaque string identifiers
//! (`"u_…"` for users, `"post_…"` for posts, catalog-assigned IDs for
//! products).

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`/`From<&str>` and `Display` implementations
///
/// The two-argument form additionally generates a `generate()` constructor
/// producing `<prefix>_<uuid>` identifiers for records created locally.
///
/// # Example
///
/// ```rust
/// # use ultre_core::define_id;
/// define_id!(ProductId);
/// define_id!(UserId, "u");
///
/// let product_id = ProductId::new("shirt-01");
/// let user_id = UserId::generate();
/// assert!(user_id.as_str().starts_with("u_"));
///
/// // These are different types, so this won't compile:
/// // let _: UserId = product_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
    ($name:ident, $prefix:literal) => {
        $crate::define_id!($name);

        impl $name {
            /// Generate a fresh ID for a locally created record.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, ::uuid::Uuid::new_v4().simple()))
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId, "u");
define_id!(PostId, "post");
define_id!(ProductId);
