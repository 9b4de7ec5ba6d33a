//! Ultre Core - Shared types library.
//!
//! This crate provides common types used across all Ultre components:
//! - `storefront` - The client-side state engine (storage, sessions, commerce, blog)
//! - `integration-tests` - Cross-service flow tests
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! document manipulation. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
