//! Ultre storefront state engine.
//!
//! The local persistence and state-synchronization layer of the Ultre
//! storefront: auth sessions, preferences, cart/wishlist/comparison state,
//! and the blog, all stored as JSON records in a key-value store and
//! projected onto a headless document model.
//!
//! # Architecture
//!
//! ```text
//! control event ─▶ UiBinder ─▶ service ─▶ KeyValueStore / CookieJar
//!                     │                          │
//!                     └──── re-render ◀── read back
//! ```
//!
//! [`state::App`] owns the shared state; services are short-lived handles
//! borrowing from it. Storage is the single source of truth: nothing is
//! cached across dispatches, so every render reads the just-written
//! records back out.
//!
//! The engine is single-threaded and event-driven: all mutation happens
//! synchronously inside a dispatch call, and the types are deliberately
//! `!Sync`. There is no cross-instance consistency; two engines over the
//! same state file can overwrite each other with stale records, the same
//! way two browser tabs could.
//!
//! # Modules
//!
//! - [`storage`] - typed key-value store, fixed key names, cookie jar
//! - [`models`] - persisted record shapes (camelCase wire layout)
//! - [`services`] - auth, preferences, commerce, blog
//! - [`dom`] - the headless document facade
//! - [`events`] - typed application events
//! - [`ui`] - action classification and dispatch
//! - [`config`] - environment-driven engine configuration
//! - [`error`] - the binder-boundary error type

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod dom;
pub mod error;
pub mod events;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod ui;

pub use config::EngineConfig;
pub use error::AppError;
pub use state::{App, WeakApp};
pub use ui::{Action, UiBinder};
