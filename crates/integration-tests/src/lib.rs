//! Shared helpers for the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cell::RefCell;
use std::rc::Rc;

use ultre_core::Email;
use ultre_storefront::services::blog::CodeDelivery;
use ultre_storefront::{App, EngineConfig, UiBinder};

/// Code delivery that captures issued codes for the test to redeem.
#[derive(Debug, Clone, Default)]
pub struct CapturingCodeDelivery {
    sent: Rc<RefCell<Vec<(String, String)>>>,
}

impl CapturingCodeDelivery {
    /// Every `(email, code)` pair delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }

    /// The most recently issued code.
    ///
    /// # Panics
    ///
    /// Panics if no code has been delivered yet.
    #[must_use]
    pub fn last_code(&self) -> String {
        self.sent
            .borrow()
            .last()
            .map(|(_, code)| code.clone())
            .expect("no verification code was delivered")
    }
}

impl CodeDelivery for CapturingCodeDelivery {
    fn deliver(&self, email: &Email, code: &str) {
        self.sent
            .borrow_mut()
            .push((email.as_str().to_owned(), code.to_owned()));
    }
}

/// Route engine logs through the test harness, honoring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A memory-backed engine with a capturing code delivery.
///
/// # Panics
///
/// Panics if the engine fails to come up (the memory backend cannot fail).
#[must_use]
pub fn test_app() -> (App, CapturingCodeDelivery) {
    init_test_logging();
    let delivery = CapturingCodeDelivery::default();
    let app = App::with_collaborators(
        EngineConfig::default(),
        Vec::new(),
        Box::new(delivery.clone()),
    )
    .expect("memory-backed engine");
    (app, delivery)
}

/// [`test_app`] wrapped in a bound dispatch table.
#[must_use]
pub fn test_binder() -> (UiBinder, CapturingCodeDelivery) {
    let (app, delivery) = test_app();
    (UiBinder::new(app), delivery)
}
