//! # storefront-session: Host Layer for the Checkout Engine
//!
//! Keeps one buyer's cart for the length of a visit, saves it after every
//! change and loads the pricing policy from the environment. All pricing and
//! cart rules are delegated to `storefront-core`.
//!
//! ## Module Organization
//! ```text
//! storefront_session/
//! ├── lib.rs          ◄─── You are here (logging setup)
//! ├── session.rs      ◄─── CartSession: Mutex<Cart> + write-through saves
//! ├── store.rs        ◄─── CartStore trait, JSON file and in-memory stores
//! ├── config.rs       ◄─── SessionConfig from STOREFRONT_* variables
//! └── error.rs        ◄─── StoreError, ApiError for the frontend
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Session Startup                                   │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: info, debug for storefront crates                        │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • SessionConfig::from_env()                                         │
//! │                                                                         │
//! │  3. Pick a Store ─────────────────────────────────────────────────────► │
//! │     • STOREFRONT_CART_PATH, else the platform data directory            │
//! │                                                                         │
//! │  4. Open the Session ─────────────────────────────────────────────────► │
//! │     • Saved cart replayed through the cart rules                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use storefront_core::{Currency, Money, ProductRef, ProductType};
//! use storefront_session::config::SessionConfig;
//! use storefront_session::session::CartSession;
//! use storefront_session::store::MemoryStore;
//!
//! let session = CartSession::open(&SessionConfig::default(), MemoryStore::new()).unwrap();
//! let course = ProductRef::new("c-1", "Course", ProductType::Course, Money::from_minor(10_000, Currency::Usd));
//! session.add_item(course, 1, None).unwrap();
//!
//! let charge = session.checkout().unwrap();
//! assert_eq!(charge.final_amount.minor(), 9800);
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod store;

use tracing_subscriber::EnvFilter;

pub use config::SessionConfig;
pub use error::{ApiError, ErrorCode, StoreError};
pub use session::{CartResponse, CartSession};
pub use store::{CartStore, JsonFileStore, MemoryStore};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,storefront=debug";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_session=trace` - Trace for the session crate only
/// - Default: `info,storefront=debug`
///
/// Returns `false` if a global subscriber was already installed, which makes
/// repeated calls (e.g. from several tests) harmless.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Opens a session with the configured file store.
///
/// ## Errors
/// `STORAGE_ERROR` when no cart location can be determined or the saved
/// cart cannot be read.
pub fn open_session(config: &SessionConfig) -> Result<CartSession<JsonFileStore>, ApiError> {
    let store = match &config.cart_path {
        Some(path) => JsonFileStore::new(path.clone()),
        None => JsonFileStore::at_default_location()?,
    };
    tracing::info!(path = ?store.path(), "Using cart file");

    CartSession::open(config, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{Currency, Money, ProductRef, ProductType};

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        assert!(!init_tracing());
    }

    #[test]
    fn test_open_session_with_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            cart_path: Some(dir.path().join("cart.json")),
            ..SessionConfig::default()
        };

        let session = open_session(&config).unwrap();
        let course = ProductRef::new(
            "c-1",
            "Course",
            ProductType::Course,
            Money::from_minor(4200, Currency::Usd),
        );
        session.add_item(course, 1, None).unwrap();
        drop(session);

        let reopened = open_session(&config).unwrap();
        assert_eq!(reopened.total().unwrap(), Money::from_minor(4200, Currency::Usd));
    }
}
