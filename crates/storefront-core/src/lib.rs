//! # storefront-core: Pure Checkout Logic for the Storefront
//!
//! This crate is the **heart** of checkout. It contains the cart, the
//! pay-what-you-feel (PWYF) price rules and the charge calculation as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Course page ──► PWYF slider ──► Cart drawer ──► Checkout     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 storefront-session                              │   │
//! │  │    CartSession, CartStore, SessionConfig, ApiError              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  money   │ │ pricing  │ │   cart   │ │    checkout      │  │   │
//! │  │   │ currency │ │  PWYF    │ │ conflict │ │ charge breakdown │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Payment gateway, catalog and rate feeds live outside this crate.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`currency`] - Supported currencies, formatting, exchange rates
//! - [`types`] - Product references, PWYF ranges, purchase classes
//! - [`pricing`] - Pay-what-you-feel price validator
//! - [`cart`] - Cart aggregate and the subscription/one-time conflict policy
//! - [`checkout`] - Charge breakdown for the payment gateway
//! - [`snapshot`] - Saved-cart wire format
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: File system, network and environment access are FORBIDDEN here
//! 3. **Integer Money**: All monetary values are minor units (i64) plus a currency
//! 4. **All or Nothing**: A cart operation either fully applies or changes nothing
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::cart::{AddOutcome, Cart};
//! use storefront_core::checkout::compute_default_charge;
//! use storefront_core::currency::Currency;
//! use storefront_core::money::Money;
//! use storefront_core::types::{ProductRef, ProductType, PwyfConstraint};
//!
//! let usd = |m| Money::from_minor(m, Currency::Usd);
//!
//! let course = ProductRef::new("course-1", "Guitar Foundations", ProductType::Course, usd(9700));
//! let workshop = ProductRef::new("pwyf-1", "Songwriting Workshop", ProductType::Course, usd(5000))
//!     .with_pwyf(PwyfConstraint::new(usd(500), usd(50_000), None).unwrap())
//!     .unwrap();
//! let membership = ProductRef::new("club", "Practice Club", ProductType::Membership, usd(2900));
//!
//! let mut cart = Cart::new(Currency::Usd);
//! cart.add_item(course, 1, None).unwrap();
//! cart.add_item(workshop, 1, Some(usd(7500))).unwrap();
//!
//! // Memberships check out separately
//! assert!(matches!(cart.add_item(membership, 1, None).unwrap(), AddOutcome::Conflict(_)));
//!
//! let charge = compute_default_charge(&cart).unwrap();
//! assert_eq!(charge.total_amount, usd(17_200));
//! assert_eq!(charge.final_amount, usd(16_856));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod currency;
pub mod error;
pub mod money;
pub mod pricing;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, Cart, CartConflict, CartItem, ConflictKind};
pub use checkout::{compute_charge, compute_default_charge, ChargeBreakdown};
pub use currency::{Currency, RateTable};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::PriceCheck;
pub use snapshot::CartLineSnapshot;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
