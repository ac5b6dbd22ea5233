//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Pricing, currency and cart failures            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-session errors (separate crate)                            │
//! │  ├── StoreError       - Saving/loading the cart snapshot               │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Frontend               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A cart conflict (subscription vs one-time) and a rejected pay-what-you-feel
//! price are ordinary outcomes the buyer resolves. They are returned as
//! [`AddOutcome`](crate::cart::AddOutcome) values, never as `Err`.

use thiserror::Error;

use crate::currency::Currency;
use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every mutating cart operation that returns one of these has left the cart
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two amounts in different currencies were combined.
    ///
    /// ## When This Occurs
    /// - A cart line priced in EUR inside a USD cart
    /// - A custom price proposed in a different currency than the product
    ///
    /// Mixed-currency carts are a pricing configuration problem, so this is
    /// propagated rather than silently converted.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch { expected: Currency, found: Currency },

    /// Currency code is not supported or not in the rate table.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Checkout was requested for a cart with nothing payable.
    #[error("Cart is empty")]
    EmptyCart,

    /// A pay-what-you-feel price falls outside the seller's range.
    #[error("Price must be between {min} and {max}")]
    PriceOutOfRange { min: Money, max: Money },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A saved cart mixes subscription and one-time products.
    #[error("Saved cart mixes subscription and one-time products (at {product_id})")]
    SnapshotConflict { product_id: String },

    /// An amount left the representable range.
    #[error("Arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unparseable number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A pay-what-you-feel range is malformed.
    ///
    /// This is a catalog configuration error: the seller set min > max or a
    /// suggested price outside the range.
    #[error("Invalid pay-what-you-feel range: {reason}")]
    InvalidConstraint { reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
