//! # Session Error Types
//!
//! Errors raised by the session layer, and the serialized form the frontend
//! receives.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Frontend                    Rust Session                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  addToCart(product, qty, customPrice)                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  CartSession method                                              │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Save failed? ─── StoreError::Io("...") ───────────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule broken? ─── CoreError::QuantityTooLarge ──► ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    // e.code = "VALIDATION_ERROR"                                       │
//! │    // e.message = "Quantity 1000 exceeds maximum allowed (999)"         │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::CoreError;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failure saving or loading the cart snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot failed.
    #[error("Cart storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be encoded or decoded.
    #[error("Cart snapshot is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

// =============================================================================
// API Error
// =============================================================================

/// Error returned from session operations.
///
/// ## Serialization
/// This is what the frontend receives when an operation fails:
/// ```json
/// {
///   "code": "CURRENCY_ERROR",
///   "message": "Unknown currency: JPY"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (e.code) {
///   case 'VALIDATION_ERROR':
///     showFieldError(e.message);
///     break;
///   case 'EMPTY_CART':
///     disableCheckoutButton();
///     break;
///   default:
///     showError('Something went wrong');
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Unsupported or mismatched currency
    CurrencyError,

    /// Checkout attempted with nothing payable
    EmptyCart,

    /// Cart operation failed
    CartError,

    /// Saved cart could not be read or written
    StorageError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CurrencyMismatch { .. } | CoreError::UnknownCurrency(_) => {
                ApiError::new(ErrorCode::CurrencyError, err.to_string())
            }
            CoreError::EmptyCart => ApiError::new(ErrorCode::EmptyCart, err.to_string()),
            CoreError::PriceOutOfRange { .. } | CoreError::QuantityTooLarge { .. } => {
                ApiError::validation(err.to_string())
            }
            CoreError::CartTooLarge { .. } | CoreError::SnapshotConflict { .. } => {
                ApiError::cart(err.to_string())
            }
            CoreError::Overflow(what) => {
                tracing::error!("Arithmetic overflow: {}", what);
                ApiError::internal("Amount is too large")
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Log the actual error but return a generic message
        tracing::error!("Cart storage failed: {}", err);
        ApiError::new(ErrorCode::StorageError, "Could not save your cart")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
