//! # Pay-What-You-Feel Pricing
//!
//! Checks a buyer-chosen price against the seller's range.
//!
//! ## Never Clamp
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Range: $5.00 ─────────────────────────────── $500.00                   │
//! │                                                                         │
//! │  proposed $2.00   → BelowMinimum { adjusted_to: $5.00 }                 │
//! │  proposed $75.00  → Accepted                                            │
//! │  proposed $900.00 → AboveMaximum { adjusted_to: $500.00 }               │
//! │  fixed-price item → NotApplicable                                       │
//! │                                                                         │
//! │  The clamp target travels with the result. Whether to apply it,        │
//! │  re-prompt, or refuse is the caller's decision.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PwyfConstraint;

/// Result of checking a proposed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceCheck {
    /// Within `[min, max]` inclusive.
    Accepted,
    /// Below the minimum.
    BelowMinimum {
        #[serde(rename = "adjustedTo")]
        adjusted_to: Money,
    },
    /// Above the maximum.
    AboveMaximum {
        #[serde(rename = "adjustedTo")]
        adjusted_to: Money,
    },
    /// The product has a fixed price.
    NotApplicable,
}

impl PriceCheck {
    /// Whether the proposed price may be used as-is.
    pub const fn is_accepted(&self) -> bool {
        matches!(self, PriceCheck::Accepted)
    }

    /// The nearest accepted price, for out-of-range results.
    pub const fn adjusted_to(&self) -> Option<Money> {
        match self {
            PriceCheck::BelowMinimum { adjusted_to } | PriceCheck::AboveMaximum { adjusted_to } => {
                Some(*adjusted_to)
            }
            PriceCheck::Accepted | PriceCheck::NotApplicable => None,
        }
    }
}

/// Validates a proposed price against an optional pay-what-you-feel range.
///
/// ## Errors
/// `CurrencyMismatch` when `proposed` is not in the range's currency.
///
/// ## Example
/// ```rust
/// use storefront_core::currency::Currency;
/// use storefront_core::money::Money;
/// use storefront_core::pricing::{validate, PriceCheck};
/// use storefront_core::types::PwyfConstraint;
///
/// let usd = |m| Money::from_minor(m, Currency::Usd);
/// let range = PwyfConstraint::new(usd(500), usd(50_000), None).unwrap();
///
/// assert_eq!(validate(Some(&range), &usd(7500)).unwrap(), PriceCheck::Accepted);
/// assert_eq!(
///     validate(Some(&range), &usd(200)).unwrap(),
///     PriceCheck::BelowMinimum { adjusted_to: usd(500) }
/// );
/// assert_eq!(validate(None, &usd(200)).unwrap(), PriceCheck::NotApplicable);
/// ```
pub fn validate(constraint: Option<&PwyfConstraint>, proposed: &Money) -> CoreResult<PriceCheck> {
    match constraint {
        Some(range) => range.check(proposed),
        None => Ok(PriceCheck::NotApplicable),
    }
}

impl PwyfConstraint {
    /// Checks a proposed price against this range.
    pub fn check(&self, proposed: &Money) -> CoreResult<PriceCheck> {
        Ok(match self.position(proposed)? {
            Ordering::Less => PriceCheck::BelowMinimum {
                adjusted_to: self.min_price(),
            },
            Ordering::Greater => PriceCheck::AboveMaximum {
                adjusted_to: self.max_price(),
            },
            Ordering::Equal => PriceCheck::Accepted,
        })
    }

    /// Like [`PwyfConstraint::check`], but out-of-range prices are an error
    /// carrying the whole range ("price must be between X and Y").
    pub fn ensure_within(&self, proposed: &Money) -> CoreResult<()> {
        if self.check(proposed)?.is_accepted() {
            Ok(())
        } else {
            Err(CoreError::PriceOutOfRange {
                min: self.min_price(),
                max: self.max_price(),
            })
        }
    }
}
