//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A pay-what-you-feel price of 19.99 × 3 in floats:                      │
//! │    59.97000000000001 → charge disagrees with the cart display          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + currency tag                       │
//! │    1999 cents × 3 = 5997 cents, always                                  │
//! │    USD + EUR is refused instead of silently added                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::currency::Currency;
//! use storefront_core::money::Money;
//!
//! let price = Money::from_minor(9700, Currency::Usd); // $97.00
//! let donation = Money::from_minor(7500, Currency::Usd); // $75.00
//!
//! let total = price.checked_add(&donation).unwrap();
//! assert_eq!(total.minor(), 17_200);
//! assert_eq!(total.to_string(), "$172.00");
//! ```

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::{self, Currency};
use crate::error::{CoreError, CoreResult, ValidationError};

/// Decimal places every supported currency rounds to.
pub const MINOR_DIGITS: u32 = 2;

/// Rounds a decimal amount to minor-unit precision, half up.
///
/// Amounts in the engine are non-negative, where "half away from zero" and
/// "half up" agree.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use storefront_core::money::round;
///
/// assert_eq!(round(Decimal::new(2345, 3)), Decimal::new(235, 2)); // 2.345 → 2.35
/// assert_eq!(round(Decimal::new(2344, 3)), Decimal::new(234, 2)); // 2.344 → 2.34
/// ```
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit, tagged with its currency.
///
/// ## Design Decisions
/// - **i64 minor units**: exact arithmetic, no float drift
/// - **Currency tag**: arithmetic across currencies is an error, never a guess
/// - **No `Add`/`Sub` operators**: combining amounts can fail, so the API
///   only exposes `checked_*` methods returning [`CoreResult`]
///
/// ## Where Money Flows
/// ```text
/// ProductRef.price ─┬─► CartItem.effective_price ──► line total
///                   │
/// custom PWYF price ┘
///
/// Cart.total ──► processor discount ──► ChargeBreakdown.final_amount
///                                            │
///                                            ▼
///                                   payment gateway handoff
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_minor(1099, Currency::Usd); // $10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Creates a Money value from a major-unit decimal, rounding half up.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    ///
    /// let price = Money::from_decimal(Decimal::new(10995, 3), Currency::Usd).unwrap();
    /// assert_eq!(price.minor(), 1100); // 10.995 → 11.00
    /// ```
    pub fn from_decimal(amount: Decimal, currency: Currency) -> CoreResult<Self> {
        let scaled = round(amount)
            .checked_mul(Decimal::from(10_i64.pow(currency.minor_units())))
            .ok_or(CoreError::Overflow("amount conversion"))?;

        let minor = scaled.to_i64().ok_or_else(|| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: format!("{amount} is outside the supported range"),
        })?;

        Ok(Money { minor, currency })
    }

    /// Returns zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money { minor: 0, currency }
    }

    /// Returns the value in minor units (cents).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the amount as a major-unit decimal (e.g. `10.99`).
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.minor_units())
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Fails with `CurrencyMismatch` unless `other` shares this currency.
    pub fn ensure_same_currency(&self, other: &Money) -> CoreResult<()> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(CoreError::CurrencyMismatch {
                expected: self.currency,
                found: other.currency,
            })
        }
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(&self, other: &Money) -> CoreResult<Money> {
        self.ensure_same_currency(other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(CoreError::Overflow("addition"))?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Subtracts an amount of the same currency.
    pub fn checked_sub(&self, other: &Money) -> CoreResult<Money> {
        self.ensure_same_currency(other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or(CoreError::Overflow("subtraction"))?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Orders two amounts of the same currency.
    pub fn try_cmp(&self, other: &Money) -> CoreResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.minor.cmp(&other.minor))
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299, Currency::Usd); // $2.99
    /// let line_total = unit_price.multiply_quantity(3).unwrap();
    /// assert_eq!(line_total.minor(), 897); // $8.97
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        let minor = self
            .minor
            .checked_mul(qty)
            .ok_or(CoreError::Overflow("line total"))?;
        Ok(Money::from_minor(minor, self.currency))
    }

    /// Returns `bps` basis points of this amount, rounded half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    ///
    /// let total = Money::from_minor(10_000, Currency::Usd); // $100.00
    /// assert_eq!(total.percentage(200).unwrap().minor(), 200); // 2% = $2.00
    /// ```
    pub fn percentage(&self, bps: u32) -> CoreResult<Money> {
        let part = (i128::from(self.minor) * i128::from(bps) + 5000) / 10_000;
        let minor = i64::try_from(part).map_err(|_| CoreError::Overflow("percentage"))?;
        Ok(Money::from_minor(minor, self.currency))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the currency's formatting convention (`$1,234.56`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&currency::format(self.minor, self.currency))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
