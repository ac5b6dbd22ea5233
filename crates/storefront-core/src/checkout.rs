//! # Checkout Amount Calculator
//!
//! Derives what the buyer is charged from the cart contents.
//!
//! ## Charge Breakdown
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart total                              $100.00                        │
//! │  Processor discount (2%)                 - $2.00   ← fee the seller     │
//! │  ──────────────────────────────────────────────      absorbs, shown     │
//! │  Final amount                             $98.00     for transparency   │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                               payment gateway (external)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::DiscountRate;
use crate::validation::validate_discount_rate_bps;

/// What the buyer pays, and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBreakdown {
    /// Sum of effective price × quantity.
    pub total_amount: Money,
    /// `total_amount × discount_rate`, rounded half up.
    pub processor_discount: Money,
    /// `total_amount − processor_discount`; the amount handed to the gateway.
    pub final_amount: Money,
    /// Rate the discount was computed with.
    pub discount_rate: DiscountRate,
}

/// Computes the charge for a cart.
///
/// Pure: the same cart and rate always yield the same breakdown, and the
/// cart is never modified.
///
/// ## Errors
/// - `EmptyCart` when there is nothing payable (no lines, or a zero total)
/// - `CurrencyMismatch` from [`Cart::total`]
/// - `Validation` for a rate above 100%
///
/// ## Example
/// ```rust
/// use storefront_core::cart::Cart;
/// use storefront_core::checkout::compute_charge;
/// use storefront_core::currency::Currency;
/// use storefront_core::money::Money;
/// use storefront_core::types::{DiscountRate, ProductRef, ProductType};
///
/// let mut cart = Cart::new(Currency::Usd);
/// let course = ProductRef::new("c-1", "Course", ProductType::Course, Money::from_minor(10_000, Currency::Usd));
/// cart.add_item(course, 1, None).unwrap();
///
/// let charge = compute_charge(&cart, DiscountRate::DEFAULT).unwrap();
/// assert_eq!(charge.processor_discount.minor(), 200);
/// assert_eq!(charge.final_amount.minor(), 9800);
/// ```
pub fn compute_charge(cart: &Cart, discount_rate: DiscountRate) -> CoreResult<ChargeBreakdown> {
    validate_discount_rate_bps(discount_rate.bps())?;

    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let total_amount = cart.total()?;
    if total_amount.is_zero() {
        return Err(CoreError::EmptyCart);
    }

    let processor_discount = total_amount.percentage(discount_rate.bps())?;
    let final_amount = total_amount.checked_sub(&processor_discount)?;

    Ok(ChargeBreakdown {
        total_amount,
        processor_discount,
        final_amount,
        discount_rate,
    })
}

/// [`compute_charge`] with [`DiscountRate::DEFAULT`] (2%).
pub fn compute_default_charge(cart: &Cart) -> CoreResult<ChargeBreakdown> {
    compute_charge(cart, DiscountRate::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::types::{ProductRef, ProductType, PwyfConstraint};

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Usd)
    }

    fn cart_with(price: i64) -> Cart {
        let mut cart = Cart::new(Currency::Usd);
        let product = ProductRef::new("c-1", "Course", ProductType::Course, usd(price));
        cart.add_item(product, 1, None).unwrap();
        cart
    }

    #[test]
    fn test_two_percent_of_one_hundred() {
        let charge = compute_charge(&cart_with(10_000), DiscountRate::from_bps(200)).unwrap();

        assert_eq!(charge.total_amount, usd(10_000));
        assert_eq!(charge.processor_discount, usd(200));
        assert_eq!(charge.final_amount, usd(9800));
        assert_eq!(charge.discount_rate.bps(), 200);
    }

    #[test]
    fn test_discount_rounds_to_cents() {
        // $172.00 at 2.9% = $4.988 → $4.99
        let charge = compute_charge(&cart_with(17_200), DiscountRate::from_bps(290)).unwrap();
        assert_eq!(charge.processor_discount, usd(499));
        assert_eq!(charge.final_amount, usd(16_701));

        // $10.25 at 2% = $0.205 → $0.21 (half up)
        let charge = compute_default_charge(&cart_with(1025)).unwrap();
        assert_eq!(charge.processor_discount, usd(21));
        assert_eq!(charge.final_amount, usd(1004));
    }

    #[test]
    fn test_zero_rate() {
        let charge = compute_charge(&cart_with(5000), DiscountRate::zero()).unwrap();
        assert_eq!(charge.processor_discount, usd(0));
        assert_eq!(charge.final_amount, usd(5000));
    }

    #[test]
    fn test_pwyf_cart_charge() {
        let mut cart = cart_with(9700);
        let range = PwyfConstraint::new(usd(500), usd(50_000), None).unwrap();
        let pwyf = ProductRef::new("p-1", "Workshop", ProductType::Course, usd(5000))
            .with_pwyf(range)
            .unwrap();
        cart.add_item(pwyf, 1, Some(usd(7500))).unwrap();

        let charge = compute_default_charge(&cart).unwrap();
        assert_eq!(charge.total_amount, usd(17_200));
        assert_eq!(charge.processor_discount, usd(344));
        assert_eq!(charge.final_amount, usd(16_856));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::new(Currency::Usd);
        assert!(matches!(
            compute_default_charge(&cart),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_zero_total_is_empty() {
        let cart = cart_with(0);
        assert!(matches!(
            compute_default_charge(&cart),
            Err(CoreError::EmptyCart)
        ));
    }

    #[test]
    fn test_rate_above_one_hundred_percent() {
        let result = compute_charge(&cart_with(1000), DiscountRate::from_bps(10_001));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_deterministic_and_pure() {
        let cart = cart_with(12_345);
        let first = compute_default_charge(&cart).unwrap();
        let second = compute_default_charge(&cart).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total().unwrap(), usd(12_345));
    }

    #[test]
    fn test_wire_format() {
        let charge = compute_default_charge(&cart_with(10_000)).unwrap();
        let json = serde_json::to_value(charge).unwrap();
        assert_eq!(json["finalAmount"]["minor"], 9800);
        assert_eq!(json["discountRate"], 200);
    }
}
