//! # Domain Types
//!
//! Core domain types used throughout the checkout engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductRef    │   │  ProductType    │   │ PurchaseClass   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │──►│  Course         │──►│  OneTime        │       │
//! │  │  name           │   │  Subscription   │   │  Subscription   │       │
//! │  │  price (Money)  │   │  Membership     │   └─────────────────┘       │
//! │  │  course_id?     │   │  OtherOneTime   │                             │
//! │  │  pwyf?  ────────┼─┐ └─────────────────┘                             │
//! │  └─────────────────┘ │                                                  │
//! │                      ▼                                                  │
//! │  ┌─────────────────────────┐   ┌─────────────────┐                     │
//! │  │    PwyfConstraint       │   │  DiscountRate   │                     │
//! │  │  min ≤ suggested ≤ max  │   │  bps (u32)      │                     │
//! │  └─────────────────────────┘   │  200 = 2%       │                     │
//! │                                └─────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::currency::Currency;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_discount_rate_bps, validate_price, validate_product_id, validate_product_name,
};

// =============================================================================
// Product Type
// =============================================================================

/// What kind of thing a product is.
///
/// Unrecognised type strings from the catalog (`"merch"`, `"ebook"`, ...)
/// deserialize as [`ProductType::OtherOneTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ProductType {
    /// A single course purchase.
    Course,
    /// Recurring subscription.
    Subscription,
    /// Recurring community membership.
    Membership,
    /// Any other one-off purchase (merch, tutoring session, ...).
    #[serde(other)]
    OtherOneTime,
}

impl ProductType {
    /// Billing class this type belongs to.
    pub const fn purchase_class(&self) -> PurchaseClass {
        match self {
            ProductType::Subscription | ProductType::Membership => PurchaseClass::Subscription,
            ProductType::Course | ProductType::OtherOneTime => PurchaseClass::OneTime,
        }
    }
}

// =============================================================================
// Purchase Class
// =============================================================================

/// Billing class of a product. A checkout holds only one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseClass {
    /// Recurring billing (`subscription`, `membership`).
    Subscription,
    /// Everything else.
    OneTime,
}

impl PurchaseClass {
    /// The class that cannot share a cart with this one.
    pub const fn opposite(&self) -> PurchaseClass {
        match self {
            PurchaseClass::Subscription => PurchaseClass::OneTime,
            PurchaseClass::OneTime => PurchaseClass::Subscription,
        }
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// Processor-fee discount represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 200 bps = 2% (the default fee the seller absorbs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Default processor discount: 2%.
    pub const DEFAULT: DiscountRate = DiscountRate(200);

    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a rate from a percentage such as `2.9`, rounding half up to
    /// whole basis points.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::types::DiscountRate;
    ///
    /// let rate = DiscountRate::from_percentage(Decimal::new(29, 1)).unwrap();
    /// assert_eq!(rate.bps(), 290);
    /// ```
    pub fn from_percentage(pct: Decimal) -> CoreResult<Self> {
        let bps = pct
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| {
                scaled
                    .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_u32()
            })
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "discount rate".to_string(),
                min: 0,
                max: 100,
            })?;
        validate_discount_rate_bps(bps)?;
        Ok(DiscountRate(bps))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage.
    pub fn percentage(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 2)
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::DEFAULT
    }
}

// =============================================================================
// Pay-What-You-Feel Constraint
// =============================================================================

/// Seller-defined price range for a pay-what-you-feel product.
///
/// ## Invariant
/// `min_price <= suggested_price <= max_price`, all in one currency.
/// Enforced at construction; there is no way to build a malformed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PwyfConstraint {
    min_price: Money,
    max_price: Money,
    suggested_price: Option<Money>,
}

impl PwyfConstraint {
    /// Builds a range, rejecting malformed catalog configuration.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    /// use storefront_core::types::PwyfConstraint;
    ///
    /// let usd = |m| Money::from_minor(m, Currency::Usd);
    /// assert!(PwyfConstraint::new(usd(500), usd(50_000), Some(usd(5000))).is_ok());
    /// assert!(PwyfConstraint::new(usd(50_000), usd(500), None).is_err());
    /// ```
    pub fn new(
        min_price: Money,
        max_price: Money,
        suggested_price: Option<Money>,
    ) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidConstraint {
            reason: reason.to_string(),
        };

        if min_price.currency() != max_price.currency()
            || suggested_price.is_some_and(|s| s.currency() != min_price.currency())
        {
            return Err(invalid("prices must share one currency"));
        }
        if min_price.is_negative() {
            return Err(invalid("minimum price cannot be negative"));
        }
        if min_price.minor() > max_price.minor() {
            return Err(invalid("minimum price exceeds maximum price"));
        }
        if let Some(suggested) = suggested_price {
            if suggested.minor() < min_price.minor() || suggested.minor() > max_price.minor() {
                return Err(invalid("suggested price is outside the range"));
            }
        }

        Ok(PwyfConstraint {
            min_price,
            max_price,
            suggested_price,
        })
    }

    /// Lowest accepted price.
    pub fn min_price(&self) -> Money {
        self.min_price
    }

    /// Highest accepted price.
    pub fn max_price(&self) -> Money {
        self.max_price
    }

    /// Price pre-filled for the buyer, if the seller set one.
    pub fn suggested_price(&self) -> Option<Money> {
        self.suggested_price
    }

    /// Currency of the range.
    pub fn currency(&self) -> Currency {
        self.min_price.currency()
    }

    /// Where `proposed` falls relative to the range.
    pub(crate) fn position(&self, proposed: &Money) -> CoreResult<Ordering> {
        if proposed.try_cmp(&self.min_price)? == Ordering::Less {
            Ok(Ordering::Less)
        } else if proposed.try_cmp(&self.max_price)? == Ordering::Greater {
            Ok(Ordering::Greater)
        } else {
            Ok(Ordering::Equal)
        }
    }
}

// =============================================================================
// Product Reference
// =============================================================================

/// Identifies a purchasable product as it is attached to a cart line.
///
/// Immutable: a changed catalog entry means removing and re-adding the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    product_id: String,
    name: String,
    product_type: ProductType,
    price: Money,
    course_id: Option<String>,
    pwyf: Option<PwyfConstraint>,
}

impl ProductRef {
    /// Creates a fixed-price product reference.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        product_type: ProductType,
        price: Money,
    ) -> Self {
        ProductRef {
            product_id: product_id.into(),
            name: name.into(),
            product_type,
            price,
            course_id: None,
            pwyf: None,
        }
    }

    /// Links the product to a course.
    pub fn with_course_id(mut self, course_id: impl Into<String>) -> Self {
        self.course_id = Some(course_id.into());
        self
    }

    /// Makes the product pay-what-you-feel.
    ///
    /// ## Errors
    /// `CurrencyMismatch` if the range is not in the base price's currency.
    pub fn with_pwyf(mut self, constraint: PwyfConstraint) -> CoreResult<Self> {
        if constraint.currency() != self.price.currency() {
            return Err(CoreError::CurrencyMismatch {
                expected: self.price.currency(),
                found: constraint.currency(),
            });
        }
        self.pwyf = Some(constraint);
        Ok(self)
    }

    /// Checks identifiers and base price.
    pub fn validate(&self) -> CoreResult<()> {
        validate_product_id(&self.product_id)?;
        validate_product_name(&self.name)?;
        validate_price(&self.price)?;
        Ok(())
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Catalog base price.
    pub fn price(&self) -> Money {
        self.price
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    /// Pay-what-you-feel range, if any.
    pub fn pwyf(&self) -> Option<&PwyfConstraint> {
        self.pwyf.as_ref()
    }

    pub fn is_pwyf(&self) -> bool {
        self.pwyf.is_some()
    }

    pub fn purchase_class(&self) -> PurchaseClass {
        self.product_type.purchase_class()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Usd)
    }

    #[test]
    fn test_purchase_classes() {
        assert_eq!(ProductType::Subscription.purchase_class(), PurchaseClass::Subscription);
        assert_eq!(ProductType::Membership.purchase_class(), PurchaseClass::Subscription);
        assert_eq!(ProductType::Course.purchase_class(), PurchaseClass::OneTime);
        assert_eq!(ProductType::OtherOneTime.purchase_class(), PurchaseClass::OneTime);
        assert_eq!(PurchaseClass::OneTime.opposite(), PurchaseClass::Subscription);
    }

    #[test]
    fn test_product_type_wire_names() {
        let parsed: ProductType = serde_json::from_str("\"membership\"").unwrap();
        assert_eq!(parsed, ProductType::Membership);

        let unknown: ProductType = serde_json::from_str("\"merch\"").unwrap();
        assert_eq!(unknown, ProductType::OtherOneTime);

        assert_eq!(
            serde_json::to_string(&ProductType::OtherOneTime).unwrap(),
            "\"other-one-time\""
        );
    }

    #[test]
    fn test_discount_rate() {
        assert_eq!(DiscountRate::default().bps(), 200);
        assert_eq!(DiscountRate::DEFAULT.percentage(), Decimal::new(2, 0));
        assert_eq!(
            DiscountRate::from_percentage(Decimal::new(25, 1)).unwrap(),
            DiscountRate::from_bps(250)
        );
        assert!(DiscountRate::from_percentage(Decimal::from(101)).is_err());
        assert!(DiscountRate::from_percentage(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_discount_rate_rounds_half_up() {
        // 2.905% = 290.5 bps → 291
        assert_eq!(
            DiscountRate::from_percentage(Decimal::new(2905, 3)).unwrap().bps(),
            291
        );
        // 2.915% = 291.5 bps → 292
        assert_eq!(
            DiscountRate::from_percentage(Decimal::new(2915, 3)).unwrap().bps(),
            292
        );
        assert_eq!(
            DiscountRate::from_percentage(Decimal::new(29049, 4)).unwrap().bps(),
            290
        );
    }

    #[test]
    fn test_constraint_rejects_malformed_ranges() {
        assert!(PwyfConstraint::new(usd(500), usd(50_000), Some(usd(7500))).is_ok());
        assert!(PwyfConstraint::new(usd(500), usd(500), None).is_ok());

        assert!(matches!(
            PwyfConstraint::new(usd(1000), usd(500), None),
            Err(ValidationError::InvalidConstraint { .. })
        ));
        assert!(PwyfConstraint::new(usd(500), usd(1000), Some(usd(2000))).is_err());
        assert!(PwyfConstraint::new(usd(-1), usd(1000), None).is_err());
        assert!(PwyfConstraint::new(
            usd(500),
            Money::from_minor(1000, Currency::Eur),
            None
        )
        .is_err());
    }

    #[test]
    fn test_product_ref_builders() {
        let constraint = PwyfConstraint::new(usd(500), usd(50_000), None).unwrap();
        let product = ProductRef::new("pwyf-1", "Songwriting Basics", ProductType::Course, usd(5000))
            .with_course_id("course-42")
            .with_pwyf(constraint)
            .unwrap();

        assert!(product.is_pwyf());
        assert_eq!(product.course_id(), Some("course-42"));
        assert_eq!(product.purchase_class(), PurchaseClass::OneTime);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_product_ref_pwyf_currency_must_match() {
        let constraint = PwyfConstraint::new(
            Money::from_minor(500, Currency::Eur),
            Money::from_minor(5000, Currency::Eur),
            None,
        )
        .unwrap();
        let result = ProductRef::new("p", "Product", ProductType::Course, usd(1000)).with_pwyf(constraint);
        assert!(matches!(result, Err(CoreError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_product_ref_validation() {
        assert!(ProductRef::new("", "Name", ProductType::Course, usd(100))
            .validate()
            .is_err());
        assert!(ProductRef::new("id", "  ", ProductType::Course, usd(100))
            .validate()
            .is_err());
        assert!(ProductRef::new("id", "Name", ProductType::Course, usd(-100))
            .validate()
            .is_err());
    }
}
