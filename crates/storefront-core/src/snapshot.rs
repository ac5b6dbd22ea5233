//! # Cart Snapshots
//!
//! The wire form of a saved cart: a JSON array of lines, as the web client
//! keeps it in local storage.
//!
//! ```json
//! [
//!   {
//!     "productId": "pwyf-1",
//!     "name": "Songwriting Workshop",
//!     "price": 50,
//!     "currency": "USD",
//!     "productType": "course",
//!     "isPwyf": true,
//!     "customPrice": 75,
//!     "minPrice": 5,
//!     "maxPrice": 500,
//!     "quantity": 1
//!   }
//! ]
//! ```
//!
//! Prices are major-unit JSON numbers. Loading a snapshot replays every line
//! through [`Cart::add_item`], so a tampered or stale snapshot cannot produce a
//! cart that breaks the cart invariants.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{AddOutcome, Cart, CartItem};
use crate::currency::Currency;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ProductRef, ProductType, PwyfConstraint};

/// One saved cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineSnapshot {
    pub product_id: String,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[ts(type = "number")]
    pub price: Decimal,
    pub currency: String,
    pub product_type: ProductType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    #[serde(default)]
    pub is_pwyf: bool,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub custom_price: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub min_price: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub max_price: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub suggested_price: Option<Decimal>,
    pub quantity: i64,
}

impl CartLineSnapshot {
    /// Captures a cart line.
    pub fn from_item(item: &CartItem) -> Self {
        let product = item.product();
        let range = product.pwyf();

        CartLineSnapshot {
            product_id: product.product_id().to_string(),
            name: product.name().to_string(),
            price: product.price().to_decimal(),
            currency: product.price().currency().code().to_string(),
            product_type: product.product_type(),
            course_id: product.course_id().map(str::to_string),
            is_pwyf: product.is_pwyf(),
            custom_price: item.custom_price().map(|p| p.to_decimal()),
            min_price: range.map(|r| r.min_price().to_decimal()),
            max_price: range.map(|r| r.max_price().to_decimal()),
            suggested_price: range
                .and_then(PwyfConstraint::suggested_price)
                .map(|p| p.to_decimal()),
            quantity: item.quantity(),
        }
    }

    /// Rebuilds the product reference this line was saved from.
    pub fn to_product(&self) -> CoreResult<ProductRef> {
        let currency: Currency = self.currency.parse()?;
        let price = Money::from_decimal(self.price, currency)?;

        let product = ProductRef::new(
            self.product_id.clone(),
            self.name.clone(),
            self.product_type,
            price,
        );
        let product = match &self.course_id {
            Some(course_id) => product.with_course_id(course_id.clone()),
            None => product,
        };

        if !self.is_pwyf {
            return Ok(product);
        }

        let min = required_price(self.min_price, "minPrice", currency)?;
        let max = required_price(self.max_price, "maxPrice", currency)?;
        let suggested = self
            .suggested_price
            .map(|p| Money::from_decimal(p, currency))
            .transpose()?;

        product.with_pwyf(PwyfConstraint::new(min, max, suggested)?)
    }

    /// The saved custom price in the line's currency.
    pub fn custom_price_money(&self) -> CoreResult<Option<Money>> {
        let currency: Currency = self.currency.parse()?;
        self.custom_price
            .map(|p| Money::from_decimal(p, currency))
            .transpose()
    }
}

fn required_price(value: Option<Decimal>, field: &str, currency: Currency) -> CoreResult<Money> {
    let value = value.ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })?;
    Money::from_decimal(value, currency)
}

impl Cart {
    /// Captures every line, in order.
    pub fn to_snapshot(&self) -> Vec<CartLineSnapshot> {
        self.items().iter().map(CartLineSnapshot::from_item).collect()
    }

    /// Rebuilds a cart from saved lines.
    ///
    /// ## Errors
    /// The first line that would violate a cart rule fails the whole load:
    /// - `UnknownCurrency` / `Validation` for unreadable lines
    /// - `CurrencyMismatch` for a line priced in another currency than `currency`
    /// - `PriceOutOfRange` for a custom price outside the saved range
    /// - `SnapshotConflict` when subscriptions and one-time products are mixed
    pub fn from_snapshot(currency: Currency, lines: &[CartLineSnapshot]) -> CoreResult<Cart> {
        let mut cart = Cart::new(currency);

        for line in lines {
            let product = line.to_product()?;
            Money::zero(currency).ensure_same_currency(&product.price())?;
            let custom_price = line.custom_price_money()?;

            if let (Some(range), Some(price)) = (product.pwyf(), custom_price.as_ref()) {
                range.ensure_within(price)?;
            }

            match cart.add_item(product, line.quantity, custom_price)? {
                AddOutcome::Added => {}
                AddOutcome::Conflict(_) => {
                    return Err(CoreError::SnapshotConflict {
                        product_id: line.product_id.clone(),
                    });
                }
                AddOutcome::PriceRejected(_) => {
                    return Err(ValidationError::InvalidFormat {
                        field: "customPrice".to_string(),
                        reason: format!("{} is not pay-what-you-feel", line.product_id),
                    }
                    .into());
                }
            }
        }

        Ok(cart)
    }
}

/// Serializes saved lines to JSON.
pub fn to_json(lines: &[CartLineSnapshot]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(lines)
}

/// Parses saved lines from JSON.
pub fn from_json(json: &str) -> serde_json::Result<Vec<CartLineSnapshot>> {
    serde_json::from_str(json)
}
