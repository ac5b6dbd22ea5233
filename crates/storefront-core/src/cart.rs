//! # Cart Aggregate
//!
//! The buyer's cart: ordered lines, one per product, plus the conflict policy
//! that keeps subscriptions and one-time purchases in separate checkouts.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add_item(product, qty, custom?)                                        │
//! │     │                                                                   │
//! │     ├── qty outside 1..=999? ─────────────► Err(Validation)             │
//! │     ├── opposite purchase class in cart? ─► Ok(Conflict)   (no change) │
//! │     ├── custom price not Accepted? ───────► Ok(PriceRejected) (no chg) │
//! │     ├── product already in cart? ─────────► qty += n, custom replaced  │
//! │     └── otherwise ────────────────────────► push new line              │
//! │                                                                         │
//! │  update_custom_price(id, price) ── Accepted? ─► apply, true            │
//! │                                  └ otherwise ─► untouched, false       │
//! │                                                                         │
//! │  update_quantity(id, delta) ── result <= 0 ─► line removed             │
//! │                                                                         │
//! │  NOTE: every call either fully applies or leaves the cart unchanged.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conflict Policy
//! | existing            | incoming            | result                |
//! |---------------------|---------------------|-----------------------|
//! | empty               | any                 | no conflict           |
//! | subscription-class  | subscription-class  | no conflict           |
//! | subscription-class  | one-time-class      | `adding_onetime`      |
//! | one-time-class      | one-time-class      | no conflict           |
//! | one-time-class      | subscription-class  | `adding_subscription` |
//!
//! The engine only reports the conflict. Asking the buyer, clearing the cart
//! and retrying the add is the caller's job.

use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use crate::currency::Currency;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{self, PriceCheck};
use crate::types::{ProductRef, ProductType, PurchaseClass};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Add Outcome
// =============================================================================

/// Which way a conflicting add was going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum ConflictKind {
    /// A one-time product offered to a cart holding subscriptions.
    #[serde(rename = "adding_onetime")]
    AddingOneTime,
    /// A subscription offered to a cart holding one-time products.
    #[serde(rename = "adding_subscription")]
    AddingSubscription,
}

/// Details of a refused add, for the confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartConflict {
    pub kind: ConflictKind,
    pub incoming: PurchaseClass,
    pub existing: PurchaseClass,
}

impl CartConflict {
    fn incoming(incoming: PurchaseClass) -> Self {
        let kind = match incoming {
            PurchaseClass::OneTime => ConflictKind::AddingOneTime,
            PurchaseClass::Subscription => ConflictKind::AddingSubscription,
        };
        CartConflict {
            kind,
            incoming,
            existing: incoming.opposite(),
        }
    }
}

/// Result of [`Cart::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AddOutcome {
    /// The line was added or its quantity increased.
    Added,
    /// The cart holds the other purchase class; nothing changed.
    Conflict(CartConflict),
    /// The custom price was not accepted; nothing changed.
    PriceRejected(PriceCheck),
}

impl AddOutcome {
    /// Whether the cart changed.
    pub const fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart.
///
/// ## Design Notes
/// - `product`: frozen copy of the catalog entry at time of adding. If the
///   seller edits the product afterwards, the cart keeps what the buyer saw.
/// - `custom_price`: only ever set on pay-what-you-feel products, and only
///   to a value the range accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    product: ProductRef,
    quantity: i64,
    custom_price: Option<Money>,
    #[ts(as = "String")]
    added_at: DateTime<Utc>,
}

impl CartItem {
    fn new(product: ProductRef, quantity: i64, custom_price: Option<Money>) -> Self {
        CartItem {
            product,
            quantity,
            custom_price,
            added_at: Utc::now(),
        }
    }

    pub fn product(&self) -> &ProductRef {
        &self.product
    }

    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// The buyer's chosen price, if they overrode the base price.
    pub fn custom_price(&self) -> Option<Money> {
        self.custom_price
    }

    /// Price actually charged per unit.
    ///
    /// The custom price when the product is pay-what-you-feel and one was
    /// chosen, otherwise the catalog price.
    pub fn effective_price(&self) -> Money {
        match self.custom_price {
            Some(price) if self.product.is_pwyf() => price,
            _ => self.product.price(),
        }
    }

    /// Effective price × quantity.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.effective_price().multiply_quantity(self.quantity)
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart for one buyer session.
///
/// ## Invariants
/// - Lines are unique by `product_id` (re-adding increases quantity)
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
/// - Never both a subscription-class and a one-time-class line
/// - Every custom price lies inside its product's range
#[derive(Debug, Clone)]
pub struct Cart {
    id: Uuid,
    currency: Currency,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart priced in `currency`.
    pub fn new(currency: Currency) -> Self {
        Cart {
            id: Uuid::new_v4(),
            currency,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - Conflicting purchase class: returns `Conflict`, cart unchanged
    /// - Custom price the range does not accept (or any custom price on a
    ///   fixed-price product): returns `PriceRejected`, cart unchanged
    /// - Product already in cart: quantity increases; a supplied custom
    ///   price replaces the previous one, an omitted one keeps it
    ///
    /// ## Errors
    /// - `Validation` for a quantity outside `1..=999` or a malformed product
    /// - `QuantityTooLarge` if the merged quantity would exceed 999
    /// - `CartTooLarge` when a new line would exceed 100 lines
    /// - `CurrencyMismatch` if the custom price's currency differs from the
    ///   product's range
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::cart::Cart;
    /// use storefront_core::currency::Currency;
    /// use storefront_core::money::Money;
    /// use storefront_core::types::{ProductRef, ProductType, PwyfConstraint};
    ///
    /// let usd = |m| Money::from_minor(m, Currency::Usd);
    /// let product = ProductRef::new("pwyf-1", "Zine", ProductType::OtherOneTime, usd(5000))
    ///     .with_pwyf(PwyfConstraint::new(usd(500), usd(50_000), None).unwrap())
    ///     .unwrap();
    ///
    /// let mut cart = Cart::new(Currency::Usd);
    /// assert!(cart.add_item(product, 1, Some(usd(7500))).unwrap().is_added());
    /// assert_eq!(cart.total().unwrap(), usd(7500));
    /// ```
    pub fn add_item(
        &mut self,
        product: ProductRef,
        quantity: i64,
        custom_price: Option<Money>,
    ) -> CoreResult<AddOutcome> {
        validate_quantity(quantity)?;
        product.validate()?;

        if let Some(conflict) = self.check_conflict(product.product_type()) {
            return Ok(AddOutcome::Conflict(conflict));
        }

        let position = self.position(product.product_id());

        if let Some(price) = custom_price.as_ref() {
            // A re-add is judged against the range frozen on the existing line.
            let line_product = position
                .and_then(|i| self.items.get(i))
                .map_or(&product, |item| &item.product);
            let check = pricing::validate(line_product.pwyf(), price)?;
            if !check.is_accepted() {
                return Ok(AddOutcome::PriceRejected(check));
            }
        }

        if let Some(item) = position.and_then(|i| self.items.get_mut(i)) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            if custom_price.is_some() {
                item.custom_price = custom_price;
            }
            return Ok(AddOutcome::Added);
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem::new(product, quantity, custom_price));
        Ok(AddOutcome::Added)
    }

    /// Removes a line by product ID. Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id() != product_id);
        self.items.len() != initial_len
    }

    /// Adjusts a line's quantity by `delta`.
    ///
    /// ## Behavior
    /// - Resulting quantity <= 0: the line is removed
    /// - Resulting quantity > 999: `QuantityTooLarge`, nothing changes
    /// - Product not in cart: no-op
    pub fn update_quantity(&mut self, product_id: &str, delta: i64) -> CoreResult<()> {
        let Some(index) = self.position(product_id) else {
            return Ok(());
        };

        let new_qty = self.items[index].quantity.saturating_add(delta);
        if new_qty > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if new_qty <= 0 {
            self.items.remove(index);
        } else {
            self.items[index].quantity = new_qty;
        }
        Ok(())
    }

    /// Sets a new pay-what-you-feel price on a line.
    ///
    /// Applies the price and returns `true` only when the range accepts it.
    /// Anything else (out of range, fixed-price product, other currency,
    /// product not in cart) returns `false` and keeps the previous price.
    /// Out-of-range prices are never clamped.
    pub fn update_custom_price(&mut self, product_id: &str, new_price: Money) -> bool {
        let Some(item) = self.items.iter_mut().find(|i| i.product_id() == product_id) else {
            return false;
        };

        match pricing::validate(item.product.pwyf(), &new_price) {
            Ok(PriceCheck::Accepted) => {
                item.custom_price = Some(new_price);
                true
            }
            _ => false,
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Sum of effective price × quantity across all lines.
    ///
    /// An empty cart totals zero in the cart currency.
    ///
    /// ## Errors
    /// `CurrencyMismatch` if any line is priced in another currency.
    pub fn total(&self) -> CoreResult<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(self.currency), |acc, item| {
                acc.checked_add(&item.line_total()?)
            })
    }

    /// Reports the conflict adding a product of this type would cause.
    ///
    /// Lets callers pre-flight an add (e.g. to grey out a button) without
    /// touching the cart.
    pub fn check_conflict(&self, product_type: ProductType) -> Option<CartConflict> {
        let incoming = product_type.purchase_class();
        self.items
            .iter()
            .any(|i| i.product.purchase_class() == incoming.opposite())
            .then(|| CartConflict::incoming(incoming))
    }

    /// Whether any line is pay-what-you-feel.
    pub fn has_pwyf_product(&self) -> bool {
        self.items.iter().any(|i| i.product.is_pwyf())
    }

    /// Whether any line is a subscription or membership.
    pub fn has_subscription(&self) -> bool {
        self.has_class(PurchaseClass::Subscription)
    }

    /// Whether any line is a one-time purchase.
    pub fn has_one_time_product(&self) -> bool {
        self.has_class(PurchaseClass::OneTime)
    }

    fn has_class(&self, class: PurchaseClass) -> bool {
        self.items.iter().any(|i| i.product.purchase_class() == class)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.product_id() == product_id)
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Looks up a line by product ID.
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Returns the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// When the cart was created or last cleared.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
