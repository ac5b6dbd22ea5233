//! # Cart Session
//!
//! Owns the buyer's cart for the lifetime of a visit and keeps the saved copy
//! in step with it.
//!
//! ## Thread Safety
//! The cart lives behind a `Mutex` because:
//! 1. Several frontend requests may touch the cart at once
//! 2. Only one request should modify the cart at a time
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Mutation                                     │
//! │                                                                         │
//! │  lock cart ──► clone ──► apply core operation to the clone              │
//! │                               │                                         │
//! │                 nothing changed? ──► return outcome (no save)           │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                    store.save(clone.to_snapshot())                      │
//! │                               │                                         │
//! │                   failed? ────┴──► Err(STORAGE_ERROR), cart untouched   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                    commit: *cart = clone                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conflict Resolution
//! ```text
//! add_item(membership) ──► AddOutcome::Conflict(adding_subscription)
//!                                 │
//!                      buyer confirms "replace cart"?
//!                         │                 │
//!                        yes                no
//!                         │                 │
//!                         ▼                 ▼
//!           clear_and_add(membership)   nothing happens
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use storefront_core::checkout::compute_charge;
use storefront_core::currency::{self, RateTable};
use storefront_core::{
    AddOutcome, Cart, CartConflict, CartItem, ChargeBreakdown, CoreResult, Currency, DiscountRate,
    Money, ProductRef, ProductType,
};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::error::{ApiError, StoreError};
use crate::store::CartStore;

// =============================================================================
// Response Views
// =============================================================================

/// One cart line as the cart drawer shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub product_type: ProductType,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    pub is_pwyf: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_price: Option<Money>,
}

impl CartLineView {
    fn from_item(item: &CartItem) -> CoreResult<Self> {
        let product = item.product();
        let range = product.pwyf();

        Ok(CartLineView {
            product_id: product.product_id().to_string(),
            name: product.name().to_string(),
            product_type: product.product_type(),
            quantity: item.quantity(),
            unit_price: item.effective_price(),
            line_total: item.line_total()?,
            is_pwyf: product.is_pwyf(),
            custom_price: item.custom_price(),
            min_price: range.map(|r| r.min_price()),
            max_price: range.map(|r| r.max_price()),
            suggested_price: range.and_then(|r| r.suggested_price()),
        })
    }
}

/// Cart totals summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
    pub formatted_total: String,
    pub has_subscription: bool,
    pub has_pwyf_product: bool,
}

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub cart_id: String,
    pub items: Vec<CartLineView>,
    pub totals: CartTotals,
}

impl CartResponse {
    /// Builds the response for a cart.
    ///
    /// ## Errors
    /// `CurrencyMismatch` if the cart cannot be totalled.
    pub fn from_cart(cart: &Cart) -> CoreResult<Self> {
        let items = cart
            .items()
            .iter()
            .map(CartLineView::from_item)
            .collect::<CoreResult<Vec<_>>>()?;
        let total = cart.total()?;

        Ok(CartResponse {
            cart_id: cart.id().to_string(),
            items,
            totals: CartTotals {
                item_count: cart.len(),
                total_quantity: cart.total_quantity(),
                total,
                formatted_total: total.to_string(),
                has_subscription: cart.has_subscription(),
                has_pwyf_product: cart.has_pwyf_product(),
            },
        })
    }
}

// =============================================================================
// Cart Session
// =============================================================================

/// Session-scoped cart with write-through persistence.
#[derive(Debug)]
pub struct CartSession<S> {
    cart: Mutex<Cart>,
    store: S,
    discount_rate: DiscountRate,
    rates: RateTable,
}

impl<S: CartStore> CartSession<S> {
    /// Opens a session, restoring the saved cart if there is one.
    ///
    /// A saved cart that is unreadable or breaks a cart rule is discarded
    /// with a warning and the session starts empty.
    ///
    /// ## Errors
    /// `STORAGE_ERROR` if the store itself cannot be read.
    pub fn open(config: &SessionConfig, store: S) -> Result<Self, ApiError> {
        let cart = match store.load() {
            Ok(Some(lines)) => match Cart::from_snapshot(config.currency, &lines) {
                Ok(cart) => {
                    debug!(cart_id = %cart.id(), lines = cart.len(), "Restored saved cart");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "Discarding saved cart");
                    Cart::new(config.currency)
                }
            },
            Ok(None) => Cart::new(config.currency),
            Err(StoreError::Serialization(e)) => {
                warn!(error = %e, "Discarding unreadable saved cart");
                Cart::new(config.currency)
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            cart_id = %cart.id(),
            currency = %config.currency,
            discount_bps = config.discount_rate.bps(),
            "Cart session opened"
        );

        Ok(CartSession {
            cart: Mutex::new(cart),
            store,
            discount_rate: config.discount_rate,
            rates: config.rates.clone(),
        })
    }

    /// Adds a product, or increases its quantity.
    ///
    /// `Conflict` and `PriceRejected` are returned as outcomes for the
    /// frontend to act on; the cart is unchanged and nothing is saved.
    pub fn add_item(
        &self,
        product: ProductRef,
        quantity: i64,
        custom_price: Option<Money>,
    ) -> Result<AddOutcome, ApiError> {
        let product_id = product.product_id().to_string();

        let outcome = self.apply(|cart| {
            let outcome = cart.add_item(product, quantity, custom_price)?;
            let changed = outcome.is_added();
            Ok((outcome, changed))
        })?;

        debug!(product_id = %product_id, quantity, ?outcome, "add_item");
        Ok(outcome)
    }

    /// Empties the cart and adds a product in one step.
    ///
    /// This is the "replace my cart" answer to a [`AddOutcome::Conflict`].
    /// If the add is refused for another reason, the old cart is kept.
    pub fn clear_and_add(
        &self,
        product: ProductRef,
        quantity: i64,
        custom_price: Option<Money>,
    ) -> Result<AddOutcome, ApiError> {
        let product_id = product.product_id().to_string();

        let outcome = self.apply(|cart| {
            cart.clear();
            let outcome = cart.add_item(product, quantity, custom_price)?;
            let changed = outcome.is_added();
            Ok((outcome, changed))
        })?;

        debug!(product_id = %product_id, quantity, ?outcome, "clear_and_add");
        Ok(outcome)
    }

    /// Removes a line. Returns whether one was removed.
    pub fn remove_item(&self, product_id: &str) -> Result<bool, ApiError> {
        let removed = self.apply(|cart| {
            let removed = cart.remove_item(product_id);
            Ok((removed, removed))
        })?;

        debug!(product_id, removed, "remove_item");
        Ok(removed)
    }

    /// Adjusts a line's quantity by `delta`; at zero or below the line goes.
    pub fn update_quantity(&self, product_id: &str, delta: i64) -> Result<(), ApiError> {
        self.apply(|cart| {
            let before = cart.item(product_id).map(CartItem::quantity);
            cart.update_quantity(product_id, delta)?;
            let after = cart.item(product_id).map(CartItem::quantity);
            Ok(((), before != after))
        })?;

        debug!(product_id, delta, "update_quantity");
        Ok(())
    }

    /// Sets a new pay-what-you-feel price. Returns whether it was applied.
    pub fn update_custom_price(&self, product_id: &str, new_price: Money) -> Result<bool, ApiError> {
        let applied = self.apply(|cart| {
            let applied = cart.update_custom_price(product_id, new_price);
            Ok((applied, applied))
        })?;

        debug!(product_id, price = %new_price, applied, "update_custom_price");
        Ok(applied)
    }

    /// Empties the cart.
    pub fn clear(&self) -> Result<(), ApiError> {
        self.apply(|cart| {
            cart.clear();
            Ok(((), true))
        })?;

        debug!("clear");
        Ok(())
    }

    /// Current cart total.
    pub fn total(&self) -> Result<Money, ApiError> {
        Ok(self.lock().total()?)
    }

    /// Current cart total expressed in another currency.
    ///
    /// Display only: the charge is always made in the cart currency.
    pub fn total_in(&self, currency: Currency) -> Result<Money, ApiError> {
        let total = self.total()?;
        Ok(self.rates.convert_money(&total, currency)?)
    }

    /// The conflict adding a product of this type would cause, if any.
    pub fn check_conflict(&self, product_type: ProductType) -> Option<CartConflict> {
        self.lock().check_conflict(product_type)
    }

    /// Lines and totals for the cart drawer.
    pub fn view(&self) -> Result<CartResponse, ApiError> {
        Ok(CartResponse::from_cart(&self.lock())?)
    }

    /// Charge breakdown for the payment gateway.
    ///
    /// ## Errors
    /// `EMPTY_CART` when there is nothing payable.
    pub fn checkout(&self) -> Result<ChargeBreakdown, ApiError> {
        let cart = self.lock();
        let charge = compute_charge(&cart, self.discount_rate)?;

        debug!(
            cart_id = %cart.id(),
            total = %charge.total_amount,
            discount = %charge.processor_discount,
            final_amount = %charge.final_amount,
            "checkout"
        );
        Ok(charge)
    }

    /// Records a successful payment: the cart is cleared and saved empty.
    ///
    /// Call only after the gateway confirmed `charge.final_amount`.
    pub fn complete_checkout(&self, charge: &ChargeBreakdown) -> Result<(), ApiError> {
        let cart_id = self.lock().id();

        self.apply(|cart| {
            cart.clear();
            Ok(((), true))
        })?;

        info!(
            cart_id = %cart_id,
            charged = %currency::format(charge.final_amount.minor(), charge.final_amount.currency()),
            "Checkout completed"
        );
        Ok(())
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use storefront_session::config::SessionConfig;
    /// use storefront_session::session::CartSession;
    /// use storefront_session::store::MemoryStore;
    ///
    /// let session = CartSession::open(&SessionConfig::default(), MemoryStore::new()).unwrap();
    /// assert!(session.with_cart(|cart| cart.is_empty()));
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Processor discount applied at checkout.
    pub fn discount_rate(&self) -> DiscountRate {
        self.discount_rate
    }

    /// The persistence collaborator.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` on a copy of the cart and commits it once saved.
    ///
    /// `f` returns its result and whether the cart changed.
    fn apply<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut Cart) -> CoreResult<(T, bool)>,
    {
        let mut cart = self.lock();
        let mut draft = cart.clone();

        let (result, changed) = f(&mut draft)?;
        if changed {
            self.store.save(&draft.to_snapshot())?;
            *cart = draft;
        }
        Ok(result)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use storefront_core::{ConflictKind, PriceCheck, PwyfConstraint};

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Usd)
    }

    fn course() -> ProductRef {
        ProductRef::new("course-1", "Guitar Foundations", ProductType::Course, usd(9700))
    }

    fn workshop() -> ProductRef {
        ProductRef::new("pwyf-1", "Songwriting Workshop", ProductType::Course, usd(5000))
            .with_pwyf(PwyfConstraint::new(usd(500), usd(50_000), Some(usd(5000))).unwrap())
            .unwrap()
    }

    fn membership() -> ProductRef {
        ProductRef::new("club", "Practice Club", ProductType::Membership, usd(2900))
    }

    fn open() -> CartSession<MemoryStore> {
        CartSession::open(&SessionConfig::default(), MemoryStore::new()).unwrap()
    }

    struct FailingStore;

    impl CartStore for FailingStore {
        fn load(&self) -> Result<Option<Vec<storefront_core::CartLineSnapshot>>, StoreError> {
            Ok(None)
        }

        fn save(&self, _: &[storefront_core::CartLineSnapshot]) -> Result<(), StoreError> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full").into())
        }
    }

    #[test]
    fn test_add_persists_and_restores() {
        let session = open();
        session.add_item(course(), 1, None).unwrap();
        session.add_item(workshop(), 1, Some(usd(7500))).unwrap();

        let saved = session.store().json().unwrap();
        let restored =
            CartSession::open(&SessionConfig::default(), MemoryStore::with_json(saved)).unwrap();

        assert_eq!(restored.total().unwrap(), usd(17_200));
        assert_eq!(
            restored.with_cart(|c| c.item("pwyf-1").and_then(CartItem::custom_price)),
            Some(usd(7500))
        );
    }

    #[test]
    fn test_conflict_then_replace_cart() {
        let session = open();
        session.add_item(course(), 1, None).unwrap();

        let outcome = session.add_item(membership(), 1, None).unwrap();
        match outcome {
            AddOutcome::Conflict(conflict) => {
                assert_eq!(conflict.kind, ConflictKind::AddingSubscription)
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(session.with_cart(Cart::len), 1);
        assert!(session.check_conflict(ProductType::Subscription).is_some());

        // Buyer confirmed: replace the cart
        let outcome = session.clear_and_add(membership(), 1, None).unwrap();
        assert!(outcome.is_added());
        assert!(session.with_cart(|c| c.has_subscription() && !c.has_one_time_product()));
        assert!(session.store().json().unwrap().contains("club"));
    }

    #[test]
    fn test_clear_and_add_keeps_cart_when_refused() {
        let session = open();
        session.add_item(course(), 1, None).unwrap();

        let outcome = session.clear_and_add(workshop(), 1, Some(usd(100))).unwrap();
        assert_eq!(
            outcome,
            AddOutcome::PriceRejected(PriceCheck::BelowMinimum { adjusted_to: usd(500) })
        );
        assert!(session.with_cart(|c| c.item("course-1").is_some()));
    }

    #[test]
    fn test_rejected_price_is_not_saved() {
        let session = open();
        let outcome = session.add_item(workshop(), 1, Some(usd(90_000))).unwrap();

        assert!(matches!(outcome, AddOutcome::PriceRejected(_)));
        assert!(session.store().json().is_none());
    }

    #[test]
    fn test_update_custom_price() {
        let session = open();
        session.add_item(workshop(), 1, Some(usd(7500))).unwrap();

        assert!(session.update_custom_price("pwyf-1", usd(15_000)).unwrap());
        assert_eq!(session.total().unwrap(), usd(15_000));

        assert!(!session.update_custom_price("pwyf-1", usd(200)).unwrap());
        assert_eq!(session.total().unwrap(), usd(15_000));
    }

    #[test]
    fn test_quantity_and_remove() {
        let session = open();
        session.add_item(course(), 2, None).unwrap();

        session.update_quantity("course-1", 3).unwrap();
        assert_eq!(session.with_cart(Cart::total_quantity), 5);

        let err = session.update_quantity("course-1", 995).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(session.with_cart(Cart::total_quantity), 5);

        session.update_quantity("course-1", -5).unwrap();
        assert!(session.with_cart(Cart::is_empty));

        session.add_item(course(), 1, None).unwrap();
        assert!(session.remove_item("course-1").unwrap());
        assert!(!session.remove_item("course-1").unwrap());
    }

    #[test]
    fn test_failed_save_leaves_cart_unchanged() {
        let session = CartSession::open(&SessionConfig::default(), FailingStore).unwrap();

        let err = session.add_item(course(), 1, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageError);
        assert!(session.with_cart(Cart::is_empty));
    }

    #[test]
    fn test_checkout_and_complete() {
        let session = open();
        session
            .add_item(
                ProductRef::new("c-1", "Course", ProductType::Course, usd(10_000)),
                1,
                None,
            )
            .unwrap();

        let charge = session.checkout().unwrap();
        assert_eq!(charge.processor_discount, usd(200));
        assert_eq!(charge.final_amount, usd(9800));

        session.complete_checkout(&charge).unwrap();
        assert!(session.with_cart(Cart::is_empty));
        assert_eq!(session.store().load().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn test_checkout_empty_cart() {
        let err = open().checkout().unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
    }

    #[test]
    fn test_configured_discount_rate() {
        let config = SessionConfig {
            discount_rate: DiscountRate::from_bps(290),
            ..SessionConfig::default()
        };
        let session = CartSession::open(&config, MemoryStore::new()).unwrap();
        session.add_item(course(), 1, None).unwrap();
        session.add_item(workshop(), 1, Some(usd(7500))).unwrap();

        let charge = session.checkout().unwrap();
        assert_eq!(charge.processor_discount, usd(499));
        assert_eq!(session.discount_rate().bps(), 290);
    }

    #[test]
    fn test_corrupt_saved_cart_is_discarded() {
        let store = MemoryStore::with_json("not json");
        let session = CartSession::open(&SessionConfig::default(), store).unwrap();
        assert!(session.with_cart(Cart::is_empty));

        let mixed = r#"[
            {"productId":"c","name":"Course","price":97,"currency":"USD","productType":"course","quantity":1},
            {"productId":"m","name":"Club","price":29,"currency":"USD","productType":"membership","quantity":1}
        ]"#;
        let session =
            CartSession::open(&SessionConfig::default(), MemoryStore::with_json(mixed)).unwrap();
        assert!(session.with_cart(Cart::is_empty));
    }

    #[test]
    fn test_saved_cart_in_other_currency_is_discarded() {
        let usd_session = open();
        usd_session.add_item(course(), 1, None).unwrap();
        let saved = usd_session.store().json().unwrap();

        let config = SessionConfig {
            currency: Currency::Eur,
            rates: RateTable::new(Currency::Eur),
            ..SessionConfig::default()
        };
        let session = CartSession::open(&config, MemoryStore::with_json(saved)).unwrap();

        assert!(session.with_cart(Cart::is_empty));
        assert_eq!(session.view().unwrap().totals.total, Money::zero(Currency::Eur));

        let eur_course = ProductRef::new(
            "course-eu",
            "Guitar Foundations",
            ProductType::Course,
            Money::from_minor(8900, Currency::Eur),
        );
        session.add_item(eur_course, 1, None).unwrap();
        assert_eq!(
            session.checkout().unwrap().final_amount,
            Money::from_minor(8722, Currency::Eur)
        );
    }

    #[test]
    fn test_total_in_other_currency() {
        let mut config = SessionConfig::default();
        config.rates.set_rate(Currency::Eur, Decimal::new(92, 2)).unwrap();
        let session = CartSession::open(&config, MemoryStore::new()).unwrap();
        session.add_item(course(), 1, None).unwrap();

        assert_eq!(
            session.total_in(Currency::Eur).unwrap(),
            Money::from_minor(8924, Currency::Eur)
        );

        let err = session.total_in(Currency::Gbp).unwrap_err();
        assert_eq!(err.code, ErrorCode::CurrencyError);
    }

    #[test]
    fn test_view() {
        let session = open();
        session.add_item(course(), 1, None).unwrap();
        session.add_item(workshop(), 1, Some(usd(7500))).unwrap();

        let view = session.view().unwrap();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[1].unit_price, usd(7500));
        assert_eq!(view.items[1].min_price, Some(usd(500)));
        assert_eq!(view.totals.formatted_total, "$172.00");
        assert!(view.totals.has_pwyf_product);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["totals"]["itemCount"], 2);
        assert!(json["items"][0].get("customPrice").is_none());
    }
}
