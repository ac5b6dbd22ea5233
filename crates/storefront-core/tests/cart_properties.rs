//! Property-based tests for cart and checkout guarantees.
//!
//! For any prices, ranges, quantities and add sequences:
//! 1. A custom price never leaves its pay-what-you-feel range
//! 2. The cart total is the sum of effective price × quantity
//! 3. An add that conflicts with the cart's purchase class changes nothing
//! 4. The charge breakdown is deterministic and adds up to the total

use proptest::prelude::*;

use storefront_core::{
    compute_charge, AddOutcome, Cart, CoreError, Currency, DiscountRate, Money, ProductRef,
    ProductType, PwyfConstraint,
};

// =============================================================================
// Strategy helpers
// =============================================================================

fn usd(minor: i64) -> Money {
    Money::from_minor(minor, Currency::Usd)
}

/// One random add: which product, at what price, how many.
#[derive(Debug, Clone)]
struct LineSpec {
    id: u8,
    price: i64,
    quantity: i64,
    pwyf: bool,
}

impl LineSpec {
    /// A one-time product. Pay-what-you-feel lines accept `0..=2 × price`.
    fn product(&self) -> ProductRef {
        let product = ProductRef::new(
            format!("p-{}", self.id),
            format!("Product {}", self.id),
            ProductType::Course,
            usd(self.price),
        );
        if self.pwyf {
            let range = PwyfConstraint::new(usd(0), usd(self.price * 2), None).unwrap();
            product.with_pwyf(range).unwrap()
        } else {
            product
        }
    }

    fn custom_price(&self) -> Option<Money> {
        self.pwyf.then(|| usd(self.price / 2))
    }
}

/// Up to 8 distinct product ids so re-adds happen often.
fn line_strategy() -> impl Strategy<Value = LineSpec> {
    (0u8..8, 0i64..=1_000_000, 1i64..=20, any::<bool>()).prop_map(|(id, price, quantity, pwyf)| {
        LineSpec {
            id,
            price,
            quantity,
            pwyf,
        }
    })
}

/// A `(min, max)` range with `min <= max`.
fn range_strategy() -> impl Strategy<Value = (i64, i64)> {
    (0i64..=100_000, 0i64..=100_000).prop_map(|(min, span)| (min, min + span))
}

fn build_cart(lines: &[LineSpec]) -> Cart {
    let mut cart = Cart::new(Currency::Usd);
    for line in lines {
        cart.add_item(line.product(), line.quantity, line.custom_price())
            .unwrap();
    }
    cart
}

// =============================================================================
// Custom prices stay in range
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_custom_price_never_leaves_range(
        (min, max) in range_strategy(),
        proposals in prop::collection::vec(0i64..=300_000, 1..20),
    ) {
        let range = PwyfConstraint::new(usd(min), usd(max), None).unwrap();
        let product = ProductRef::new("pwyf", "Workshop", ProductType::Course, usd(min))
            .with_pwyf(range)
            .unwrap();

        let mut cart = Cart::new(Currency::Usd);
        prop_assert!(cart.add_item(product, 1, Some(usd(min))).unwrap().is_added());

        for proposed in proposals {
            let before = cart.item("pwyf").unwrap().custom_price();
            let applied = cart.update_custom_price("pwyf", usd(proposed));
            let after = cart.item("pwyf").unwrap().custom_price().unwrap();

            prop_assert_eq!(applied, (min..=max).contains(&proposed));
            prop_assert!(after.minor() >= min && after.minor() <= max);
            if !applied {
                prop_assert_eq!(Some(after), before);
            }
        }
    }
}

// =============================================================================
// Total is the sum of the lines
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_total_is_sum_of_effective_prices(
        lines in prop::collection::vec(line_strategy(), 0..30),
    ) {
        let mut cart = Cart::new(Currency::Usd);
        let mut added_quantity = 0;

        for line in &lines {
            let outcome = cart
                .add_item(line.product(), line.quantity, line.custom_price())
                .unwrap();
            if outcome.is_added() {
                added_quantity += line.quantity;
            }
        }

        let expected: i64 = cart
            .items()
            .iter()
            .map(|item| item.effective_price().minor() * item.quantity())
            .sum();

        prop_assert_eq!(cart.total().unwrap(), usd(expected));
        prop_assert_eq!(cart.total_quantity(), added_quantity);
    }
}

// =============================================================================
// Conflicting adds change nothing
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_subscription_into_one_time_cart_changes_nothing(
        lines in prop::collection::vec(line_strategy(), 1..15),
        membership in any::<bool>(),
        quantity in 1i64..=999,
    ) {
        let mut cart = build_cart(&lines);
        let before = cart.to_snapshot();
        let total_before = cart.total().unwrap();

        let product_type = if membership { ProductType::Membership } else { ProductType::Subscription };
        let plan = ProductRef::new("plan", "Plan", product_type, usd(2900));
        let outcome = cart.add_item(plan, quantity, None).unwrap();

        prop_assert!(matches!(outcome, AddOutcome::Conflict(_)));
        prop_assert_eq!(cart.to_snapshot(), before);
        prop_assert_eq!(cart.total().unwrap(), total_before);
    }

    #[test]
    fn test_one_time_into_subscription_cart_changes_nothing(
        plans in prop::collection::vec((0u8..5, 0i64..=100_000, 1i64..=20), 1..10),
        incoming in line_strategy(),
    ) {
        let mut cart = Cart::new(Currency::Usd);
        for (id, price, quantity) in &plans {
            let plan = ProductRef::new(format!("plan-{id}"), "Plan", ProductType::Subscription, usd(*price));
            cart.add_item(plan, *quantity, None).unwrap();
        }
        let before = cart.to_snapshot();

        let outcome = cart
            .add_item(incoming.product(), incoming.quantity, incoming.custom_price())
            .unwrap();

        prop_assert!(matches!(outcome, AddOutcome::Conflict(_)));
        prop_assert_eq!(cart.to_snapshot(), before);
    }
}

// =============================================================================
// Charge breakdown
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_charge_is_deterministic(
        lines in prop::collection::vec(line_strategy(), 1..15),
        bps in 0u32..=10_000,
    ) {
        let cart = build_cart(&lines);
        let before = cart.to_snapshot();
        let rate = DiscountRate::from_bps(bps);
        let total = cart.total().unwrap();

        match compute_charge(&cart, rate) {
            Ok(first) => {
                let second = compute_charge(&cart, rate).unwrap();
                prop_assert_eq!(first, second);
                prop_assert_eq!(first.total_amount, total);
                prop_assert_eq!(
                    first.processor_discount.minor(),
                    (total.minor() * i64::from(bps) + 5000) / 10_000
                );
                prop_assert_eq!(
                    first.processor_discount.minor() + first.final_amount.minor(),
                    total.minor()
                );
            }
            Err(err) => {
                prop_assert!(matches!(err, CoreError::EmptyCart));
                prop_assert!(total.is_zero());
            }
        }

        prop_assert_eq!(cart.to_snapshot(), before);
    }
}
