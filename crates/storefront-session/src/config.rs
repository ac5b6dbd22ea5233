//! # Session Configuration
//!
//! Pricing policy for a session, loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOREFRONT_*`)
//! 2. Defaults (this file)
//!
//! ## Environment Variables
//! | Variable                   | Example              | Meaning                          |
//! |----------------------------|----------------------|----------------------------------|
//! | `STOREFRONT_CURRENCY`      | `EUR`                | Cart currency                    |
//! | `STOREFRONT_DISCOUNT_RATE` | `2.9`                | Processor discount, percent      |
//! | `STOREFRONT_RATES`         | `EUR=0.92,GBP=0.79`  | Rates relative to cart currency  |
//! | `STOREFRONT_CART_PATH`     | `/tmp/cart.json`     | Saved cart file                  |
//!
//! A value that does not parse is logged at `warn` and the default is kept,
//! so a typo never stops the storefront from starting.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_core::currency::{self, Currency, RateTable};
use storefront_core::DiscountRate;
use tracing::warn;

const ENV_CURRENCY: &str = "STOREFRONT_CURRENCY";
const ENV_DISCOUNT_RATE: &str = "STOREFRONT_DISCOUNT_RATE";
const ENV_RATES: &str = "STOREFRONT_RATES";
const ENV_CART_PATH: &str = "STOREFRONT_CART_PATH";

/// Session configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Currency the cart is priced in.
    pub currency: Currency,

    /// Processor discount applied at checkout.
    pub discount_rate: DiscountRate,

    /// Exchange rates anchored at `currency`.
    pub rates: RateTable,

    /// Saved cart location. `None` uses the platform data directory.
    pub cart_path: Option<PathBuf>,
}

impl Default for SessionConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Currency: USD ($)
    /// - Discount: 2%
    /// - Rates: none besides USD itself
    /// - Cart file: platform data directory
    fn default() -> Self {
        SessionConfig {
            currency: Currency::Usd,
            discount_rate: DiscountRate::DEFAULT,
            rates: RateTable::new(Currency::Usd),
            cart_path: None,
        }
    }
}

impl SessionConfig {
    /// Creates a SessionConfig from environment variables and defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    ///
    /// ## Usage
    /// ```rust
    /// use storefront_core::Currency;
    /// use storefront_session::config::SessionConfig;
    ///
    /// let config = SessionConfig::from_lookup(|key| match key {
    ///     "STOREFRONT_CURRENCY" => Some("gbp".to_string()),
    ///     "STOREFRONT_DISCOUNT_RATE" => Some("2.9".to_string()),
    ///     _ => None,
    /// });
    ///
    /// assert_eq!(config.currency, Currency::Gbp);
    /// assert_eq!(config.discount_rate.bps(), 290);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SessionConfig::default();

        if let Some(code) = lookup(ENV_CURRENCY) {
            match code.parse::<Currency>() {
                Ok(currency) => {
                    config.currency = currency;
                    config.rates = RateTable::new(currency);
                }
                Err(e) => warn!(value = %code, error = %e, "Ignoring {}", ENV_CURRENCY),
            }
        }

        if let Some(raw) = lookup(ENV_DISCOUNT_RATE) {
            match parse_discount_rate(&raw) {
                Ok(rate) => config.discount_rate = rate,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_DISCOUNT_RATE),
            }
        }

        if let Some(raw) = lookup(ENV_RATES) {
            for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if let Err(e) = apply_rate(&mut config.rates, entry) {
                    warn!(entry, error = %e, "Ignoring exchange rate in {}", ENV_RATES);
                }
            }
        }

        if let Some(path) = lookup(ENV_CART_PATH).filter(|p| !p.trim().is_empty()) {
            config.cart_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Formats a minor-unit amount in the session currency.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_session::config::SessionConfig;
    ///
    /// let config = SessionConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, minor: i64) -> String {
        currency::format(minor, self.currency)
    }
}

fn parse_discount_rate(raw: &str) -> Result<DiscountRate, String> {
    let pct = Decimal::from_str(raw.trim().trim_end_matches('%')).map_err(|e| e.to_string())?;
    DiscountRate::from_percentage(pct).map_err(|e| e.to_string())
}

fn apply_rate(rates: &mut RateTable, entry: &str) -> Result<(), String> {
    let (code, rate) = entry
        .split_once('=')
        .ok_or_else(|| "expected CODE=RATE".to_string())?;
    let currency = code.parse::<Currency>().map_err(|e| e.to_string())?;
    if currency == rates.base() {
        return Err(format!("{currency} is the base currency"));
    }
    let rate = Decimal::from_str(rate.trim()).map_err(|e| e.to_string())?;
    rates.set_rate(currency, rate).map_err(|e| e.to_string())
}
