//! # Currency Module
//!
//! Supported currencies, their display conventions, and the exchange-rate
//! table supplied by the pricing policy.
//!
//! ## Conversion Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RateTable (base = USD)                                                 │
//! │                                                                         │
//! │    USD ── 1.00                                                          │
//! │    EUR ── 0.92      1 USD buys 0.92 EUR                                 │
//! │    GBP ── 0.79      1 USD buys 0.79 GBP                                 │
//! │                                                                         │
//! │  92.00 EUR → GBP:  92.00 / 0.92 × 0.79 = 79.00 GBP                      │
//! │                    └── to base ──┘ └ to target                          │
//! │                                                                         │
//! │  Intermediate math is exact decimal; only the result is rounded to     │
//! │  minor units (round half up).                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{self, Money};

// =============================================================================
// Currency
// =============================================================================

/// A currency the storefront can price in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar.
    Usd,
    /// Euro.
    Eur,
    /// Pound sterling.
    Gbp,
    /// Canadian dollar.
    Cad,
    /// Australian dollar.
    Aud,
}

/// How an amount is laid out for a currency.
struct Convention {
    symbol: &'static str,
    symbol_first: bool,
    group_separator: char,
    decimal_separator: char,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cad,
        Currency::Aud,
    ];

    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
        }
    }

    /// Number of minor-unit digits (cents).
    pub const fn minor_units(&self) -> u32 {
        2
    }

    /// Display symbol.
    pub const fn symbol(&self) -> &'static str {
        self.convention().symbol
    }

    const fn convention(&self) -> Convention {
        match self {
            Currency::Usd => Convention {
                symbol: "$",
                symbol_first: true,
                group_separator: ',',
                decimal_separator: '.',
            },
            Currency::Eur => Convention {
                symbol: "€",
                symbol_first: false,
                group_separator: '.',
                decimal_separator: ',',
            },
            Currency::Gbp => Convention {
                symbol: "£",
                symbol_first: true,
                group_separator: ',',
                decimal_separator: '.',
            },
            Currency::Cad => Convention {
                symbol: "CA$",
                symbol_first: true,
                group_separator: ',',
                decimal_separator: '.',
            },
            Currency::Aud => Convention {
                symbol: "A$",
                symbol_first: true,
                group_separator: ',',
                decimal_separator: '.',
            },
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    /// Parses an ISO code, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(CoreError::UnknownCurrency(code))
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats an amount in minor units using the currency's convention.
///
/// ## Example
/// ```rust
/// use storefront_core::currency::{format, Currency};
///
/// assert_eq!(format(123_456, Currency::Usd), "$1,234.56");
/// assert_eq!(format(123_456, Currency::Eur), "1.234,56 €");
/// assert_eq!(format(-550, Currency::Gbp), "-£5.50");
/// ```
pub fn format(minor: i64, currency: Currency) -> String {
    let convention = currency.convention();
    let scale = 10_u64.pow(currency.minor_units());
    let magnitude = minor.unsigned_abs();
    let sign = if minor < 0 { "-" } else { "" };

    let number = format!(
        "{}{}{:0width$}",
        group_digits(magnitude / scale, convention.group_separator),
        convention.decimal_separator,
        magnitude % scale,
        width = currency.minor_units() as usize
    );

    if convention.symbol_first {
        format!("{sign}{}{number}", convention.symbol)
    } else {
        format!("{sign}{number} {}", convention.symbol)
    }
}

fn group_digits(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Rate Table
// =============================================================================

/// Exchange rates relative to a base currency.
///
/// Each rate is how many units of that currency one unit of the base buys.
/// The base itself is always present at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    base: Currency,
    rates: BTreeMap<Currency, Decimal>,
}

impl RateTable {
    /// Creates a table that only knows its base currency.
    pub fn new(base: Currency) -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(base, Decimal::ONE);
        RateTable { base, rates }
    }

    /// Builder form of [`RateTable::set_rate`].
    pub fn with_rate(mut self, currency: Currency, rate: Decimal) -> CoreResult<Self> {
        self.set_rate(currency, rate)?;
        Ok(self)
    }

    /// Sets the rate for a currency. Rates must be positive.
    pub fn set_rate(&mut self, currency: Currency, rate: Decimal) -> CoreResult<()> {
        if rate <= Decimal::ZERO {
            return Err(ValidationError::MustBePositive {
                field: format!("exchange rate for {currency}"),
            }
            .into());
        }
        self.rates.insert(currency, rate);
        Ok(())
    }

    /// The base currency.
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Rate for a currency, if the table has one.
    pub fn rate(&self, currency: Currency) -> Option<Decimal> {
        self.rates.get(&currency).copied()
    }

    /// Whether the table can convert to and from this currency.
    pub fn supports(&self, currency: Currency) -> bool {
        self.rates.contains_key(&currency)
    }

    /// Converts a major-unit amount between two currency codes.
    ///
    /// ## Errors
    /// `UnknownCurrency` when either code is unsupported or has no rate.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use storefront_core::currency::{Currency, RateTable};
    ///
    /// let table = RateTable::new(Currency::Usd)
    ///     .with_rate(Currency::Eur, Decimal::new(92, 2))
    ///     .unwrap();
    ///
    /// let eur = table.convert(Decimal::from(100), "USD", "EUR").unwrap();
    /// assert_eq!(eur, Decimal::new(9200, 2));
    /// ```
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> CoreResult<Decimal> {
        let from = self.lookup(from)?;
        let to = self.lookup(to)?;
        self.convert_between(amount, from, to)
    }

    /// Converts a [`Money`] value into another currency.
    pub fn convert_money(&self, amount: &Money, to: Currency) -> CoreResult<Money> {
        let converted = self.convert_between(amount.to_decimal(), amount.currency(), to)?;
        Money::from_decimal(converted, to)
    }

    fn lookup(&self, code: &str) -> CoreResult<Currency> {
        let currency: Currency = code.parse()?;
        if self.supports(currency) {
            Ok(currency)
        } else {
            Err(CoreError::UnknownCurrency(currency.code().to_string()))
        }
    }

    fn convert_between(&self, amount: Decimal, from: Currency, to: Currency) -> CoreResult<Decimal> {
        let from_rate = self
            .rate(from)
            .ok_or_else(|| CoreError::UnknownCurrency(from.code().to_string()))?;
        let to_rate = self
            .rate(to)
            .ok_or_else(|| CoreError::UnknownCurrency(to.code().to_string()))?;

        if from == to {
            return Ok(money::round(amount));
        }

        let converted = amount
            .checked_div(from_rate)
            .and_then(|in_base| in_base.checked_mul(to_rate))
            .ok_or(CoreError::Overflow("currency conversion"))?;

        Ok(money::round(converted))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
