//! Price oracle.
//!
//! Resolves a stock symbol to its current unit price from a fixed table.
//! Unknown symbols resolve to zero rather than an error; the zero price
//! is the sentinel for "unknown" and downstream behavior depends on it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

/// Fixed symbol → unit price table. Pure and deterministic.
#[derive(Debug, Clone)]
pub struct PriceTable {
    prices: BTreeMap<String, Decimal>,
}

impl Default for PriceTable {
    /// The builtin table used when no configuration override is given.
    fn default() -> Self {
        PriceTable::new([
            ("AAPL".to_string(), dec!(150)),
            ("TSLA".to_string(), dec!(700)),
            ("GOOGL".to_string(), dec!(2800)),
        ])
    }
}

impl PriceTable {
    /// Build a table from (symbol, price) pairs.
    pub fn new(prices: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        PriceTable {
            prices: prices.into_iter().collect(),
        }
    }

    /// Current unit price for a symbol. Zero for any unknown input,
    /// including empty or malformed symbols. Never fails.
    pub fn price(&self, symbol: &str) -> Decimal {
        self.prices.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }

    /// Whether the symbol is in the table.
    pub fn is_known(&self, symbol: &str) -> bool {
        self.prices.contains_key(symbol)
    }

    /// All known symbols with their prices, in symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.prices.iter().map(|(s, &p)| (s.as_str(), p))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
