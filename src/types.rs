//! Shared types for the TRADESIM ledger.
//!
//! These types form the data model used across all modules.
//! They are designed to be stable so that the pricing, account,
//! and session modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Transaction kind
// ---------------------------------------------------------------------------

/// The four balance-affecting event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdraw,
    Buy,
    Sell,
}

impl TransactionKind {
    /// Whether this kind carries a symbol and share quantity.
    pub fn is_trade(&self) -> bool {
        matches!(self, TransactionKind::Buy | TransactionKind::Sell)
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Deposit => write!(f, "DEPOSIT"),
            TransactionKind::Withdraw => write!(f, "WITHDRAW"),
            TransactionKind::Buy => write!(f, "BUY"),
            TransactionKind::Sell => write!(f, "SELL"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction record
// ---------------------------------------------------------------------------

/// An immutable record of one completed balance-affecting event.
///
/// `symbol` and `quantity` are present only for Buy/Sell. `amount` is
/// always the cash moved: cost for Buy, proceeds for Sell, the absolute
/// amount for Deposit/Withdraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    pub symbol: Option<String>,
    pub quantity: Option<u64>,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// A cash deposit for the given amount.
    pub fn deposit(amount: Decimal) -> Self {
        Self::cash(TransactionKind::Deposit, amount)
    }

    /// A cash withdrawal for the given amount.
    pub fn withdraw(amount: Decimal) -> Self {
        Self::cash(TransactionKind::Withdraw, amount)
    }

    /// A share purchase: `amount` is the total cost.
    pub fn buy(symbol: &str, quantity: u64, cost: Decimal) -> Self {
        Self::trade(TransactionKind::Buy, symbol, quantity, cost)
    }

    /// A share sale: `amount` is the total proceeds.
    pub fn sell(symbol: &str, quantity: u64, proceeds: Decimal) -> Self {
        Self::trade(TransactionKind::Sell, symbol, quantity, proceeds)
    }

    fn cash(kind: TransactionKind, amount: Decimal) -> Self {
        Transaction {
            kind,
            symbol: None,
            quantity: None,
            amount,
            timestamp: Utc::now(),
        }
    }

    fn trade(kind: TransactionKind, symbol: &str, quantity: u64, amount: Decimal) -> Self {
        Transaction {
            kind,
            symbol: Some(symbol.to_string()),
            quantity: Some(quantity),
            amount,
            timestamp: Utc::now(),
        }
    }

    /// Per-share price derived from the recorded totals.
    /// None for cash transactions or a zero quantity.
    pub fn unit_price(&self) -> Option<Decimal> {
        match self.quantity {
            Some(q) if q > 0 => Some(self.amount / Decimal::from(q)),
            _ => None,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.symbol, self.quantity) {
            (Some(symbol), Some(quantity)) => {
                let each = self.unit_price().unwrap_or(Decimal::ZERO);
                write!(
                    f,
                    "{}: {} shares of {} at ${:.2} each, total ${:.2}",
                    self.kind, quantity, symbol, each, self.amount,
                )
            }
            _ => write!(f, "{}: ${:.2}", self.kind, self.amount),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the account ledger.
///
/// Only validation failures are errors. Business-rule rejections
/// (insufficient funds, insufficient shares) are reported as a `false`
/// outcome by the operation itself, with no state change.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid {field}: {value} (must be strictly positive)")]
    InvalidAmount { field: &'static str, value: Decimal },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
