//! Account ledger.
//!
//! Owns the cash balance, share holdings, and append-only transaction
//! history for one simulated brokerage account. All mutations go through
//! the four operations here; trades and valuations are priced through
//! the [`PriceTable`] supplied at construction.
//!
//! Validation failures (non-positive amount or quantity) are errors and
//! are raised before any state change. Business-rule rejections
//! (insufficient funds, insufficient shares) are a `false` outcome with
//! zero mutation and no transaction recorded. Every operation is atomic:
//! it applies all of its effects or none of them.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::pricing::PriceTable;
use crate::types::{AccountError, Transaction};

pub struct Account {
    balance: Decimal,
    initial_deposit: Decimal,
    holdings: BTreeMap<String, u64>,
    transactions: Vec<Transaction>,
    pricing: PriceTable,
}

impl Account {
    /// Open an account with a strictly positive initial deposit.
    /// The deposit is recorded as the first transaction.
    pub fn open(initial_deposit: Decimal, pricing: PriceTable) -> Result<Self, AccountError> {
        check_positive("initial deposit", initial_deposit)?;

        let mut account = Account {
            balance: initial_deposit,
            initial_deposit,
            holdings: BTreeMap::new(),
            transactions: Vec::new(),
            pricing,
        };
        account.record(Transaction::deposit(initial_deposit));

        info!(balance = %account.balance, "Account opened");
        Ok(account)
    }

    // -- Mutating operations ----------------------------------------------

    /// Add cash to the balance. No failure mode beyond validation.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        check_positive("deposit amount", amount)?;

        self.balance += amount;
        self.record(Transaction::deposit(amount));

        info!(amount = %amount, balance = %self.balance, "Deposit applied");
        Ok(())
    }

    /// Remove cash from the balance. Returns `Ok(false)` without any
    /// state change when the balance would go negative.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<bool, AccountError> {
        check_positive("withdrawal amount", amount)?;

        if amount > self.balance {
            warn!(
                amount = %amount,
                balance = %self.balance,
                "Withdrawal rejected: insufficient funds"
            );
            return Ok(false);
        }

        self.balance -= amount;
        self.record(Transaction::withdraw(amount));

        info!(amount = %amount, balance = %self.balance, "Withdrawal applied");
        Ok(true)
    }

    /// Buy shares at the oracle price. Returns `Ok(false)` without any
    /// state change when the cost exceeds the balance.
    ///
    /// An unknown symbol prices at zero, so the cost is zero and the buy
    /// succeeds, adding the shares at no cost. That falls out of the
    /// oracle's zero-default policy; there is no special case here.
    pub fn buy(&mut self, symbol: &str, quantity: u64) -> Result<bool, AccountError> {
        check_quantity(quantity)?;

        let cost = self.pricing.price(symbol) * Decimal::from(quantity);
        if cost > self.balance {
            warn!(
                symbol,
                quantity,
                cost = %cost,
                balance = %self.balance,
                "Buy rejected: insufficient funds"
            );
            return Ok(false);
        }

        self.balance -= cost;
        *self.holdings.entry(symbol.to_string()).or_insert(0) += quantity;
        self.record(Transaction::buy(symbol, quantity, cost));

        info!(symbol, quantity, cost = %cost, balance = %self.balance, "Buy filled");
        Ok(true)
    }

    /// Sell held shares at the oracle price. Returns `Ok(false)` without
    /// any state change when the symbol is absent or the held quantity
    /// is below the requested quantity. A holding that reaches exactly
    /// zero is removed entirely.
    pub fn sell(&mut self, symbol: &str, quantity: u64) -> Result<bool, AccountError> {
        check_quantity(quantity)?;

        let held = self.holdings.get(symbol).copied().unwrap_or(0);
        if held < quantity {
            warn!(
                symbol,
                requested = quantity,
                held,
                "Sell rejected: insufficient shares"
            );
            return Ok(false);
        }

        let proceeds = self.pricing.price(symbol) * Decimal::from(quantity);
        self.balance += proceeds;

        let remaining = held - quantity;
        if remaining == 0 {
            self.holdings.remove(symbol);
        } else {
            self.holdings.insert(symbol.to_string(), remaining);
        }
        self.record(Transaction::sell(symbol, quantity, proceeds));

        info!(symbol, quantity, proceeds = %proceeds, balance = %self.balance, "Sell filled");
        Ok(true)
    }

    // -- Queries ----------------------------------------------------------

    /// Cash plus the oracle-priced value of all current holdings.
    pub fn portfolio_value(&self) -> Decimal {
        let share_value: Decimal = self
            .holdings
            .iter()
            .map(|(symbol, &quantity)| self.pricing.price(symbol) * Decimal::from(quantity))
            .sum();
        self.balance + share_value
    }

    /// Portfolio value relative to the initial deposit.
    pub fn profit_or_loss(&self) -> Decimal {
        self.portfolio_value() - self.initial_deposit
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn initial_deposit(&self) -> Decimal {
        self.initial_deposit
    }

    /// Independent copy of the current holdings. Mutating the returned
    /// map never affects ledger state.
    pub fn holdings(&self) -> BTreeMap<String, u64> {
        self.holdings.clone()
    }

    /// Independent copy of the transaction history, in chronological
    /// (insertion) order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn pricing(&self) -> &PriceTable {
        &self.pricing
    }

    fn record(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }
}

fn check_positive(field: &'static str, value: Decimal) -> Result<(), AccountError> {
    if value <= Decimal::ZERO {
        return Err(AccountError::InvalidAmount { field, value });
    }
    Ok(())
}

fn check_quantity(quantity: u64) -> Result<(), AccountError> {
    if quantity == 0 {
        return Err(AccountError::InvalidAmount {
            field: "quantity",
            value: Decimal::ZERO,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use rust_decimal_macros::dec;

    fn funded(amount: Decimal) -> Account {
        Account::open(amount, PriceTable::default()).unwrap()
    }

    // -- Construction --

    #[test]
    fn test_open_sets_balance_and_records_deposit() {
        let account = funded(dec!(10000));
        assert_eq!(account.balance(), dec!(10000));
        assert_eq!(account.initial_deposit(), dec!(10000));
        assert!(account.holdings().is_empty());

        let txs = account.transactions();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TransactionKind::Deposit);
        assert_eq!(txs[0].amount, dec!(10000));
    }

    #[test]
    fn test_open_rejects_non_positive_deposit() {
        assert!(Account::open(dec!(0), PriceTable::default()).is_err());
        assert!(Account::open(dec!(-100), PriceTable::default()).is_err());
    }

    // -- Deposit --

    #[test]
    fn test_deposit_increases_balance() {
        let mut account = funded(dec!(100));
        account.deposit(dec!(50)).unwrap();
        assert_eq!(account.balance(), dec!(150));
        assert_eq!(account.transactions().len(), 2);
    }

    #[test]
    fn test_deposit_rejects_non_positive_amount() {
        let mut account = funded(dec!(100));
        assert!(account.deposit(dec!(0)).is_err());
        assert!(account.deposit(dec!(-10)).is_err());
        assert_eq!(account.balance(), dec!(100));
        assert_eq!(account.transactions().len(), 1);
    }

    // -- Withdraw --

    #[test]
    fn test_withdraw_decreases_balance() {
        let mut account = funded(dec!(100));
        assert!(account.withdraw(dec!(40)).unwrap());
        assert_eq!(account.balance(), dec!(60));
        assert_eq!(account.transactions().last().unwrap().kind, TransactionKind::Withdraw);
    }

    #[test]
    fn test_withdraw_insufficient_funds_changes_nothing() {
        let mut account = funded(dec!(100));
        assert!(!account.withdraw(dec!(100.01)).unwrap());
        assert_eq!(account.balance(), dec!(100));
        assert_eq!(account.transactions().len(), 1);
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut account = funded(dec!(100));
        assert!(account.withdraw(dec!(100)).unwrap());
        assert_eq!(account.balance(), dec!(0));
    }

    #[test]
    fn test_withdraw_rejects_non_positive_amount() {
        let mut account = funded(dec!(100));
        assert!(account.withdraw(dec!(0)).is_err());
        assert_eq!(account.transactions().len(), 1);
    }

    // -- Buy --

    #[test]
    fn test_buy_deducts_cost_and_adds_holding() {
        let mut account = funded(dec!(10000));
        assert!(account.buy("AAPL", 10).unwrap());
        assert_eq!(account.balance(), dec!(8500));
        assert_eq!(account.holdings().get("AAPL"), Some(&10));

        let tx = account.transactions().last().unwrap().clone();
        assert_eq!(tx.kind, TransactionKind::Buy);
        assert_eq!(tx.amount, dec!(1500));
        assert_eq!(tx.symbol.as_deref(), Some("AAPL"));
        assert_eq!(tx.quantity, Some(10));
    }

    #[test]
    fn test_buy_accumulates_existing_holding() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap();
        account.buy("AAPL", 5).unwrap();
        assert_eq!(account.holdings().get("AAPL"), Some(&15));
    }

    #[test]
    fn test_buy_insufficient_funds_changes_nothing() {
        let mut account = funded(dec!(1000));
        assert!(!account.buy("TSLA", 2).unwrap()); // costs 1400
        assert_eq!(account.balance(), dec!(1000));
        assert!(account.holdings().is_empty());
        assert_eq!(account.transactions().len(), 1);
    }

    #[test]
    fn test_buy_unknown_symbol_is_free() {
        let mut account = funded(dec!(1000));
        assert!(account.buy("UNKNOWN", 10).unwrap());
        assert_eq!(account.balance(), dec!(1000));
        assert_eq!(account.holdings().get("UNKNOWN"), Some(&10));

        let tx = account.transactions().last().unwrap().clone();
        assert_eq!(tx.amount, dec!(0));
    }

    #[test]
    fn test_buy_rejects_zero_quantity() {
        let mut account = funded(dec!(1000));
        assert!(account.buy("AAPL", 0).is_err());
        assert_eq!(account.transactions().len(), 1);
    }

    // -- Sell --

    #[test]
    fn test_sell_credits_proceeds_and_removes_emptied_holding() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap();

        assert!(account.sell("AAPL", 10).unwrap());
        assert_eq!(account.balance(), dec!(10000)); // round-trip at constant price
        assert!(!account.holdings().contains_key("AAPL"));

        let tx = account.transactions().last().unwrap().clone();
        assert_eq!(tx.kind, TransactionKind::Sell);
        assert_eq!(tx.amount, dec!(1500));
    }

    #[test]
    fn test_sell_partial_keeps_remainder() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap();

        assert!(account.sell("AAPL", 4).unwrap());
        assert_eq!(account.holdings().get("AAPL"), Some(&6));
        assert_eq!(account.balance(), dec!(9100));
    }

    #[test]
    fn test_sell_unheld_symbol_changes_nothing() {
        let mut account = funded(dec!(1000));
        assert!(!account.sell("AAPL", 1).unwrap());
        assert_eq!(account.balance(), dec!(1000));
        assert_eq!(account.transactions().len(), 1);
    }

    #[test]
    fn test_sell_more_than_held_changes_nothing() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap();

        assert!(!account.sell("AAPL", 11).unwrap());
        assert_eq!(account.holdings().get("AAPL"), Some(&10));
        assert_eq!(account.balance(), dec!(8500));
        assert_eq!(account.transactions().len(), 2);
    }

    #[test]
    fn test_sell_rejects_zero_quantity() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 1).unwrap();
        assert!(account.sell("AAPL", 0).is_err());
    }

    // -- Queries --

    #[test]
    fn test_portfolio_value_prices_holdings() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap(); // balance 8500, shares worth 1500
        assert_eq!(account.portfolio_value(), account.balance() + dec!(1500));
        assert_eq!(account.portfolio_value(), dec!(10000));
    }

    #[test]
    fn test_profit_or_loss_zero_after_conversion_to_shares() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap(); // 1500
        assert_eq!(account.balance(), dec!(8500));
        account.buy("TSLA", 2).unwrap(); // 1400
        assert_eq!(account.balance(), dec!(7100));

        let holdings = account.holdings();
        assert_eq!(holdings.get("AAPL"), Some(&10));
        assert_eq!(holdings.get("TSLA"), Some(&2));
        assert_eq!(account.profit_or_loss(), dec!(0));
    }

    #[test]
    fn test_profit_or_loss_after_withdrawal_is_negative() {
        // Withdrawn cash leaves the portfolio, so P/L reflects it.
        let mut account = funded(dec!(1000));
        account.withdraw(dec!(200)).unwrap();
        assert_eq!(account.profit_or_loss(), dec!(-200));
    }

    // -- Snapshots --

    #[test]
    fn test_holdings_snapshot_is_independent() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 10).unwrap();

        let mut snapshot = account.holdings();
        snapshot.insert("AAPL".to_string(), 999);
        snapshot.insert("FAKE".to_string(), 1);

        assert_eq!(account.holdings().get("AAPL"), Some(&10));
        assert!(!account.holdings().contains_key("FAKE"));
    }

    #[test]
    fn test_transactions_snapshot_is_independent() {
        let mut account = funded(dec!(10000));
        account.deposit(dec!(1)).unwrap();

        let mut snapshot = account.transactions();
        snapshot.clear();

        assert_eq!(account.transactions().len(), 2);
    }

    #[test]
    fn test_transactions_preserve_insertion_order() {
        let mut account = funded(dec!(10000));
        account.buy("AAPL", 1).unwrap();
        account.withdraw(dec!(10)).unwrap();
        account.sell("AAPL", 1).unwrap();

        let kinds: Vec<TransactionKind> =
            account.transactions().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TransactionKind::Deposit,
                TransactionKind::Buy,
                TransactionKind::Withdraw,
                TransactionKind::Sell,
            ]
        );
    }
}
