//! Session handlers.
//!
//! The string-in/string-out boundary consumed by the form-style front
//! end. A [`Session`] owns at most one [`Account`] plus the price table,
//! replacing global account state with an explicit context object that
//! every handler goes through. Each handler parses its text inputs,
//! drives the ledger, and renders a human-readable result line.
//!
//! Unknown symbols are refused here, at the form boundary. The ledger
//! itself prices them at zero and would accept the trade.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::account::Account;
use crate::pricing::PriceTable;

const NO_ACCOUNT: &str = "Error: Please create an account first.";

pub struct Session {
    pricing: PriceTable,
    account: Option<Account>,
}

impl Session {
    pub fn new(pricing: PriceTable) -> Self {
        Session {
            pricing,
            account: None,
        }
    }

    /// The ledger, once an account has been created.
    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    // -- Mutating handlers ------------------------------------------------

    /// Create (or replace) the session account with the given initial
    /// deposit.
    pub fn create_account(&mut self, initial_deposit: &str) -> String {
        let amount = match parse_amount(initial_deposit) {
            Ok(a) => a,
            Err(msg) => return msg,
        };
        match Account::open(amount, self.pricing.clone()) {
            Ok(account) => {
                self.account = Some(account);
                debug!(initial_deposit = %amount, "Session account created");
                format!("Account created with initial deposit of ${amount:.2}")
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    pub fn deposit(&mut self, amount: &str) -> String {
        let Some(account) = self.account.as_mut() else {
            return NO_ACCOUNT.to_string();
        };
        let amount = match parse_amount(amount) {
            Ok(a) => a,
            Err(msg) => return msg,
        };
        match account.deposit(amount) {
            Ok(()) => format!(
                "Successfully deposited ${amount:.2}. New balance: ${:.2}",
                account.balance()
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    pub fn withdraw(&mut self, amount: &str) -> String {
        let Some(account) = self.account.as_mut() else {
            return NO_ACCOUNT.to_string();
        };
        let amount = match parse_amount(amount) {
            Ok(a) => a,
            Err(msg) => return msg,
        };
        match account.withdraw(amount) {
            Ok(true) => format!(
                "Successfully withdrew ${amount:.2}. New balance: ${:.2}",
                account.balance()
            ),
            Ok(false) => format!(
                "Error: Insufficient funds. Current balance: ${:.2}",
                account.balance()
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    pub fn buy(&mut self, symbol: &str, quantity: &str) -> String {
        if self.account.is_none() {
            return NO_ACCOUNT.to_string();
        }
        let symbol = symbol.trim().to_uppercase();
        let quantity = match parse_quantity(quantity) {
            Ok(q) => q,
            Err(msg) => return msg,
        };
        if !self.pricing.is_known(&symbol) {
            return self.unknown_symbol(&symbol);
        }

        let price = self.pricing.price(&symbol);
        let total = price * Decimal::from(quantity);
        let Some(account) = self.account.as_mut() else {
            return NO_ACCOUNT.to_string();
        };
        match account.buy(&symbol, quantity) {
            Ok(true) => format!(
                "Successfully bought {quantity} shares of {symbol} at ${price:.2} each. \
                 Total cost: ${total:.2}. New balance: ${:.2}",
                account.balance()
            ),
            Ok(false) => format!(
                "Error: Insufficient funds to buy {quantity} shares of {symbol} at \
                 ${price:.2} each (${total:.2}). Current balance: ${:.2}",
                account.balance()
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    pub fn sell(&mut self, symbol: &str, quantity: &str) -> String {
        if self.account.is_none() {
            return NO_ACCOUNT.to_string();
        }
        let symbol = symbol.trim().to_uppercase();
        let quantity = match parse_quantity(quantity) {
            Ok(q) => q,
            Err(msg) => return msg,
        };
        if !self.pricing.is_known(&symbol) {
            return self.unknown_symbol(&symbol);
        }

        let price = self.pricing.price(&symbol);
        let total = price * Decimal::from(quantity);
        let Some(account) = self.account.as_mut() else {
            return NO_ACCOUNT.to_string();
        };
        match account.sell(&symbol, quantity) {
            Ok(true) => format!(
                "Successfully sold {quantity} shares of {symbol} at ${price:.2} each. \
                 Total value: ${total:.2}. New balance: ${:.2}",
                account.balance()
            ),
            Ok(false) => {
                let held = account.holdings().get(&symbol).copied().unwrap_or(0);
                format!(
                    "Error: Insufficient shares to sell. You have {held} shares of \
                     {symbol}, but tried to sell {quantity}."
                )
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    // -- Read-only handlers -----------------------------------------------

    /// Balance, portfolio value, profit/loss, and priced holdings.
    pub fn summary(&self) -> String {
        let Some(account) = self.account.as_ref() else {
            return NO_ACCOUNT.to_string();
        };

        let mut lines = vec![
            format!("Cash Balance: ${:.2}", account.balance()),
            format!("Portfolio Value: ${:.2}", account.portfolio_value()),
        ];

        let pnl = account.profit_or_loss();
        let pct = pnl * dec!(100) / account.initial_deposit();
        lines.push(format!("Profit/Loss: ${pnl:.2} ({pct:.2}%)"));

        let holdings = account.holdings();
        if holdings.is_empty() {
            lines.push("\nNo current holdings.".to_string());
        } else {
            lines.push("\nCurrent Holdings:".to_string());
            for (symbol, quantity) in &holdings {
                let price = self.pricing.price(symbol);
                let value = price * Decimal::from(*quantity);
                lines.push(format!(
                    "  {symbol}: {quantity} shares at ${price:.2} = ${value:.2}"
                ));
            }
        }

        lines.join("\n")
    }

    /// Numbered chronological transaction list.
    pub fn history(&self) -> String {
        let Some(account) = self.account.as_ref() else {
            return NO_ACCOUNT.to_string();
        };

        let transactions = account.transactions();
        let mut lines = vec!["Transaction History:".to_string()];
        for (i, tx) in transactions.iter().enumerate() {
            lines.push(format!("{}. {tx}", i + 1));
        }
        lines.join("\n")
    }

    /// The transaction history as pretty-printed JSON.
    pub fn history_json(&self) -> String {
        let Some(account) = self.account.as_ref() else {
            return NO_ACCOUNT.to_string();
        };
        match serde_json::to_string_pretty(&account.transactions()) {
            Ok(json) => json,
            Err(e) => format!("Error: {e}"),
        }
    }

    /// All known symbols with their current prices.
    pub fn prices(&self) -> String {
        let mut lines = vec!["Current Stock Prices:".to_string()];
        for (symbol, price) in self.pricing.symbols() {
            lines.push(format!("{symbol}: ${price:.2}"));
        }
        lines.join("\n")
    }

    fn unknown_symbol(&self, symbol: &str) -> String {
        let available: Vec<&str> = self.pricing.symbols().map(|(s, _)| s).collect();
        format!(
            "Error: Invalid stock symbol '{symbol}'. Available stocks: {}",
            available.join(", ")
        )
    }
}

fn parse_amount(input: &str) -> Result<Decimal, String> {
    input
        .trim()
        .parse::<Decimal>()
        .map_err(|_| format!("Error: Invalid amount '{}'.", input.trim()))
}

fn parse_quantity(input: &str) -> Result<u64, String> {
    let n: i64 = input
        .trim()
        .parse()
        .map_err(|_| format!("Error: Invalid quantity '{}'.", input.trim()))?;
    if n <= 0 {
        return Err(format!(
            "Error: Invalid quantity: {n} (must be strictly positive)"
        ));
    }
    Ok(n as u64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
