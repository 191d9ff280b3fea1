//! TRADESIM — Single-Account Trading Simulation Ledger
//!
//! Entry point. Loads configuration, initialises structured logging,
//! optionally opens the account from config, and runs a synchronous
//! line-oriented command loop over the session handlers.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use tracing::info;

use tradesim::config::AppConfig;
use tradesim::session::Session;

const BANNER: &str = r#"
 _____ ____      _    ____  _____ ____ ___ __  __
|_   _|  _ \    / \  |  _ \| ____/ ___|_ _|  \/  |
  | | | |_) |  / _ \ | | | |  _| \___ \| || |\/| |
  | | |  _ <  / ___ \| |_| | |___ ___) | || |  | |
  |_| |_| \_\/_/   \_\____/|_____|____/___|_|  |_|

  Single-Account Trading Simulation Ledger
  v0.1.0
"#;

const HELP: &str = "\
Commands:
  create <amount>        open the account with an initial deposit
  deposit <amount>       add cash
  withdraw <amount>      remove cash
  buy <symbol> <qty>     buy shares at the current price
  sell <symbol> <qty>    sell held shares at the current price
  summary                balance, portfolio value, profit/loss, holdings
  history                transaction history
  json                   transaction history as JSON
  prices                 known symbols and prices
  help                   this message
  quit                   exit";

fn main() -> Result<()> {
    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        account_name = %cfg.account.name,
        currency = %cfg.account.currency,
        "TRADESIM starting up"
    );

    let mut session = Session::new(cfg.price_table());

    // Open the account up front when the config names a deposit.
    if let Some(deposit) = cfg.account.initial_deposit {
        println!("{}", session.create_account(&deposit.to_string()));
    }

    println!("{HELP}\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        let reply = match parts.as_slice() {
            [] => continue,
            ["create", amount] => session.create_account(amount),
            ["deposit", amount] => session.deposit(amount),
            ["withdraw", amount] => session.withdraw(amount),
            ["buy", symbol, quantity] => session.buy(symbol, quantity),
            ["sell", symbol, quantity] => session.sell(symbol, quantity),
            ["summary"] => session.summary(),
            ["history"] => session.history(),
            ["json"] => session.history_json(),
            ["prices"] => session.prices(),
            ["help"] => HELP.to_string(),
            ["quit"] | ["exit"] => break,
            _ => format!("Unrecognised command: {}\nType 'help' for usage.", line.trim()),
        };
        println!("{reply}");
    }

    if let Some(account) = session.account() {
        info!(
            balance = %account.balance(),
            portfolio_value = %account.portfolio_value(),
            transactions = account.transactions().len(),
            "TRADESIM shut down cleanly."
        );
    }

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tradesim=info"));

    let json_logging = std::env::var("TRADESIM_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        fmt().with_env_filter(env_filter).with_target(true).init();
    }
}
