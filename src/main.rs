//! Expense Settlement Engine CLI
//!
//! Command-line interface for settling shared expenses from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- expenses.csv > settlements.csv
//! cargo run -- --participants people.csv --show-names expenses.csv > settlements.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 expenses.csv > settlements.csv
//! ```
//!
//! The program reads expense records from the input CSV file, settles them
//! using the selected processing strategy, and writes one `from,to,amount`
//! row per payment to stdout. Logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use expense_settlement_engine::{cli, logging, strategy};
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init_logging(&args.log_level, args.log_format);

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, args.to_settlement_config())
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.ledger_files(), &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
