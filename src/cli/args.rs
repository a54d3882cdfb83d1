use crate::logging::LogFormat;
use crate::strategy::{BatchConfig, LedgerFiles};
use crate::types::{SettlementConfig, DEFAULT_EPSILON, DEFAULT_PRECISION};
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Settle shared expenses with as few payments as possible
#[derive(Parser, Debug)]
#[command(name = "expense-settlement-engine")]
#[command(about = "Settle shared expenses with as few payments as possible", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing expense records
    #[arg(value_name = "EXPENSES", help = "Path to the expenses CSV file")]
    pub expenses_file: PathBuf,

    /// Participants CSV file path
    #[arg(
        long = "participants",
        value_name = "PATH",
        help = "Participants CSV; expenses may then only reference listed ids"
    )]
    pub participants_file: Option<PathBuf>,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Processing strategy: 'sync' for synchronous or 'async' for batched"
    )]
    pub strategy: StrategyType,

    /// Number of expenses per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of expenses per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Decimal places in printed amounts
    #[arg(long = "precision", value_name = "DP", default_value_t = DEFAULT_PRECISION)]
    pub precision: u32,

    /// Zero tolerance
    #[arg(long = "epsilon", value_name = "DECIMAL", default_value_t = DEFAULT_EPSILON)]
    pub epsilon: Decimal,

    /// Print participant names instead of ids
    #[arg(long = "show-names")]
    pub show_names: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "FILTER", default_value = "warn")]
    pub log_level: String,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values use the defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create a SettlementConfig from CLI arguments
    pub fn to_settlement_config(&self) -> SettlementConfig {
        SettlementConfig::new(self.epsilon, self.precision, self.show_names)
    }

    /// Input files named on the command line
    pub fn ledger_files(&self) -> LedgerFiles {
        let files = LedgerFiles::new(self.expenses_file.clone());
        match &self.participants_file {
            Some(path) => files.with_participants(path.clone()),
            None => files,
        }
    }
}
