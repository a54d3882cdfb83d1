//! Benchmark suite for settlement strategies and the settlement core
//!
//! Compares the synchronous and asynchronous processing strategies on
//! generated expense files, and measures the in-memory settlement engine as
//! the number of expenses grows.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use expense_settlement_engine::cli::StrategyType;
use expense_settlement_engine::strategy::{create_strategy, BatchConfig, LedgerFiles};
use expense_settlement_engine::{Expense, Participant, SettlementConfig, SettlementEngine};
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::io::Write;
use tempfile::NamedTempFile;

const PARTICIPANTS: u32 = 50;

fn main() {
    divan::main();
}

/// Deterministic expense mix: rotating payers, 2 to 6 contributors each
fn generate_expenses(count: u64) -> Vec<Expense> {
    (0..count)
        .map(|id| {
            let payer = (id % PARTICIPANTS as u64) as u32 + 1;
            let size = (id % 5) as u32 + 2;
            let contributors = (0..size).map(|k| (payer + k * 7) % PARTICIPANTS + 1);
            Expense::new(id, Decimal::new(((id * 7919) % 100_000 + 100) as i64, 2))
                .paid_by(payer)
                .shared_by(contributors)
        })
        .collect()
}

fn expenses_csv(count: u64) -> NamedTempFile {
    let mut csv = String::from("id,name,amount,payer,contributors\n");
    for expense in generate_expenses(count) {
        let contributors: Vec<String> = expense.contributors.iter().map(u32::to_string).collect();
        let payer = expense.payer.map(|p| p.to_string()).unwrap_or_default();
        writeln!(
            csv,
            "{},expense {},{},{},{}",
            expense.id,
            expense.id,
            expense.amount,
            payer,
            contributors.join(";")
        )
        .expect("Failed to format row");
    }

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(csv.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

/// Settlement engine alone, expenses already in memory
#[divan::bench(args = [100, 1_000, 10_000])]
fn engine_compute(bencher: divan::Bencher, count: u64) {
    let participants: Vec<Participant> = (1..=PARTICIPANTS).map(Participant::unnamed).collect();
    let expenses = generate_expenses(count);
    let engine = SettlementEngine::default();

    bencher.bench_local(|| engine.compute(divan::black_box(&participants), divan::black_box(&expenses)));
}

/// Synchronous strategy, CSV in and out
#[divan::bench(args = [1_000, 100_000])]
fn sync_strategy(bencher: divan::Bencher, count: u64) {
    let file = expenses_csv(count);
    let files = LedgerFiles::new(file.path());
    let strategy = create_strategy(StrategyType::Sync, None, SettlementConfig::default());

    bencher.bench_local(|| {
        let mut output: Vec<u8> = Vec::new();
        strategy
            .process(&files, &mut output)
            .expect("Processing failed");
    });
}

/// Asynchronous strategy, CSV in and out
#[divan::bench(args = [1_000, 100_000])]
fn async_strategy(bencher: divan::Bencher, count: u64) {
    let file = expenses_csv(count);
    let files = LedgerFiles::new(file.path());
    let strategy = create_strategy(
        StrategyType::Async,
        Some(BatchConfig::default()),
        SettlementConfig::default(),
    );

    bencher.bench_local(|| {
        let mut output: Vec<u8> = Vec::new();
        strategy
            .process(&files, &mut output)
            .expect("Processing failed");
    });
}
