//! Concurrent debt accumulation
//!
//! This module provides the thread-safe counterpart of the directed debt
//! accumulation step, used when expenses are streamed in batches.
//!
//! # Architecture
//!
//! - **AsyncDebtAggregator**: undivided debt sums kept in a DashMap keyed by
//!   `(debtor, creditor, ways)`
//! - **BatchProcessor**: partitions each batch by payer and accumulates every
//!   partition on its own tokio task
//!
//! Division, netting, balance calculation and matching still run once, on a
//! sorted snapshot, through `resolve_splits` and the regular
//! `SettlementEngine`.
//!
//! # Thread Safety
//!
//! Every sum is keyed by its creditor, which is always the payer of the
//! expense it came from. Partitioning by payer therefore gives each key a
//! single writer. The sums are undivided input amounts, so they do not depend
//! on the order the expenses are applied in, and they equal the sequential
//! ones.

pub mod batch_processor;
pub mod debt_aggregator;

pub use batch_processor::BatchProcessor;
pub use debt_aggregator::AsyncDebtAggregator;
