//! Asynchronous CSV reader with batch interface
//!
//! Provides batch reading over participant or expense rows for the async
//! processing strategy.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - the `CsvRow` conversions shared with the synchronous reader
//! - batch reading so that each batch can be handed to the BatchProcessor
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of (line, row)
//!                  ↓
//!           csv_format module
//!           (CsvRow::from_record)
//! ```

use crate::io::csv_format::CsvRow;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::marker::PhantomData;

/// Asynchronous CSV reader
///
/// Yields rows of type `T` in batches, each tagged with its file line.
pub struct AsyncReader<R: AsyncRead + Unpin, T: CsvRow> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: u64,
    skipped: usize,
    _row: PhantomData<T>,
}

impl<R: AsyncRead + Unpin + Send + 'static, T: CsvRow> AsyncReader<R, T> {
    /// Create a new AsyncReader from an async reader
    ///
    /// # Arguments
    ///
    /// * `reader` - Async reader providing CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
            skipped: 0,
            _row: PhantomData,
        }
    }

    /// Number of malformed rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read a batch of rows
    ///
    /// Reads up to `batch_size` valid rows. Invalid rows are logged with
    /// their line number and skipped.
    ///
    /// # Returns
    ///
    /// `(line, row)` pairs in file order. Returns an empty vector when the
    /// end of the file is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<(u64, T)> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<T::Record>();

        while batch.len() < batch_size {
            let Some(next) = records.next().await else {
                break;
            };
            self.line_num += 1;
            // Line 1 is the header
            let line = self.line_num + 1;

            match next {
                Ok(record) => match T::from_record(record) {
                    Ok(row) => batch.push((line, row)),
                    Err(e) => {
                        self.skipped += 1;
                        tracing::warn!(line, error = %e, "Skipping invalid record");
                    }
                },
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!(line, error = %e, "Skipping malformed CSV row");
                }
            }
        }

        batch
    }

    /// Read every remaining row
    pub async fn read_all(&mut self, batch_size: usize) -> Vec<(u64, T)> {
        let mut rows = Vec::new();
        loop {
            let batch = self.read_batch(batch_size).await;
            if batch.is_empty() {
                return rows;
            }
            rows.extend(batch);
        }
    }
}
