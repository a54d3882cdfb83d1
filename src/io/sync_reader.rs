//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over participant or expense rows from a CSV
//! file. Delegates CSV format concerns to the csv_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize CSV records
//! sequentially, delegating conversion to the `CsvRow` implementation of the
//! requested type. Records are processed one at a time without loading the
//! entire file into memory.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<T, SettlementError>` for each CSV row:
//!
//! ```no_run
//! use expense_settlement_engine::io::sync_reader::SyncReader;
//! use expense_settlement_engine::types::Expense;
//! use std::path::Path;
//!
//! let reader = SyncReader::<Expense>::new(Path::new("expenses.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(expense) => println!("Read expense: {:?}", expense),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants carrying the line number

use crate::io::csv_format::CsvRow;
use crate::types::SettlementError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::marker::PhantomData;
use std::path::Path;

/// Synchronous CSV reader
///
/// Provides an iterator interface over rows of type `T`.
#[derive(Debug)]
pub struct SyncReader<T: CsvRow> {
    reader: csv::Reader<File>,
    line_num: u64,
    _row: PhantomData<T>,
}

impl<T: CsvRow> SyncReader<T> {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (for trailing optional columns)
    /// - Use an 8KB buffer for efficient I/O
    ///
    /// # Errors
    ///
    /// `FileNotFound` or `IoError` if the file could not be opened.
    pub fn new(path: &Path) -> Result<Self, SettlementError> {
        let file = File::open(path).map_err(|e| SettlementError::open_failed(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
            _row: PhantomData,
        })
    }

    /// File line of the most recently yielded row
    ///
    /// Line 1 is the header, so the first data row is line 2.
    pub fn line(&self) -> u64 {
        self.line_num + 1
    }
}

impl<T: CsvRow> Iterator for SyncReader<T> {
    type Item = Result<T, SettlementError>;

    /// Get the next row from the CSV file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(T))` - Successfully parsed row
    /// * `Some(Err(SettlementError))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<T::Record>();
        let next = deserializer.next()?;

        self.line_num += 1;
        let line = self.line();

        Some(match next {
            Ok(record) => T::from_record(record).map_err(|e| e.at_line(line)),
            Err(e) => Err(SettlementError::ParseError {
                line: Some(line),
                message: e.to_string(),
            }),
        })
    }
}
