//! CSV format handling for ledger input and settlement output
//!
//! This module centralizes all CSV format concerns, providing:
//! - Row structures for participant and expense deserialization
//! - Conversion from CSV rows to domain types
//! - Settlement output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    Expense, ExpenseId, Participant, ParticipantId, SettlementConfig, SettlementError,
    SettlementTransaction,
};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::str::FromStr;

/// CSV row for the participants file
///
/// Columns: `id,name`. A missing or empty name falls back to the id.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ParticipantCsvRecord {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: Option<String>,
}

/// CSV row for the expenses file
///
/// Columns: `id,name,amount,payer,contributors`. Everything after `amount`
/// may be empty; `contributors` holds ids separated by `;` or whitespace.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExpenseCsvRecord {
    pub id: ExpenseId,
    #[serde(default)]
    pub name: Option<String>,
    pub amount: String,
    #[serde(default)]
    pub payer: Option<String>,
    #[serde(default)]
    pub contributors: Option<String>,
}

/// A domain type that can be read from one CSV row
///
/// Lets the sync and async readers share one implementation for both
/// input files.
pub trait CsvRow: Sized + Send + 'static {
    /// The raw row as deserialized by serde
    type Record: DeserializeOwned + Send + 'static;

    /// Convert a raw row into the domain type
    fn from_record(record: Self::Record) -> Result<Self, SettlementError>;
}

impl CsvRow for Participant {
    type Record = ParticipantCsvRecord;

    fn from_record(record: Self::Record) -> Result<Self, SettlementError> {
        Ok(convert_participant_record(record))
    }
}

impl CsvRow for Expense {
    type Record = ExpenseCsvRecord;

    fn from_record(record: Self::Record) -> Result<Self, SettlementError> {
        convert_expense_record(record)
    }
}

/// Convert a ParticipantCsvRecord to a Participant
pub fn convert_participant_record(record: ParticipantCsvRecord) -> Participant {
    match record.name {
        Some(name) if !name.trim().is_empty() => Participant::new(record.id, name.trim()),
        _ => Participant::unnamed(record.id),
    }
}

/// Convert an ExpenseCsvRecord to an Expense
///
/// This function:
/// - Parses the amount string into a Decimal
/// - Parses the optional payer id; an empty field leaves the expense without payer
/// - Splits the contributor list on `;` and whitespace and parses every id
///
/// Negative amounts are accepted here; rejecting them is the ledger's job.
///
/// # Errors
///
/// * `InvalidAmount` if the amount is empty or not a decimal number
/// * `InvalidParticipantId` if the payer or a contributor is not a valid id
pub fn convert_expense_record(record: ExpenseCsvRecord) -> Result<Expense, SettlementError> {
    let amount = Decimal::from_str(record.amount.trim())
        .map_err(|_| SettlementError::invalid_amount(&record.amount, record.id))?;

    let payer = match record.payer.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(parse_participant_id(value, record.id)?),
        _ => None,
    };

    let contributors = record
        .contributors
        .as_deref()
        .unwrap_or_default()
        .split(|c: char| c == ';' || c.is_whitespace())
        .filter(|value| !value.is_empty())
        .map(|value| parse_participant_id(value, record.id))
        .collect::<Result<Vec<_>, _>>()?;

    let mut expense = Expense::new(record.id, amount).shared_by(contributors);
    expense.payer = payer;
    if let Some(name) = record.name {
        expense = expense.described(name.trim());
    }

    Ok(expense)
}

fn parse_participant_id(value: &str, expense: ExpenseId) -> Result<ParticipantId, SettlementError> {
    value
        .parse::<ParticipantId>()
        .map_err(|_| SettlementError::invalid_participant_id(value, expense))
}

/// Round an amount for display
///
/// Rounds half away from zero to `precision` places and always prints
/// exactly that many decimals.
pub fn format_amount(amount: Decimal, precision: u32) -> String {
    let rounded = amount.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", precision as usize, rounded)
}

/// Write settlement transactions to CSV format
///
/// Writes one row per transaction with columns: from, to, amount, keeping
/// the order the matcher produced them in. With `show_names` set, payer and
/// receiver are printed by name; ids without a known name are printed as-is.
///
/// # Arguments
///
/// * `transactions` - Settlement transactions to write
/// * `participants` - Known participants, used for name lookup
/// * `config` - Output precision and naming options
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Errors
///
/// Returns `SettlementError::Output` if a write error occurred.
pub fn write_settlements_csv(
    transactions: &[SettlementTransaction],
    participants: &[Participant],
    config: &SettlementConfig,
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    use csv::Writer;

    let names: HashMap<ParticipantId, &str> = if config.show_names {
        participants.iter().map(|p| (p.id, p.name.as_str())).collect()
    } else {
        HashMap::new()
    };
    let label = |id: ParticipantId| {
        names
            .get(&id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| id.to_string())
    };

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["from", "to", "amount"])
        .map_err(|e| SettlementError::output(format!("Failed to write CSV header: {}", e)))?;

    for transaction in transactions {
        writer
            .write_record(&[
                label(transaction.from),
                label(transaction.to),
                format_amount(transaction.amount, config.precision),
            ])
            .map_err(|e| {
                SettlementError::output(format!("Failed to write settlement record: {}", e))
            })?;
    }

    writer
        .flush()
        .map_err(|e| SettlementError::output(format!("Failed to flush output: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn record(amount: &str, payer: Option<&str>, contributors: Option<&str>) -> ExpenseCsvRecord {
        ExpenseCsvRecord {
            id: 1,
            name: Some("Dinner".to_string()),
            amount: amount.to_string(),
            payer: payer.map(str::to_string),
            contributors: contributors.map(str::to_string),
        }
    }

    #[rstest]
    #[case::semicolons("1;2;3", &[1, 2, 3])]
    #[case::spaces("1 2 3", &[1, 2, 3])]
    #[case::mixed("3; 1  2", &[1, 2, 3])]
    #[case::duplicates("2;2;1", &[1, 2])]
    #[case::trailing_separator("1;2;", &[1, 2])]
    fn test_convert_expense_contributors(#[case] contributors: &str, #[case] expected: &[u32]) {
        let expense = convert_expense_record(record("30", Some("1"), Some(contributors))).unwrap();

        let expected: BTreeSet<ParticipantId> = expected.iter().copied().collect();
        assert_eq!(expense.contributors, expected);
        assert_eq!(expense.payer, Some(1));
        assert_eq!(expense.description, "Dinner");
    }

    #[rstest]
    #[case::no_payer(None)]
    #[case::empty_payer(Some(""))]
    #[case::blank_payer(Some("   "))]
    fn test_convert_expense_without_payer(#[case] payer: Option<&str>) {
        let expense = convert_expense_record(record("30", payer, Some("1;2"))).unwrap();
        assert_eq!(expense.payer, None);
        assert!(!expense.is_settleable());
    }

    #[test]
    fn test_convert_expense_without_contributors() {
        let expense = convert_expense_record(record("30", Some("1"), None)).unwrap();
        assert!(expense.contributors.is_empty());
    }

    #[rstest]
    #[case("  100.0  ", Decimal::new(1000, 1))]
    #[case("33.333", Decimal::new(33333, 3))]
    #[case("-5", Decimal::new(-5, 0))]
    fn test_convert_expense_amount_parsing(#[case] amount: &str, #[case] expected: Decimal) {
        let expense = convert_expense_record(record(amount, Some("1"), Some("1"))).unwrap();
        assert_eq!(expense.amount, expected);
    }

    #[rstest]
    #[case::bad_amount(record("abc", Some("1"), Some("1")), "Invalid amount 'abc'")]
    #[case::empty_amount(record("", Some("1"), Some("1")), "Invalid amount")]
    #[case::bad_payer(record("10", Some("x"), Some("1")), "Invalid participant id 'x'")]
    #[case::negative_payer(record("10", Some("-1"), Some("1")), "Invalid participant id '-1'")]
    #[case::bad_contributor(record("10", Some("1"), Some("1;two")), "Invalid participant id 'two'")]
    fn test_convert_expense_errors(#[case] row: ExpenseCsvRecord, #[case] expected: &str) {
        let error = convert_expense_record(row).unwrap_err();
        assert!(error.to_string().contains(expected), "{}", error);
    }

    #[rstest]
    #[case::named(Some("Dang"), "Dang")]
    #[case::trimmed(Some("  Vinh "), "Vinh")]
    #[case::empty(Some(""), "7")]
    #[case::missing(None, "7")]
    fn test_convert_participant_record(#[case] name: Option<&str>, #[case] expected: &str) {
        let participant = convert_participant_record(ParticipantCsvRecord {
            id: 7,
            name: name.map(str::to_string),
        });
        assert_eq!(participant.id, 7);
        assert_eq!(participant.name, expected);
    }

    #[rstest]
    #[case(Decimal::new(3333, 2), 2, "33.33")]
    #[case(Decimal::new(100, 0) / Decimal::new(3, 0), 2, "33.33")]
    #[case(Decimal::new(200, 0) / Decimal::new(3, 0), 2, "66.67")]
    #[case(Decimal::new(5, 3), 2, "0.01")]
    #[case(Decimal::new(20, 0), 2, "20.00")]
    #[case(Decimal::new(125, 2), 1, "1.3")]
    #[case(Decimal::new(125, 2), 0, "1")]
    #[case(Decimal::new(7, 0), 4, "7.0000")]
    fn test_format_amount(#[case] amount: Decimal, #[case] precision: u32, #[case] expected: &str) {
        assert_eq!(format_amount(amount, precision), expected);
    }

    fn tx(from: ParticipantId, to: ParticipantId, amount: Decimal) -> SettlementTransaction {
        SettlementTransaction::new(from, to, amount)
    }

    #[rstest]
    #[case::empty(vec![], false, "from,to,amount\n")]
    #[case::keeps_matcher_order(
        vec![tx(3, 1, Decimal::new(40, 0)), tx(2, 1, Decimal::new(10, 0))],
        false,
        "from,to,amount\n3,1,40.00\n2,1,10.00\n"
    )]
    #[case::rounds_repeating_share(
        vec![tx(2, 1, Decimal::new(100, 0) / Decimal::new(3, 0))],
        false,
        "from,to,amount\n2,1,33.33\n"
    )]
    #[case::names(
        vec![tx(2, 1, Decimal::new(20, 0))],
        true,
        "from,to,amount\nVinh,Dang,20.00\n"
    )]
    #[case::unknown_name_falls_back_to_id(
        vec![tx(9, 1, Decimal::new(5, 0))],
        true,
        "from,to,amount\n9,Dang,5.00\n"
    )]
    fn test_write_settlements_csv(
        #[case] transactions: Vec<SettlementTransaction>,
        #[case] show_names: bool,
        #[case] expected_output: &str,
    ) {
        let participants = vec![Participant::new(1, "Dang"), Participant::new(2, "Vinh")];
        let config = SettlementConfig {
            show_names,
            ..SettlementConfig::default()
        };

        let mut output = Vec::new();
        write_settlements_csv(&transactions, &participants, &config, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_settlements_csv_quotes_names() {
        let participants = vec![Participant::new(1, "Lee, Ann"), Participant::new(2, "Bo")];
        let config = SettlementConfig {
            show_names: true,
            ..SettlementConfig::default()
        };

        let mut output = Vec::new();
        write_settlements_csv(
            &[tx(2, 1, Decimal::new(1, 0))],
            &participants,
            &config,
            &mut output,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "from,to,amount\nBo,\"Lee, Ann\",1.00\n"
        );
    }
}
