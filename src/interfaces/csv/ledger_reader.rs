use crate::domain::participant::ParticipantId;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Expense,
    Payment,
}

/// One row of a ledger CSV file.
///
/// Expenses leave `receiver` empty and are shared by everyone; payments
/// leave `description` empty.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct LedgerEntry {
    pub r#type: EntryType,
    pub payer: ParticipantId,
    pub receiver: Option<ParticipantId>,
    pub amount: Decimal,
    pub description: Option<String>,
}

/// Reads ledger entries from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<LedgerEntry>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct LedgerReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LedgerReader<R> {
    /// Creates a new `LedgerReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes entries.
    pub fn entries(self) -> impl Iterator<Item = Result<LedgerEntry>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reader_valid_stream() {
        let data = "type, payer, receiver, amount, description\n\
                    expense, 1, , 30.00, Team dinner\n\
                    payment, 2, 1, 10, ";
        let reader = LedgerReader::new(data.as_bytes());
        let results: Vec<Result<LedgerEntry>> = reader.entries().collect();

        assert_eq!(results.len(), 2);
        let expense = results[0].as_ref().unwrap();
        assert_eq!(expense.r#type, EntryType::Expense);
        assert_eq!(expense.payer, ParticipantId(1));
        assert_eq!(expense.receiver, None);
        assert_eq!(expense.amount, dec!(30));
        assert_eq!(expense.description.as_deref(), Some("Team dinner"));

        let payment = results[1].as_ref().unwrap();
        assert_eq!(payment.r#type, EntryType::Payment);
        assert_eq!(payment.receiver, Some(ParticipantId(1)));
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "type, payer, receiver, amount, description\n\
                    refund, 1, , 1.0, Oops\n\
                    expense, one, , 1.0, Typo";
        let reader = LedgerReader::new(data.as_bytes());
        let results: Vec<Result<LedgerEntry>> = reader.entries().collect();

        assert!(results[0].is_err());
        assert!(results[1].is_err());
    }
}
