//! Reading and writing the on-disk transaction history.
//!
//! Two formats are kept side by side: the CSV log described by [`CSV_HEADER`]
//! and the JSON snapshot from [`crate::json`]. [`Store`] owns the load/save
//! policy between them: the JSON snapshot is preferred on load, the CSV log
//! is the fallback, and both are rewritten on save.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use csv::Trim;
use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    json,
    types::{Ledger, Money, Transaction, TxKind},
};

/// Default CSV log file name
pub const CSV_PATH: &str = "transactions.csv";
/// Default JSON snapshot file name
pub const JSON_PATH: &str = "transactions.json";

/// Column names of the CSV log, in on-disk order
pub const CSV_HEADER: [&str; 4] = ["type", "amount_cents", "balance_after", "timestamp"];

/// One row of the CSV log. All fields are integers, so no quoting or
/// escaping is ever needed.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "type")]
    kind: i64,
    amount_cents: i64,
    balance_after: i64,
    timestamp: i64,
}

impl From<&Transaction> for CsvRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            kind: tx.kind().code(),
            amount_cents: tx.amount().subunits(),
            balance_after: tx.balance_after().subunits(),
            timestamp: tx.timestamp(),
        }
    }
}

/// Writes the ledger as a CSV log: the [`CSV_HEADER`] line, then one line
/// per transaction.
///
/// The header is written even for an empty ledger, so the output is always
/// recognizable on re-load.
/// # Errors
/// [`Error::Csv`] or [`Error::Io`] if the writer fails
pub fn write_ledger_csv<W: Write>(writer: &mut W, ledger: &Ledger) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for tx in ledger.history() {
        csv_writer.serialize(CsvRow::from(tx))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Reads a ledger back from a CSV log, best-effort.
///
/// A leading header line is skipped when present; a file written without one
/// is read the same way. Each remaining line must carry at least four
/// comma-separated fields, of which the first four must be integers with a
/// known kind tag; lines that do not are skipped silently. The balance is
/// the `balance_after` of the last accepted row, or zero when none.
#[must_use]
pub fn read_ledger_csv<R: Read>(reader: &mut R, max_history: Option<usize>) -> Ledger {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut transactions = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        // Unreadable lines are skipped, same as unparseable ones
        let Ok(record) = record else { continue };
        if index == 0 && record.get(0) == Some(CSV_HEADER[0]) {
            continue;
        }
        if let Some(transaction) = parse_row(&record) {
            transactions.push(transaction);
        }
    }
    Ledger::restore(transactions, Money::ZERO, max_history)
}

/// Extracts one transaction from a CSV record, if its first four fields
/// hold a known kind tag and three integers
fn parse_row(record: &csv::StringRecord) -> Option<Transaction> {
    if record.len() < 4 {
        return None;
    }
    let field = |index: usize| record.get(index).and_then(|f| f.parse::<i64>().ok());
    Some(Transaction {
        kind: TxKind::from_code(field(0)?)?,
        amount: Money::from(field(1)?),
        balance_after: Money::from(field(2)?),
        timestamp: field(3)?,
    })
}

/// Where the ledger lives on disk, and how much history to keep in memory.
///
/// The history bound is part of the store configuration so that a loaded
/// ledger and a freshly recorded one obey the same cap, and the persisted
/// files never hold more entries than a session would retain.
#[derive(Debug, Clone)]
pub struct Store {
    csv_path: PathBuf,
    json_path: PathBuf,
    max_history: Option<usize>,
}

impl Default for Store {
    /// A store over [`CSV_PATH`] and [`JSON_PATH`] in the current directory,
    /// with unbounded history
    fn default() -> Self {
        Self {
            csv_path: CSV_PATH.into(),
            json_path: JSON_PATH.into(),
            max_history: None,
        }
    }
}

impl Store {
    /// Creates a store over the default file names in the current directory
    #[must_use]
    pub fn new() -> Self {
        Store::default()
    }

    /// Creates a store over the default file names inside `dir`
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            csv_path: dir.join(CSV_PATH),
            json_path: dir.join(JSON_PATH),
            max_history: None,
        }
    }

    /// Caps the in-memory history of loaded and recorded ledgers at `max`
    /// entries, evicting oldest-first. See [`Ledger::with_max_history`] for
    /// the audit-loss semantics.
    #[must_use]
    pub fn with_max_history(mut self, max: usize) -> Self {
        self.max_history = Some(max.max(1));
        self
    }

    /// Loads the ledger from disk.
    ///
    /// The JSON snapshot is preferred; if it cannot be read the CSV log is
    /// tried; if neither can, an empty ledger is returned. Decoding itself
    /// is best-effort and cannot fail, so only read errors cause fallback.
    /// Missing files are expected on first run; other read errors are
    /// logged at warn level.
    #[must_use]
    pub fn load(&self) -> Ledger {
        match std::fs::read_to_string(&self.json_path) {
            Ok(document) => {
                log::info!("loading history from {}", self.json_path.display());
                return json::read_ledger(&document, self.max_history);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("could not read {}: {err}", self.json_path.display()),
        }
        match File::open(&self.csv_path) {
            Ok(file) => {
                log::info!("loading history from {}", self.csv_path.display());
                return read_ledger_csv(&mut BufReader::new(file), self.max_history);
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => log::warn!("could not read {}: {err}", self.csv_path.display()),
        }
        log::info!("no previous history found, starting empty");
        match self.max_history {
            Some(max) => Ledger::with_max_history(max),
            None => Ledger::new(),
        }
    }

    /// Writes the ledger to both formats.
    ///
    /// A failure writing one format is logged at warn level and does not
    /// stop the other write; the last failure is returned after both were
    /// attempted, so callers can still tell something went wrong.
    /// # Errors
    /// [`Error::Io`] or [`Error::Csv`] from whichever write failed last
    pub fn save(&self, ledger: &Ledger) -> Result<(), Error> {
        let mut result = Ok(());
        if let Err(err) = self.save_csv(ledger) {
            log::warn!("failed to write {}: {err}", self.csv_path.display());
            result = Err(err);
        }
        if let Err(err) = self.save_json(ledger) {
            log::warn!("failed to write {}: {err}", self.json_path.display());
            result = Err(err);
        }
        result
    }

    fn save_csv(&self, ledger: &Ledger) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(&self.csv_path)?);
        write_ledger_csv(&mut file, ledger)?;
        file.flush()?;
        Ok(())
    }

    fn save_json(&self, ledger: &Ledger) -> Result<(), Error> {
        let mut file = BufWriter::new(File::create(&self.json_path)?);
        json::write_ledger(&mut file, ledger)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.deposit(Money::from(10000)).unwrap();
        ledger.withdraw(Money::from(4050)).unwrap();
        ledger
    }

    fn tuples(ledger: &Ledger) -> Vec<(TxKind, i64, i64, i64)> {
        ledger
            .history()
            .map(|tx| {
                (
                    tx.kind(),
                    tx.amount().subunits(),
                    tx.balance_after().subunits(),
                    tx.timestamp(),
                )
            })
            .collect()
    }

    #[test]
    fn test_write_emits_header_and_rows() {
        let mut output = Vec::new();
        let ledger = Ledger::restore(
            vec![Transaction {
                kind: TxKind::Deposit,
                amount: Money::from(5000),
                balance_after: Money::from(5000),
                timestamp: 1_700_000_000,
            }],
            Money::ZERO,
            None,
        );
        write_ledger_csv(&mut output, &ledger).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "type,amount_cents,balance_after,timestamp\n1,5000,5000,1700000000\n"
        );
    }

    #[test]
    fn test_write_empty_ledger_is_header_only() {
        let mut output = Vec::new();
        write_ledger_csv(&mut output, &Ledger::new()).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "type,amount_cents,balance_after,timestamp\n"
        );
    }

    #[test]
    fn test_csv_round_trip() {
        for ledger in [Ledger::new(), sample_ledger()] {
            let mut encoded = Vec::new();
            write_ledger_csv(&mut encoded, &ledger).unwrap();
            let decoded = read_ledger_csv(&mut Cursor::new(&encoded), None);
            assert_eq!(decoded.balance(), ledger.balance());
            assert_eq!(tuples(&decoded), tuples(&ledger));
        }
    }

    #[test]
    fn test_read_tolerates_missing_header() {
        let data = b"1,10000,10000,1700000000\n2,4050,5950,1700000100\n";
        let ledger = read_ledger_csv(&mut Cursor::new(&data[..]), None);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.balance(), Money::from(5950));
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let data = b"type,amount_cents,balance_after,timestamp\n\
            1,10000,10000,1700000000\n\
            not,a,valid,row\n\
            2,4050\n\
            9,1,1,1\n\
            2,4050,5950,1700000100\n";
        let ledger = read_ledger_csv(&mut Cursor::new(&data[..]), None);
        assert_eq!(
            tuples(&ledger),
            vec![
                (TxKind::Deposit, 10000, 10000, 1_700_000_000),
                (TxKind::Withdraw, 4050, 5950, 1_700_000_100),
            ]
        );
        assert_eq!(ledger.balance(), Money::from(5950));
    }

    #[test]
    fn test_read_uses_first_four_of_longer_rows() {
        let data = b"1,10000,10000,1700000000,extra,fields\n";
        let ledger = read_ledger_csv(&mut Cursor::new(&data[..]), None);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.balance(), Money::from(10000));
    }

    #[test]
    fn test_read_empty_input_is_empty_ledger() {
        let ledger = read_ledger_csv(&mut Cursor::new(&b""[..]), None);
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance(), Money::ZERO);
    }

    #[test]
    fn test_store_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::in_dir(dir.path());
        store.save(&sample_ledger()).unwrap();
        assert!(dir.path().join(CSV_PATH).exists());
        assert!(dir.path().join(JSON_PATH).exists());
    }

    #[test]
    fn test_store_prefers_json_then_csv_then_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::in_dir(dir.path());
        let ledger = sample_ledger();
        store.save(&ledger).unwrap();

        // Both files present: the JSON snapshot wins
        let loaded = store.load();
        assert_eq!(loaded.balance().to_string(), "59.50");
        assert_eq!(loaded.len(), 2);
        assert_eq!(tuples(&loaded), tuples(&ledger));

        // JSON only
        std::fs::remove_file(dir.path().join(CSV_PATH)).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.balance().to_string(), "59.50");
        assert_eq!(loaded.len(), 2);

        // CSV only
        store.save(&ledger).unwrap();
        std::fs::remove_file(dir.path().join(JSON_PATH)).unwrap();
        let loaded = store.load();
        assert_eq!(loaded.balance().to_string(), "59.50");
        assert_eq!(loaded.len(), 2);
        assert_eq!(tuples(&loaded), tuples(&ledger));

        // Neither
        std::fs::remove_file(dir.path().join(CSV_PATH)).unwrap();
        let loaded = store.load();
        assert!(loaded.is_empty());
        assert_eq!(loaded.balance(), Money::ZERO);
    }

    #[test]
    fn test_store_applies_history_bound_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::new();
        for amount in [100, 200, 300] {
            ledger.deposit(Money::from(amount)).unwrap();
        }
        Store::in_dir(dir.path()).save(&ledger).unwrap();

        let loaded = Store::in_dir(dir.path()).with_max_history(2).load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.balance(), Money::from(600));
    }

    #[test]
    fn test_save_reports_failure_but_attempts_both() {
        let dir = tempfile::tempdir().unwrap();
        // Point the CSV at a path that cannot be created
        let store = Store {
            csv_path: dir.path().join("missing").join(CSV_PATH),
            json_path: dir.path().join(JSON_PATH),
            max_history: None,
        };
        assert!(store.save(&sample_ledger()).is_err());
        // The JSON write still happened
        assert!(dir.path().join(JSON_PATH).exists());
    }
}
