//! Minimal writer and reader for the JSON snapshot file.
//!
//! This is a format-specific codec, not a JSON library. The writer emits one
//! fixed document shape, and the reader recovers transactions from that shape
//! by scanning for known substrings instead of parsing. That keeps it
//! byte-compatible with previously written snapshots and tolerant of
//! whitespace differences, at the cost of assuming the documented key order.
//! Callers only see [`Ledger`] values, so the scanner can be swapped for a
//! real parser later without touching the rest of the crate.
//!
//! The document shape:
//!
//! ```json
//! {
//!   "balance_cents": 5950,
//!   "transactions": [
//!     {"type": 1, "amount": 10000, "balance_after": 10000, "timestamp": 1700000000}
//!   ]
//! }
//! ```

use std::io::Write;

use crate::errors::Error;
use crate::types::{Ledger, Money, Transaction, TxKind};

const BALANCE_KEY: &str = "\"balance_cents\"";
const TX_MARKER: &str = "{\"type\"";

/// Writes the ledger as a JSON snapshot.
///
/// The output is byte-stable: re-encoding a decoded ledger reproduces the
/// same document, so snapshots written by older runs stay readable.
/// # Errors
/// [`Error::Io`] if the writer fails
pub fn write_ledger<W: Write>(writer: &mut W, ledger: &Ledger) -> Result<(), Error> {
    writeln!(writer, "{{")?;
    writeln!(
        writer,
        "  \"balance_cents\": {},",
        ledger.balance().subunits()
    )?;
    writeln!(writer, "  \"transactions\": [")?;
    let count = ledger.len();
    for (index, tx) in ledger.history().enumerate() {
        let separator = if index + 1 < count { "," } else { "" };
        writeln!(
            writer,
            "    {{\"type\": {}, \"amount\": {}, \"balance_after\": {}, \"timestamp\": {}}}{separator}",
            tx.kind().code(),
            tx.amount().subunits(),
            tx.balance_after().subunits(),
            tx.timestamp(),
        )?;
    }
    writeln!(writer, "  ]")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Reads a ledger back from a JSON snapshot document, best-effort.
///
/// The `"balance_cents"` value (minus sign allowed) is picked up textually;
/// each `{"type"` occurrence then yields a transaction from the next four
/// integers, in the documented field order, with any non-digit text accepted
/// between them. Occurrences that do not yield four in-range integers and a
/// known kind tag are skipped. The final balance comes from the last decoded
/// transaction, falling back to `"balance_cents"` when none decoded.
#[must_use]
pub fn read_ledger(document: &str, max_history: Option<usize>) -> Ledger {
    let explicit_balance = document
        .find(BALANCE_KEY)
        .and_then(|at| next_integer(&document[at + BALANCE_KEY.len()..]))
        .map_or(Money::ZERO, |(value, _)| Money::from(value));

    let mut transactions = Vec::new();
    let mut rest = document;
    while let Some(at) = rest.find(TX_MARKER) {
        // Always step past the marker so malformed documents still terminate
        let body = &rest[at + TX_MARKER.len()..];
        // Bound this object's scan at the next marker so a corrupt object
        // cannot swallow its successor's numbers
        let end = body.find(TX_MARKER).unwrap_or(body.len());
        if let Some(transaction) = parse_transaction(&body[..end]) {
            transactions.push(transaction);
        }
        rest = body;
    }
    Ledger::restore(transactions, explicit_balance, max_history)
}

/// Extracts one transaction from the text following a `{"type"` marker
fn parse_transaction(body: &str) -> Option<Transaction> {
    let (code, body) = next_integer(body)?;
    let (amount, body) = next_integer(body)?;
    let (balance_after, body) = next_integer(body)?;
    let (timestamp, _) = next_integer(body)?;
    Some(Transaction {
        kind: TxKind::from_code(code)?,
        amount: Money::from(amount),
        balance_after: Money::from(balance_after),
        timestamp,
    })
}

/// Skips ahead to the next integer (optionally `-`-signed) and parses it,
/// returning the value and the text after it. A `-` only counts as a sign
/// when a digit follows it directly.
fn next_integer(text: &str) -> Option<(i64, &str)> {
    let bytes = text.as_bytes();
    let mut start = 0;
    loop {
        let byte = *bytes.get(start)?;
        if byte.is_ascii_digit() {
            break;
        }
        if byte == b'-' && bytes.get(start + 1).is_some_and(u8::is_ascii_digit) {
            break;
        }
        start += 1;
    }
    let mut end = start + 1;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let value = text[start..end].parse().ok()?;
    Some((value, &text[end..]))
}
