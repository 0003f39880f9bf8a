//! Common datatypes supporting functions throughout Passbook

use std::{collections::VecDeque, fmt::Display};

use crate::errors::{OverflowError, ParseError};

/// The number of sub-units (cents) in one whole currency unit
pub const SUBUNITS_PER_UNIT: i64 = 100;

/// An exact amount of money, counted in the smallest currency unit (cents).
///
/// Amounts are never stored or compared as floating point; parsing and
/// formatting go directly between decimal strings and integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl From<i64> for Money {
    fn from(subunits: i64) -> Self {
        Self(subunits)
    }
}

impl Money {
    /// Zero cents
    pub const ZERO: Money = Money(0);

    /// Returns the raw sub-unit (cent) count
    #[must_use]
    #[inline]
    pub fn subunits(self) -> i64 {
        self.0
    }

    /// Returns whether the amount is strictly greater than zero
    #[must_use]
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parses a decimal string such as `123`, `123.4` or `123.45` into cents.
    ///
    /// Leading and trailing ASCII whitespace is ignored. The integer digit
    /// run must be non-empty, and when a `.` is present it must be followed
    /// by exactly one or two digits; a single fractional digit is scaled by
    /// ten (`12.3` parses as 1230 cents). Negative inputs are rejected here.
    ///
    /// # Errors
    /// [`ParseError::Malformed`] for anything outside that grammar,
    /// [`ParseError::Overflow`] when the cent count does not fit in an `i64`.
    pub fn parse_decimal(text: &str) -> Result<Self, ParseError> {
        let text = text.trim_matches(|c: char| c.is_ascii_whitespace());
        if text.is_empty() || text.starts_with('-') {
            return Err(ParseError::Malformed);
        }
        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (text, None),
        };
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::Malformed);
        }
        let units: i64 = whole.parse().map_err(|_| ParseError::Overflow)?;
        let cents = match fraction {
            None => 0,
            Some(digits)
                if matches!(digits.len(), 1 | 2)
                    && digits.bytes().all(|b| b.is_ascii_digit()) =>
            {
                let cents: i64 = digits.parse().map_err(|_| ParseError::Malformed)?;
                if digits.len() == 1 {
                    cents * 10
                } else {
                    cents
                }
            }
            Some(_) => return Err(ParseError::Malformed),
        };
        units
            .checked_mul(SUBUNITS_PER_UNIT)
            .and_then(|subunits| subunits.checked_add(cents))
            .map(Money)
            .ok_or(ParseError::Overflow)
    }

    /// Adds two amounts, detecting overflow of the underlying integer.
    /// # Errors
    /// [`OverflowError`] if the sum leaves the representable range
    pub fn checked_add(self, other: Money) -> Result<Money, OverflowError> {
        self.0.checked_add(other.0).map(Money).ok_or(OverflowError)
    }

    /// Subtracts an amount, detecting overflow of the underlying integer.
    /// # Errors
    /// [`OverflowError`] if the difference leaves the representable range
    pub fn checked_sub(self, other: Money) -> Result<Money, OverflowError> {
        self.0.checked_sub(other.0).map(Money).ok_or(OverflowError)
    }
}

impl Display for Money {
    /// Renders the canonical decimal form: two fractional digits, `.` as the
    /// separator, and a single leading `-` for negative amounts.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        let per_unit = SUBUNITS_PER_UNIT as u64;
        write!(f, "{sign}{}.{:02}", magnitude / per_unit, magnitude % per_unit)
    }
}

/// The two operations a passbook account supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    /// Credit to the account
    Deposit,
    /// Debit from the account
    Withdraw,
}

impl TxKind {
    /// The numeric tag both on-disk formats use (1 = deposit, 2 = withdraw)
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            TxKind::Deposit => 1,
            TxKind::Withdraw => 2,
        }
    }

    /// Maps an on-disk numeric tag back to a kind, if it is one we know
    #[must_use]
    pub fn from_code(code: i64) -> Option<TxKind> {
        match code {
            1 => Some(TxKind::Deposit),
            2 => Some(TxKind::Withdraw),
            _ => None,
        }
    }
}

/// One applied operation on the account.
///
/// Transactions are created at the moment a deposit or withdrawal succeeds
/// and never mutated afterwards; `balance_after` is the running balance as
/// of this transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub(crate) kind: TxKind,
    pub(crate) amount: Money,
    pub(crate) balance_after: Money,
    pub(crate) timestamp: i64,
}

impl Transaction {
    /// Whether this was a deposit or a withdrawal
    #[must_use]
    #[inline]
    pub fn kind(&self) -> TxKind {
        self.kind
    }

    /// The (positive) amount moved
    #[must_use]
    #[inline]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// The account balance immediately after this transaction applied
    #[must_use]
    #[inline]
    pub fn balance_after(&self) -> Money {
        self.balance_after
    }

    /// When the transaction happened, in seconds since the Unix epoch
    #[must_use]
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// The ordered, balance-consistent record of all transactions for the
/// single account.
///
/// The balance always equals the `balance_after` of the most recent
/// transaction (or zero when the history is empty and nothing was restored
/// from disk). History is append-only during a session; the only removal is
/// oldest-entry eviction under an explicit [`Ledger::with_max_history`]
/// bound.
#[derive(Debug, Default)]
pub struct Ledger {
    pub(crate) balance: Money,
    pub(crate) history: VecDeque<Transaction>,
    pub(crate) max_history: Option<usize>,
}

impl Ledger {
    /// Creates an empty ledger with unbounded history
    #[must_use]
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Creates an empty ledger that retains at most `max` transactions.
    ///
    /// When recording would exceed the bound, the oldest entry is evicted
    /// first. Eviction discards audit history; the balance is tracked
    /// independently and is unaffected. A bound of zero is treated as one.
    #[must_use]
    pub fn with_max_history(max: usize) -> Self {
        Ledger {
            max_history: Some(max.max(1)),
            ..Ledger::default()
        }
    }

    /// Returns the current balance
    #[must_use]
    #[inline]
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Iterates the retained history in chronological order.
    ///
    /// The iterator borrows the ledger, so it can be restarted by calling
    /// this again.
    pub fn history(&self) -> impl Iterator<Item = &Transaction> {
        self.history.iter()
    }

    /// Number of retained transactions
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns whether any transactions are retained
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_units() {
        assert_eq!(Money::parse_decimal("12"), Ok(Money::from(1200)));
        assert_eq!(Money::parse_decimal("0"), Ok(Money::ZERO));
        assert_eq!(Money::parse_decimal("007"), Ok(Money::from(700)));
    }

    #[test]
    fn test_parse_fractional_digits() {
        // One fractional digit scales by ten
        assert_eq!(Money::parse_decimal("12.3"), Ok(Money::from(1230)));
        assert_eq!(Money::parse_decimal("12.34"), Ok(Money::from(1234)));
        assert_eq!(Money::parse_decimal("0.05"), Ok(Money::from(5)));
    }

    #[test]
    fn test_parse_trims_outer_whitespace_only() {
        assert_eq!(Money::parse_decimal("  100.50\t"), Ok(Money::from(10050)));
        assert_eq!(Money::parse_decimal("1 2"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("12 .3"), Err(ParseError::Malformed));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(Money::parse_decimal("-5"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("12.345"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("ab"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal(""), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("12."), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal(".5"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("1.2.3"), Err(ParseError::Malformed));
        assert_eq!(Money::parse_decimal("1,50"), Err(ParseError::Malformed));
    }

    #[test]
    fn test_parse_detects_overflow() {
        assert_eq!(
            Money::parse_decimal("99999999999999999999"),
            Err(ParseError::Overflow)
        );
        // i64::MAX cents is 92233720368547758.07 units; one unit more overflows
        assert_eq!(
            Money::parse_decimal("92233720368547758.07"),
            Ok(Money::from(i64::MAX))
        );
        assert_eq!(
            Money::parse_decimal("92233720368547759"),
            Err(ParseError::Overflow)
        );
    }

    #[test]
    fn test_format_is_canonical() {
        assert_eq!(Money::from(1230).to_string(), "12.30");
        assert_eq!(Money::from(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from(-5).to_string(), "-0.05");
        assert_eq!(Money::from(-12345).to_string(), "-123.45");
        assert_eq!(Money::from(i64::MIN).to_string(), "-92233720368547758.08");
    }

    #[test]
    fn test_parse_format_round_trip() {
        for text in ["0", "7", "12", "12.3", "12.34", "100.50", "0.05"] {
            let parsed = Money::parse_decimal(text).unwrap();
            let canonical = parsed.to_string();
            assert_eq!(Money::parse_decimal(&canonical), Ok(parsed));
            // Canonical form always carries exactly two fractional digits
            let (_, fraction) = canonical.split_once('.').unwrap();
            assert_eq!(fraction.len(), 2);
        }
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(
            Money::from(100).checked_add(Money::from(50)),
            Ok(Money::from(150))
        );
        assert_eq!(
            Money::from(100).checked_sub(Money::from(150)),
            Ok(Money::from(-50))
        );
        assert_eq!(
            Money::from(i64::MAX).checked_add(Money::from(1)),
            Err(OverflowError)
        );
        assert_eq!(
            Money::from(i64::MIN).checked_sub(Money::from(1)),
            Err(OverflowError)
        );
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(TxKind::from_code(1), Some(TxKind::Deposit));
        assert_eq!(TxKind::from_code(2), Some(TxKind::Withdraw));
        assert_eq!(TxKind::from_code(0), None);
        assert_eq!(TxKind::from_code(3), None);
        assert_eq!(TxKind::Deposit.code(), 1);
        assert_eq!(TxKind::Withdraw.code(), 2);
    }
}
