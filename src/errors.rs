use crate::types::Money;

/// A decimal amount string could not be converted into sub-units
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The input was not of the form `digits[.digits]` with one or two fractional digits
    #[error("malformed amount; expected digits with up to two decimal places")]
    Malformed,
    /// The value is too large to count in sub-units
    #[error("amount exceeds the representable range")]
    Overflow,
}

/// Arithmetic on sub-unit amounts left the representable range
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[error("amount arithmetic exceeds the representable range")]
pub struct OverflowError;

/// Error type returned when a ledger operation is rejected.
///
/// The ledger is left unchanged whenever one of these is returned.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// Deposits and withdrawals must move a strictly positive amount
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    /// A withdrawal asked for more than the account holds
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The amount the withdrawal asked for
        requested: Money,
        /// The balance at the time of the request
        available: Money,
    },
    /// Applying the amount would overflow the balance
    #[error(transparent)]
    Overflow(#[from] OverflowError),
}

/// Error type for reading or writing the persisted ledger files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A ledger file could not be opened, read or written
    #[error("error accessing ledger file")]
    Io(#[from] std::io::Error),
    /// Error emitting the CSV log
    #[error("error writing CSV")]
    Csv(#[from] csv::Error),
}
