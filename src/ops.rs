use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    errors::LedgerError,
    types::{Ledger, Money, Transaction, TxKind},
};

/// Seconds since the Unix epoch, or zero if the clock predates it
fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

impl Ledger {
    /// Adds funds to the account and records a deposit transaction.
    ///
    /// Returns the recorded transaction.
    /// # Errors
    /// [`LedgerError::NonPositiveAmount`] unless `amount > 0`,
    /// [`LedgerError::Overflow`] if the balance would leave the
    /// representable range. The ledger is unchanged on error.
    pub fn deposit(&mut self, amount: Money) -> Result<Transaction, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount);
        }
        self.balance = self.balance.checked_add(amount)?;
        Ok(self.record(TxKind::Deposit, amount))
    }

    /// Removes funds from the account and records a withdrawal transaction.
    ///
    /// Returns the recorded transaction.
    /// # Errors
    /// [`LedgerError::NonPositiveAmount`] unless `amount > 0`,
    /// [`LedgerError::InsufficientFunds`] if `amount` exceeds the balance.
    /// The ledger is unchanged on error.
    pub fn withdraw(&mut self, amount: Money) -> Result<Transaction, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount);
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        self.balance = self.balance.checked_sub(amount)?;
        Ok(self.record(TxKind::Withdraw, amount))
    }

    /// Stamps and appends a transaction for the balance just applied
    fn record(&mut self, kind: TxKind, amount: Money) -> Transaction {
        let transaction = Transaction {
            kind,
            amount,
            balance_after: self.balance,
            timestamp: unix_now(),
        };
        self.push_bounded(transaction);
        transaction
    }

    /// Appends a transaction, evicting the oldest entry first when the
    /// history bound would be exceeded
    pub(crate) fn push_bounded(&mut self, transaction: Transaction) {
        if let Some(max) = self.max_history {
            while self.history.len() >= max {
                self.history.pop_front();
            }
        }
        self.history.push_back(transaction);
    }

    /// Rebuilds a ledger from decoded transactions.
    ///
    /// The balance is taken from the last transaction's `balance_after`;
    /// `explicit_balance` is kept only when no transactions were decoded.
    /// The history bound applies to restored entries the same way it applies
    /// to recorded ones.
    pub(crate) fn restore(
        transactions: Vec<Transaction>,
        explicit_balance: Money,
        max_history: Option<usize>,
    ) -> Self {
        let mut ledger = Ledger {
            balance: explicit_balance,
            max_history,
            ..Ledger::default()
        };
        for transaction in transactions {
            ledger.balance = transaction.balance_after;
            ledger.push_bounded(transaction);
        }
        ledger
    }
}
