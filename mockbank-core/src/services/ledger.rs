//! Ledger service - validates and applies deposits, withdrawals and transfers
//!
//! Every operation follows the same shape: validate the raw input, load one
//! snapshot of the collection, derive balances from that snapshot, append,
//! then commit the whole collection with a compare-and-swap against the
//! version that was read. Any failure before the commit leaves the store
//! untouched; a lost race surfaces as `Error::ConcurrentModification`.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{
    parse_amount, reference_for_millis, validate_pin, OperationKind, Session, Transaction,
    TransactionKind, User,
};
use crate::ports::{find_user, index_of_user, StoreSnapshot, UserStore};

/// Ledger service for balance-changing operations
pub struct LedgerService {
    store: Arc<dyn UserStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Apply a deposit or withdrawal to the session account
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// amount, PIN shape, account, PIN match, funds.
    pub fn apply_operation(
        &self,
        session: &Session,
        kind: OperationKind,
        amount_input: &str,
        pin_input: &str,
    ) -> Result<Transaction> {
        let amount = parse_amount(amount_input)?;
        validate_pin(pin_input)?;

        let StoreSnapshot { mut users, version } = self.store.load_snapshot()?;
        let index = index_of_user(&users, session.account_number())
            .ok_or_else(|| Error::UnknownAccount(session.account_number().to_string()))?;
        authenticate(&users[index], pin_input)?;

        let kind = TransactionKind::from(kind);
        let balance_before = users[index].current_balance();
        if !kind.is_credit() && amount > balance_before {
            return Err(Error::InsufficientFunds);
        }

        let now = Utc::now();
        let mut references = ReferenceAllocator::new(&users);
        let tx = Transaction::record(kind, amount, balance_before, now, references.next(now))
            .ok_or(Error::InvalidAmount)?;

        users[index].transactions.push(tx.clone());
        self.store.save_if_unchanged(&users, &version)?;

        Ok(tx)
    }

    /// Move funds from the session account to `to_account`
    ///
    /// Returns the sender's entry. Both legs are committed in a single write.
    pub fn transfer(
        &self,
        session: &Session,
        to_account: &str,
        amount_input: &str,
        pin_input: &str,
    ) -> Result<Transaction> {
        let amount = parse_amount(amount_input)?;
        validate_pin(pin_input)?;

        let StoreSnapshot { mut users, version } = self.store.load_snapshot()?;
        let from = index_of_user(&users, session.account_number())
            .ok_or_else(|| Error::UnknownAccount(session.account_number().to_string()))?;
        authenticate(&users[from], pin_input)?;

        let to = index_of_user(&users, to_account)
            .ok_or_else(|| Error::UnknownAccount(to_account.to_string()))?;
        if from == to {
            return Err(Error::validation("Cannot transfer to the same account"));
        }

        let sender_before = users[from].current_balance();
        if amount > sender_before {
            return Err(Error::InsufficientFunds);
        }
        let recipient_before = users[to].current_balance();

        let now = Utc::now();
        let mut references = ReferenceAllocator::new(&users);
        let outgoing = Transaction::record(
            TransactionKind::TransferOut,
            amount,
            sender_before,
            now,
            references.next(now),
        )
        .ok_or(Error::InvalidAmount)?
        .with_counterparty(users[to].account_number.clone());
        let incoming = Transaction::record(
            TransactionKind::TransferIn,
            amount,
            recipient_before,
            now,
            references.next(now),
        )
        .ok_or(Error::InvalidAmount)?
        .with_counterparty(users[from].account_number.clone());

        users[from].transactions.push(outgoing.clone());
        users[to].transactions.push(incoming);
        self.store.save_if_unchanged(&users, &version)?;

        Ok(outgoing)
    }

    /// `apply_operation` for a caller that may not be logged in
    ///
    /// Input errors still come first; a missing session is reported
    /// where the account would be resolved.
    pub fn apply_operation_as(
        &self,
        session: Option<&Session>,
        kind: OperationKind,
        amount_input: &str,
        pin_input: &str,
    ) -> Result<Transaction> {
        parse_amount(amount_input)?;
        validate_pin(pin_input)?;
        let session = session.ok_or(Error::NoActiveSession)?;
        self.apply_operation(session, kind, amount_input, pin_input)
    }

    /// `transfer` for a caller that may not be logged in
    pub fn transfer_as(
        &self,
        session: Option<&Session>,
        to_account: &str,
        amount_input: &str,
        pin_input: &str,
    ) -> Result<Transaction> {
        parse_amount(amount_input)?;
        validate_pin(pin_input)?;
        let session = session.ok_or(Error::NoActiveSession)?;
        self.transfer(session, to_account, amount_input, pin_input)
    }

    /// Current balance of the session account
    pub fn balance(&self, session: &Session) -> Result<i64> {
        Ok(self.session_user(session)?.current_balance())
    }

    /// Ledger of the session account, oldest first
    pub fn history(&self, session: &Session) -> Result<Vec<Transaction>> {
        Ok(self.session_user(session)?.transactions)
    }

    fn session_user(&self, session: &Session) -> Result<User> {
        let users = self.store.load_all()?;
        find_user(&users, session.account_number())
            .cloned()
            .ok_or_else(|| Error::UnknownAccount(session.account_number().to_string()))
    }
}

fn authenticate(user: &User, pin: &str) -> Result<()> {
    if user.pin_matches(pin) {
        Ok(())
    } else {
        Err(Error::AuthenticationFailed)
    }
}

/// Hands out `TR<millis>` references not yet used anywhere in the collection
struct ReferenceAllocator {
    taken: HashSet<String>,
}

impl ReferenceAllocator {
    fn new(users: &[User]) -> Self {
        let taken = users
            .iter()
            .flat_map(|u| u.transactions.iter().map(|tx| tx.reference.clone()))
            .collect();
        Self { taken }
    }

    fn next(&mut self, at: DateTime<Utc>) -> String {
        let mut millis = at.timestamp_millis();
        loop {
            let reference = reference_for_millis(millis);
            if self.taken.insert(reference.clone()) {
                return reference;
            }
            millis += 1;
        }
    }
}
