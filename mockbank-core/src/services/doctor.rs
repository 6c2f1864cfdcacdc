//! Doctor service - integrity checks over the stored collection

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::{find_user, UserStore};

/// Doctor service for ledger health checks
pub struct DoctorService {
    store: Arc<dyn UserStore>,
}

impl DoctorService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Run all health checks
    ///
    /// Never modifies the store. An unreadable store is reported as a failed
    /// check rather than returned as an error; I/O failures still propagate.
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        let users = match self.store.load_all() {
            Ok(users) => {
                checks.insert(
                    "store_readable".to_string(),
                    CheckResult::pass(format!("{} account(s) loaded", users.len())),
                );
                users
            }
            Err(Error::CorruptStore(msg)) => {
                checks.insert(
                    "store_readable".to_string(),
                    CheckResult::error("Account store cannot be parsed", vec![json!({ "reason": msg })]),
                );
                return Ok(DoctorResult::from_checks(checks));
            }
            Err(e) => return Err(e),
        };

        checks.insert("unique_account_numbers".to_string(), check_unique_accounts(&users));
        checks.insert("ledger_continuity".to_string(), check_continuity(&users));
        checks.insert("ledger_arithmetic".to_string(), check_arithmetic(&users));
        checks.insert("unique_references".to_string(), check_unique_references(&users));

        let session = match self.store.load_session() {
            Ok(session) => check_session(&users, session.as_deref()),
            Err(Error::CorruptStore(msg)) => CheckResult::error(
                "Session file cannot be parsed",
                vec![json!({ "reason": msg })],
            ),
            Err(e) => return Err(e),
        };
        checks.insert("session".to_string(), session);

        Ok(DoctorResult::from_checks(checks))
    }
}

fn check_unique_accounts(users: &[User]) -> CheckResult {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for user in users {
        *counts.entry(user.account_number.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();

    if duplicates.is_empty() {
        CheckResult::pass("All account numbers are unique")
    } else {
        CheckResult::error(
            format!("{} account number(s) are used more than once", duplicates.len()),
            duplicates
                .into_iter()
                .map(|(account, count)| json!({ "account_number": account, "count": count }))
                .collect(),
        )
    }
}

/// Each entry must start where the previous one (or the opening balance) ended
fn check_continuity(users: &[User]) -> CheckResult {
    let mut breaks = Vec::new();
    for user in users {
        let mut expected = user.opening_balance;
        for (position, tx) in user.transactions.iter().enumerate() {
            if tx.balance_before != expected {
                breaks.push(json!({
                    "account_number": user.account_number,
                    "position": position,
                    "reference": tx.reference,
                    "expected_before": expected,
                    "actual_before": tx.balance_before,
                }));
            }
            expected = tx.balance_after;
        }
    }

    if breaks.is_empty() {
        CheckResult::pass("Every ledger chains from its opening balance")
    } else {
        CheckResult::error(format!("{} ledger break(s) found", breaks.len()), breaks)
    }
}

fn check_arithmetic(users: &[User]) -> CheckResult {
    let bad: Vec<_> = users
        .iter()
        .flat_map(|u| {
            u.transactions
                .iter()
                .filter(|tx| !tx.is_consistent())
                .map(move |tx| {
                    json!({
                        "account_number": u.account_number,
                        "reference": tx.reference,
                        "type": tx.kind.as_str(),
                    })
                })
        })
        .collect();

    if bad.is_empty() {
        CheckResult::pass("All entries add up")
    } else {
        CheckResult::error(format!("{} entr(ies) do not add up", bad.len()), bad)
    }
}

fn check_unique_references(users: &[User]) -> CheckResult {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tx in users.iter().flat_map(|u| u.transactions.iter()) {
        *counts.entry(tx.reference.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();

    if duplicates.is_empty() {
        CheckResult::pass("All transaction references are unique")
    } else {
        CheckResult::warning(
            format!("{} reference(s) are used more than once", duplicates.len()),
            duplicates
                .into_iter()
                .map(|(reference, count)| json!({ "reference": reference, "count": count }))
                .collect(),
        )
    }
}

fn check_session(users: &[User], session: Option<&str>) -> CheckResult {
    match session {
        None => CheckResult::pass("No active session"),
        Some(account) if find_user(users, account).is_some() => {
            CheckResult::pass("Session points to an existing account")
        }
        Some(account) => CheckResult::warning(
            "Session points to a missing account",
            vec![json!({ "account_number": account })],
        ),
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

impl DoctorResult {
    fn from_checks(checks: BTreeMap<String, CheckResult>) -> Self {
        let passed = checks.values().filter(|c| c.status == "pass").count() as i64;
        let warnings = checks.values().filter(|c| c.status == "warning").count() as i64;
        let errors = checks.values().filter(|c| c.status == "error").count() as i64;
        Self {
            checks,
            summary: DoctorSummary { passed, warnings, errors },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: "pass".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warning(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: "warning".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }

    fn error(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: i64,
    pub warnings: i64,
    pub errors: i64,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::{Transaction, TransactionKind};

    fn user_with_deposit(account: &str, reference: &str) -> User {
        let mut user = User::new(account, "Ada", "1234", 100);
        user.transactions.push(
            Transaction::record(TransactionKind::Deposit, 50, 100, Utc::now(), reference).unwrap(),
        );
        user
    }

    #[test]
    fn test_healthy_store_passes() {
        let store = MemoryStore::with_users(vec![
            user_with_deposit("1111111111", "TR1"),
            user_with_deposit("2222222222", "TR2"),
        ]);
        store.save_session("1111111111").unwrap();

        let result = DoctorService::new(Arc::new(store)).run_checks().unwrap();
        assert_eq!(result.summary.errors, 0);
        assert_eq!(result.summary.warnings, 0);
        assert_eq!(result.summary.passed, 6);
    }

    #[test]
    fn test_broken_chain_and_duplicates_are_reported() {
        let mut broken = user_with_deposit("1111111111", "TR1");
        let mut second =
            Transaction::record(TransactionKind::Withdrawal, 10, 140, Utc::now(), "TR1").unwrap();
        second.balance_after = 100;
        broken.transactions.push(second);

        let store = MemoryStore::with_users(vec![broken, user_with_deposit("1111111111", "TR3")]);
        store.save_session("9999999999").unwrap();

        let result = DoctorService::new(Arc::new(store)).run_checks().unwrap();
        assert_eq!(result.checks["ledger_continuity"].status, "error");
        assert_eq!(result.checks["ledger_arithmetic"].status, "error");
        assert_eq!(result.checks["unique_account_numbers"].status, "error");
        assert_eq!(result.checks["unique_references"].status, "warning");
        assert_eq!(result.checks["session"].status, "warning");
        assert_eq!(result.summary.errors, 3);
    }
}
