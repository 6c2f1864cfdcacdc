//! Account service - registration and account lookup

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{validate_account_number, validate_pin, User};
use crate::ports::{find_user, StoreSnapshot, StoreVersion, UserStore};

/// Attempts at drawing an unused account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 100;

/// Account service for registration and lookups
pub struct AccountService {
    store: Arc<dyn UserStore>,
    default_opening_balance: i64,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, default_opening_balance: i64) -> Self {
        Self {
            store,
            default_opening_balance,
        }
    }

    /// Register a new account under a freshly issued account number
    pub fn register(
        &self,
        name: &str,
        pin: &str,
        opening_balance: Option<i64>,
    ) -> Result<User> {
        let StoreSnapshot { users, version } = self.store.load_snapshot()?;
        let account_number = issue_account_number(&users)?;
        self.insert(users, version, &account_number, name, pin, opening_balance)
    }

    /// Register a new account under a caller-chosen account number
    pub fn register_with_number(
        &self,
        account_number: &str,
        name: &str,
        pin: &str,
        opening_balance: Option<i64>,
    ) -> Result<User> {
        validate_account_number(account_number)?;
        let StoreSnapshot { users, version } = self.store.load_snapshot()?;
        if find_user(&users, account_number).is_some() {
            return Err(Error::DuplicateAccount(account_number.to_string()));
        }
        self.insert(users, version, account_number, name, pin, opening_balance)
    }

    fn insert(
        &self,
        mut users: Vec<User>,
        version: StoreVersion,
        account_number: &str,
        name: &str,
        pin: &str,
        opening_balance: Option<i64>,
    ) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Account name is required"));
        }
        validate_pin(pin)?;
        let opening_balance = opening_balance.unwrap_or(self.default_opening_balance);
        if opening_balance < 0 {
            return Err(Error::validation("Opening balance cannot be negative"));
        }

        let user = User::new(account_number, name, pin, opening_balance);
        users.push(user.clone());
        self.store.save_if_unchanged(&users, &version)?;

        Ok(user)
    }

    /// Get an account by number
    pub fn get(&self, account_number: &str) -> Result<User> {
        self.store
            .find_by_account_id(account_number)?
            .ok_or_else(|| Error::UnknownAccount(account_number.to_string()))
    }

    /// Summaries of all accounts, in registration order
    pub fn list(&self) -> Result<Vec<AccountSummary>> {
        Ok(self
            .store
            .load_all()?
            .iter()
            .map(AccountSummary::from)
            .collect())
    }
}

fn issue_account_number(users: &[User]) -> Result<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_NUMBER_ATTEMPTS {
        let candidate = format!("{:010}", rng.gen_range(0..10_000_000_000u64));
        if find_user(users, &candidate).is_none() {
            return Ok(candidate);
        }
    }
    Err(Error::Other("Could not issue a free account number".to_string()))
}

/// Public view of an account, without the PIN
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub account_number: String,
    pub account_name: String,
    pub balance: i64,
    pub transaction_count: usize,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            account_number: user.account_number.clone(),
            account_name: user.account_name.clone(),
            balance: user.current_balance(),
            transaction_count: user.transactions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::ACCOUNT_NUMBER_LEN;

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryStore::new()), 0)
    }

    #[test]
    fn test_register_issues_ten_digit_number() {
        let accounts = service();
        let user = accounts.register("Ada Lovelace", "1234", Some(1000)).unwrap();

        assert_eq!(user.account_number.len(), ACCOUNT_NUMBER_LEN);
        assert!(user.account_number.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(user.current_balance(), 1000);
        assert_eq!(accounts.get(&user.account_number).unwrap(), user);
    }

    #[test]
    fn test_register_uses_default_opening_balance() {
        let accounts = AccountService::new(Arc::new(MemoryStore::new()), 2500);
        let user = accounts.register("Ada", "1234", None).unwrap();
        assert_eq!(user.opening_balance, 2500);
    }

    #[test]
    fn test_register_validation() {
        let accounts = service();
        assert!(matches!(
            accounts.register("  ", "1234", None),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            accounts.register("Ada", "12", None),
            Err(Error::InvalidPin)
        ));
        assert!(matches!(
            accounts.register("Ada", "1234", Some(-1)),
            Err(Error::Validation(_))
        ));
        assert!(accounts.list().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_account_number_is_rejected() {
        let accounts = service();
        accounts
            .register_with_number("0123456789", "Ada", "1234", None)
            .unwrap();
        let err = accounts
            .register_with_number("0123456789", "Grace", "4321", None)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAccount(_)));
        assert_eq!(accounts.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_hides_pin() {
        let accounts = service();
        accounts
            .register_with_number("0123456789", "Ada", "1234", Some(50))
            .unwrap();
        let summaries = accounts.list().unwrap();
        assert_eq!(summaries[0].balance, 50);
        let json = serde_json::to_string(&summaries).unwrap();
        assert!(!json.to_lowercase().contains("pin"));
    }

    #[test]
    fn test_get_unknown_account() {
        assert!(matches!(
            service().get("0000000000"),
            Err(Error::UnknownAccount(_))
        ));
    }
}
