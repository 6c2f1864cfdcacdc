//! Session service - login, logout and the current session

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{validate_account_number, validate_pin, Session, User};
use crate::ports::UserStore;

/// Session service for the single active session
pub struct SessionService {
    store: Arc<dyn UserStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Verify credentials and make `account_number` the active session
    ///
    /// Replaces any session that was already active.
    pub fn login(&self, account_number: &str, pin: &str) -> Result<Session> {
        validate_account_number(account_number)?;
        validate_pin(pin)?;

        let user = self
            .store
            .find_by_account_id(account_number)?
            .ok_or_else(|| Error::UnknownAccount(account_number.to_string()))?;
        if !user.pin_matches(pin) {
            return Err(Error::AuthenticationFailed);
        }

        self.store.save_session(account_number)?;
        Ok(Session::new(account_number))
    }

    /// Clear the active session; returns whether one was active
    pub fn logout(&self) -> Result<bool> {
        let was_active = self.store.load_session()?.is_some();
        self.store.clear_session()?;
        Ok(was_active)
    }

    /// The active session, if any
    pub fn current(&self) -> Result<Option<Session>> {
        Ok(self.store.load_session()?.map(Session::new))
    }

    /// The active session, or `Error::NoActiveSession`
    pub fn require_current(&self) -> Result<Session> {
        self.current()?.ok_or(Error::NoActiveSession)
    }

    /// The user behind the active session
    pub fn current_user(&self) -> Result<User> {
        let session = self.require_current()?;
        self.store
            .find_by_account_id(session.account_number())?
            .ok_or_else(|| Error::UnknownAccount(session.account_number().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;

    fn service() -> SessionService {
        let store = MemoryStore::with_users(vec![User::new("1111111111", "Ada", "1234", 0)]);
        SessionService::new(Arc::new(store))
    }

    #[test]
    fn test_login_and_logout() {
        let sessions = service();
        assert!(sessions.current().unwrap().is_none());

        let session = sessions.login("1111111111", "1234").unwrap();
        assert_eq!(session.account_number(), "1111111111");
        assert_eq!(sessions.current().unwrap(), Some(session));
        assert_eq!(sessions.current_user().unwrap().account_name, "Ada");

        assert!(sessions.logout().unwrap());
        assert!(!sessions.logout().unwrap());
        assert!(matches!(
            sessions.require_current(),
            Err(Error::NoActiveSession)
        ));
    }

    #[test]
    fn test_login_failures_leave_no_session() {
        let sessions = service();

        assert!(matches!(
            sessions.login("11111", "1234"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            sessions.login("1111111111", "12"),
            Err(Error::InvalidPin)
        ));
        assert!(matches!(
            sessions.login("2222222222", "1234"),
            Err(Error::UnknownAccount(_))
        ));
        assert!(matches!(
            sessions.login("1111111111", "0000"),
            Err(Error::AuthenticationFailed)
        ));
        assert!(sessions.current().unwrap().is_none());
    }
}
