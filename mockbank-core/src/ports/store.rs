//! Store port - persisted user collection abstraction

use crate::domain::result::Result;
use crate::domain::User;

/// Identifies one persisted state of the user collection
///
/// Two loads return equal versions only if nothing was written in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoreVersion(String);

impl StoreVersion {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Version of a store that has never been written
    pub fn absent() -> Self {
        Self("absent".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The user collection together with the version it was read at
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub users: Vec<User>,
    pub version: StoreVersion,
}

/// Persisted user collection plus the session scalar
///
/// Writes always replace the whole collection. Implementations must make a
/// write visible all at once: a concurrent reader sees either the old or the
/// new collection, never a mix.
pub trait UserStore: Send + Sync {
    // === Collection ===

    /// Read the whole collection and its version
    ///
    /// An absent store reads as empty; a present but malformed one fails
    /// with `Error::CorruptStore`.
    fn load_snapshot(&self) -> Result<StoreSnapshot>;

    /// Replace the whole collection unconditionally
    fn save_all(&self, users: &[User]) -> Result<()>;

    /// Replace the whole collection if it is still at `expected`
    ///
    /// Fails with `Error::ConcurrentModification` otherwise, leaving the
    /// store untouched.
    fn save_if_unchanged(&self, users: &[User], expected: &StoreVersion) -> Result<StoreVersion>;

    // === Session ===

    /// Account number of the active session, if any
    fn load_session(&self) -> Result<Option<String>>;

    fn save_session(&self, account_number: &str) -> Result<()>;

    fn clear_session(&self) -> Result<()>;

    // === Lookups ===

    fn load_all(&self) -> Result<Vec<User>> {
        Ok(self.load_snapshot()?.users)
    }

    fn find_by_account_id(&self, account_number: &str) -> Result<Option<User>> {
        let users = self.load_all()?;
        Ok(find_user(&users, account_number).cloned())
    }

    fn index_of_account_id(&self, account_number: &str) -> Result<Option<usize>> {
        let users = self.load_all()?;
        Ok(index_of_user(&users, account_number))
    }
}

/// Find a user in an already loaded collection
pub fn find_user<'a>(users: &'a [User], account_number: &str) -> Option<&'a User> {
    users.iter().find(|u| u.account_number == account_number)
}

/// Position of a user in an already loaded collection
pub fn index_of_user(users: &[User], account_number: &str) -> Option<usize> {
    users.iter().position(|u| u.account_number == account_number)
}
