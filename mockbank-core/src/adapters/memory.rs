//! In-process store, used by tests and when embedding the core without a
//! data directory

use std::sync::{Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::{StoreSnapshot, StoreVersion, UserStore};

#[derive(Default)]
struct MemoryState {
    users: Option<Vec<User>>,
    /// Bumped on every write
    writes: u64,
    session: Option<String>,
}

/// User store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `users`
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                users: Some(users),
                writes: 1,
                session: None,
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))
    }

    fn version_of(state: &MemoryState) -> StoreVersion {
        match state.users {
            None => StoreVersion::absent(),
            Some(_) => StoreVersion::new(format!("mem-{}", state.writes)),
        }
    }
}

impl UserStore for MemoryStore {
    fn load_snapshot(&self) -> Result<StoreSnapshot> {
        let state = self.state()?;
        Ok(StoreSnapshot {
            users: state.users.clone().unwrap_or_default(),
            version: Self::version_of(&state),
        })
    }

    fn save_all(&self, users: &[User]) -> Result<()> {
        let mut state = self.state()?;
        state.users = Some(users.to_vec());
        state.writes += 1;
        Ok(())
    }

    fn save_if_unchanged(&self, users: &[User], expected: &StoreVersion) -> Result<StoreVersion> {
        let mut state = self.state()?;
        if Self::version_of(&state) != *expected {
            return Err(Error::ConcurrentModification);
        }
        state.users = Some(users.to_vec());
        state.writes += 1;
        Ok(Self::version_of(&state))
    }

    fn load_session(&self) -> Result<Option<String>> {
        Ok(self.state()?.session.clone())
    }

    fn save_session(&self, account_number: &str) -> Result<()> {
        self.state()?.session = Some(account_number.to_string());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        self.state()?.session = None;
        Ok(())
    }
}
