//! JSON file store implementation
//!
//! Layout inside the data directory:
//! - `users.json`: the user collection as a pretty-printed JSON array
//! - `session.json`: the active session's account number as a JSON string
//! - `users.lock`: advisory lock serializing writers across processes

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::domain::User;
use crate::ports::{StoreSnapshot, StoreVersion, UserStore};

const USERS_FILE: &str = "users.json";
const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "users.lock";

/// User store backed by JSON files in a directory
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store in `dir`
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_FILE)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Take the writer lock; it is released when the returned file is dropped
    fn lock_for_write(&self) -> Result<File> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))?;
        file.lock_exclusive()?;
        Ok(file)
    }

    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn decode(bytes: Option<&[u8]>) -> Result<Vec<User>> {
        match bytes {
            None => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(bytes)
                .map_err(|e| Error::corrupt(format!("{}: {}", USERS_FILE, e))),
        }
    }

    fn encode(users: &[User]) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(users)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn version_of(bytes: Option<&[u8]>) -> StoreVersion {
        match bytes {
            None => StoreVersion::absent(),
            Some(bytes) => StoreVersion::new(hex::encode(Sha256::digest(bytes))),
        }
    }

    /// Write to a sibling temp file, then rename it over `target`
    fn write_atomically(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn load_snapshot(&self) -> Result<StoreSnapshot> {
        let bytes = Self::read_optional(&self.users_path())?;
        let users = Self::decode(bytes.as_deref())?;
        Ok(StoreSnapshot {
            users,
            version: Self::version_of(bytes.as_deref()),
        })
    }

    fn save_all(&self, users: &[User]) -> Result<()> {
        let bytes = Self::encode(users)?;
        let _lock = self.lock_for_write()?;
        self.write_atomically(&self.users_path(), &bytes)
    }

    fn save_if_unchanged(&self, users: &[User], expected: &StoreVersion) -> Result<StoreVersion> {
        let bytes = Self::encode(users)?;
        let _lock = self.lock_for_write()?;

        let current = Self::read_optional(&self.users_path())?;
        if Self::version_of(current.as_deref()) != *expected {
            return Err(Error::ConcurrentModification);
        }

        self.write_atomically(&self.users_path(), &bytes)?;
        Ok(Self::version_of(Some(&bytes)))
    }

    fn load_session(&self) -> Result<Option<String>> {
        match Self::read_optional(&self.session_path())? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice::<String>(&bytes)
                .map(Some)
                .map_err(|e| Error::corrupt(format!("{}: {}", SESSION_FILE, e))),
        }
    }

    fn save_session(&self, account_number: &str) -> Result<()> {
        let bytes = serde_json::to_vec(account_number)?;
        self.write_atomically(&self.session_path(), &bytes)
    }

    fn clear_session(&self) -> Result<()> {
        match fs::remove_file(self.session_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_users() -> Vec<User> {
        vec![
            User::new("1111111111", "Ada", "1234", 1000),
            User::new("2222222222", "Grace", "4321", 0),
        ]
    }

    #[test]
    fn test_absent_store_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        let snapshot = store.load_snapshot().unwrap();
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.version, StoreVersion::absent());
    }

    #[test]
    fn test_malformed_store_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        fs::write(store.users_path(), b"[{\"accountNumber\": ").unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, Error::CorruptStore(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.save_all(&sample_users()).unwrap();

        assert_eq!(store.load_all().unwrap(), sample_users());
        assert_eq!(
            store.find_by_account_id("2222222222").unwrap().unwrap().account_name,
            "Grace"
        );
        assert_eq!(store.index_of_account_id("2222222222").unwrap(), Some(1));
        assert!(store.find_by_account_id("9999999999").unwrap().is_none());
        assert_eq!(store.index_of_account_id("9999999999").unwrap(), None);
    }

    #[test]
    fn test_save_of_loaded_collection_keeps_bytes() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.save_all(&sample_users()).unwrap();
        let before = fs::read(store.users_path()).unwrap();

        let users = store.load_all().unwrap();
        store.save_all(&users).unwrap();

        assert_eq!(fs::read(store.users_path()).unwrap(), before);
    }

    #[test]
    fn test_stale_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        store.save_all(&sample_users()).unwrap();

        let first = store.load_snapshot().unwrap();
        let second = store.load_snapshot().unwrap();
        assert_eq!(first.version, second.version);

        let mut users = first.users.clone();
        users[0].account_name = "Ada L.".to_string();
        let new_version = store.save_if_unchanged(&users, &first.version).unwrap();
        assert_ne!(new_version, first.version);

        let err = store
            .save_if_unchanged(&second.users, &second.version)
            .unwrap_err();
        assert!(matches!(err, Error::ConcurrentModification));
        assert_eq!(store.load_all().unwrap()[0].account_name, "Ada L.");
        assert_eq!(store.load_snapshot().unwrap().version, new_version);
    }

    #[test]
    fn test_first_write_against_absent_version() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        store
            .save_if_unchanged(&sample_users(), &StoreVersion::absent())
            .unwrap();
        assert_eq!(store.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_session_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();

        assert_eq!(store.load_session().unwrap(), None);
        store.save_session("1111111111").unwrap();
        assert_eq!(store.load_session().unwrap().as_deref(), Some("1111111111"));
        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), None);
        store.clear_session().unwrap();
    }
}
