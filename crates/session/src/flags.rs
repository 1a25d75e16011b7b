//! Flag store implementations
//!
//! A missing `first_launch` key means the app has never been launched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use contracts::{ContractError, FlagStore};
use tracing::debug;

pub const FIRST_LAUNCH_KEY: &str = "first_launch";
pub const USER_SIGNED_UP_KEY: &str = "user_signed_up";

/// In-memory flags, lost on drop
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: BTreeMap<String, bool>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn is_first_launch(&self) -> Result<bool, ContractError> {
        Ok(!self.flags.contains_key(FIRST_LAUNCH_KEY))
    }

    fn mark_app_launched(&mut self) -> Result<(), ContractError> {
        self.flags.insert(FIRST_LAUNCH_KEY.to_string(), true);
        Ok(())
    }

    fn is_user_signed_up(&self) -> Result<bool, ContractError> {
        Ok(self.flags.get(USER_SIGNED_UP_KEY).copied().unwrap_or(false))
    }

    fn mark_user_signed_up(&mut self) -> Result<(), ContractError> {
        self.flags.insert(USER_SIGNED_UP_KEY.to_string(), true);
        Ok(())
    }

    fn clear_all(&mut self) -> Result<(), ContractError> {
        self.flags.clear();
        Ok(())
    }
}

/// Flags persisted as a JSON object on disk
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
    flags: BTreeMap<String, bool>,
}

impl FileFlagStore {
    /// Open the store, starting empty if the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref().to_path_buf();
        let flags = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                ContractError::store(path.display().to_string(), format!("invalid flag file: {e}"))
            })?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), flags = flags.len(), "Flag store opened");
        Ok(Self { path, flags })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), ContractError> {
        let content = serde_json::to_string_pretty(&self.flags)
            .map_err(|e| ContractError::store(self.path.display().to_string(), e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn set(&mut self, key: &str) -> Result<(), ContractError> {
        self.flags.insert(key.to_string(), true);
        self.persist()
    }
}

impl FlagStore for FileFlagStore {
    fn is_first_launch(&self) -> Result<bool, ContractError> {
        Ok(!self.flags.contains_key(FIRST_LAUNCH_KEY))
    }

    fn mark_app_launched(&mut self) -> Result<(), ContractError> {
        self.set(FIRST_LAUNCH_KEY)
    }

    fn is_user_signed_up(&self) -> Result<bool, ContractError> {
        Ok(self.flags.get(USER_SIGNED_UP_KEY).copied().unwrap_or(false))
    }

    fn mark_user_signed_up(&mut self) -> Result<(), ContractError> {
        self.set(USER_SIGNED_UP_KEY)
    }

    fn clear_all(&mut self) -> Result<(), ContractError> {
        self.flags.clear();
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_flags() {
        let mut store = MemoryFlagStore::new();
        assert!(store.is_first_launch().unwrap());
        assert!(!store.is_user_signed_up().unwrap());

        store.mark_app_launched().unwrap();
        store.mark_user_signed_up().unwrap();
        assert!(!store.is_first_launch().unwrap());
        assert!(store.is_user_signed_up().unwrap());

        store.clear_all().unwrap();
        assert!(store.is_first_launch().unwrap());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flags.json");

        let mut store = FileFlagStore::open(&path).unwrap();
        assert!(store.is_first_launch().unwrap());
        store.mark_app_launched().unwrap();

        let reopened = FileFlagStore::open(&path).unwrap();
        assert!(!reopened.is_first_launch().unwrap());
        assert!(!reopened.is_user_signed_up().unwrap());
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flags.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            FileFlagStore::open(&path),
            Err(ContractError::Store { .. })
        ));
    }
}
