use crate::error::Result;
use crate::models::{LogEntry, UserProfile};

use super::storage::KeyValueStorage;

/// Fixed key the profile blob lives under.
pub const STORAGE_KEY: &str = "parallel_user_data";

/// Persistence for the single [`UserProfile`].
///
/// Every mutation is a full read-modify-write of the whole blob.
#[derive(Debug, Clone)]
pub struct ProfileStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> ProfileStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Never fails: missing, unreadable or corrupt data yields the default profile.
    pub fn load(&self) -> UserProfile {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserProfile::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored profile, using defaults");
                return UserProfile::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Stored profile is corrupt, using defaults");
                UserProfile::default()
            }
        }
    }

    pub fn save(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.storage.set(STORAGE_KEY, &json)
    }

    /// Prepends `entry`. Id uniqueness is the caller's job.
    pub fn append_log(&self, entry: LogEntry) -> Result<()> {
        let mut profile = self.load();
        profile.logs.insert(0, entry);
        self.save(&profile)
    }

    /// Removes every entry with `id`; unknown ids are a no-op.
    pub fn delete_log(&self, id: &str) -> Result<()> {
        let mut profile = self.load();
        let before = profile.logs.len();
        profile.logs.retain(|entry| entry.id != id);
        if profile.logs.len() == before {
            tracing::debug!(id, "No log entry to delete");
        }
        self.save(&profile)
    }

    pub fn list_logs(&self) -> Vec<LogEntry> {
        self.load().logs
    }
}
