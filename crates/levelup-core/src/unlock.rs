use crate::error::{LevelupError, Result};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockEntry {
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// UnlockRecord
// ---------------------------------------------------------------------------

/// Per-player unlock state, keyed by achievement id.
///
/// Entries only ever move from locked to unlocked; there is no way to reset
/// one through this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    #[serde(default)]
    entries: BTreeMap<String, UnlockEntry>,
}

impl UnlockRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&UnlockEntry> {
        self.entries.get(id)
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.entries.get(id).map(|e| e.unlocked).unwrap_or(false)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(id).and_then(|e| e.unlocked_at)
    }

    /// Ids of unlocked achievements, sorted.
    pub fn unlocked_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.unlocked)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn unlocked_count(&self) -> usize {
        self.entries.values().filter(|e| e.unlocked).count()
    }

    /// Mark `id` unlocked at `at`. Returns `false` if it already was, in
    /// which case the original timestamp is kept.
    pub fn mark_unlocked(&mut self, id: &str, at: DateTime<Utc>) -> bool {
        let entry = self.entries.entry(id.to_string()).or_default();
        if entry.unlocked {
            return false;
        }
        entry.unlocked = true;
        entry.unlocked_at = Some(at);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnlockEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let record: UnlockRecord = crate::io::read_store_yaml(&paths::unlocks_path(root))?;
        record.check()?;
        Ok(record)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        crate::io::write_yaml(&paths::unlocks_path(root), self)
    }

    /// A hand-edited file can claim `unlocked: true` without a timestamp or
    /// the reverse; both break the set-once invariant.
    fn check(&self) -> Result<()> {
        for (id, entry) in &self.entries {
            if entry.unlocked != entry.unlocked_at.is_some() {
                return Err(LevelupError::validation(
                    format!("unlocks.{id}"),
                    "unlocked and unlocked_at disagree",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    #[test]
    fn unlock_is_set_once() {
        let mut record = UnlockRecord::new();
        let first = Utc::now();
        assert!(record.mark_unlocked("first-commit", first));
        assert!(!record.mark_unlocked("first-commit", first + Duration::hours(1)));
        assert_eq!(record.unlocked_at("first-commit"), Some(first));
        assert_eq!(record.unlocked_ids(), vec!["first-commit"]);
    }

    #[test]
    fn unknown_ids_are_locked() {
        let record = UnlockRecord::new();
        assert!(!record.is_unlocked("streak-7"));
        assert!(record.get("streak-7").is_none());
        assert_eq!(record.unlocked_count(), 0);
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut record = UnlockRecord::new();
        record.mark_unlocked("first-commit", Utc::now());
        record.save(dir.path()).unwrap();

        let loaded = UnlockRecord::load(dir.path()).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_before_init_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            UnlockRecord::load(dir.path()),
            Err(LevelupError::NotInitialized)
        ));
    }

    #[test]
    fn inconsistent_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = paths::unlocks_path(dir.path());
        crate::io::atomic_write(&path, b"entries:\n  first-commit:\n    unlocked: true\n").unwrap();
        assert!(matches!(
            UnlockRecord::load(dir.path()),
            Err(LevelupError::Validation { .. })
        ));
    }
}
