use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryKvStore;

const SNAPSHOT_VERSION: u32 = 1;

/// JSON image of an [`InMemoryKvStore`].
///
/// Ledger values are decimal text, so entries are stored as UTF-8 strings
/// and the file stays readable by hand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub entries: BTreeMap<String, String>,
}

impl Snapshot {
    /// Capture the current contents of `store`.
    pub fn capture(store: &InMemoryKvStore) -> StoreResult<Self> {
        let mut entries = BTreeMap::new();
        for (key, value) in store.entries()? {
            let text = String::from_utf8(value).map_err(|_| {
                StoreError::Serialization(format!("value under {key:?} is not UTF-8"))
            })?;
            entries.insert(key, text);
        }
        Ok(Self {
            version: SNAPSHOT_VERSION,
            entries,
        })
    }

    /// Build a store holding exactly this snapshot's entries.
    pub fn restore(self) -> InMemoryKvStore {
        InMemoryKvStore::from_entries(
            self.entries
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
        )
    }

    /// Write the snapshot to `path`, replacing the file atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %path.display(), entries = self.entries.len(), "snapshot saved");
        Ok(())
    }

    /// Read a snapshot from `path`.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot: Self = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(snapshot)
    }

    /// Read a snapshot, or start empty when `path` does not exist yet.
    pub fn load_or_empty(path: &Path) -> StoreResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self {
                version: SNAPSHOT_VERSION,
                entries: BTreeMap::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::KeyValueStore;

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let store = InMemoryKvStore::new();
        store.put("balance::alice", b"99999000").unwrap();
        store.put("balance::bob", b"1000").unwrap();
        Snapshot::capture(&store).unwrap().save(&path).unwrap();

        let restored = Snapshot::load(&path).unwrap().restore();
        assert_eq!(restored.get("balance::bob").unwrap(), Some(b"1000".to_vec()));
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn file_is_human_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let store = InMemoryKvStore::new();
        store.put("balance::alice", b"42").unwrap();
        Snapshot::capture(&store).unwrap().save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"balance::alice\": \"42\""));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load_or_empty(&dir.path().join("absent.json")).unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    }

    #[test]
    fn non_utf8_values_are_rejected() {
        let store = InMemoryKvStore::new();
        store.put("blob", &[0xff, 0xfe]).unwrap();
        assert!(matches!(
            Snapshot::capture(&store),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, r#"{"version":99,"entries":{}}"#).unwrap();
        assert!(matches!(
            Snapshot::load(&path),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn garbage_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Snapshot::load(&path).is_err());
    }
}
