/*!
The snapshot archive: newest-first list of saved grids backed by one
storage key.

Every mutation is applied to the in-memory list first and then the whole
list is rewritten under the archive key. If that write fails the caller gets
the error, but the live list keeps the change; it simply will not survive a
restart.

Hydration is forgiving: a missing or unreadable payload yields an empty
archive, and individual damaged records are dropped with a warning while the
rest load normally.
*/

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{StorageBackend, StorageConfig};
use crate::snapshot::{Snapshot, SnapshotIdGenerator, Thumbnail};
use crate::storage::{KeyValueStore, LocalFileStorage, MemoryStorage};
use crate::{Grid, PixooError, Result};

/// Storage key the archive is written under by default
pub const DEFAULT_STORAGE_KEY: &str = "pixoo-saved-images";

/// Current payload format version
pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct ArchivePayload<'a> {
    version: u32,
    snapshots: &'a [Snapshot],
}

/// Snapshot archive over a [`KeyValueStore`]
///
/// # Example
/// ```rust
/// use pixoo_core::{Grid, MemoryStorage, SnapshotArchive};
///
/// let storage = MemoryStorage::new();
/// let mut archive = SnapshotArchive::open(storage.clone());
/// let id = archive.save(&Grid::new())?;
///
/// let reopened = SnapshotArchive::open(storage);
/// assert_eq!(reopened.list()[0].id, id);
/// # Ok::<(), pixoo_core::PixooError>(())
/// ```
pub struct SnapshotArchive<S: KeyValueStore> {
    storage: S,
    key: String,
    snapshots: Vec<Snapshot>,
    ids: SnapshotIdGenerator,
}

impl<S: KeyValueStore> SnapshotArchive<S> {
    /// Create an empty, not yet hydrated archive under [`DEFAULT_STORAGE_KEY`]
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key<K: Into<String>>(storage: S, key: K) -> Self {
        Self {
            storage,
            key: key.into(),
            snapshots: Vec::new(),
            ids: SnapshotIdGenerator::new(),
        }
    }

    /// Create an archive and hydrate it from storage
    pub fn open(storage: S) -> Self {
        let mut archive = Self::new(storage);
        archive.load();
        archive
    }

    /// Hydrate from storage, replacing the in-memory list
    ///
    /// Never fails: unreadable payloads and records are discarded.
    ///
    /// # Returns
    /// Number of snapshots loaded
    pub fn load(&mut self) -> usize {
        self.snapshots = match self.storage.get(&self.key) {
            Ok(Some(payload)) => parse_payload(&payload),
            Ok(None) => {
                debug!(key = %self.key, "No saved snapshots");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    key = %self.key,
                    error = %e,
                    "Failed to read snapshot archive, starting empty"
                );
                Vec::new()
            }
        };

        self.ids = SnapshotIdGenerator::new();
        for snapshot in &self.snapshots {
            self.ids.observe(&snapshot.id);
        }

        info!(key = %self.key, count = self.snapshots.len(), "Snapshot archive loaded");
        self.snapshots.len()
    }

    /// Save a deep copy of `grid` as the newest snapshot
    ///
    /// # Returns
    /// The new snapshot id
    ///
    /// # Errors
    /// * `PixooError::Image` - If the thumbnail cannot be rendered (nothing is added)
    /// * `PixooError::Storage` - If the rewrite fails; the snapshot stays in the live list
    pub fn save(&mut self, grid: &Grid) -> Result<String> {
        self.save_at(grid, Utc::now())
    }

    /// Save with an explicit creation instant
    pub fn save_at(&mut self, grid: &Grid, timestamp: DateTime<Utc>) -> Result<String> {
        let snapshots = &self.snapshots;
        let id = self
            .ids
            .next(timestamp, |candidate| snapshots.iter().any(|s| s.id == candidate))?;

        let snapshot = Snapshot::capture(id.clone(), grid, timestamp)?;
        self.snapshots.insert(0, snapshot);
        debug!(id = %id, count = self.snapshots.len(), "Snapshot added");

        self.persist()?;
        Ok(id)
    }

    /// Remove the snapshot with `id`
    ///
    /// # Returns
    /// Whether a snapshot was removed; an unknown id is not an error and
    /// does not touch storage
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let Some(index) = self.position(id) else {
            debug!(id, "Delete of unknown snapshot ignored");
            return Ok(false);
        };

        self.snapshots.remove(index);
        debug!(id, count = self.snapshots.len(), "Snapshot removed");

        self.persist()?;
        Ok(true)
    }

    /// All snapshots, newest first
    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Copy of the grid stored under `id`, for restoring into the editor
    pub fn get(&self, id: &str) -> Result<Grid> {
        self.snapshot(id)
            .map(|s| s.grid.clone())
            .ok_or_else(|| PixooError::NotFound(id.to_string()))
    }

    pub fn snapshot(&self, id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.snapshots.iter().position(|s| s.id == id)
    }

    /// Rewrite the whole list under the archive key
    fn persist(&self) -> Result<()> {
        let payload = serde_json::to_string(&ArchivePayload {
            version: ARCHIVE_FORMAT_VERSION,
            snapshots: &self.snapshots,
        })?;

        self.storage.set(&self.key, &payload).map_err(|e| {
            warn!(
                key = %self.key,
                error = %e,
                "Snapshot archive write failed, change kept in memory only"
            );
            PixooError::storage(format!("Failed to write snapshot archive: {e}"))
        })
    }
}

impl<S: KeyValueStore> std::fmt::Debug for SnapshotArchive<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotArchive")
            .field("key", &self.key)
            .field("snapshots", &self.snapshots.len())
            .finish()
    }
}

/// Decode a stored payload, keeping every record that reads back cleanly
fn parse_payload(payload: &str) -> Vec<Snapshot> {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable snapshot archive");
            return Vec::new();
        }
    };

    let records = match value {
        // layout written before payloads were versioned
        Value::Array(records) => records,
        Value::Object(mut envelope) => {
            let version = envelope.get("version").and_then(Value::as_u64);
            match version {
                Some(v) if v <= u64::from(ARCHIVE_FORMAT_VERSION) => {}
                other => {
                    warn!(version = ?other, "Discarding snapshot archive with unsupported version");
                    return Vec::new();
                }
            }
            match envelope.remove("snapshots") {
                Some(Value::Array(records)) => records,
                _ => {
                    warn!("Discarding snapshot archive without a snapshot list");
                    return Vec::new();
                }
            }
        }
        _ => {
            warn!("Discarding snapshot archive with unexpected layout");
            return Vec::new();
        }
    };

    let mut snapshots: Vec<Snapshot> = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match parse_record(record) {
            Ok(snapshot) if snapshots.iter().any(|s| s.id == snapshot.id) => {
                warn!(index, id = %snapshot.id, "Skipping snapshot with duplicate id");
            }
            Ok(snapshot) => snapshots.push(snapshot),
            Err(e) => warn!(index, error = %e, "Skipping malformed snapshot record"),
        }
    }
    snapshots
}

fn parse_record(record: Value) -> Result<Snapshot> {
    let mut snapshot: Snapshot = serde_json::from_value(record)?;
    snapshot.validate()?;
    if snapshot.thumbnail.is_empty() {
        snapshot.thumbnail = Thumbnail::render(&snapshot.grid)?;
    }
    Ok(snapshot)
}

/// Open an archive on the storage backend described by `config`
///
/// # Example
/// ```rust
/// use pixoo_core::{create_archive_from_config, StorageConfig};
///
/// let archive = create_archive_from_config(&StorageConfig::default_memory())?;
/// assert!(archive.is_empty());
/// # Ok::<(), pixoo_core::PixooError>(())
/// ```
pub fn create_archive_from_config(
    config: &StorageConfig,
) -> Result<SnapshotArchive<Box<dyn KeyValueStore>>> {
    config.validate()?;

    let storage: Box<dyn KeyValueStore> = match config.backend {
        StorageBackend::Local => match &config.local_base_path {
            Some(base_path) => Box::new(LocalFileStorage::with_base_dir(base_path)),
            None => Box::new(LocalFileStorage::new()),
        },
        StorageBackend::Memory => Box::new(MemoryStorage::new()),
    };

    let mut archive = SnapshotArchive::with_key(storage, config.storage_key.clone());
    archive.load();
    Ok(archive)
}
