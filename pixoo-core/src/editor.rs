/*!
Editor session tying the paintable grid to the snapshot archive.

[`Editor`] implements the save / load / export flow: saving captures the
current grid into the archive, loading replaces the current grid with a
copy of a stored one, and exporting renders the current grid for download.
*/

use tracing::info;

use crate::archive::create_archive_from_config;
use crate::export::{self, ExportTarget, EXPORT_FILE_NAME};
use crate::storage::KeyValueStore;
use crate::{GridStore, Result, Snapshot, SnapshotArchive, StorageConfig};

/// One editing session: a [`GridStore`] plus its [`SnapshotArchive`]
pub struct Editor<S: KeyValueStore> {
    store: GridStore,
    archive: SnapshotArchive<S>,
    export_file_name: String,
}

impl<S: KeyValueStore> Editor<S> {
    /// Start a session on a blank grid over an already hydrated archive
    pub fn new(archive: SnapshotArchive<S>) -> Self {
        Self {
            store: GridStore::new(),
            archive,
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }

    pub fn with_export_file_name<N: Into<String>>(mut self, name: N) -> Self {
        self.export_file_name = name.into();
        self
    }

    pub fn store(&self) -> &GridStore {
        &self.store
    }

    /// Mutable access for paint events
    pub fn store_mut(&mut self) -> &mut GridStore {
        &mut self.store
    }

    pub fn archive(&self) -> &SnapshotArchive<S> {
        &self.archive
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        self.archive.list()
    }

    /// Archive the current grid
    ///
    /// # Returns
    /// The new snapshot id
    pub fn save(&mut self) -> Result<String> {
        let id = self.archive.save(self.store.grid())?;
        info!(id = %id, "Saved current grid");
        Ok(id)
    }

    /// Replace the current grid with the snapshot stored under `id`
    pub fn load(&mut self, id: &str) -> Result<()> {
        let grid = self.archive.get(id)?;
        self.store.replace_grid(grid);
        info!(id, "Loaded snapshot into editor");
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.archive.delete(id)
    }

    /// Render the current grid at export scale and hand it to `target`
    pub fn export(&self, target: &dyn ExportTarget) -> Result<()> {
        export::export_png_as(self.store.grid(), target, &self.export_file_name)
    }

    pub fn export_file_name(&self) -> &str {
        &self.export_file_name
    }
}

impl Editor<Box<dyn KeyValueStore>> {
    /// Open an editor on the backend described by `config`
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let archive = create_archive_from_config(config)?;
        Ok(Self::new(archive).with_export_file_name(config.export_file_name.clone()))
    }
}
