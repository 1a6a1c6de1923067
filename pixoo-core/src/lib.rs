/*!
# Pixoo Core Engine

Core library of the Pixoo pixel-art editor: a fixed 64x64 color grid that is
painted cell by cell, rasterized to PNG, and archived as named snapshots.

This crate provides:

- [`GridStore`]: the current grid plus paint gesture state (color, eraser,
  drag-in-progress) with change notifications
- [`raster`]: deterministic, lossless rendering of a grid at any integer
  scale (640x640 exports, 128x128 thumbnails)
- [`SnapshotArchive`]: newest-first snapshot list persisted as a whole
  through a pluggable [`KeyValueStore`]

## Architecture

Durable storage and export delivery are ports ([`KeyValueStore`],
[`ExportTarget`]) with local-filesystem and in-memory adapters, so the grid
and archive logic never touch a concrete backend directly.

## Usage

```rust
use pixoo_core::{Color, Editor, MemoryStorage, SnapshotArchive};

let mut editor = Editor::new(SnapshotArchive::open(MemoryStorage::new()));

// Paint
let store = editor.store_mut();
store.set_color(Color::rgb(255, 0, 0));
store.begin_paint(0, 0)?;
store.end_paint();

// Save, wipe, restore
let id = editor.save()?;
editor.store_mut().clear_all();
editor.load(&id)?;
assert_eq!(editor.store().grid().get(0, 0), Some(Color::rgb(255, 0, 0)));
# Ok::<(), pixoo_core::PixooError>(())
```
*/

pub mod archive;
pub mod color;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod grid;
pub mod observability;
pub mod raster;
pub mod snapshot;
pub mod storage;
pub mod store;


pub use archive::{create_archive_from_config, SnapshotArchive, DEFAULT_STORAGE_KEY};
pub use color::{Color, PALETTE};
pub use config::{StorageBackend, StorageConfig};
pub use editor::Editor;
pub use error::{PixooError, Result};
pub use export::{DirectoryExport, ExportTarget, EXPORT_FILE_NAME};
pub use grid::{Grid, GRID_SIZE};
pub use snapshot::{Snapshot, Thumbnail};
pub use storage::{KeyValueStore, LocalFileStorage, MemoryStorage};
pub use store::{GridStore, PaintState};
