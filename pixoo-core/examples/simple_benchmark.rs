/*!
Simple benchmark example for hyperfine performance testing.

Paints a full grid, saves it through a filesystem-backed archive, reopens the
archive and exports the restored grid.
*/

use pixoo_core::{
    raster, Color, DirectoryExport, Editor, LocalFileStorage, SnapshotArchive, GRID_SIZE,
    PALETTE,
};
use std::time::Instant;

fn main() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let storage = LocalFileStorage::with_base_dir(temp_dir.path());

    let mut editor = Editor::new(SnapshotArchive::open(storage.clone()));

    let start = Instant::now();

    // Paint every cell, one stroke per row
    let store = editor.store_mut();
    for row in 0..GRID_SIZE {
        store.set_color(PALETTE[row % PALETTE.len()]);
        store.begin_paint(row, 0).unwrap();
        for col in 1..GRID_SIZE {
            store.continue_paint(row, col).unwrap();
        }
        store.end_paint();
    }
    let painted = start.elapsed();

    let id = editor.save().unwrap();
    let saved = start.elapsed();

    let reopened = SnapshotArchive::open(storage);
    let grid = reopened.get(&id).unwrap();
    let loaded = start.elapsed();

    editor
        .export(&DirectoryExport::new(temp_dir.path()))
        .unwrap();
    let exported = start.elapsed();

    // Verify correctness
    assert_eq!(&grid, editor.store().grid());
    assert_ne!(grid.get(1, 1), Some(Color::EMPTY));

    let archive_bytes = std::fs::metadata(temp_dir.path().join("pixoo-saved-images.json"))
        .unwrap()
        .len();
    let export_bytes = std::fs::metadata(temp_dir.path().join("pixoo-art.png"))
        .unwrap()
        .len();

    println!("Paint completed in:  {:?}", painted);
    println!("Save completed in:   {:?}", saved - painted);
    println!("Reload completed in: {:?}", loaded - saved);
    println!("Export completed in: {:?}", exported - loaded);
    println!("Archive size: {} bytes", archive_bytes);
    println!("Export size: {} bytes", export_bytes);
    println!(
        "Thumbnail size: {} bytes",
        reopened.list()[0].thumbnail.png().len()
    );
    println!(
        "Export side: {} px",
        raster::image_side(raster::EXPORT_CELL_SIZE)
    );
}
