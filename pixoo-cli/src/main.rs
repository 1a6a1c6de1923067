/*!
Pixoo CLI - Command-line interface for the Pixoo pixel-art editor.

This CLI provides utilities for painting, inspecting, exporting and managing
the snapshot archive stored on disk (or in memory for throwaway sessions).
*/

mod script;

use anyhow::Context;
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use pixoo_core::{
    observability::init_observability, raster, DirectoryExport, Editor, ExportTarget,
    KeyValueStore, StorageConfig,
};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};
use tracing::{error, info};

type CliEditor = Editor<Box<dyn KeyValueStore>>;

#[derive(Parser)]
#[command(name = "pixoo")]
#[command(about = "CLI for the Pixoo pixel-art editor")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Storage backend to use
    #[arg(short, long, global = true, value_enum, default_value = "disk")]
    storage: StorageType,

    /// Directory holding the snapshot archive (disk storage only)
    #[arg(short, long, global = true, env = "PIXOO_PATH", default_value = "./snapshots")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Debug)]
enum StorageType {
    Disk,
    Memory,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved snapshots, newest first
    List,
    /// Show details of a specific snapshot
    Show {
        /// Snapshot identifier
        snapshot_id: String,
    },
    /// Replay a paint script, then optionally save and export the result
    Draw {
        /// Script file (one paint command per line)
        script: PathBuf,
        /// Save the painted grid as a new snapshot
        #[arg(long)]
        save: bool,
        /// Export the painted grid as PNG into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Write a snapshot as PNG
    Export {
        /// Snapshot identifier
        snapshot_id: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Write the stored thumbnail instead of a full-size render
        #[arg(long)]
        thumbnail: bool,
    },
    /// Sample a rendered PNG back into a grid and save it as a snapshot
    Import {
        /// PNG file whose side is 64 times the cell size
        png: PathBuf,
        /// Pixels per grid cell in the source image
        #[arg(long, default_value_t = raster::EXPORT_CELL_SIZE)]
        cell_size: u32,
    },
    /// Delete a snapshot
    Delete {
        /// Snapshot identifier
        snapshot_id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Tabled)]
struct SnapshotInfo {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Created")]
    timestamp: String,
    #[tabled(rename = "Painted cells")]
    painted: usize,
    #[tabled(rename = "Thumbnail")]
    thumbnail: String,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Initialize logging
    let directive = if cli.verbose { "debug" } else { "info" };
    init_observability(directive, cli.json_logs)?;

    // Open the editor on the configured archive
    let storage_config = create_storage_config(&cli);
    info!("Using storage {:?}", storage_config);
    let mut editor = Editor::from_config(&storage_config)?;

    // Execute command
    match cli.command {
        Commands::List => list_snapshots(&editor),
        Commands::Show { snapshot_id } => show_snapshot(&editor, &snapshot_id)?,
        Commands::Draw {
            script,
            save,
            export,
        } => draw(&mut editor, &script, save, export)?,
        Commands::Export {
            snapshot_id,
            out,
            thumbnail,
        } => export_snapshot(&mut editor, &snapshot_id, out, thumbnail)?,
        Commands::Import { png, cell_size } => import_png(&mut editor, &png, cell_size)?,
        Commands::Delete { snapshot_id, force } => {
            delete_snapshot(&mut editor, &snapshot_id, force)?
        }
    }

    Ok(())
}

fn create_storage_config(cli: &Cli) -> StorageConfig {
    match cli.storage {
        StorageType::Disk => StorageConfig::local_with_base_path(&cli.path),
        StorageType::Memory => StorageConfig::default_memory(),
    }
}

fn list_snapshots(editor: &CliEditor) {
    let snapshots: Vec<SnapshotInfo> = editor
        .snapshots()
        .iter()
        .map(|snapshot| SnapshotInfo {
            id: snapshot.id.clone(),
            timestamp: format_timestamp(snapshot.timestamp),
            painted: snapshot.grid.painted_cells(),
            thumbnail: format_size(snapshot.thumbnail.png().len() as u64),
        })
        .collect();

    if snapshots.is_empty() {
        println!("No snapshots found");
    } else {
        let table = Table::new(snapshots);
        println!("{table}");
    }
}

fn show_snapshot(editor: &CliEditor, snapshot_id: &str) -> Result<(), anyhow::Error> {
    info!("Showing snapshot: {}", snapshot_id);

    let Some(snapshot) = editor.archive().snapshot(snapshot_id) else {
        error!("Snapshot not found: {}", snapshot_id);
        anyhow::bail!("Snapshot not found: {snapshot_id}");
    };

    println!("Snapshot Details:");
    println!("  ID: {}", snapshot.id);
    println!("  Created: {}", format_timestamp(snapshot.timestamp));
    println!("  Painted cells: {}", snapshot.grid.painted_cells());
    println!(
        "  Thumbnail: {} ({})",
        format_size(snapshot.thumbnail.png().len() as u64),
        if snapshot.thumbnail.is_empty() {
            "missing"
        } else {
            "png"
        }
    );
    match &snapshot.content_hash {
        Some(hash) => println!("  Content Hash: {hash}"),
        None => println!("  Content Hash: (none)"),
    }

    Ok(())
}

fn draw(
    editor: &mut CliEditor,
    script_path: &Path,
    save: bool,
    export: Option<PathBuf>,
) -> Result<(), anyhow::Error> {
    let source = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let steps = script::parse(&source)?;
    info!("Replaying {} paint steps", steps.len());

    script::run(editor, &steps)?;
    println!("Painted {} cells", editor.store().grid().painted_cells());

    if save {
        let id = editor.save()?;
        println!("✓ Saved snapshot {id}");
    }
    if let Some(dir) = export {
        let target = DirectoryExport::new(&dir);
        editor.export(&target)?;
        println!(
            "✓ Exported {}",
            target.path_for(editor.export_file_name()).display()
        );
    }

    Ok(())
}

fn export_snapshot(
    editor: &mut CliEditor,
    snapshot_id: &str,
    out: PathBuf,
    thumbnail: bool,
) -> Result<(), anyhow::Error> {
    let target = DirectoryExport::new(out);

    if thumbnail {
        let snapshot = editor
            .archive()
            .snapshot(snapshot_id)
            .ok_or_else(|| anyhow::anyhow!("Snapshot not found: {snapshot_id}"))?;
        if snapshot.thumbnail.is_empty() {
            anyhow::bail!("Snapshot {snapshot_id} has no thumbnail");
        }
        let file_name = format!("{snapshot_id}-thumbnail.png");
        target.deliver(&file_name, snapshot.thumbnail.png())?;
        println!("✓ Exported {}", target.path_for(&file_name).display());
        return Ok(());
    }

    editor.load(snapshot_id)?;
    editor.export(&target)?;
    println!(
        "✓ Exported {}",
        target.path_for(editor.export_file_name()).display()
    );
    Ok(())
}

fn import_png(
    editor: &mut CliEditor,
    png: &Path,
    cell_size: u32,
) -> Result<(), anyhow::Error> {
    let bytes =
        std::fs::read(png).with_context(|| format!("Failed to read {}", png.display()))?;
    let image = raster::decode_png(&bytes)?;
    let grid = raster::sample_grid(&image, cell_size)?;

    editor.store_mut().replace_grid(grid);
    let id = editor.save()?;
    println!(
        "✓ Imported {} as snapshot {id} ({} painted cells)",
        png.display(),
        editor.store().grid().painted_cells()
    );
    Ok(())
}

fn delete_snapshot(
    editor: &mut CliEditor,
    snapshot_id: &str,
    force: bool,
) -> Result<(), anyhow::Error> {
    if !force {
        print!("Are you sure you want to delete snapshot '{snapshot_id}'? (y/N): ");
        use std::io::{self, Write};
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().to_lowercase().starts_with('y') {
            println!("Deletion cancelled");
            return Ok(());
        }
    }

    if editor.delete(snapshot_id)? {
        println!("✓ Snapshot deleted successfully");
    } else {
        println!("No snapshot with id '{snapshot_id}'");
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixoo_core::{Color, GRID_SIZE};
    use tempfile::TempDir;

    fn disk_editor(dir: &TempDir) -> CliEditor {
        Editor::from_config(&StorageConfig::local_with_base_path(dir.path())).unwrap()
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_cli_parses_global_options() {
        let cli = Cli::try_parse_from([
            "pixoo", "--storage", "memory", "draw", "art.txt", "--save",
        ])
        .unwrap();
        assert!(matches!(cli.storage, StorageType::Memory));
        assert!(matches!(cli.command, Commands::Draw { save: true, .. }));

        let cli = Cli::try_parse_from(["pixoo", "import", "art.png"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Import { cell_size: 10, .. }
        ));
    }

    #[test]
    fn test_draw_save_export_and_delete() {
        let dir = TempDir::new().unwrap();
        let script_path = dir.path().join("corners.txt");
        std::fs::write(
            &script_path,
            "color #ff0000\ndown 0 0\nup\ncolor #0000ff\ndown 63 63\n",
        )
        .unwrap();

        let mut editor = disk_editor(&dir);
        let out = dir.path().join("out");
        draw(&mut editor, &script_path, true, Some(out.clone())).unwrap();
        assert!(out.join("pixoo-art.png").exists());

        let mut editor = disk_editor(&dir);
        assert_eq!(editor.snapshots().len(), 1);
        let id = editor.snapshots()[0].id.clone();

        export_snapshot(&mut editor, &id, out.clone(), true).unwrap();
        let thumb = std::fs::read(out.join(format!("{id}-thumbnail.png"))).unwrap();
        let thumb = raster::decode_png(&thumb).unwrap();
        let grid = raster::sample_grid(&thumb, raster::THUMBNAIL_CELL_SIZE).unwrap();
        assert_eq!(grid.get(0, 0), Some(Color::rgb(0xff, 0, 0)));
        assert_eq!(grid.get(GRID_SIZE - 1, GRID_SIZE - 1), Some(Color::rgb(0, 0, 0xff)));

        delete_snapshot(&mut editor, &id, true).unwrap();
        assert!(disk_editor(&dir).snapshots().is_empty());
    }

    #[test]
    fn test_import_round_trips_an_export() {
        let dir = TempDir::new().unwrap();
        let mut editor = disk_editor(&dir);
        editor.store_mut().set_color(Color::rgb(0x12, 0x34, 0x56));
        editor.store_mut().begin_paint(5, 7).unwrap();
        editor.store_mut().end_paint();
        editor.export(&DirectoryExport::new(dir.path())).unwrap();

        let png = dir.path().join("pixoo-art.png");
        let mut editor = disk_editor(&dir);
        import_png(&mut editor, &png, raster::EXPORT_CELL_SIZE).unwrap();

        let id = editor.snapshots()[0].id.clone();
        let grid = editor.archive().get(&id).unwrap();
        assert_eq!(grid.get(5, 7), Some(Color::rgb(0x12, 0x34, 0x56)));
        assert_eq!(grid.painted_cells(), 1);

        assert!(import_png(&mut editor, &png, 3).is_err());
    }

    #[test]
    fn test_missing_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut editor = disk_editor(&dir);
        assert!(show_snapshot(&editor, "nope").is_err());
        assert!(export_snapshot(&mut editor, "nope", dir.path().to_path_buf(), false).is_err());
    }
}
