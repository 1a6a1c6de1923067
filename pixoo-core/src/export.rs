/*!
PNG export of the current grid.

The grid is rendered at [`EXPORT_CELL_SIZE`] and handed to an
[`ExportTarget`], the capability that actually delivers the bytes (a
download, a file on disk, a test buffer).
*/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::raster::{self, EXPORT_CELL_SIZE};
use crate::{Grid, Result};

/// File name suggested for exported images
pub const EXPORT_FILE_NAME: &str = "pixoo-art.png";

/// Destination for exported raster bytes
pub trait ExportTarget {
    /// Deliver `bytes` under the suggested `file_name`
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<()>;
}

/// Writes exports as files inside a directory
#[derive(Debug, Clone)]
pub struct DirectoryExport {
    dir: PathBuf,
}

impl DirectoryExport {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path a file named `file_name` is written to
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl ExportTarget for DirectoryExport {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(file_name);
        fs::write(&path, bytes)?;

        info!(path = %path.display(), bytes = bytes.len(), "Image exported");
        Ok(())
    }
}

/// Render `grid` at export scale and deliver it as [`EXPORT_FILE_NAME`]
pub fn export_png(grid: &Grid, target: &dyn ExportTarget) -> Result<()> {
    export_png_as(grid, target, EXPORT_FILE_NAME)
}

/// Render `grid` at export scale and deliver it under `file_name`
pub fn export_png_as(grid: &Grid, target: &dyn ExportTarget, file_name: &str) -> Result<()> {
    let png = raster::render_png(grid, EXPORT_CELL_SIZE)?;
    target.deliver(file_name, &png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PixooError};
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Captured {
        files: RefCell<Vec<(String, Vec<u8>)>>,
    }

    impl ExportTarget for Captured {
        fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .push((file_name.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_export_uses_fixed_name_and_size() {
        let target = Captured::default();
        let mut grid = Grid::new();
        grid.set(0, 0, Color::rgb(0xff, 0, 0)).unwrap();

        export_png(&grid, &target).unwrap();

        let files = target.files.borrow();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, "pixoo-art.png");

        let image = raster::decode_png(&files[0].1).unwrap();
        assert_eq!(image.dimensions(), (640, 640));
        assert_eq!(image.get_pixel(5, 5).0, [0xff, 0, 0]);
        assert_eq!(image.get_pixel(15, 5).0, [0, 0, 0]);
    }

    #[test]
    fn test_directory_export_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = DirectoryExport::new(temp_dir.path().join("out"));

        export_png_as(&Grid::new(), &target, "blank.png").unwrap();

        let bytes = fs::read(target.path_for("blank.png")).unwrap();
        assert_eq!(raster::decode_png(&bytes).unwrap().dimensions(), (640, 640));
    }

    #[test]
    fn test_directory_export_reports_io_errors() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("taken");
        fs::write(&blocker, "not a directory").unwrap();

        let target = DirectoryExport::new(&blocker);
        let result = export_png(&Grid::new(), &target);
        assert!(matches!(result, Err(PixooError::Io(_))));
    }
}
