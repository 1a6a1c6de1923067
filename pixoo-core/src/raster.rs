/*!
Grid rasterization and PNG encoding.

Rendering is a pure function of a [`Grid`]: every cell becomes a uniform
`cell_size` x `cell_size` block, row `i` mapped to the vertical axis and
column `j` to the horizontal one. The same fill-rectangle pass drives both
the full-size export and the archive thumbnails.
*/

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgb, RgbImage};

use crate::{Color, Grid, PixooError, Result, GRID_SIZE};

/// Cell size used for downloads (640x640 output)
pub const EXPORT_CELL_SIZE: u32 = 10;

/// Cell size used for archive thumbnails (128x128 output)
pub const THUMBNAIL_CELL_SIZE: u32 = 2;

/// Largest accepted cell size
pub const MAX_CELL_SIZE: u32 = 64;

/// A drawing target that accepts solid rectangle fills
pub trait Surface {
    /// Fill `[x, x + w) x [y, y + h)` with `color`
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color);
}

impl Surface for RgbImage {
    fn fill_rect(&mut self, x: u32, y: u32, w: u32, h: u32, color: Color) {
        let pixel = Rgb(color.to_array());
        let x_end = x.saturating_add(w).min(self.width());
        let y_end = y.saturating_add(h).min(self.height());
        for py in y..y_end {
            for px in x..x_end {
                self.put_pixel(px, py, pixel);
            }
        }
    }
}

/// Side length in pixels of a grid rendered at `cell_size`
pub fn image_side(cell_size: u32) -> u32 {
    GRID_SIZE as u32 * cell_size
}

fn check_cell_size(cell_size: u32) -> Result<()> {
    if cell_size == 0 || cell_size > MAX_CELL_SIZE {
        return Err(PixooError::validation(format!(
            "Cell size must be between 1 and {MAX_CELL_SIZE}, got {cell_size}"
        )));
    }
    Ok(())
}

/// Paint `grid` onto any surface at the given cell size
pub fn render_to<S: Surface>(grid: &Grid, cell_size: u32, surface: &mut S) {
    for (i, j, color) in grid.cells() {
        surface.fill_rect(
            j as u32 * cell_size,
            i as u32 * cell_size,
            cell_size,
            cell_size,
            color,
        );
    }
}

/// Render `grid` into a `(64 * cell_size)`-square RGB image
pub fn render(grid: &Grid, cell_size: u32) -> Result<RgbImage> {
    check_cell_size(cell_size)?;
    let side = image_side(cell_size);
    let mut image = RgbImage::new(side, side);
    render_to(grid, cell_size, &mut image);
    Ok(image)
}

/// Encode an image as PNG; identical pixels always yield identical bytes
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(bytes)
}

/// Render and encode in one step
///
/// # Example
/// ```rust
/// use pixoo_core::{raster, Grid};
///
/// let png = raster::render_png(&Grid::new(), raster::THUMBNAIL_CELL_SIZE)?;
/// let image = raster::decode_png(&png)?;
/// assert_eq!(image.dimensions(), (128, 128));
/// # Ok::<(), pixoo_core::PixooError>(())
/// ```
pub fn render_png(grid: &Grid, cell_size: u32) -> Result<Vec<u8>> {
    encode_png(&render(grid, cell_size)?)
}

/// Decode PNG bytes into an RGB image
pub fn decode_png(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    Ok(image.to_rgb8())
}

/// Recover a grid from a rendered image by reading each block's center pixel
pub fn sample_grid(image: &RgbImage, cell_size: u32) -> Result<Grid> {
    check_cell_size(cell_size)?;
    let side = image_side(cell_size);
    if image.dimensions() != (side, side) {
        let (w, h) = image.dimensions();
        return Err(PixooError::invalid_format(format!(
            "Expected a {side}x{side} image for cell size {cell_size}, got {w}x{h}"
        )));
    }

    let center = cell_size / 2;
    let mut grid = Grid::new();
    for i in 0..GRID_SIZE {
        for j in 0..GRID_SIZE {
            let x = j as u32 * cell_size + center;
            let y = i as u32 * cell_size + center;
            grid.set(i, j, Color::from(image.get_pixel(x, y).0))?;
        }
    }
    Ok(grid)
}
