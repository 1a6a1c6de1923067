/*!
The paintable grid and its gesture state.

[`GridStore`] owns the current [`Grid`] and the ephemeral [`PaintState`].
Every mutation is synchronous and, once applied, is announced to the
registered observers with a read-only view of the new grid.
*/

use tracing::{debug, warn};

use crate::{Color, Grid, Result};

/// Ephemeral painting state, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintState {
    /// Color written by the next paint when the eraser is off
    pub current_color: Color,
    /// When set, paints write [`Color::EMPTY`]
    pub eraser_active: bool,
    /// True between `begin_paint` and `end_paint`
    pub is_drawing: bool,
}

impl PaintState {
    /// The color a paint operation writes right now
    pub fn brush(&self) -> Color {
        if self.eraser_active {
            Color::EMPTY
        } else {
            self.current_color
        }
    }
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            current_color: Color::DEFAULT_PAINT,
            eraser_active: false,
            is_drawing: false,
        }
    }
}

type Observer = Box<dyn FnMut(&Grid)>;

/// Owner of the current grid
///
/// # Example
/// ```rust
/// use pixoo_core::{Color, GridStore};
///
/// let mut store = GridStore::new();
/// store.set_color(Color::rgb(0, 0, 255));
/// store.begin_paint(0, 0)?;
/// store.continue_paint(0, 1)?;
/// store.end_paint();
///
/// assert_eq!(store.grid().get(0, 1), Some(Color::rgb(0, 0, 255)));
/// # Ok::<(), pixoo_core::PixooError>(())
/// ```
pub struct GridStore {
    grid: Grid,
    paint: PaintState,
    observers: Vec<Observer>,
}

impl GridStore {
    pub fn new() -> Self {
        Self::with_grid(Grid::new())
    }

    pub fn with_grid(grid: Grid) -> Self {
        Self {
            grid,
            paint: PaintState::default(),
            observers: Vec::new(),
        }
    }

    /// Register a callback invoked after every grid mutation
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&Grid) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Start a gesture and paint the cell under it
    ///
    /// Out-of-range coordinates are rejected with
    /// [`PixooError::OutOfBounds`](crate::PixooError::OutOfBounds) and leave
    /// the store untouched, including the gesture flag.
    pub fn begin_paint(&mut self, row: usize, col: usize) -> Result<()> {
        self.paint_cell(row, col)?;
        self.paint.is_drawing = true;
        Ok(())
    }

    /// Paint the cell under a moving pointer; ignored outside a gesture
    pub fn continue_paint(&mut self, row: usize, col: usize) -> Result<()> {
        if !self.paint.is_drawing {
            return Ok(());
        }
        self.paint_cell(row, col)
    }

    pub fn end_paint(&mut self) {
        self.paint.is_drawing = false;
    }

    /// Select a paint color, leaving eraser mode
    pub fn set_color(&mut self, color: Color) {
        self.paint.current_color = color;
        self.paint.eraser_active = false;
    }

    pub fn toggle_eraser(&mut self) {
        self.paint.eraser_active = !self.paint.eraser_active;
    }

    /// Reset every cell to the empty color
    pub fn clear_all(&mut self) {
        self.grid.fill(Color::EMPTY);
        debug!("Grid cleared");
        self.notify();
    }

    /// Replace the whole grid, e.g. when restoring a snapshot
    pub fn replace_grid(&mut self, grid: Grid) {
        self.grid = grid;
        self.notify();
    }

    /// Replace the whole grid from untyped rows
    ///
    /// Rows that are not exactly 64x64 are rejected with
    /// [`PixooError::DimensionMismatch`](crate::PixooError::DimensionMismatch)
    /// and the current grid is kept.
    pub fn replace_grid_rows(&mut self, rows: Vec<Vec<Color>>) -> Result<()> {
        let grid = Grid::from_rows(rows)?;
        self.replace_grid(grid);
        Ok(())
    }

    /// Read-only view of the current grid
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn paint_state(&self) -> PaintState {
        self.paint
    }

    fn paint_cell(&mut self, row: usize, col: usize) -> Result<()> {
        let brush = self.paint.brush();
        if let Err(e) = self.grid.set(row, col, brush) {
            warn!(row, col, "Rejected paint outside the grid");
            return Err(e);
        }
        self.notify();
        Ok(())
    }

    fn notify(&mut self) {
        for observer in self.observers.iter_mut() {
            observer(&self.grid);
        }
    }
}

impl Default for GridStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("grid", &self.grid)
            .field("paint", &self.paint)
            .field("observers", &self.observers.len())
            .finish()
    }
}
