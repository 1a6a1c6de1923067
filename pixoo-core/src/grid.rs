/*!
The fixed-size color grid.

A [`Grid`] is always exactly [`GRID_SIZE`] x [`GRID_SIZE`] cells and every
cell holds a valid [`Color`]. It is a plain value: cloning deep-copies all
cells, so an archived grid never aliases the one being painted.
*/

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::{Color, PixooError, Result};

/// Width and height of every grid, in cells
pub const GRID_SIZE: usize = 64;

type Cells = [[Color; GRID_SIZE]; GRID_SIZE];

/// A 64x64 grid of colors, indexed `[row][col]`
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Box<Cells>,
}

impl Grid {
    /// Create a grid with every cell set to [`Color::EMPTY`]
    pub fn new() -> Self {
        Self::filled(Color::EMPTY)
    }

    /// Create a grid with every cell set to `color`
    pub fn filled(color: Color) -> Self {
        Self {
            cells: Box::new([[color; GRID_SIZE]; GRID_SIZE]),
        }
    }

    /// Build a grid from nested rows, rejecting anything that is not 64x64
    ///
    /// # Example
    /// ```rust
    /// use pixoo_core::{Color, Grid, PixooError};
    ///
    /// let rows = vec![vec![Color::EMPTY; 64]; 32];
    /// assert!(matches!(
    ///     Grid::from_rows(rows),
    ///     Err(PixooError::DimensionMismatch { rows: 32, cols: 64 })
    /// ));
    /// ```
    pub fn from_rows(rows: Vec<Vec<Color>>) -> Result<Self> {
        let mismatch = |cols: usize| PixooError::DimensionMismatch {
            rows: rows.len(),
            cols,
        };

        if rows.len() != GRID_SIZE {
            return Err(mismatch(rows.first().map_or(0, Vec::len)));
        }
        if let Some(bad) = rows.iter().find(|row| row.len() != GRID_SIZE) {
            return Err(mismatch(bad.len()));
        }

        let mut grid = Self::new();
        for (target, source) in grid.cells.iter_mut().zip(&rows) {
            target.copy_from_slice(source);
        }
        Ok(grid)
    }

    /// Color at `(row, col)`, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Overwrite a single cell
    pub fn set(&mut self, row: usize, col: usize, color: Color) -> Result<()> {
        let cell = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(PixooError::OutOfBounds { row, col })?;
        *cell = color;
        Ok(())
    }

    pub fn fill(&mut self, color: Color) {
        for row in self.cells.iter_mut() {
            row.fill(color);
        }
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> + '_ {
        self.cells.iter().map(|row| &row[..])
    }

    /// Every cell as `(row, col, color)` in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, color)| (i, j, *color))
        })
    }

    /// Number of cells holding something other than the empty color
    pub fn painted_cells(&self) -> usize {
        self.cells().filter(|(_, _, color)| !color.is_empty()).count()
    }

    /// SHA-256 of the row-major RGB bytes, as lowercase hex
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for (_, _, color) in self.cells() {
            hasher.update(color.to_array());
        }
        format!("{:x}", hasher.finalize())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("size", &GRID_SIZE)
            .field("painted_cells", &self.painted_cells())
            .finish()
    }
}

impl TryFrom<Vec<Vec<Color>>> for Grid {
    type Error = PixooError;

    fn try_from(rows: Vec<Vec<Color>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}

impl<'de> Deserialize<'de> for Grid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rows = Vec::<Vec<Color>>::deserialize(deserializer)?;
        Grid::from_rows(rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new();
        assert_eq!(grid.rows().count(), GRID_SIZE);
        assert!(grid.rows().all(|row| row.len() == GRID_SIZE));
        assert!(grid.cells().all(|(_, _, color)| color == Color::EMPTY));
        assert_eq!(grid.painted_cells(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = Grid::new();
        grid.set(3, 60, Color::rgb(1, 2, 3)).unwrap();

        assert_eq!(grid.get(3, 60), Some(Color::rgb(1, 2, 3)));
        assert_eq!(grid.get(60, 3), Some(Color::EMPTY));
        assert_eq!(grid.get(64, 0), None);
        assert_eq!(grid.painted_cells(), 1);
    }

    #[test]
    fn test_set_out_of_bounds() {
        let mut grid = Grid::new();
        let result = grid.set(0, 64, Color::DEFAULT_PAINT);

        assert!(matches!(
            result,
            Err(PixooError::OutOfBounds { row: 0, col: 64 })
        ));
        assert_eq!(grid, Grid::new());
    }

    #[test]
    fn test_from_rows_validates_dimensions() {
        assert!(Grid::from_rows(vec![vec![Color::EMPTY; GRID_SIZE]; GRID_SIZE]).is_ok());

        let mut ragged = vec![vec![Color::EMPTY; GRID_SIZE]; GRID_SIZE];
        ragged[10].pop();
        assert!(matches!(
            Grid::from_rows(ragged),
            Err(PixooError::DimensionMismatch { rows: 64, cols: 63 })
        ));

        assert!(matches!(
            Grid::from_rows(Vec::new()),
            Err(PixooError::DimensionMismatch { rows: 0, cols: 0 })
        ));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = Grid::new();
        let copy = original.clone();
        original.set(0, 0, Color::DEFAULT_PAINT).unwrap();

        assert_eq!(copy.get(0, 0), Some(Color::EMPTY));
    }

    #[test]
    fn test_serde_roundtrip_uses_nested_hex_rows() {
        let mut grid = Grid::new();
        grid.set(0, 1, Color::rgb(0xab, 0xcd, 0xef)).unwrap();

        let value = serde_json::to_value(&grid).unwrap();
        assert_eq!(value[0][1], "#abcdef");
        assert_eq!(value[63][63], "#000000");

        let restored: Grid = serde_json::from_value(value).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_deserialize_rejects_wrong_size() {
        let rows = vec![vec!["#000000"; 8]; 8];
        let json = serde_json::to_string(&rows).unwrap();
        assert!(serde_json::from_str::<Grid>(&json).is_err());
    }

    #[test]
    fn test_content_hash_tracks_cells() {
        let blank = Grid::new();
        let mut painted = Grid::new();
        painted.set(5, 5, Color::rgb(0, 0, 1)).unwrap();

        assert_eq!(blank.content_hash(), Grid::new().content_hash());
        assert_ne!(blank.content_hash(), painted.content_hash());
        assert_eq!(blank.content_hash().len(), 64);
    }
}
