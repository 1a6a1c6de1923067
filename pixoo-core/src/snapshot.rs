/*!
Archived grid snapshots.

A [`Snapshot`] is created once, on save, and never changes afterwards. It
carries a deep copy of the grid, the creation instant, a 128x128 PNG
thumbnail and a content hash used to detect damaged records on reload.
*/

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::raster::{self, THUMBNAIL_CELL_SIZE};
use crate::{Grid, PixooError, Result};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// PNG-encoded preview of a grid, persisted as a `data:` URL
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Thumbnail {
    png: Vec<u8>,
}

impl Thumbnail {
    /// Render the thumbnail for `grid` at [`THUMBNAIL_CELL_SIZE`]
    pub fn render(grid: &Grid) -> Result<Self> {
        Ok(Self {
            png: raster::render_png(grid, THUMBNAIL_CELL_SIZE)?,
        })
    }

    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// Parse a `data:image/png;base64,...` URL; an empty string is an empty thumbnail
    pub fn from_data_url(url: &str) -> Result<Self> {
        if url.is_empty() {
            return Ok(Self::default());
        }
        let encoded = url.strip_prefix(DATA_URL_PREFIX).ok_or_else(|| {
            PixooError::invalid_format("Thumbnail is not a base64 PNG data URL")
        })?;
        let png = general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| PixooError::invalid_format(format!("Invalid thumbnail base64: {e}")))?;
        Ok(Self { png })
    }

    pub fn to_data_url(&self) -> String {
        if self.png.is_empty() {
            return String::new();
        }
        format!("{DATA_URL_PREFIX}{}", general_purpose::STANDARD.encode(&self.png))
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}

impl std::fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Thumbnail({} bytes)", self.png.len())
    }
}

impl Serialize for Thumbnail {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for Thumbnail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        Thumbnail::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

/// One archived grid
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Unique within its archive
    pub id: String,

    pub grid: Grid,

    /// Creation instant, stored as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub thumbnail: Thumbnail,

    /// SHA-256 of the grid cells; absent on records written before hashing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Snapshot {
    /// Capture `grid` (deep copy) with a freshly rendered thumbnail
    pub fn capture<S: Into<String>>(id: S, grid: &Grid, timestamp: DateTime<Utc>) -> Result<Self> {
        let grid = grid.clone();
        let thumbnail = Thumbnail::render(&grid)?;
        let content_hash = Some(grid.content_hash());
        Ok(Self {
            id: id.into(),
            grid,
            timestamp,
            thumbnail,
            content_hash,
        })
    }

    /// Check the stored hash against the grid, when a hash was stored
    pub fn verify_integrity(&self) -> Result<()> {
        let Some(expected) = &self.content_hash else {
            return Ok(());
        };
        let actual = self.grid.content_hash();
        if *expected == actual {
            Ok(())
        } else {
            Err(PixooError::IntegrityCheckFailed {
                expected: expected.clone(),
                actual,
            })
        }
    }

    /// Validate that all required fields are properly set
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(PixooError::validation("snapshot id cannot be empty"));
        }
        self.verify_integrity()
    }
}

/// Issues snapshot ids from a millisecond clock
///
/// Ids are the decimal epoch-millisecond value of the save instant. When two
/// saves land on the same millisecond, or the clock steps backwards, the
/// value is bumped past the last issued id so ids stay strictly increasing.
#[derive(Debug, Clone, Default)]
pub struct SnapshotIdGenerator {
    last: Option<i64>,
}

impl SnapshotIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids sort after `id` when it is numeric
    pub fn observe(&mut self, id: &str) {
        if let Ok(value) = id.parse::<i64>() {
            self.last = Some(self.last.map_or(value, |last| last.max(value)));
        }
    }

    /// Next id at `now` that `taken` does not report as in use
    ///
    /// When the last id leaves no room above it, counting restarts from
    /// the clock.
    ///
    /// # Errors
    /// * `PixooError::Validation` - If every id from the start point up is taken
    pub fn next<F>(&mut self, now: DateTime<Utc>, taken: F) -> Result<String>
    where
        F: Fn(&str) -> bool,
    {
        let now = now.timestamp_millis();
        let mut candidate = match self.last.and_then(|last| last.checked_add(1)) {
            Some(after_last) => now.max(after_last),
            None => now,
        };
        while taken(&candidate.to_string()) {
            candidate = candidate
                .checked_add(1)
                .ok_or_else(|| PixooError::validation("No free snapshot id left"))?;
        }
        self.last = Some(candidate);
        Ok(candidate.to_string())
    }
}
