/*!
Local filesystem storage adapter implementation.
*/

use std::fs;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::{PixooError, Result};

/// Local filesystem storage adapter
///
/// Each key is stored as `<base_dir>/<key>.json`. Values are written to a
/// temporary sibling file and renamed into place, so a failed write leaves
/// the previous value intact.
///
/// # Example
/// ```rust
/// use pixoo_core::storage::{KeyValueStore, LocalFileStorage};
///
/// # let dir = std::env::temp_dir().join("pixoo-doc-local");
/// let storage = LocalFileStorage::with_base_dir(&dir);
/// storage.set("pixoo-saved-images", "[]")?;
/// assert!(storage.exists("pixoo-saved-images"));
/// # Ok::<(), pixoo_core::PixooError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    /// Store values in the current directory
    pub fn new() -> Self {
        Self::with_base_dir(".")
    }

    /// Store values under `base_dir`, created on first write
    pub fn with_base_dir<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the file backing `key`
    fn resolve_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(|c: char| c == '/' || c == '\\');
        if !valid {
            return Err(PixooError::validation(format!(
                "Storage key must be a plain name: {key:?}"
            )));
        }
        Ok(self.base_dir.join(format!("{key}.json")))
    }

    /// Ensure the base directory exists, creating it if necessary
    fn ensure_base_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                PixooError::storage(format!(
                    "Failed to create directory {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

impl Default for LocalFileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let full_path = self.resolve_path(key)?;
        if !full_path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&full_path).map(Some).map_err(|e| {
            PixooError::storage(format!("Failed to read {}: {}", full_path.display(), e))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.resolve_path(key)?;
        self.ensure_base_dir()?;

        let tmp_path = full_path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(|e| {
            PixooError::storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;

        fs::rename(&tmp_path, &full_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PixooError::storage(format!(
                "Failed to move {} into place: {}",
                full_path.display(),
                e
            ))
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let full_path = self.resolve_path(key)?;

        if full_path.exists() {
            fs::remove_file(&full_path).map_err(|e| {
                PixooError::storage(format!("Failed to delete {}: {}", full_path.display(), e))
            })?;
        }

        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.resolve_path(key).map(|p| p.exists()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_file_storage_basic_operations() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::with_base_dir(temp_dir.path());

        assert_eq!(storage.get("pixoo-saved-images").unwrap(), None);

        assert!(storage.set("pixoo-saved-images", "[]").is_ok());
        assert!(storage.exists("pixoo-saved-images"));
        assert!(temp_dir.path().join("pixoo-saved-images.json").exists());
        assert_eq!(
            storage.get("pixoo-saved-images").unwrap().as_deref(),
            Some("[]")
        );

        assert!(storage.remove("pixoo-saved-images").is_ok());
        assert!(!storage.exists("pixoo-saved-images"));
    }

    #[test]
    fn test_overwrite_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::with_base_dir(temp_dir.path());

        storage.set("k", "first").unwrap();
        storage.set("k", "second").unwrap();

        assert_eq!(storage.get("k").unwrap().as_deref(), Some("second"));
        assert!(!temp_dir.path().join("k.json.tmp").exists());
    }

    #[test]
    fn test_creates_missing_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");
        let storage = LocalFileStorage::with_base_dir(&nested);

        assert!(storage.set("k", "v").is_ok());
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalFileStorage::with_base_dir(temp_dir.path());

        for key in ["", "..", "../escape", "nested/key", "back\\slash"] {
            assert!(matches!(
                storage.set(key, "v"),
                Err(PixooError::Validation(_))
            ));
            assert!(!storage.exists(key));
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let storage = LocalFileStorage::with_base_dir(&blocker);
        assert!(matches!(storage.set("k", "v"), Err(PixooError::Storage(_))));
    }
}
