//! Configuration module for storage backend selection and export settings
//!
//! This module provides the configuration structure used to pick where the
//! snapshot archive lives (local filesystem or memory), which key it is
//! written under, and the file name used for PNG exports.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::archive::DEFAULT_STORAGE_KEY;
use crate::export::EXPORT_FILE_NAME;

/// Enumeration of supported storage backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    /// Local filesystem storage
    Local,
    /// Process-local memory, lost on exit
    Memory,
}

/// Configuration structure for storage and export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// The storage backend to use
    pub backend: StorageBackend,
    /// Base path for local storage (optional, defaults to current directory)
    pub local_base_path: Option<PathBuf>,
    /// Key the snapshot archive is stored under
    pub storage_key: String,
    /// File name suggested for PNG exports
    pub export_file_name: String,
}

impl StorageConfig {
    /// Create a default configuration for local filesystem storage
    pub fn default_local() -> Self {
        StorageConfig {
            backend: StorageBackend::Local,
            local_base_path: None,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }

    /// Create a default configuration for in-memory storage
    pub fn default_memory() -> Self {
        StorageConfig {
            backend: StorageBackend::Memory,
            ..Self::default_local()
        }
    }

    /// Create a local configuration rooted at `base_path`
    pub fn local_with_base_path<P: AsRef<Path>>(base_path: P) -> Self {
        StorageConfig {
            local_base_path: Some(base_path.as_ref().to_path_buf()),
            ..Self::default_local()
        }
    }

    /// Parse a storage URI and create the matching configuration
    ///
    /// Supports formats:
    /// - `memory://` for in-memory storage
    /// - `/local/path` or `./relative/path` for local storage
    pub fn from_uri(uri: &str) -> Result<StorageConfig, crate::PixooError> {
        if let Some(rest) = uri.strip_prefix("memory://") {
            if !rest.is_empty() {
                return Err(crate::PixooError::validation(
                    "Memory URI must not carry a path",
                ));
            }
            return Ok(StorageConfig::default_memory());
        }

        if uri.contains("://") {
            return Err(crate::PixooError::validation(format!(
                "Unsupported storage URI: {uri}"
            )));
        }
        if uri.is_empty() {
            return Err(crate::PixooError::validation("Storage path cannot be empty"));
        }

        Ok(StorageConfig::local_with_base_path(uri))
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.storage_key.is_empty() {
            return Err(crate::PixooError::validation("storage_key cannot be empty"));
        }
        if self.export_file_name.is_empty() {
            return Err(crate::PixooError::validation(
                "export_file_name cannot be empty",
            ));
        }
        if !self.export_file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(crate::PixooError::validation(
                "export_file_name must end in .png",
            ));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::default_local()
    }
}
