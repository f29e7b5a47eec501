//! # Configuration
//!
//! Catalog configuration is loaded with [`confique`], layered in priority order:
//! 1. **Environment variables**: `CATALOG_DATABASE`, `CATALOG_DATA_DIR`, ...
//! 2. **Config file**: `catalog.toml` in the OS config directory (via `directories`),
//!    or the file given with `--config`.
//! 3. **Compiled Defaults**: `#[config(default = ...)]`.
//!
//! The CLI's `--data-dir` flag is applied on top of the loaded value.
//!
//! ## Available Settings
//!
//! | Key | Env | Default | Description |
//! |-----|-----|---------|-------------|
//! | `database_name` | `CATALOG_DATABASE` | `productApp` | Name of the product database |
//! | `data_dir` | `CATALOG_DATA_DIR` | OS data dir | Where database files live |
//! | `log_level` | `CATALOG_LOG_LEVEL` | `warn` | Used when `RUST_LOG` is unset |
//! | `max_image_bytes` | `CATALOG_MAX_IMAGE_BYTES` | 5 MiB | Largest accepted image file |

use crate::error::{CatalogError, Result};
use crate::image::DEFAULT_MAX_IMAGE_BYTES;
use crate::store::DEFAULT_DATABASE_NAME;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the catalog, stored in `catalog.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Name of the product database (one file per name).
    #[config(default = "productApp", env = "CATALOG_DATABASE")]
    pub database_name: String,

    /// Directory holding database files. Defaults to the OS data directory.
    #[config(env = "CATALOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. "warn", "catalogapp=debug").
    #[config(default = "warn", env = "CATALOG_LOG_LEVEL")]
    pub log_level: String,

    /// Largest image file accepted by the product form, in bytes.
    #[config(default = 5242880, env = "CATALOG_MAX_IMAGE_BYTES")]
    pub max_image_bytes: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            data_dir: None,
            log_level: "warn".to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl CatalogConfig {
    /// Load from the environment and `file`, falling back to defaults.
    ///
    /// A missing `file` is fine unless `required` is set.
    pub fn load(file: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            if required && !file.exists() {
                return Err(CatalogError::Setup(format!(
                    "Config file not found: {}",
                    file.display()
                )));
            }
            builder = builder.file(file);
        }
        Ok(builder.load()?)
    }

    /// Key/value pairs for display, in a stable order.
    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        vec![
            ("database_name", self.database_name.clone()),
            (
                "data_dir",
                self.data_dir
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(default)".to_string()),
            ),
            ("log_level", self.log_level.clone()),
            ("max_image_bytes", self.max_image_bytes.to_string()),
        ]
    }
}
