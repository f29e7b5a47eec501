//! # Context Initialization
//!
//! Resolves where the catalog keeps its data, loads configuration, opens the record
//! store and starts the catalog controller.
//!
//! ## Data Directory Resolution
//!
//! 1. Explicit override (the CLI's `--data-dir`).
//! 2. `data_dir` from configuration (which itself honors `CATALOG_DATA_DIR`).
//! 3. The OS-appropriate data directory from the `directories` crate.
//!
//! The directory is created lazily on the first commit, so resolving a path never
//! touches the filesystem.

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::store::fs_backend::FsBackend;
use crate::store::product_store::ProductStore;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILENAME: &str = "catalog.toml";

pub type FsCatalog = Catalog<ProductStore<FsBackend>>;

#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub data_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CatalogPaths {
    pub data_dir: PathBuf,
    pub database_file: PathBuf,
    pub config_file: Option<PathBuf>,
}

pub struct CatalogContext {
    pub catalog: FsCatalog,
    pub config: CatalogConfig,
    pub paths: CatalogPaths,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "catalog", "catalog")
}

pub fn default_config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

pub fn resolve_data_dir(data_override: Option<&Path>, config: &CatalogConfig) -> Result<PathBuf> {
    if let Some(dir) = data_override {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CatalogError::Setup("Could not determine a data directory".to_string()))
}

/// Load configuration and resolve paths without opening anything.
pub fn load_settings(options: &InitOptions) -> Result<(CatalogConfig, CatalogPaths)> {
    let (config_file, required) = match &options.config_file {
        Some(file) => (Some(file.clone()), true),
        None => (default_config_file(), false),
    };
    let config = CatalogConfig::load(config_file.as_deref(), required)?;

    let data_dir = resolve_data_dir(options.data_dir.as_deref(), &config)?;
    let database_file = FsBackend::new(&data_dir, &config.database_name).database_path();

    Ok((
        config,
        CatalogPaths {
            data_dir,
            database_file,
            config_file,
        },
    ))
}

/// Build a ready catalog. Store failures do not fail initialization; they leave the
/// catalog empty and not ready, as [`Catalog::start`] documents.
pub async fn initialize(options: &InitOptions) -> Result<CatalogContext> {
    let (config, paths) = load_settings(options)?;
    Ok(start_with(config, paths).await)
}

/// Start the catalog from already loaded settings.
pub async fn start_with(config: CatalogConfig, paths: CatalogPaths) -> CatalogContext {
    debug!(
        data_dir = %paths.data_dir.display(),
        database = %config.database_name,
        "Starting catalog"
    );

    let backend = FsBackend::new(&paths.data_dir, &config.database_name);
    let catalog = Catalog::start(ProductStore::open(backend, config.database_name.clone())).await;

    CatalogContext {
        catalog,
        config,
        paths,
    }
}
