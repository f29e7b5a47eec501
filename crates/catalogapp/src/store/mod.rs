//! # Storage Layer
//!
//! The record store owns the durable collection of products. Everything above it
//! (form, catalog controller, CLI) talks to the [`RecordStore`] trait only.
//!
//! ## Layers
//!
//! - [`backend::StorageBackend`]: raw I/O for one named database. It knows how to load the
//!   whole [`Database`] document and how to commit it atomically, nothing else.
//! - [`product_store::ProductStore`]: the record semantics (key generation, partial merge,
//!   idempotent delete, schema upgrades) on top of any backend.
//!
//! ## Transactions
//!
//! Each operation is its own transaction: take the store's transaction lock, load the document,
//! mutate it, commit it, release the lock. There is no multi-operation transaction. Because
//! the lock spans the whole operation, `update` is an atomic read-modify-write within one
//! process. Two processes writing the same database are not coordinated.
//!
//! ## Storage Layout
//!
//! ```text
//! <data_dir>/
//! └── productApp.json     # {"name", "version", "next_id", "products": [...]}
//! ```
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: production, one JSON file per database, tmp-file + rename commits.
//! - [`mem_backend::MemBackend`]: in-memory, for tests, with switchable failure simulation.

use crate::error::StoreResult;
use crate::model::{Product, ProductId, ProductPatch};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;
pub mod product_store;

/// Current on-disk schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Database name used when none is configured.
pub const DEFAULT_DATABASE_NAME: &str = "productApp";

/// The whole persisted state of one database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    pub version: u32,
    /// Next key to hand out. Only ever grows, so keys are never reused.
    pub next_id: u64,
    /// Kept sorted by id.
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SCHEMA_VERSION,
            next_id: 1,
            products: Vec::new(),
        }
    }

    /// Linear scan: a document edited by hand while a store is open may be out of order.
    pub(crate) fn position(&self, id: ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id == Some(id))
    }
}

/// Durable CRUD over product records.
///
/// Every method is a single-shot request/response running in its own transaction.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new product and return its freshly assigned id.
    async fn create(&self, product: &Product) -> StoreResult<ProductId>;

    /// All persisted products. Callers must not rely on the order.
    async fn read_all(&self) -> StoreResult<Vec<Product>>;

    /// Merge `patch` over the stored record and return the result.
    async fn update(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<Product>;

    /// Remove a product. Removing an unknown id succeeds.
    async fn delete(&self, id: ProductId) -> StoreResult<()>;
}
