//! # Catalog Architecture
//!
//! Catalog is a **UI-agnostic product catalog library**. The `catalog` binary is one client
//! of it; nothing in here assumes a terminal.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UI Client (crates/catalog)                                 │
//! │  - Parses arguments, renders cards, owns stdout/exit codes  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Catalog Controller (catalog.rs) + Product Form (form.rs)   │
//! │  - In-memory mirror of the store, form lifecycle            │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Record Store (store/)                                      │
//! │  - `RecordStore` trait, `ProductStore` over a backend       │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From the catalog controller inward, code:
//! - Takes regular Rust arguments and returns regular Rust types
//! - Reports failures through `CmdResult` messages and `tracing` events
//! - **Never** writes to stdout/stderr
//! - **Never** calls `std::process::exit`
//!
//! ## Concurrency
//!
//! Everything is designed for a single-threaded async runtime. Storage and file reads are
//! the only suspension points. Each store operation is its own transaction.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/product_store.rs`): CRUD semantics against `MemBackend`, including
//!    simulated engine failures.
//! 2. **Form** (`form.rs`): field rules and the image-read generation check.
//! 3. **Catalog** (`catalog.rs`): mirror consistency after every success and failure.
//! 4. **FsBackend** (`tests/`): real files in temp directories.
//!
//! ## Module Overview
//!
//! - [`catalog`]: The catalog controller, entry point for UI clients
//! - [`form`]: Transient edit state for one product
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Product`, `ProductId`, `ProductPatch`)
//! - [`image`]: Image file to data URI encoding
//! - [`config`]: Configuration management
//! - [`init`]: Path resolution and context setup
//! - [`outcome`]: Structured operation results
//! - [`error`]: Error types

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod image;
pub mod init;
pub mod model;
pub mod outcome;
pub mod store;
