//! # Catalog CLI
//!
//! The `catalog` binary is one client of the `catalogapp` library. This file only starts
//! the runtime, calls `cli::run()` and turns its outcome into an exit code; everything
//! user-facing lives under `src/cli/`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/catalog/src/cli/)                        │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Command dispatch + form driving (commands.rs)            │
//! │  - Card grid and message rendering (render.rs, styles.rs)   │
//! │  - tracing subscriber setup (logging.rs)                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Catalog controller (crates/catalogapp/src/catalog.rs)      │
//! │  - In-memory mirror, modal/form lifecycle, store calls      │
//! │  - Returns structured `CmdResult` values                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The runtime is single-threaded: store transactions and image reads are the only
//! suspension points, and every catalog operation holds `&mut` access to the controller.
//!
//! ## Testing Approach
//!
//! - Library behavior is tested in `crates/catalogapp`.
//! - Rendering is unit tested in `cli/render.rs` with color disabled.
//! - `tests/cli_e2e.rs` drives the built binary against a temporary data directory.

mod cli;

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
