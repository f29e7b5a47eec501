//! # CLI Behavior
//!
//! This is **one possible UI client** for the catalog. It is the only place that knows
//! about terminal I/O, exit codes and output formatting.
//!
//! ### Naked Execution (`catalog`)
//!
//! Running `catalog` with no arguments defaults to `catalog list`, the card grid.
//!
//! ### Forms Without a Screen
//!
//! `add` and `edit` drive the same product form a graphical client would: flags fill the
//! fields, `--image` starts the asynchronous image read, and the form is submitted only
//! when every required field is present. Prices go through the same sanitizer as typed
//! input, so `--price 12a.3b4` stores `12.34`.
//!
//! ### Exit Codes
//!
//! A command exits with 1 when any error-level message was produced, 0 otherwise.
//!
//! ## Module Structure
//!
//! - `commands`: Per-command handlers that call the catalog and print results
//! - `logging`: tracing subscriber setup
//! - `render`: Card grid, product detail and message formatting
//! - `setup`: Argument parsing via clap
//! - `styles`: Terminal styling constants

mod commands;
mod logging;
mod render;
pub mod setup;
mod styles;

pub use commands::run;
