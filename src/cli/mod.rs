//! # CLI Module
//!
//! Command-line entry points for the `dogs-api` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! dogs-api serve --config config/config.yaml
//! dogs-api serve --addr 127.0.0.1:3001 --memory
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML config (default: `config/config.yaml` if present)
//! - `--addr <ADDR>` - listen address, overrides config and `DOGS_ADDR`
//! - `--database <PATH>` - SQLite file, overrides config and `DOGS_DATABASE_PATH`
//! - `--memory` - keep records in process memory instead of SQLite
//!
//! ### `routes`
//!
//! Print the route table and exit.

mod commands;


pub use commands::{run_cli, Cli, Commands};
