use crate::app;
use crate::config::AppConfig;
use crate::routes::dog_routes;
use crate::runtime_config::RuntimeConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

/// Command-line interface for the dog records service.
#[derive(Debug, Parser)]
#[command(name = "dogs-api", version)]
#[command(about = "HTTP API for dog records", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// YAML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, e.g. 0.0.0.0:3000
        #[arg(long)]
        addr: Option<String>,

        /// SQLite database file (":memory:" for a throwaway database)
        #[arg(long, conflicts_with = "memory")]
        database: Option<PathBuf>,

        /// Keep records in process memory instead of SQLite
        #[arg(long, default_value_t = false)]
        memory: bool,
    },
    /// Print the route table
    Routes,
}

/// Resolve the effective configuration for `serve`.
///
/// Precedence: flags, then `DOGS_*` variables, then the file, then defaults.
pub fn resolve_config(
    config: Option<&std::path::Path>,
    addr: Option<String>,
    database: Option<PathBuf>,
) -> anyhow::Result<AppConfig> {
    let mut resolved = AppConfig::load(config)?;
    if let Some(addr) = addr {
        resolved.http.addr = addr;
    }
    if let Some(database) = database {
        resolved.database.path = database;
    }
    Ok(resolved)
}

/// Write one `METHOD PATTERN -> handler` line per route.
pub fn print_routes(out: &mut impl Write) -> io::Result<()> {
    for route in dog_routes() {
        writeln!(
            out,
            "{:<7} {:<12} -> {}",
            route.method, route.path_pattern, route.handler_name
        )?;
    }
    Ok(())
}

/// Run the parsed command to completion.
///
/// # Errors
///
/// Configuration, store or bind failures, and a server that exits abnormally.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            config,
            addr,
            database,
            memory,
        } => {
            let config = resolve_config(config.as_deref(), addr, database)?;
            let runtime = RuntimeConfig::from_env();
            let store = app::open_store(&config, memory)?;
            info!(
                addr = %config.http.addr,
                database = %config.database.path.display(),
                memory,
                not_found_status = config.api.not_found_status.code(),
                metrics = config.metrics.enabled,
                stack_size = runtime.stack_size,
                "Starting dogs-api"
            );
            let handle = app::start(store, &config, runtime)?;
            handle
                .join()
                .map_err(|e| anyhow::anyhow!("server exited abnormally: {e:?}"))?;
            Ok(())
        }
        Commands::Routes => {
            print_routes(&mut io::stdout().lock()).context("failed to write routes")?;
            Ok(())
        }
    }
}
