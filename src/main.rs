use clap::Parser;
use dogs_api::cli::{run_cli, Cli};
use dogs_api::logging::{init_logging_with_config, LogConfig};

fn main() -> anyhow::Result<()> {
    let _guard = init_logging_with_config(&LogConfig::from_env())?;
    run_cli(Cli::parse())
}
