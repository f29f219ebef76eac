use anyhow::{Context, Result};
use clap::Parser;
use climatewatch_cli::Cli;
use climatewatch_config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config first so its log filter applies
    let config = AppConfig::resolve(cli.config.as_ref()).context("failed to load configuration")?;

    climatewatch_obs::init("climatewatch", &config.log_filter());

    let output = climatewatch_cli::run(&cli, &config)?;
    print!("{output}");
    Ok(())
}
