use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use pricetag::{PriceSuffixService, PricingConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "pricetag")]
#[command(about = "Print a live price suffix for an asset")]
struct Cli {
    /// Asset key (e.g. btc, eth, xau, xag)
    asset: Option<String>,

    /// Quote currency (defaults to the configured currency)
    #[arg(short = 'C', long)]
    currency: Option<String>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verify TLS certificates against the system trust store
    #[arg(long)]
    verify_tls: bool,

    /// List known asset keys and exit
    #[arg(long)]
    list: bool,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pricetag").join("config.toml"))
}

fn load_config(cli: &Cli) -> Result<PricingConfig> {
    let config = match cli.config.as_ref().or(default_config_path().as_ref()) {
        Some(path) => PricingConfig::load_or_default(path)?,
        None => PricingConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if cli.verify_tls {
        config.verify_tls = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let service = PriceSuffixService::new(&config);

    if cli.list {
        for key in service.registry().keys() {
            println!("{key}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(asset) = cli.asset.as_deref() else {
        eprintln!("Usage: pricetag <ASSET> [--currency CODE]. Run 'pricetag --help' for more options.");
        return Ok(ExitCode::from(2));
    };

    match service.suffix_for(asset, cli.currency.as_deref()).await {
        Some(suffix) => {
            println!("{suffix}");
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
