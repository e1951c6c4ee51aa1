//! Tenantry server binary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use tenantry_config::{ConfigLoader, TenantryConfig};
use tenantry_logging::init_logging_from_config;
use tenantry_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level override
    #[arg(long)]
    log_level: Option<String>,

    /// Print a sample configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        println!("{}", TenantryConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    apply_cli_overrides(&mut config, &cli)?;
    config.validate_all()?;

    init_logging_from_config(&config.logging)?;
    tracing::info!("Starting tenantry server v{}", env!("CARGO_PKG_VERSION"));

    let server = Server::new(config).await?;
    server.start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut TenantryConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e))?;
    }
    Ok(())
}
