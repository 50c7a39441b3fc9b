use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use snctl_token_agent::handler::SecretBackend;
use snctl_token_agent::issuer::{Orchestrator, ProcessRunner};
use snctl_token_agent::server;
use snctl_token_agent::storage::StorageKind;
use snctl_token_agent::utils::config_loader;
use snctl_token_agent::utils::constants::DEFAULT_CONFIG_PATH;
use snctl_token_agent::utils::logging;
use snctl_token_agent::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config)?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Open secret storage
    // -------------------------------

    let storage = StorageKind::from_config(&service_config.storage).await?;

    // -------------------------------
    // 3. Prepare issuer and path backend
    // -------------------------------

    let orchestrator = Orchestrator::new(ProcessRunner, &service_config.issuer);
    info!("Using snctl: {}", orchestrator.issuer().program());
    let backend = Arc::new(SecretBackend::new(
        storage,
        orchestrator,
        service_config.settings.mount_point.clone(),
    ));

    // -------------------------------
    // 4. Serve path operations until shutdown
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config.settings, backend).await
}
