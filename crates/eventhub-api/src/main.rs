use anyhow::{Context, Result};
use clap::Parser;
use eventhub_api::{AppState, Server};
use eventhub_core::{ConfigManager, LoggingConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "eventhub-server")]
#[command(about = "MyCSD Event Hub API server", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to .eventhub.toml, then ~/.eventhub/config.toml)
    #[arg(short, long, env = "EVENTHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host, overrides [server].host
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides [server].port
    #[arg(short, long)]
    port: Option<u16>,

    /// Seed JSON for the in-memory stores, overrides [store].seed_path
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Write a default config file to this path and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{level},eventhub_api={level},tower_http=info",
            level = logging.level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format.as_str() {
        "json" => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.init_config {
        ConfigManager::create_default_config(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(());
    }

    let manager = match &cli.config {
        Some(path) => ConfigManager::load_from_path(path),
        None => ConfigManager::load(),
    }
    .context("loading configuration")?;

    let mut config = manager.config().clone();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(seed) = cli.seed {
        config.store.seed_path = Some(seed);
    }
    let manager = Arc::new(ConfigManager::from_config(config).context("validating configuration")?);

    init_tracing(&manager.config().logging);

    let server_config = &manager.config().server;
    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                server_config.host, server_config.port
            )
        })?;

    let state = AppState::new(manager.clone()).context("building application state")?;
    Server::new(addr, state).run().await?;
    Ok(())
}
