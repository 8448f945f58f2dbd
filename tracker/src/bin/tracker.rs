//! tracker: serve the activities/accounts API.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker::config::DEFAULT_SECRET;
use tracker::{Application, Config};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Activities and accounts REST API")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides server.host and $HOST
    #[arg(long)]
    host: Option<String>,
    /// Overrides server.port and $PORT
    #[arg(short, long)]
    port: Option<u16>,
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    if let Some(host) = &cli.host {
        config.server.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info,tracker_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    if config.auth.secret == DEFAULT_SECRET {
        tracing::warn!("using the default signing secret; set TRACKER_SECRET or auth.secret");
    }
    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        tie_break = ?config.router.tie_break,
        "tracker starting"
    );
    Application::new(config).run()
}
