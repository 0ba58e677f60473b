use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use rainfall_core::{AppError, Config};
use rainfall_model::LoadState;
use rainfall_web::Pages;

#[derive(Parser)]
#[command(author, version, about = "Rain prediction web service", long_about = None)]
struct Cli {
    /// Config file (defaults to $RAINFALL_CONFIG, then the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override server.port
    #[arg(long)]
    port: Option<u16>,

    /// Override artifacts.base_dir
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())
        .map_err(|e| fail(e, "Failed to load configuration"))?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(base_dir) = cli.artifacts {
        config.artifacts.base_dir = base_dir;
    }
    config.server.debug |= cli.debug;

    rainfall_core::init(config.server.debug)?;
    config
        .ensure_valid()
        .map_err(|e| fail(e, "Invalid configuration"))?;

    // Load failures are kept and reported per request instead of aborting.
    let state = Arc::new(LoadState::load(&config.artifacts));
    if let Some(error) = state.load_error() {
        tracing::warn!("Serving without a model: {}", error);
    }

    let pages = Arc::new(Pages::from_config(&config.pages));

    rainfall_web::serve(&config.server, state, pages)
        .await
        .map_err(|e| fail(e, "Server failed"))
}

/// Log the operator hint for a startup failure and wrap it for the exit report.
fn fail(error: impl Into<AppError>, context: &'static str) -> anyhow::Error {
    let error = error.into();
    tracing::error!("{}", error.user_message());
    anyhow::Error::new(error).context(context)
}
