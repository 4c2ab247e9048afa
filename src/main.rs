//! Flashcard Store
//!
//! Serves the flashcard review API from the in-memory collection store.

use anyhow::Result;
use clap::Parser;
use flashcard_store::{
    config::{Environment, Settings},
    logging::{init_tracing, LogFormat},
    server::App,
    services::ClockMode,
};

/// Flashcard Store
///
/// JSON API for browsing decks, adding cards and recording answers.
#[derive(Parser, Debug)]
#[command(name = "flashcard-store")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides PORT env var)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to (overrides HOST env var)
    #[arg(long)]
    host: Option<String>,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format (overrides LOG_FORMAT env var)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Environment: dev, staging, prod (overrides ENVIRONMENT env var)
    #[arg(short, long, value_enum)]
    env: Option<Environment>,

    /// Clock used for due dates (overrides CLOCK_MODE env var)
    #[arg(long, value_enum)]
    clock: Option<ClockMode>,

    /// Start with an empty collection instead of the six sample decks
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (before logging, so we can use log_level)
    let mut settings = Settings::load()?;

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(log_level) = args.log_level {
        settings.log_level = log_level;
    }
    if let Some(log_format) = args.log_format {
        settings.log_format = log_format;
    }
    if let Some(env) = args.env {
        settings.environment = env;
    }
    if let Some(clock) = args.clock {
        settings.clock_mode = clock;
    }
    if args.empty {
        settings.seed_default_decks = false;
    }
    settings.validate()?;

    init_tracing(&settings.log_level, settings.log_format)?;

    tracing::info!(
        app_name = %settings.app_name,
        version = %settings.app_version,
        environment = %settings.environment,
        host = %settings.host,
        port = %settings.port,
        clock_mode = %settings.clock_mode,
        "Starting application"
    );

    let app = App::new(settings).await?;

    app.run_with_graceful_shutdown().await?;

    tracing::info!("Application shutdown complete");

    Ok(())
}
