//! Hekim - Doctor assistant chatbot
//!
//! Main entry point for the Hekim application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hekim::cli::{Cli, Commands};
use hekim::commands;
use hekim::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.clone().unwrap_or_else(|| "config/config.yaml".to_string());
    let config = Config::load(&config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { provider } => {
            tracing::info!("Starting terminal chat");
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            commands::chat::run_chat(config, provider).await?;
            Ok(())
        }
        Commands::Serve { .. } => {
            tracing::info!("Starting HTTP server");
            commands::serve::run_serve(config).await?;
            Ok(())
        }
        Commands::Client { .. } => {
            tracing::info!("Starting remote terminal client");
            commands::client::run_client(config).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "hekim=debug" } else { "hekim=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
