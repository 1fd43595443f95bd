// src/main.rs — pixelscribe entry point

use std::sync::Arc;

use clap::Parser;

use pixelscribe::cli::describe::{run_describe, DescribeOptions};
use pixelscribe::cli::{Cli, Commands};
use pixelscribe::core::{AnalysisController, AnalysisSettings};
use pixelscribe::gateway::google::GoogleGateway;
use pixelscribe::gateway::InferenceGateway;
use pixelscribe::infra::config::Config;
use pixelscribe::infra::logger;

#[tokio::main]
async fn main() {
    // Initialize logging (respects RUST_LOG)
    logger::init_logging("warn");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    let controller = build_controller(&config)?;

    match cli.command {
        Commands::Describe { ref path, raw, json } => {
            let opts = DescribeOptions {
                raw,
                json,
                quiet: cli.quiet,
            };
            run_describe(&controller, path, opts).await
        }
        Commands::Session => pixelscribe::cli::session::run_session(&controller).await,
        Commands::Config => Ok(()),
    }
}

/// Resolve the credential once and wire it into the gateway.
fn build_controller(config: &Config) -> anyhow::Result<AnalysisController> {
    let api_key = config.resolve_api_key()?;
    let gateway: Arc<dyn InferenceGateway> =
        Arc::new(GoogleGateway::from_config(&config.gateway, api_key)?);
    let settings = AnalysisSettings::from_config(config)?;
    tracing::debug!(model = %settings.model, base_url = %config.gateway.base_url, "controller ready");
    Ok(AnalysisController::new(gateway, settings))
}
