// src/cli/mod.rs — CLI definition (clap derive)

pub mod describe;
pub mod progress;
pub mod render;
pub mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::infra::config::Config;

#[derive(Parser)]
#[command(name = "pixelscribe", about = "Describe an image with a multimodal model", version)]
pub struct Cli {
    /// Model id (overrides `gateway.model`)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Output language (overrides `analysis.language`)
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress progress output (only emit the final result)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Describe a single image file
    Describe {
        /// Image to analyze
        path: PathBuf,
        /// Print the model's markdown as-is
        #[arg(long)]
        raw: bool,
        /// Print the final session as JSON
        #[arg(long, conflicts_with = "raw")]
        json: bool,
    },
    /// Interactive session: select, analyze, reset
    Session,
    /// Print the effective configuration
    Config,
}

impl Cli {
    /// Fold command-line overrides into the loaded config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref model) = self.model {
            config.gateway.model = model.clone();
        }
        if let Some(ref language) = self.language {
            config.analysis.language = language.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_describe() {
        let cli = Cli::parse_from(["pixelscribe", "describe", "photo.jpg", "--raw"]);
        match cli.command {
            Commands::Describe { path, raw, json } => {
                assert_eq!(path, PathBuf::from("photo.jpg"));
                assert!(raw);
                assert!(!json);
            }
            _ => panic!("expected describe"),
        }
    }

    #[test]
    fn test_raw_and_json_conflict() {
        let res = Cli::try_parse_from(["pixelscribe", "describe", "a.png", "--raw", "--json"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "pixelscribe",
            "session",
            "--model",
            "gemini-2.5-flash",
            "-l",
            "Vietnamese",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.gateway.model, "gemini-2.5-flash");
        assert_eq!(config.analysis.language, "Vietnamese");
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::parse_from(["pixelscribe", "config"]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.gateway.model, "gemini-2.0-flash");
    }
}
