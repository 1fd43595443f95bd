// src/infra/errors.rs — Error types for pixelscribe

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PixelScribeError {
    // Gateway errors
    #[error("Gateway '{gateway}' error: {message}")]
    Gateway {
        gateway: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limited by '{gateway}'")]
    RateLimited { gateway: String },

    // Image errors
    #[error("Image is empty")]
    EmptyImage,

    #[error("Could not read image '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed data URI: {0}")]
    DataUri(String),

    // User errors
    #[error("No API key configured. Set {env} or `gateway.api_key` in config.toml.")]
    MissingCredential { env: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Instruction template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelScribeError {
    /// Whether the error came from the remote service rather than local input.
    pub fn is_gateway_failure(&self) -> bool {
        matches!(
            self,
            PixelScribeError::Gateway { .. } | PixelScribeError::RateLimited { .. }
        )
    }

    /// Whether the error came from turning user input into an image payload.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            PixelScribeError::EmptyImage
                | PixelScribeError::Decode { .. }
                | PixelScribeError::DataUri(_)
        )
    }
}
