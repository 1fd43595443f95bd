// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::PixelScribeError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub model: String,
    pub base_url: String,
    /// Inline API key. Prefer `api_key_env` so the key stays out of the file.
    pub api_key: Option<String>,
    pub api_key_env: String,
    /// No timeout is applied when unset.
    pub timeout_seconds: Option<u64>,
    /// Declared MIME type for every upload. Detected from content when unset.
    pub mime_override: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key: None,
            api_key_env: "GEMINI_API_KEY".into(),
            timeout_seconds: None,
            mime_override: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub language: String,
    pub tone: String,
    /// minijinja template overriding the built-in instruction.
    pub instruction: Option<String>,
    pub fallback_text: String,
    pub failure_message: String,
    pub decode_failure_message: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: "English".into(),
            tone: "respectful and precise".into(),
            instruction: None,
            fallback_text: "No description could be generated for this image.".into(),
            failure_message: "Something went wrong while analyzing the image. Please try again."
                .into(),
            decode_failure_message: "The selected file could not be read.".into(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve the API key from the process environment.
    pub fn resolve_api_key(&self) -> Result<String, PixelScribeError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key: inline value first, then the named variable.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, PixelScribeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = self.gateway.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.trim().to_string());
        }
        lookup(&self.gateway.api_key_env)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| PixelScribeError::MissingCredential {
                env: self.gateway.api_key_env.clone(),
            })
    }

    /// Copy of the config that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.gateway.api_key.is_some() {
            copy.gateway.api_key = Some("********".into());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reasonable() {
        let c = Config::default();
        assert_eq!(c.gateway.model, "gemini-2.0-flash");
        assert_eq!(c.gateway.api_key_env, "GEMINI_API_KEY");
        assert!(c.gateway.timeout_seconds.is_none());
        assert!(c.gateway.mime_override.is_none());
        assert_eq!(c.analysis.language, "English");
        assert!(c.analysis.instruction.is_none());
        assert_ne!(c.analysis.failure_message, c.analysis.decode_failure_message);
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.gateway.model, "gemini-2.0-flash");
        assert!(!config.analysis.fallback_text.is_empty());
    }

    #[test]
    fn test_parse_partial_section() {
        let toml_str = r#"
[gateway]
model = "gemini-2.5-flash"

[analysis]
language = "Vietnamese"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.model, "gemini-2.5-flash");
        assert_eq!(config.gateway.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.analysis.language, "Vietnamese");
        assert_eq!(config.analysis.tone, "respectful and precise");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[gateway]
model = "gemini-2.5-pro"
base_url = "http://127.0.0.1:9999/v1beta"
api_key_env = "MY_KEY"
timeout_seconds = 30
mime_override = "image/jpeg"

[analysis]
language = "French"
tone = "casual"
instruction = "Describe in {{ language }}."
fallback_text = "Nothing."
failure_message = "Failed."
decode_failure_message = "Unreadable."
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gateway.base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(config.gateway.timeout_seconds, Some(30));
        assert_eq!(config.gateway.mime_override.as_deref(), Some("image/jpeg"));
        assert_eq!(
            config.analysis.instruction.as_deref(),
            Some("Describe in {{ language }}.")
        );
        assert_eq!(config.analysis.decode_failure_message, "Unreadable.");
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.gateway.model, config.gateway.model);
        assert_eq!(deserialized.analysis.tone, config.analysis.tone);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[gateway]\nmodel = \"gemini-2.5-flash\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gateway.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_api_key_inline_wins() {
        let mut c = Config::default();
        c.gateway.api_key = Some(" inline-key ".into());
        let key = c.resolve_api_key_with(|_| Some("env-key".into())).unwrap();
        assert_eq!(key, "inline-key");
    }

    #[test]
    fn test_api_key_from_named_env() {
        let mut c = Config::default();
        c.gateway.api_key_env = "CUSTOM_KEY".into();
        let key = c
            .resolve_api_key_with(|name| (name == "CUSTOM_KEY").then(|| "abc".to_string()))
            .unwrap();
        assert_eq!(key, "abc");
    }

    #[test]
    fn test_api_key_missing() {
        let c = Config::default();
        let err = c.resolve_api_key_with(|_| Some("   ".into())).unwrap_err();
        assert!(matches!(err, PixelScribeError::MissingCredential { ref env } if env == "GEMINI_API_KEY"));
    }

    #[test]
    fn test_redacted_hides_key() {
        let mut c = Config::default();
        c.gateway.api_key = Some("secret".into());
        let r = c.redacted();
        assert_eq!(r.gateway.api_key.as_deref(), Some("********"));
        assert!(Config::default().redacted().gateway.api_key.is_none());
    }
}
