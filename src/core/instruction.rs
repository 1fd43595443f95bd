// src/core/instruction.rs — Analysis instruction template

use minijinja::{context, Environment, UndefinedBehavior};

use crate::infra::config::AnalysisConfig;
use crate::infra::errors::PixelScribeError;

pub const DEFAULT_TEMPLATE: &str = "\
Analyze this image in detail and write the description in {{ language }}.
Use a {{ tone }} tone.
Cover:
- the main objects and subjects
- the colors
- the spatial layout and composition
- any notable details, visible text or context
Format the answer as short markdown sections.";

/// A minijinja template rendered with `language` and `tone`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTemplate {
    source: String,
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl InstructionTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        match config.instruction.as_deref() {
            Some(src) if !src.trim().is_empty() => Self::new(src),
            _ => Self::default(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Undefined variables are an error, so typos show up at startup.
    pub fn render(&self, language: &str, tone: &str) -> Result<String, PixelScribeError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        let rendered = env.render_str(&self.source, context! { language, tone })?;
        Ok(rendered.trim().to_string())
    }
}
