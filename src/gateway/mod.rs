// src/gateway/mod.rs — Inference gateway layer

pub mod google;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infra::errors::PixelScribeError;

/// A remote multimodal model that turns one image plus one instruction into text.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    fn id(&self) -> &str;

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, PixelScribeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub model: String,
    pub image: InlineImage,
    pub instruction: String,
}

/// Binary part of a request: base64 data (no `data:` prefix) and its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    #[default]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        let u = TokenUsage {
            input_tokens: 258,
            output_tokens: 90,
        };
        assert_eq!(u.total(), 348);
        assert_eq!(TokenUsage::default().total(), 0);
    }

    #[test]
    fn test_token_usage_total_saturates() {
        let u = TokenUsage {
            input_tokens: u32::MAX,
            output_tokens: 10,
        };
        assert_eq!(u.total(), u32::MAX);
    }

    #[test]
    fn test_finish_reason_default() {
        assert_eq!(FinishReason::default(), FinishReason::Unknown);
    }
}
