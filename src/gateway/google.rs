// src/gateway/google.rs — Google Generative AI (Gemini) gateway

use async_trait::async_trait;
use std::time::Duration;

use super::{AnalysisRequest, AnalysisResponse, FinishReason, InferenceGateway, TokenUsage};
use crate::infra::config::GatewayConfig;
use crate::infra::errors::PixelScribeError;
use crate::util::truncate_str;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleGateway {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleGateway {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from the `[gateway]` config section and an already-resolved key.
    pub fn from_config(config: &GatewayConfig, api_key: String) -> Result<Self, PixelScribeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PixelScribeError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the Gemini request body: one user turn, image part then text part.
    fn build_request_body(&self, request: &AnalysisRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": request.image.mime_type,
                            "data": request.image.data,
                        }
                    },
                    { "text": request.instruction },
                ],
            }],
        })
    }

    fn gateway_error(&self, status: Option<u16>, message: String) -> PixelScribeError {
        PixelScribeError::Gateway {
            gateway: "google".into(),
            status,
            message,
        }
    }
}

/// Missing counts read as zero; oversized ones clamp to `u32::MAX`.
fn token_count(v: &serde_json::Value) -> u32 {
    v.as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

/// Pull text, usage and finish reason out of a `generateContent` response.
pub(crate) fn parse_response(resp: &serde_json::Value) -> AnalysisResponse {
    let text: String = resp["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = TokenUsage {
        input_tokens: token_count(&resp["usageMetadata"]["promptTokenCount"]),
        output_tokens: token_count(&resp["usageMetadata"]["candidatesTokenCount"]),
    };

    let finish_reason = match resp["candidates"][0]["finishReason"].as_str() {
        Some("STOP") => FinishReason::Stop,
        Some("MAX_TOKENS") => FinishReason::MaxTokens,
        Some("SAFETY") | Some("PROHIBITED_CONTENT") | Some("BLOCKLIST") => FinishReason::Safety,
        _ => FinishReason::Unknown,
    };

    AnalysisResponse {
        text,
        usage,
        finish_reason,
    }
}

#[async_trait]
impl InferenceGateway for GoogleGateway {
    fn id(&self) -> &str {
        "google"
    }

    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResponse, PixelScribeError> {
        let body = self.build_request_body(&request);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url(),
            request.model,
            self.api_key,
        );

        tracing::debug!(
            model = %request.model,
            mime_type = %request.image.mime_type,
            payload_len = request.image.data.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.gateway_error(None, e.without_url().to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PixelScribeError::RateLimited {
                gateway: "google".into(),
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.gateway_error(
                Some(status.as_u16()),
                format!("HTTP {}: {}", status, truncate_str(&error_body, 500)),
            ));
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| {
            self.gateway_error(
                Some(status.as_u16()),
                format!("Failed to parse response: {}", e.without_url()),
            )
        })?;

        if let Some(reason) = resp["promptFeedback"]["blockReason"].as_str() {
            tracing::warn!(reason, "prompt was blocked by the gateway");
        }

        let parsed = parse_response(&resp);
        tracing::debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            finish_reason = ?parsed.finish_reason,
            "generateContent finished"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::InlineImage;
    use pretty_assertions::assert_eq;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            model: "gemini-2.0-flash".into(),
            image: InlineImage {
                mime_type: "image/png".into(),
                data: "iVBORw0KGgo=".into(),
            },
            instruction: "Describe this image.".into(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let gw = GoogleGateway::new("k".into());
        let body = gw.build_request_body(&request());
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[0]["inline_data"]["data"], "iVBORw0KGgo=");
        assert_eq!(parts[1]["text"], "Describe this image.");
        assert_eq!(body["contents"][0]["role"], "user");
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let resp = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "a red apple" }, { "text": " on a table" }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 260, "candidatesTokenCount": 7 }
        });
        let parsed = parse_response(&resp);
        assert_eq!(parsed.text, "a red apple on a table");
        assert_eq!(parsed.finish_reason, FinishReason::Stop);
        assert_eq!(parsed.usage.total(), 267);
    }

    #[test]
    fn test_parse_response_clamps_token_counts() {
        let resp = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "x" }] } }],
            "usageMetadata": { "promptTokenCount": 5_000_000_000u64, "candidatesTokenCount": 3 }
        });
        let parsed = parse_response(&resp);
        assert_eq!(parsed.usage.input_tokens, u32::MAX);
        assert_eq!(parsed.usage.output_tokens, 3);
        assert_eq!(parsed.usage.total(), u32::MAX);
    }

    #[test]
    fn test_parse_response_without_candidates() {
        let resp = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let parsed = parse_response(&resp);
        assert!(parsed.text.is_empty());
        assert_eq!(parsed.finish_reason, FinishReason::Unknown);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gw = GoogleGateway::new("k".into()).with_base_url("http://localhost:1234/v1beta/");
        assert_eq!(gw.base_url(), "http://localhost:1234/v1beta");
    }

    #[test]
    fn test_from_config_uses_base_url() {
        let cfg = GatewayConfig {
            base_url: "http://127.0.0.1:8080/".into(),
            timeout_seconds: Some(5),
            ..Default::default()
        };
        let gw = GoogleGateway::from_config(&cfg, "k".into()).unwrap();
        assert_eq!(gw.base_url(), "http://127.0.0.1:8080");
        assert_eq!(gw.id(), "google");
    }
}
