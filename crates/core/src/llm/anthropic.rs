use crate::config::Settings;
use crate::llm::error::UpstreamError;
use crate::llm::{CompletionRequest, LlmClient, Provider, ANALYSIS_FALLBACK};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_anthropic_api_key()?.to_string();
        let base_url =
            std::env::var("ANTHROPIC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ANTHROPIC_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("ANTHROPIC_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    async fn create_message(&self, req: CreateMessageRequest) -> anyhow::Result<serde_json::Value> {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Anthropic request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Anthropic response body")?;
        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("Anthropic response is not valid JSON: {text}"))?;

        if let Some(message) = upstream_error_message(&raw_json) {
            return Err(UpstreamError {
                provider: Provider::Anthropic,
                message,
            }
            .into());
        }
        if !status.is_success() {
            return Err(UpstreamError {
                provider: Provider::Anthropic,
                message: format!("HTTP {status}"),
            }
            .into());
        }

        Ok(raw_json)
    }

    fn response_text(raw: &serde_json::Value) -> Option<String> {
        let res = serde_json::from_value::<CreateMessageResponse>(raw.clone()).ok()?;
        let mut out = String::new();
        for block in &res.content {
            match block {
                ContentBlock::Text { text } => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
                ContentBlock::Thinking { .. }
                | ContentBlock::RedactedThinking { .. }
                | ContentBlock::Unknown => {
                    // Ignore non-text blocks.
                }
            }
        }
        let out = out.trim().to_string();
        (!out.is_empty()).then_some(out)
    }
}

fn upstream_error_message(raw: &serde_json::Value) -> Option<String> {
    raw.get("error")?
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[async_trait::async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let body = CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: req.max_tokens,
            messages: vec![Message {
                role: "user",
                content: req.prompt,
            }],
        };

        let raw = self.create_message(body).await?;
        Ok(Self::response_text(&raw).unwrap_or_else(|| ANALYSIS_FALLBACK.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "thinking")]
    Thinking {
        #[serde(default)]
        thinking: String,
    },

    #[serde(rename = "redacted_thinking")]
    RedactedThinking {
        #[serde(default)]
        data: String,
    },

    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_text_block() {
        let raw = json!({"content": [{"type": "text", "text": "sell everything"}]});
        assert_eq!(
            AnthropicClient::response_text(&raw),
            Some("sell everything".to_string())
        );
    }

    #[test]
    fn skips_non_text_blocks() {
        let raw = json!({"content": [
            {"type": "thinking", "thinking": "hmm"},
            {"type": "text", "text": "hold"},
            {"type": "tool_use", "id": "t1"}
        ]});
        assert_eq!(AnthropicClient::response_text(&raw), Some("hold".to_string()));
    }

    #[test]
    fn empty_content_yields_none() {
        assert_eq!(AnthropicClient::response_text(&json!({"content": []})), None);
        assert_eq!(
            AnthropicClient::response_text(&json!({"content": [{"type": "text", "text": ""}]})),
            None
        );
    }

    #[test]
    fn error_payload_message_is_surfaced() {
        let raw = json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}});
        assert_eq!(upstream_error_message(&raw), Some("Overloaded".to_string()));
    }
}
