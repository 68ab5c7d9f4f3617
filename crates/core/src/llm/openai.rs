use crate::config::Settings;
use crate::llm::error::UpstreamError;
use crate::llm::{CompletionRequest, LlmClient, Provider, ANALYSIS_FALLBACK};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_openai_api_key()?.to_string();
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("OPENAI_TIMEOUT_SECS")
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

    async fn chat_completion(
        &self,
        req: ChatCompletionRequest,
    ) -> anyhow::Result<serde_json::Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read OpenAI response body")?;
        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("OpenAI response is not valid JSON: {text}"))?;

        // OpenAI reports failures as a top-level `error` object; forward its
        // message regardless of the HTTP status.
        if let Some(message) = upstream_error_message(&raw_json) {
            return Err(UpstreamError {
                provider: Provider::OpenAi,
                message,
            }
            .into());
        }
        if !status.is_success() {
            return Err(UpstreamError {
                provider: Provider::OpenAi,
                message: format!("HTTP {status}"),
            }
            .into());
        }

        Ok(raw_json)
    }

    fn extract_content(raw: &serde_json::Value) -> Option<String> {
        let res = serde_json::from_value::<ChatCompletionResponse>(raw.clone()).ok()?;
        res.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn upstream_error_message(raw: &serde_json::Value) -> Option<String> {
    raw.get("error")?
        .get("message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user",
                content: req.prompt,
            }],
            max_tokens: req.max_tokens,
            temperature: req.temperature,
        };

        let raw = self.chat_completion(body).await?;
        Ok(Self::extract_content(&raw).unwrap_or_else(|| ANALYSIS_FALLBACK.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_choice_content() {
        let raw = json!({"choices": [{"message": {"content": "X"}}]});
        assert_eq!(OpenAiClient::extract_content(&raw), Some("X".to_string()));
    }

    #[test]
    fn missing_or_empty_content_yields_none() {
        assert_eq!(OpenAiClient::extract_content(&json!({"choices": []})), None);
        assert_eq!(
            OpenAiClient::extract_content(&json!({"choices": [{"message": {}}]})),
            None
        );
        assert_eq!(
            OpenAiClient::extract_content(&json!({"choices": [{"message": {"content": "  "}}]})),
            None
        );
    }

    #[test]
    fn error_payload_message_is_surfaced() {
        let raw = json!({"error": {"message": "insufficient_quota", "type": "billing"}});
        assert_eq!(
            upstream_error_message(&raw),
            Some("insufficient_quota".to_string())
        );
        assert_eq!(upstream_error_message(&json!({"choices": []})), None);
    }

    #[test]
    fn request_omits_temperature_when_unset() {
        let req = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
            max_tokens: 300,
            temperature: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["max_tokens"], 300);
    }
}
