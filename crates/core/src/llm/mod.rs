pub mod anthropic;
pub mod error;
pub mod openai;

use serde::Deserialize;

/// Substituted whenever a provider answers successfully but the text content
/// is missing or empty. Not an error condition.
pub const ANALYSIS_FALLBACK: &str = "Analysis unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Provider {
    #[serde(rename = "openai")]
    OpenAi,
    #[default]
    #[serde(rename = "anthropic")]
    Anthropic,
}

impl Provider {
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
        }
    }
}

/// One completion round-trip. `temperature` is honored only by providers
/// that accept it (OpenAI); others ignore it.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Model identifier surfaced to callers in the response envelope.
    fn model_id(&self) -> &str;

    /// Issues exactly one upstream call, no retries. A provider error payload
    /// surfaces as [`error::UpstreamError`]; missing content resolves to
    /// [`ANALYSIS_FALLBACK`].
    async fn complete(&self, req: CompletionRequest) -> anyhow::Result<String>;
}
