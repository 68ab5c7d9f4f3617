pub mod domain;
pub mod earnings;
pub mod llm;
pub mod prompt;

pub mod config {
    use anyhow::Context;

    /// Process-wide configuration, read once at startup and immutable
    /// thereafter. Handlers never touch the environment directly.
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub openai_api_key: Option<String>,
        pub anthropic_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub earnings_source: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                earnings_source: std::env::var("EARNINGS_SOURCE").ok(),
            })
        }

        pub fn require_openai_api_key(&self) -> anyhow::Result<&str> {
            self.openai_api_key
                .as_deref()
                .context("OPENAI_API_KEY is required")
        }

        pub fn require_anthropic_api_key(&self) -> anyhow::Result<&str> {
            self.anthropic_api_key
                .as_deref()
                .context("ANTHROPIC_API_KEY is required")
        }
    }
}
