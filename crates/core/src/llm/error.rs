use crate::llm::Provider;
use std::fmt;

/// Error payload returned by a provider. The message is forwarded to the
/// caller, so it carries the provider's own wording untouched.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub provider: Provider,
    pub message: String,
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} upstream error: {}",
            self.provider.display_name(),
            self.message
        )
    }
}

impl std::error::Error for UpstreamError {}
