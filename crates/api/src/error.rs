use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::llm::error::UpstreamError;
use folio_core::llm::Provider;
use serde_json::json;

/// Everything a handler can fail with. All variants render as the
/// `{"error": message}` envelope; nothing propagates past the boundary.
#[derive(Debug)]
pub enum ApiError {
    MethodNotAllowed,
    BadRequest(String),
    ProviderNotConfigured(Provider),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::ProviderNotConfigured(provider) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{} API key not configured", provider.display_name()),
            ),
            ApiError::Internal(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "request failed");
                // Provider error payloads are forwarded verbatim, and unknown
                // failures keep their message. Sanitizing what leaves the
                // boundary is an open item.
                let message = match err.downcast_ref::<UpstreamError>() {
                    Some(upstream) => upstream.message.clone(),
                    None => format!("{err:#}"),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
