use axum::extract::rejection::JsonRejection;
use axum::http::{header, Method, StatusCode};
use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use folio_core::config::Settings;
use folio_core::domain::earnings::EarningsRecord;
use folio_core::domain::portfolio::PortfolioSnapshot;
use folio_core::earnings::table::StaticEarningsTable;
use folio_core::earnings::yahoo::YahooEarningsClient;
use folio_core::earnings::{resolve_earnings, EarningsSource};
use folio_core::llm::anthropic::AnthropicClient;
use folio_core::llm::openai::OpenAiClient;
use folio_core::llm::{CompletionRequest, LlmClient, Provider};
use folio_core::prompt;
use folio_core::prompt::RecommendKind;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub openai: Option<Arc<dyn LlmClient>>,
    pub anthropic: Option<Arc<dyn LlmClient>>,
    /// Live earnings source; `None` runs table-only.
    pub earnings: Option<Arc<dyn EarningsSource>>,
    pub earnings_table: Arc<StaticEarningsTable>,
}

impl AppState {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let openai = match settings.openai_api_key {
            Some(_) => Some(Arc::new(OpenAiClient::from_settings(settings)?) as Arc<dyn LlmClient>),
            None => {
                tracing::warn!("OPENAI_API_KEY missing; OpenAI-backed requests will fail");
                None
            }
        };

        let anthropic = match settings.anthropic_api_key {
            Some(_) => {
                Some(Arc::new(AnthropicClient::from_settings(settings)?) as Arc<dyn LlmClient>)
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY missing; Anthropic-backed requests will fail");
                None
            }
        };

        let earnings = match settings.earnings_source.as_deref() {
            Some("static") => {
                tracing::info!("earnings served from the static table only");
                None
            }
            _ => Some(Arc::new(YahooEarningsClient::from_env()?) as Arc<dyn EarningsSource>),
        };

        Ok(Self {
            openai,
            anthropic,
            earnings,
            earnings_table: Arc::new(StaticEarningsTable::new()),
        })
    }

    fn llm(&self, provider: Provider) -> Result<Arc<dyn LlmClient>, ApiError> {
        let client = match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
        };
        client
            .clone()
            .ok_or(ApiError::ProviderNotConfigured(provider))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(
            "/healthz",
            get(healthz).options(preflight).fallback(method_not_allowed),
        )
        .route(
            "/api/analyze",
            post(analyze).options(preflight).fallback(method_not_allowed),
        )
        .route(
            "/api/describe",
            post(describe).options(preflight).fallback(method_not_allowed),
        )
        .route(
            "/api/earnings",
            post(earnings).options(preflight).fallback(method_not_allowed),
        )
        .route(
            "/api/recommend",
            post(recommend).options(preflight).fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
    }
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(flatten)]
    portfolio: PortfolioSnapshot,
    #[serde(default)]
    model: Option<Provider>,
}

#[derive(Debug, Serialize)]
struct AnalysisResponse {
    analysis: String,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

async fn analyze(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let req = parse_body(body)?;
    let provider = req.model.unwrap_or_default();
    let client = state.llm(provider)?;

    let analysis = client
        .complete(CompletionRequest {
            prompt: prompt::analyze_prompt(&req.portfolio),
            max_tokens: prompt::ANALYZE_MAX_TOKENS,
            temperature: Some(prompt::ANALYZE_TEMPERATURE),
        })
        .await?;

    Ok(Json(AnalysisResponse {
        analysis,
        timestamp: Utc::now(),
        model: Some(client.model_id().to_string()),
    }))
}

#[derive(Debug, Deserialize)]
struct DescribeRequest {
    #[serde(default)]
    symbols: Option<Vec<SymbolInfo>>,
}

#[derive(Debug, Deserialize)]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    asset_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct DescribeResponse {
    descriptions: BTreeMap<String, String>,
}

async fn describe(
    State(state): State<AppState>,
    body: Result<Json<DescribeRequest>, JsonRejection>,
) -> Result<Json<DescribeResponse>, ApiError> {
    let req = parse_body(body)?;
    let symbols = match req.symbols {
        Some(symbols) if !symbols.is_empty() => symbols,
        _ => return Err(ApiError::BadRequest("symbols array required".to_string())),
    };

    let client = state.llm(Provider::OpenAi)?;

    // Best effort: a symbol whose upstream call fails is logged and omitted,
    // never fails the whole request.
    let mut descriptions = BTreeMap::new();
    for info in &symbols {
        let request = CompletionRequest {
            prompt: prompt::describe_prompt(
                &info.symbol,
                info.name.as_deref(),
                info.asset_type.as_deref(),
            ),
            max_tokens: prompt::DESCRIBE_MAX_TOKENS,
            temperature: Some(prompt::DESCRIBE_TEMPERATURE),
        };
        match client.complete(request).await {
            Ok(text) => {
                descriptions.insert(info.symbol.clone(), text);
            }
            Err(err) => {
                tracing::warn!(symbol = %info.symbol, error = %err, "description failed; omitting symbol");
            }
        }
    }

    Ok(Json(DescribeResponse { descriptions }))
}

#[derive(Debug, Deserialize)]
struct EarningsRequest {
    #[serde(default)]
    symbols: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EarningsResponse {
    earnings: BTreeMap<String, EarningsRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

async fn earnings(
    State(state): State<AppState>,
    body: Result<Json<EarningsRequest>, JsonRejection>,
) -> Result<Json<EarningsResponse>, ApiError> {
    let req = parse_body(body)?;
    let table = &state.earnings_table;

    let (earnings, used_table) = match req.symbols {
        // No symbols requested: serve the whole curated calendar.
        None => (table.all(), true),
        Some(symbols) => resolve_earnings(state.earnings.as_deref(), table, &symbols).await,
    };

    Ok(Json(EarningsResponse {
        earnings,
        last_updated: used_table.then(|| table.last_updated()),
        note: used_table.then(|| table.note().to_string()),
    }))
}

#[derive(Debug, Deserialize)]
struct RecommendRequest {
    #[serde(flatten)]
    portfolio: PortfolioSnapshot,
    #[serde(default, rename = "type")]
    kind: RecommendKind,
    #[serde(default)]
    watchlist: Vec<String>,
}

async fn recommend(
    State(state): State<AppState>,
    body: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let req = parse_body(body)?;
    let client = state.llm(Provider::Anthropic)?;

    let analysis = client
        .complete(CompletionRequest {
            prompt: req.kind.render(&req.portfolio, &req.watchlist),
            max_tokens: req.kind.max_tokens(),
            temperature: None,
        })
        .await?;

    Ok(Json(AnalysisResponse {
        analysis,
        timestamp: Utc::now(),
        model: None,
    }))
}
