use crate::domain::earnings::{EarningsRecord, EarningsTime};
use crate::earnings::EarningsSource;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Yahoo rejects default library user agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Earnings dates from the Yahoo Finance quote-summary endpoint. No API key.
#[derive(Debug, Clone)]
pub struct YahooEarningsClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooEarningsClient {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("YAHOO_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("YAHOO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Yahoo http client")?;

        Ok(Self { http, base_url })
    }

    fn url(&self, symbol: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url.trim_end_matches('/'),
            symbol
        )
    }
}

#[async_trait::async_trait]
impl EarningsSource for YahooEarningsClient {
    fn source_name(&self) -> &'static str {
        "yahoo"
    }

    async fn earnings_for(&self, symbol: &str) -> anyhow::Result<Option<EarningsRecord>> {
        let res = self
            .http
            .get(self.url(symbol))
            .query(&[("modules", "calendarEvents")])
            .send()
            .await
            .context("Yahoo request failed")?;

        let status = res.status();
        if !status.is_success() {
            anyhow::bail!("Yahoo HTTP {status} for {symbol}");
        }

        let body = res
            .json::<QuoteSummaryResponse>()
            .await
            .context("failed to decode Yahoo quoteSummary response")?;

        Ok(extract_record(&body))
    }
}

fn extract_record(body: &QuoteSummaryResponse) -> Option<EarningsRecord> {
    let earnings = body
        .quote_summary
        .result
        .as_deref()?
        .first()?
        .calendar_events
        .as_ref()?
        .earnings
        .as_ref()?;

    let raw = earnings.earnings_date.first()?.raw?;
    let date = chrono::DateTime::from_timestamp(raw, 0)?.date_naive();
    let time = earnings
        .earnings_call_time
        .as_deref()
        .map(EarningsTime::from_call_time)
        .unwrap_or(EarningsTime::Unscheduled);

    Some(EarningsRecord { date, time })
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Clone, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "calendarEvents", default)]
    calendar_events: Option<CalendarEvents>,
}

#[derive(Debug, Clone, Deserialize)]
struct CalendarEvents {
    #[serde(default)]
    earnings: Option<Earnings>,
}

#[derive(Debug, Clone, Deserialize)]
struct Earnings {
    #[serde(rename = "earningsDate", default)]
    earnings_date: Vec<RawValue>,
    #[serde(rename = "earningsCallTime", default)]
    earnings_call_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawValue {
    #[serde(default)]
    raw: Option<i64>,
}
