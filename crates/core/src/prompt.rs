//! Prompt templates for every endpoint, collapsed into one place so wording
//! changes cannot drift between near-identical handlers.

use crate::domain::portfolio::PortfolioSnapshot;
use serde::Deserialize;

/// Fixed contextual preamble shared by the analysis and recommendation
/// templates.
pub const MARKET_CONTEXT: &str = "Current market context (Feb 2026):\n\
- Trump tariffs creating sector volatility\n\
- Tech/AI stocks under pressure but showing signs of bottoming\n\
- Crypto in pullback mode\n\
- Earnings season underway";

pub const ANALYZE_TOP_HOLDINGS: usize = 8;
pub const ANALYZE_MAX_TOKENS: u32 = 300;
pub const ANALYZE_TEMPERATURE: f32 = 0.7;

pub const DESCRIBE_MAX_TOKENS: u32 = 60;
pub const DESCRIBE_TEMPERATURE: f32 = 0.3;

/// Rounds to whole dollars and inserts thousands separators, matching the
/// display format callers already show in the UI.
pub fn format_usd(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn format_usd_opt(value: Option<f64>) -> String {
    value.map(format_usd).unwrap_or_else(|| "N/A".to_string())
}

/// One line per holding: `SYM: $1,234 (stock)`, descending by market value.
fn top_holdings_summary(snapshot: &PortfolioSnapshot, n: usize) -> String {
    snapshot
        .top_holdings(n)
        .iter()
        .map(|h| {
            format!(
                "{}: ${} ({})",
                h.symbol,
                format_usd(h.market_value()),
                h.asset_type.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per holding with its weight: `SYM: $1,234 (12.3%) - stock`.
fn weighted_holdings_summary(snapshot: &PortfolioSnapshot) -> String {
    let total = snapshot.effective_total();
    snapshot
        .ranked_holdings()
        .iter()
        .map(|h| {
            let value = h.market_value();
            let weight = if total > 0.0 {
                format!(" ({:.1}%)", value / total * 100.0)
            } else {
                String::new()
            };
            format!(
                "{}: ${}{} - {}",
                h.symbol,
                format_usd(value),
                weight,
                h.asset_type.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analyze_prompt(snapshot: &PortfolioSnapshot) -> String {
    format!(
        "You are a concise financial analyst. Give a 3-4 sentence quick market \
analysis focusing on how current conditions affect this portfolio.\n\n\
Portfolio: ${} total\n\
- Stocks: ${}\n\
- Crypto: ${}\n\n\
Top Holdings:\n{}\n\n\
{}\n\n\
Be direct and actionable. Focus on these specific holdings.",
        format_usd_opt(snapshot.total_value),
        format_usd_opt(snapshot.stocks_value),
        format_usd_opt(snapshot.crypto_value),
        top_holdings_summary(snapshot, ANALYZE_TOP_HOLDINGS),
        MARKET_CONTEXT,
    )
}

/// One-line description request for a single symbol; issued per symbol so a
/// failing entry never spoils the rest of the batch.
pub fn describe_prompt(symbol: &str, name: Option<&str>, asset_type: Option<&str>) -> String {
    let mut subject = symbol.to_string();
    match (name, asset_type) {
        (Some(name), Some(kind)) => subject.push_str(&format!(" ({name}, {kind})")),
        (Some(name), None) => subject.push_str(&format!(" ({name})")),
        (None, Some(kind)) => subject.push_str(&format!(" ({kind})")),
        (None, None) => {}
    }

    format!(
        "Generate a one-sentence description (max 15 words) for {subject}. \
Focus on what the company/asset does or is known for. \
Keep it concise and investor-focused. Respond with the sentence only, no preamble."
    )
}

/// Recommendation flavors. Each picks a distinct template and token budget;
/// the handler stays generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecommendKind {
    #[default]
    Rebalance,
    HighRisk,
    Watchlist,
    Conviction,
    Framework,
}

impl RecommendKind {
    pub fn max_tokens(self) -> u32 {
        match self {
            RecommendKind::Rebalance => 1200,
            RecommendKind::HighRisk => 1400,
            RecommendKind::Watchlist => 1600,
            RecommendKind::Framework => 2000,
            RecommendKind::Conviction => 2500,
        }
    }

    pub fn render(self, snapshot: &PortfolioSnapshot, watchlist: &[String]) -> String {
        let header = format!(
            "Current Portfolio (${}):\n{}\n\n{}",
            format_usd(snapshot.effective_total()),
            weighted_holdings_summary(snapshot),
            MARKET_CONTEXT,
        );

        match self {
            RecommendKind::Rebalance => rebalance_prompt(&header),
            RecommendKind::HighRisk => high_risk_prompt(&header),
            RecommendKind::Watchlist => watchlist_prompt(&header, watchlist),
            RecommendKind::Conviction => conviction_prompt(&header),
            RecommendKind::Framework => framework_prompt(&header),
        }
    }
}

fn rebalance_prompt(header: &str) -> String {
    format!(
        "You are an expert portfolio manager providing rebalancing recommendations.\n\n\
{header}\n\n\
Analyze this portfolio and provide specific rebalancing recommendations.\n\n\
Format with these sections:\n\n\
**📉 Consider Reducing/Selling:**\n\
Which current holdings should be trimmed or sold? Why? Be specific about position sizing.\n\n\
**📈 Consider Adding Exposure:**\n\
Which current holdings deserve MORE capital? Or what NEW positions should be added? Why?\n\n\
**⚖️ Optimal Allocation:**\n\
Suggest target allocation percentages for the top holdings.\n\n\
**🎯 Priority Actions:**\n\
List 2-3 specific trades to make this week, in order of priority.\n\n\
Be direct and specific. Reference actual position sizes and suggest specific percentage changes."
    )
}

fn high_risk_prompt(header: &str) -> String {
    format!(
        "You are an expert stock analyst specializing in high-conviction, short-term \
trading opportunities.\n\n\
{header}\n\n\
Provide 3-4 HIGH RISK/HIGH REWARD stock ideas for the short-term (1-4 weeks). These should be:\n\
- NOT already in the portfolio\n\
- Have clear catalysts coming up\n\
- Offer asymmetric risk/reward (potential 15-30%+ upside)\n\
- Include specific entry points and stop losses\n\n\
Format with these sections:\n\
**🎯 High Risk/Reward Picks:**\n\n\
For each pick:\n\
- **[TICKER]** - Company Name\n\
- Why: [1-2 sentence thesis]\n\
- Catalyst: [specific upcoming event]\n\
- Entry: $XX | Target: $XX | Stop: $XX\n\
- Risk level: [High/Very High]\n\n\
**⚠️ Key Risks:**\n\
Brief note on what could go wrong with these plays.\n\n\
Be specific with price levels. These are trading ideas, not long-term investments."
    )
}

fn watchlist_prompt(header: &str, watchlist: &[String]) -> String {
    let candidates = if watchlist.is_empty() {
        "(none provided - suggest 4-5 candidates that complement this portfolio)".to_string()
    } else {
        watchlist.join(", ")
    };

    format!(
        "You are an expert stock analyst reviewing a trading watchlist against an \
existing portfolio.\n\n\
{header}\n\n\
Watchlist candidates: {candidates}\n\n\
For each candidate, decide: buy now, wait for a better entry, or drop from the watchlist.\n\n\
Format with these sections:\n\n\
**👀 Watchlist Verdicts:**\n\
One line per candidate: [TICKER] - Buy / Wait / Drop, with the single most important reason.\n\n\
**🛒 Ready to Buy:**\n\
For candidates worth buying now: entry zone, initial position size relative to this \
portfolio, and the catalyst that makes now the time.\n\n\
**⏳ Waiting For:**\n\
For the rest: the specific price level or event that would change the verdict.\n\n\
Consider overlap with existing holdings; flag any candidate that duplicates current exposure."
    )
}

fn conviction_prompt(header: &str) -> String {
    format!(
        "You are an expert equity analyst building deep, high-conviction theses.\n\n\
{header}\n\n\
Identify the 2-3 highest-conviction positions in this portfolio and build a full thesis \
for each. Go deep rather than wide.\n\n\
Format with these sections for EACH pick:\n\n\
**💎 [TICKER] - The Thesis:**\n\
The core bull case in 3-4 sentences. What does the market misunderstand?\n\n\
**📊 The Numbers:**\n\
Key valuation and growth figures supporting the thesis, plus a 12-month price target.\n\n\
**🐻 The Bear Case:**\n\
The strongest argument against the position, stated honestly.\n\n\
**⚖️ Sizing:**\n\
Whether the current weight matches the conviction level, and what weight would.\n\n\
Close with **🚨 What Would Change My Mind:** - the concrete signals that would \
invalidate each thesis."
    )
}

fn framework_prompt(header: &str) -> String {
    format!(
        "You are an expert portfolio coach. Instead of individual picks, build a reusable \
decision framework tailored to this specific portfolio.\n\n\
{header}\n\n\
Format with these sections:\n\n\
**📐 Position Sizing Rules:**\n\
Concrete max/min position sizes for this portfolio's scale, and when to break them.\n\n\
**🚪 Entry Criteria:**\n\
A short checklist a new position must pass before capital is committed.\n\n\
**🏃 Exit Criteria:**\n\
Rules for taking profits and cutting losses, with specific percentage triggers.\n\n\
**🛡️ Risk Limits:**\n\
Portfolio-level limits: sector concentration, crypto allocation ceiling, cash floor.\n\n\
**🔁 Review Cadence:**\n\
What to re-check weekly vs monthly, referencing the actual holdings above.\n\n\
Make every rule concrete enough to act on without further interpretation."
    )
}
