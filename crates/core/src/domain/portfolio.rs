use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Stock,
    Crypto,
}

impl AssetType {
    pub fn label(self) -> &'static str {
        match self {
            AssetType::Stock => "stock",
            AssetType::Crypto => "crypto",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: f64,
    pub price: f64,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Holding {
    /// Market value of the position. Used only for ranking and display.
    pub fn market_value(&self) -> f64 {
        self.shares * self.price
    }
}

/// Caller-supplied portfolio, constructed per request and never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    #[serde(default)]
    pub holdings: Vec<Holding>,
    pub total_value: Option<f64>,
    pub stocks_value: Option<f64>,
    pub crypto_value: Option<f64>,
}

impl PortfolioSnapshot {
    /// Holdings in descending market-value order. The sort is stable, so
    /// equal-value positions keep their submitted order.
    pub fn ranked_holdings(&self) -> Vec<&Holding> {
        let mut ranked: Vec<&Holding> = self.holdings.iter().collect();
        ranked.sort_by(|a, b| b.market_value().total_cmp(&a.market_value()));
        ranked
    }

    pub fn top_holdings(&self, n: usize) -> Vec<&Holding> {
        let mut ranked = self.ranked_holdings();
        ranked.truncate(n);
        ranked
    }

    /// Caller-provided total, falling back to the sum of position values.
    pub fn effective_total(&self) -> f64 {
        self.total_value
            .unwrap_or_else(|| self.holdings.iter().map(Holding::market_value).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding(symbol: &str, shares: f64, price: f64) -> Holding {
        Holding {
            symbol: symbol.to_string(),
            shares,
            price,
            asset_type: AssetType::Stock,
            name: None,
        }
    }

    #[test]
    fn ranking_is_descending_by_market_value() {
        let snapshot = PortfolioSnapshot {
            holdings: vec![
                holding("AAPL", 10.0, 100.0),
                holding("NVDA", 5.0, 1000.0),
                holding("PLTR", 100.0, 20.0),
            ],
            ..Default::default()
        };

        let ranked = snapshot.ranked_holdings();
        let symbols: Vec<&str> = ranked.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NVDA", "PLTR", "AAPL"]);
    }

    #[test]
    fn ranking_is_stable_for_equal_values() {
        let snapshot = PortfolioSnapshot {
            holdings: vec![
                holding("A", 1.0, 100.0),
                holding("B", 2.0, 50.0),
                holding("C", 4.0, 25.0),
            ],
            ..Default::default()
        };

        let ranked = snapshot.ranked_holdings();
        let symbols: Vec<&str> = ranked.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn top_holdings_never_exceeds_n() {
        let snapshot = PortfolioSnapshot {
            holdings: (0..12)
                .map(|i| holding(&format!("S{i}"), 1.0, i as f64))
                .collect(),
            ..Default::default()
        };

        assert_eq!(snapshot.top_holdings(8).len(), 8);
        assert_eq!(snapshot.top_holdings(20).len(), 12);
    }

    #[test]
    fn effective_total_prefers_caller_value() {
        let mut snapshot = PortfolioSnapshot {
            holdings: vec![holding("A", 2.0, 10.0)],
            ..Default::default()
        };
        assert_eq!(snapshot.effective_total(), 20.0);

        snapshot.total_value = Some(123.0);
        assert_eq!(snapshot.effective_total(), 123.0);
    }

    #[test]
    fn holding_deserializes_camel_case_body() {
        let h: Holding = serde_json::from_str(
            r#"{"symbol":"BTC","shares":0.5,"price":60000,"type":"crypto","name":"Bitcoin"}"#,
        )
        .unwrap();
        assert_eq!(h.asset_type, AssetType::Crypto);
        assert_eq!(h.market_value(), 30000.0);
    }

    #[test]
    fn snapshot_defaults_missing_holdings_to_empty() {
        let s: PortfolioSnapshot = serde_json::from_str(r#"{"totalValue":100}"#).unwrap();
        assert!(s.holdings.is_empty());
        assert_eq!(s.total_value, Some(100.0));
    }
}
