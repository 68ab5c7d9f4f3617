pub mod table;
pub mod yahoo;

use crate::domain::earnings::EarningsRecord;
use crate::earnings::table::StaticEarningsTable;
use std::collections::BTreeMap;

#[async_trait::async_trait]
pub trait EarningsSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// `Ok(None)` means the source has no upcoming date for the symbol.
    async fn earnings_for(&self, symbol: &str) -> anyhow::Result<Option<EarningsRecord>>;
}

/// Best-effort per-symbol resolution. A failed or empty lookup against the
/// live source (absent when the service runs table-only) falls back to the
/// curated table; symbols unknown to both are simply absent from the result.
/// Returns the resolved map and whether the table contributed.
pub async fn resolve_earnings(
    source: Option<&dyn EarningsSource>,
    table: &StaticEarningsTable,
    symbols: &[String],
) -> (BTreeMap<String, EarningsRecord>, bool) {
    let mut earnings = BTreeMap::new();
    let mut used_table = false;

    for symbol in symbols {
        let record = match source {
            Some(source) => match source.earnings_for(symbol).await {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(
                        symbol = %symbol,
                        source = source.source_name(),
                        error = %err,
                        "earnings lookup failed; falling back to static table"
                    );
                    None
                }
            },
            None => None,
        };

        match record {
            Some(record) => {
                earnings.insert(symbol.clone(), record);
            }
            None => {
                if let Some(record) = table.lookup(symbol) {
                    earnings.insert(symbol.clone(), record);
                    used_table = true;
                }
            }
        }
    }

    (earnings, used_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct FailingSource;

    #[async_trait::async_trait]
    impl EarningsSource for FailingSource {
        fn source_name(&self) -> &'static str {
            "failing"
        }

        async fn earnings_for(&self, _symbol: &str) -> anyhow::Result<Option<EarningsRecord>> {
            anyhow::bail!("connection refused")
        }
    }

    struct FixedSource(EarningsRecord);

    #[async_trait::async_trait]
    impl EarningsSource for FixedSource {
        fn source_name(&self) -> &'static str {
            "fixed"
        }

        async fn earnings_for(&self, _symbol: &str) -> anyhow::Result<Option<EarningsRecord>> {
            Ok(Some(self.0))
        }
    }

    #[tokio::test]
    async fn source_failure_falls_back_to_table() {
        let table = StaticEarningsTable::new();
        let symbols = vec!["NVDA".to_string(), "FAKE".to_string()];
        let (earnings, used_table) =
            resolve_earnings(Some(&FailingSource), &table, &symbols).await;

        assert!(earnings.contains_key("NVDA"));
        assert!(!earnings.contains_key("FAKE"));
        assert!(used_table);
    }

    #[tokio::test]
    async fn table_only_mode_resolves_without_live_source() {
        let table = StaticEarningsTable::new();
        let symbols = vec!["NVDA".to_string(), "FAKE".to_string()];
        let (earnings, used_table) = resolve_earnings(None, &table, &symbols).await;

        assert!(earnings.contains_key("NVDA"));
        assert!(!earnings.contains_key("FAKE"));
        assert!(used_table);
    }

    #[tokio::test]
    async fn source_hit_skips_the_table() {
        let record = EarningsRecord {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            time: crate::domain::earnings::EarningsTime::BeforeOpen,
        };
        let table = StaticEarningsTable::new();
        let symbols = vec!["NVDA".to_string()];
        let (earnings, used_table) =
            resolve_earnings(Some(&FixedSource(record)), &table, &symbols).await;

        assert_eq!(earnings["NVDA"], record);
        assert!(!used_table);
    }
}
