use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Session in which the earnings call happens: after market close, before
/// market open, or not yet announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarningsTime {
    #[serde(rename = "AMC")]
    AfterClose,
    #[serde(rename = "BMO")]
    BeforeOpen,
    #[serde(rename = "TBD")]
    Unscheduled,
}

impl EarningsTime {
    /// Lenient mapping of provider call-time labels. Anything unrecognized
    /// is reported as TBD rather than an error.
    pub fn from_call_time(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AMC" => EarningsTime::AfterClose,
            "BMO" => EarningsTime::BeforeOpen,
            _ => EarningsTime::Unscheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub date: NaiveDate,
    pub time: EarningsTime,
}
