// =============================================================================
// Shared types used across the NASDAQ analyzer
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized daily bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars in strictly ascending date order.
pub type Series = Vec<OhlcvRow>;

/// A daily bar enriched with the RSI column.
///
/// `rsi` is `None` while the lookback window is still filling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    #[serde(flatten)]
    pub bar: OhlcvRow,
    pub rsi: Option<f64>,
}

/// Current quote snapshot for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Signed, in percentage units (1.25 means +1.25 %).
    pub change_percent: f64,
    pub volume: u64,
}

/// Why a fetch produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentReason {
    MissingCredential,
    Transport,
    Payload,
}

impl std::fmt::Display for AbsentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "missing API credential"),
            Self::Transport => write!(f, "transport failure"),
            Self::Payload => write!(f, "unusable payload"),
        }
    }
}

/// Result of a best-effort fetch: either data or an explicit absence.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Data(T),
    Absent(AbsentReason),
}

/// Headline sentiment bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Bullish,
    Bearish,
    Neutral,
}

impl SentimentLabel {
    /// Strictly above 0.1 is Bullish, strictly below -0.1 is Bearish.
    pub fn from_score(score: f64) -> Self {
        if score > 0.1 {
            Self::Bullish
        } else if score < -0.1 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::Neutral => write!(f, "Neutral"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.05), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.5), SentimentLabel::Bullish);
        assert_eq!(SentimentLabel::from_score(-0.3), SentimentLabel::Bearish);
    }

    #[test]
    fn label_boundaries_are_exclusive() {
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn indicator_row_serialises_flat() {
        let row = IndicatorRow {
            bar: OhlcvRow {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
            },
            rsi: None,
        };
        let v = serde_json::to_value(&row).unwrap();
        assert_eq!(v["date"], "2024-03-01");
        assert_eq!(v["close"], 1.5);
        assert!(v["rsi"].is_null());
    }
}
