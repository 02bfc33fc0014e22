// =============================================================================
// Dashboard Assembly — overview, sentiment, and technical sections
// =============================================================================
//
// Each section is fetch → compute → present, and sections are independent of
// one another. Within a section every fetch is awaited in turn; there is no
// shared mutable state, so the dashboard itself is immutable and shared via
// `Arc` by the API layer.
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::alphavantage::AlphaVantageClient;
use crate::indicators::rsi::{current_rsi, with_rsi};
use crate::runtime_config::RuntimeConfig;
use crate::sentiment::{score_headlines, HeadlineSentiment, PolarityScorer, HEADLINES};
use crate::types::{AbsentReason, Fetched, Quote, Series};

// =============================================================================
// Section types
// =============================================================================

/// One overview metric. `quote` is `None` exactly when `absent_reason` is set.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewEntry {
    pub display_name: String,
    pub ticker: String,
    pub quote: Option<Quote>,
    pub absent_reason: Option<AbsentReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chart + RSI for one ticker, or the warning shown instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TechnicalSection {
    Available {
        symbol: String,
        /// Most recent closes, oldest first.
        chart: Vec<ChartPoint>,
        /// RSI of the latest row; `None` while the window is still filling.
        rsi: Option<f64>,
        rsi_zone: Option<&'static str>,
        rsi_window: usize,
        rows: usize,
    },
    Unavailable {
        symbol: String,
        warning: String,
        reason: Option<AbsentReason>,
    },
}

/// Full page: all three sections plus when they were built.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub overview: Vec<OverviewEntry>,
    pub sentiment: Vec<HeadlineSentiment>,
    pub technical: TechnicalSection,
}

// =============================================================================
// Dashboard
// =============================================================================

pub struct Dashboard {
    config: RuntimeConfig,
    client: AlphaVantageClient,
    scorer: Box<dyn PolarityScorer>,
}

impl Dashboard {
    pub fn new(
        config: RuntimeConfig,
        client: AlphaVantageClient,
        scorer: Box<dyn PolarityScorer>,
    ) -> Self {
        Self {
            config,
            client,
            scorer,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Quote every configured symbol, in configuration order.
    pub async fn overview(&self) -> Vec<OverviewEntry> {
        let mut entries = Vec::with_capacity(self.config.symbols.len());

        for entry in &self.config.symbols {
            let (quote, absent_reason) = match self.client.global_quote(&entry.ticker).await {
                Fetched::Data(q) => (Some(q), None),
                Fetched::Absent(reason) => (None, Some(reason)),
            };
            entries.push(OverviewEntry {
                display_name: entry.display_name.clone(),
                ticker: entry.ticker.clone(),
                quote,
                absent_reason,
            });
        }

        let available = entries.iter().filter(|e| e.quote.is_some()).count();
        info!(available, total = entries.len(), "overview built");
        entries
    }

    /// Score the static headline list.
    pub fn sentiment(&self) -> Vec<HeadlineSentiment> {
        score_headlines(self.scorer.as_ref(), HEADLINES)
    }

    /// Chart + RSI section for `symbol`.
    pub async fn technical(&self, symbol: &str) -> TechnicalSection {
        let fetched = self.client.daily_series(symbol).await;
        build_technical(
            symbol,
            fetched,
            self.config.rsi_window,
            self.config.chart_points,
        )
    }

    /// Build every section, one after the other.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let overview = self.overview().await;
        let sentiment = self.sentiment();
        let technical = self.technical(&self.config.chart_symbol).await;

        DashboardSnapshot {
            generated_at: Utc::now(),
            overview,
            sentiment,
            technical,
        }
    }
}

/// Turn a daily-series fetch into the technical section.
///
/// An absent fetch and an empty series both produce `Unavailable`.
pub fn build_technical(
    symbol: &str,
    fetched: Fetched<Series>,
    rsi_window: usize,
    chart_points: usize,
) -> TechnicalSection {
    let (series, reason) = match fetched {
        Fetched::Data(series) => (series, None),
        Fetched::Absent(reason) => (Series::new(), Some(reason)),
    };

    if series.is_empty() {
        warn!(symbol, reason = ?reason, "no daily data — technical section unavailable");
        return TechnicalSection::Unavailable {
            symbol: symbol.to_string(),
            warning: format!("Unable to fetch {symbol} data. Please check API or connection."),
            reason,
        };
    }

    let rows = with_rsi(&series, rsi_window);
    let latest = current_rsi(&rows);

    let start = rows.len().saturating_sub(chart_points);
    let chart = rows[start..]
        .iter()
        .map(|r| ChartPoint {
            date: r.bar.date,
            close: r.bar.close,
        })
        .collect();

    TechnicalSection::Available {
        symbol: symbol.to_string(),
        chart,
        rsi: latest.map(|(v, _)| v),
        rsi_zone: latest.map(|(_, zone)| zone),
        rsi_window,
        rows: rows.len(),
    }
}
