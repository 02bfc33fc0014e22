// =============================================================================
// Alpha Vantage REST Client — best-effort quote and daily-series fetches
// =============================================================================
//
// Every public fetch returns `Fetched<T>`: a missing API key, a network
// failure, a non-2xx status, a malformed body or a provider notice all
// collapse into `Fetched::Absent` with a reason. Nothing here is retried.
//
// SECURITY: the API key is never logged; it only appears in the query string
// sent to the provider.
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, instrument, warn};

use crate::market_data;
use crate::runtime_config::{ApiCredential, RuntimeConfig};
use crate::types::{AbsentReason, Fetched, Quote, Series};

const GLOBAL_QUOTE_KEY: &str = "Global Quote";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Keys the provider uses instead of data when it refuses a request
/// (bad symbol, throttling, premium endpoint).
const NOTICE_KEYS: &[&str] = &["Error Message", "Note", "Information"];

/// Alpha Vantage REST API client.
#[derive(Clone)]
pub struct AlphaVantageClient {
    credential: ApiCredential,
    base_url: String,
    client: reqwest::Client,
}

impl AlphaVantageClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a client from the runtime configuration and an API credential.
    ///
    /// A missing credential is allowed; every fetch will then report
    /// `AbsentReason::MissingCredential` without touching the network.
    pub fn new(config: &RuntimeConfig, credential: ApiCredential) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        debug!(
            base_url = %config.base_url,
            credential = credential.is_present(),
            "AlphaVantageClient initialised"
        );

        Ok(Self {
            credential,
            base_url: config.base_url.clone(),
            client,
        })
    }

    // -------------------------------------------------------------------------
    // Public fetches
    // -------------------------------------------------------------------------

    /// GLOBAL_QUOTE — current price, change percent, and volume.
    #[instrument(skip(self), name = "alphavantage::global_quote")]
    pub async fn global_quote(&self, symbol: &str) -> Fetched<Quote> {
        let Some(key) = self.credential.key() else {
            debug!("no API key configured — skipping quote fetch");
            return Fetched::Absent(AbsentReason::MissingCredential);
        };

        let params = [("function", "GLOBAL_QUOTE"), ("symbol", symbol), ("apikey", key)];
        let body = match self.get_text(&params).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "quote request failed");
                return Fetched::Absent(AbsentReason::Transport);
            }
        };

        match parse_global_quote(symbol, &body) {
            Ok(quote) => {
                debug!(price = quote.price, change_percent = quote.change_percent, "quote fetched");
                Fetched::Data(quote)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "quote payload unusable");
                Fetched::Absent(AbsentReason::Payload)
            }
        }
    }

    /// TIME_SERIES_DAILY (compact) — normalized, date-ascending daily bars.
    ///
    /// An empty or invalid `"Time Series (Daily)"` object yields
    /// `Fetched::Data` with an empty series; callers decide how to present
    /// that.
    #[instrument(skip(self), name = "alphavantage::daily_series")]
    pub async fn daily_series(&self, symbol: &str) -> Fetched<Series> {
        let Some(key) = self.credential.key() else {
            debug!("no API key configured — skipping daily series fetch");
            return Fetched::Absent(AbsentReason::MissingCredential);
        };

        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", "compact"),
            ("apikey", key),
        ];
        let body = match self.get_text(&params).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "daily series request failed");
                return Fetched::Absent(AbsentReason::Transport);
            }
        };

        match parse_daily_series(&body) {
            Ok(series) => {
                debug!(rows = series.len(), "daily series fetched");
                Fetched::Data(series)
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "daily series payload unusable");
                Fetched::Absent(AbsentReason::Payload)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// GET the base URL with `params` and return the body of a 2xx response.
    async fn get_text(&self, params: &[(&str, &str)]) -> Result<String> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .context("GET request to Alpha Vantage failed")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("failed to read Alpha Vantage response body")?;

        if !status.is_success() {
            bail!("Alpha Vantage returned {status}: {body}");
        }

        Ok(body)
    }
}

impl std::fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Payload parsing
// =============================================================================

/// Parse a GLOBAL_QUOTE response body.
pub fn parse_global_quote(symbol: &str, body: &str) -> Result<Quote> {
    let root: serde_json::Value =
        serde_json::from_str(body).context("quote response is not valid JSON")?;
    check_provider_notice(&root)?;

    let quote = root
        .get(GLOBAL_QUOTE_KEY)
        .and_then(|v| v.as_object())
        .context("response missing 'Global Quote' object")?;

    let price_raw = str_field(quote, "05. price")?;
    let price: f64 = price_raw
        .parse()
        .with_context(|| format!("failed to parse price '{price_raw}'"))?;

    let change_raw = str_field(quote, "10. change percent")?;
    let change_percent: f64 = change_raw
        .trim_end_matches('%')
        .trim()
        .parse()
        .with_context(|| format!("failed to parse change percent '{change_raw}'"))?;

    let volume_raw = str_field(quote, "06. volume")?;
    let volume: u64 = volume_raw
        .parse()
        .with_context(|| format!("failed to parse volume '{volume_raw}'"))?;

    if !price.is_finite() || !change_percent.is_finite() {
        bail!("non-finite quote values");
    }

    let symbol = quote
        .get("01. symbol")
        .and_then(|v| v.as_str())
        .unwrap_or(symbol)
        .to_string();

    Ok(Quote {
        symbol,
        price,
        change_percent,
        volume,
    })
}

/// Parse a TIME_SERIES_DAILY response body into a normalized series.
///
/// A body without the series object is an error; a series object with bad
/// rows normalizes to an empty series.
pub fn parse_daily_series(body: &str) -> Result<Series> {
    let root: serde_json::Value =
        serde_json::from_str(body).context("daily series response is not valid JSON")?;
    check_provider_notice(&root)?;

    let raw = root
        .get(DAILY_SERIES_KEY)
        .context("response missing 'Time Series (Daily)' object")?;

    Ok(market_data::normalize(raw))
}

fn str_field<'a>(obj: &'a serde_json::Map<String, serde_json::Value>, name: &str) -> Result<&'a str> {
    obj.get(name)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .with_context(|| format!("missing field '{name}'"))
}

fn check_provider_notice(root: &serde_json::Value) -> Result<()> {
    for key in NOTICE_KEYS {
        if let Some(msg) = root.get(*key).and_then(|v| v.as_str()) {
            bail!("Alpha Vantage notice ({key}): {msg}");
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Router};
    use serde_json::json;

    const QUOTE_BODY: &str = r#"{
        "Global Quote": {
            "01. symbol": "QQQ",
            "02. open": "440.0000",
            "05. price": "445.1200",
            "06. volume": "35123456",
            "07. latest trading day": "2024-03-01",
            "10. change percent": "-1.2345%"
        }
    }"#;

    fn daily_body() -> String {
        json!({
            "Meta Data": { "2. Symbol": "QQQ" },
            "Time Series (Daily)": {
                "2024-03-04": { "1. open": "2", "2. high": "2", "3. low": "2", "4. close": "2", "5. volume": "20" },
                "2024-03-01": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1", "5. volume": "10" }
            }
        })
        .to_string()
    }

    /// Stand-in for the provider: routes on `function` and `symbol`.
    async fn fake_provider(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
        if q.get("apikey").map(String::as_str) != Some("test-key") {
            return (StatusCode::FORBIDDEN, "bad key".to_string());
        }
        let symbol = q.get("symbol").cloned().unwrap_or_default();
        match (q.get("function").map(String::as_str), symbol.as_str()) {
            (Some("GLOBAL_QUOTE"), "QQQ") => (StatusCode::OK, QUOTE_BODY.to_string()),
            (Some("GLOBAL_QUOTE"), "EMPTY") => (StatusCode::OK, r#"{"Global Quote": {}}"#.to_string()),
            (Some("TIME_SERIES_DAILY"), "QQQ") => {
                if q.get("outputsize").map(String::as_str) != Some("compact") {
                    return (StatusCode::BAD_REQUEST, "outputsize".to_string());
                }
                (StatusCode::OK, daily_body())
            }
            (Some("TIME_SERIES_DAILY"), "BADROW") => (
                StatusCode::OK,
                json!({
                    "Time Series (Daily)": {
                        "2024-03-01": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "n/a", "5. volume": "10" }
                    }
                })
                .to_string(),
            ),
            (Some(_), "THROTTLED") => (
                StatusCode::OK,
                r#"{"Note": "API call frequency exceeded"}"#.to_string(),
            ),
            (Some(_), "BROKEN") => (StatusCode::OK, "<html>not json</html>".to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
        }
    }

    async fn spawn_provider() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/query", get(fake_provider));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/query")
    }

    fn data<T: std::fmt::Debug>(fetched: Fetched<T>) -> T {
        match fetched {
            Fetched::Data(v) => v,
            other => panic!("expected data, got {other:?}"),
        }
    }

    fn client_for(base_url: String, key: &str) -> AlphaVantageClient {
        let config = RuntimeConfig {
            base_url,
            request_timeout_secs: 5,
            ..RuntimeConfig::default()
        };
        AlphaVantageClient::new(&config, ApiCredential::new(key)).unwrap()
    }

    // ---- parsing ---------------------------------------------------------

    #[test]
    fn parse_quote_strips_percent() {
        let q = parse_global_quote("QQQ", QUOTE_BODY).unwrap();
        assert_eq!(q.symbol, "QQQ");
        assert!((q.price - 445.12).abs() < 1e-9);
        assert!((q.change_percent + 1.2345).abs() < 1e-9);
        assert_eq!(q.volume, 35_123_456);
    }

    #[test]
    fn parse_quote_rejects_empty_object() {
        assert!(parse_global_quote("QQQ", r#"{"Global Quote": {}}"#).is_err());
        assert!(parse_global_quote("QQQ", "{}").is_err());
    }

    #[test]
    fn parse_quote_rejects_notice() {
        let err = parse_global_quote("QQQ", r#"{"Information": "premium endpoint"}"#).unwrap_err();
        assert!(format!("{err:#}").contains("premium endpoint"));
    }

    #[test]
    fn parse_daily_requires_series_key() {
        assert!(parse_daily_series(r#"{"Meta Data": {}}"#).is_err());
        assert!(parse_daily_series(r#"{"Time Series (Daily)": {}}"#).unwrap().is_empty());
        assert!(parse_daily_series(r#"{"Time Series (Daily)": {"bad": {}}}"#)
            .unwrap()
            .is_empty());
    }

    // ---- fetches ---------------------------------------------------------

    #[tokio::test]
    async fn missing_credential_short_circuits() {
        // Unroutable address: the test fails on timeout if the client touches it.
        let client = client_for("http://10.255.255.1/query".into(), "");
        assert_eq!(
            client.global_quote("QQQ").await,
            Fetched::Absent(AbsentReason::MissingCredential)
        );
        assert_eq!(
            client.daily_series("QQQ").await,
            Fetched::Absent(AbsentReason::MissingCredential)
        );
    }

    #[tokio::test]
    async fn fetches_quote_from_provider() {
        let client = client_for(spawn_provider().await, "test-key");
        let quote = data(client.global_quote("QQQ").await);
        assert!((quote.price - 445.12).abs() < 1e-9);
    }

    #[tokio::test]
    async fn fetches_daily_series_sorted() {
        let client = client_for(spawn_provider().await, "test-key");
        let series = data(client.daily_series("QQQ").await);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].close, 1.0);
        assert_eq!(series[1].close, 2.0);
    }

    #[tokio::test]
    async fn bad_rows_normalize_to_empty_series() {
        let client = client_for(spawn_provider().await, "test-key");
        assert!(data(client.daily_series("BADROW").await).is_empty());
    }

    #[tokio::test]
    async fn error_status_is_transport_absence() {
        let client = client_for(spawn_provider().await, "wrong-key");
        assert_eq!(
            client.global_quote("QQQ").await,
            Fetched::Absent(AbsentReason::Transport)
        );
    }

    #[tokio::test]
    async fn bad_payloads_are_payload_absence() {
        let client = client_for(spawn_provider().await, "test-key");
        assert_eq!(
            client.global_quote("EMPTY").await,
            Fetched::Absent(AbsentReason::Payload)
        );
        assert_eq!(
            client.global_quote("THROTTLED").await,
            Fetched::Absent(AbsentReason::Payload)
        );
        assert_eq!(
            client.daily_series("BROKEN").await,
            Fetched::Absent(AbsentReason::Payload)
        );
    }

    #[tokio::test]
    async fn connection_refused_is_transport_absence() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{addr}/query"), "test-key");
        assert_eq!(
            client.daily_series("QQQ").await,
            Fetched::Absent(AbsentReason::Transport)
        );
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = client_for("http://localhost/query".into(), "very-secret");
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
