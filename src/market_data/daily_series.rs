use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::types::{OhlcvRow, Series};

// ---------------------------------------------------------------------------
// Provider field names
// ---------------------------------------------------------------------------

const FIELD_OPEN: &str = "1. open";
const FIELD_HIGH: &str = "2. high";
const FIELD_LOW: &str = "3. low";
const FIELD_CLOSE: &str = "4. close";
const FIELD_VOLUME: &str = "5. volume";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Convert a raw `"Time Series (Daily)"` object into a date-ordered [`Series`].
///
/// A single bad row invalidates the whole payload. Empty, non-object, or
/// invalid payloads all produce an empty series; the reason is logged.
pub fn normalize(raw: &serde_json::Value) -> Series {
    match try_normalize(raw) {
        Ok(series) => series,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "discarding daily series payload");
            Series::new()
        }
    }
}

/// Fallible form of [`normalize`] that reports why a payload was rejected.
///
/// Returns an empty series for an empty object; that is not an error.
pub fn try_normalize(raw: &serde_json::Value) -> Result<Series> {
    let entries = raw
        .as_object()
        .context("daily series payload is not a JSON object")?;

    // BTreeMap keyed by parsed date gives ascending order and catches
    // duplicates that only differ in formatting.
    let mut rows: BTreeMap<NaiveDate, OhlcvRow> = BTreeMap::new();

    for (key, record) in entries {
        let row = parse_row(key, record).with_context(|| format!("invalid row for '{key}'"))?;
        if rows.insert(row.date, row).is_some() {
            bail!("duplicate date '{key}'");
        }
    }

    debug!(rows = rows.len(), "daily series normalized");
    Ok(rows.into_values().collect())
}

fn parse_row(key: &str, record: &serde_json::Value) -> Result<OhlcvRow> {
    let date = NaiveDate::parse_from_str(key.trim(), DATE_FORMAT)
        .with_context(|| format!("'{key}' is not a {DATE_FORMAT} date"))?;

    let record = record.as_object().context("record is not a JSON object")?;
    let field = |name: &str| -> Result<f64> {
        let val = record
            .get(name)
            .with_context(|| format!("missing field '{name}'"))?;
        parse_price_field(val).with_context(|| format!("bad value for '{name}'"))
    };

    let volume = field(FIELD_VOLUME)?;

    Ok(OhlcvRow {
        date,
        open: field(FIELD_OPEN)?,
        high: field(FIELD_HIGH)?,
        low: field(FIELD_LOW)?,
        close: field(FIELD_CLOSE)?,
        // Truncation toward zero; the value is already known to be finite and >= 0.
        volume: volume as u64,
    })
}

/// Parse a JSON value that may be either a string or a number into a finite,
/// non-negative `f64`.
fn parse_price_field(val: &serde_json::Value) -> Result<f64> {
    let n = if let Some(s) = val.as_str() {
        s.trim()
            .parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))?
    } else if let Some(n) = val.as_f64() {
        n
    } else {
        bail!("expected string or number, got: {val}")
    };

    if !n.is_finite() {
        bail!("non-finite value {n}");
    }
    if n < 0.0 {
        bail!("negative value {n}");
    }
    Ok(n)
}
