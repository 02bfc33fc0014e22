// =============================================================================
// Relative Strength Index (RSI) — Simple-average variant
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes. The first
//          close has no predecessor, so its delta is undefined.
// Step 2 — Split deltas into gains (positive part) and losses (magnitude of
//          the negative part).
// Step 3 — Average gains and losses with a trailing SMA over `period` deltas.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The output is aligned 1:1 with the input closes; the first `period` values
// are `None`.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use crate::indicators::sma::rolling_mean;
use crate::types::{IndicatorRow, OhlcvRow};

/// Default look-back window.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI column for the given `closes` and `period`.
///
/// The returned vector always has `closes.len()` elements.
///
/// The first delta is left undefined rather than zero-filled, so a window only
/// counts real price changes and the first RSI value lands at index `period`,
/// one row later than a zero-seeded rolling mean would place it.
///
/// # Edge cases
/// - `period == 0` => every element is `None`
/// - `closes.len() <= period` => every element is `None`
/// - If average loss is zero (no down moves), RSI is 100.0.
/// - If both averages are zero (flat market), RSI is 50.0.
/// - Non-finite results are reported as `None`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    // --- Compute price deltas, aligned with closes ---------------------------
    let deltas: Vec<Option<f64>> = std::iter::once(None)
        .chain(closes.windows(2).map(|w| Some(w[1] - w[0])))
        .take(closes.len())
        .collect();

    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    // --- Trailing averages ---------------------------------------------------
    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| rsi_from_averages(g?, l?))
        .collect()
}

/// Append the RSI column to a chronologically ordered series.
///
/// No rows are dropped or reordered.
pub fn with_rsi(series: &[OhlcvRow], period: usize) -> Vec<IndicatorRow> {
    let closes: Vec<f64> = series.iter().map(|r| r.close).collect();
    series
        .iter()
        .cloned()
        .zip(calculate_rsi(&closes, period))
        .map(|(bar, rsi)| IndicatorRow { bar, rsi })
        .collect()
}

/// Return the RSI of the most recent row together with a human-readable label.
///
/// Returns `None` when the series is empty or the last row has no RSI yet.
pub fn current_rsi(rows: &[IndicatorRow]) -> Option<(f64, &'static str)> {
    let value = rows.last()?.rsi?;
    Some((value, rsi_zone(value)))
}

/// Classify an RSI value into its overbought / oversold zone.
pub fn rsi_zone(value: f64) -> &'static str {
    if value >= 70.0 {
        "OVERBOUGHT"
    } else if value <= 30.0 {
        "OVERSOLD"
    } else {
        "NEUTRAL"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// - If both averages are zero, RSI is 50.0 (no movement).
/// - If average loss is zero (only gains), RSI is 100.0.
/// - Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // No movement at all — neutral.
    } else if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}
