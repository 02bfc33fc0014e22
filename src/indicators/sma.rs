// =============================================================================
// Simple Moving Average (SMA) — trailing window
// =============================================================================

/// Trailing mean over `window` observations, aligned with the input.
///
/// Output index `i` averages `values[i + 1 - window ..= i]`. It is `None`
/// until `window` observations are available, or whenever any observation
/// inside the window is itself `None`.
///
/// # Edge cases
/// - `window == 0` => every element is `None`
/// - empty input   => empty vec
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let window_f = window as f64;
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().try_fold(0.0_f64, |acc, &v| v.map(|x| acc + x))?;
            let mean = sum / window_f;
            mean.is_finite().then_some(mean)
        })
        .collect()
}
