// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator implementations. Outputs stay aligned with
// their input series and use `Option<f64>` for rows where the look-back window
// is still filling or the arithmetic is undefined.

pub mod rsi;
pub mod sma;
