//! Yield/spread reconciliation.
//!
//! A trade is quoted either as a spread over the closing yield (in basis
//! points) or as an outright trade yield. Editing one side recomputes the
//! other. Results are rounded so repeated edits do not accumulate
//! floating-point noise; the two directions are not exact inverses after
//! rounding.

/// Decimal places kept on a derived trade yield.
pub const YIELD_PLACES: i32 = 6;
/// Decimal places kept on a derived spread.
pub const SPREAD_PLACES: i32 = 4;

const BP_PER_PERCENT: f64 = 100.0;

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Lenient numeric parse: surrounding whitespace is ignored and anything that
/// is not a finite number is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// `closing + spread / 100`, rounded to [`YIELD_PLACES`].
pub fn trade_yield_from_spread(closing_yield: Option<f64>, spread_bp: Option<f64>) -> f64 {
    let closing = or_zero(closing_yield);
    let spread = or_zero(spread_bp);
    round_to(closing + spread / BP_PER_PERCENT, YIELD_PLACES)
}

/// `(trade - closing) * 100`, rounded to [`SPREAD_PLACES`].
pub fn spread_from_trade_yield(closing_yield: Option<f64>, trade_yield: Option<f64>) -> f64 {
    let closing = or_zero(closing_yield);
    let trade = or_zero(trade_yield);
    round_to((trade - closing) * BP_PER_PERCENT, SPREAD_PLACES)
}
