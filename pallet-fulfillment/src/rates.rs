//! Shared arithmetic policy for every metric: safe division, rounding, trends.
//!
//! Nothing here returns NaN or infinity. A zero denominator yields 0, except
//! `on_time_rate`, which reports an empty population as fully on time.

/// Rounds half toward positive infinity, the way dashboard `Math.round` does.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// `round(numerator / denominator * scale) / scale`, 0 when undefined.
pub fn ratio(numerator: f64, denominator: f64, scale: f64) -> f64 {
    if denominator == 0.0 || scale == 0.0 {
        return 0.0;
    }
    let value = round_half_up(numerator / denominator * scale) / scale;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Integer percentage `round(numerator / denominator * 100)`, 0 when `denominator == 0`.
pub fn percentage(numerator: i64, denominator: i64) -> i64 {
    ratio(numerator as f64 * 100.0, denominator as f64, 1.0) as i64
}

/// On-time percentage; an empty population counts as 100% on time.
pub fn on_time_rate(total: i64, on_time: i64) -> i64 {
    if total == 0 {
        return 100;
    }
    percentage(on_time, total)
}

/// Period-over-period change in whole percent. 0 when there is no baseline.
pub fn trend_percent(current: i64, previous: i64) -> i64 {
    percentage(current - previous, previous)
}

/// Mean of the finite values, one decimal.
fn mean_one_decimal(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    ratio(finite.iter().sum(), finite.len() as f64, 10.0)
}

/// Mean of durations in hours, one decimal. Empty input is 0.
pub fn average_hours(durations: &[f64]) -> f64 {
    mean_one_decimal(durations)
}

/// Mean of durations in days, one decimal. Empty input is 0.
pub fn average_days(durations: &[f64]) -> f64 {
    mean_one_decimal(durations)
}
