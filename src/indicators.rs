//! Momentum indicators - pure functions over closing-price slices.
//!
//! Prices are chronological, most-recent last. Nothing here holds state;
//! every pass recomputes from the candles it just fetched.

/// Relative Strength Index over the last `period + 1` closes.
///
/// Consecutive diffs are split into upward and downward force, each averaged
/// over `period`. When the downward force is exactly zero, RS is taken as 0
/// rather than dividing by zero, so a flat or loss-free series reports RSI 0
/// (not 100). That undercounts pure-uptrend strength and is intentional:
/// downstream thresholds treat it as "no momentum reading yet".
///
/// Returns `None` when fewer than `period + 1` closes are available.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let tail = &closes[closes.len() - (period + 1)..];
    let mut up_sum = 0.0;
    let mut down_sum = 0.0;
    for pair in tail.windows(2) {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            up_sum += delta;
        } else {
            down_sum -= delta;
        }
    }
    let up = up_sum / period as f64;
    let down = down_sum / period as f64;
    let rs = if down == 0.0 { 0.0 } else { up / down };
    let value = 100.0 - (100.0 / (1.0 + rs));
    Some((value * 100.0).round() / 100.0)
}

/// Percent change from `from` to `to`. Callers check the result is finite;
/// a zero baseline yields +/-inf or NaN, never a panic.
pub fn percent_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}
