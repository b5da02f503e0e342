//! Per-symbol alert decision: RSI-gated percent moves over two windows.
//!
//! Pure functions: closes + live price + thresholds in, a typed outcome out.
//! The scanner decides eligibility (universe membership, price ceiling)
//! before anything here runs.

use crate::config::Config;
use crate::indicators::{percent_change, rsi};

/// Which lookback window produced the move. Candles are 5-minute, so "2
/// candles back" is the 5-minute window and "4 candles back" the 15-minute
/// window, both measured against the live ticker price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveWindow {
    FiveMin,
    FifteenMin,
}

impl MoveWindow {
    pub fn minutes(&self) -> u32 {
        match self {
            MoveWindow::FiveMin => 5,
            MoveWindow::FifteenMin => 15,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveWindow::FiveMin => "5m",
            MoveWindow::FifteenMin => "15m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer closes than the RSI lookback needs; routine, retried next pass.
    ShortHistory,
    /// RSI below threshold (or pinned to 0 by the loss-free policy).
    WeakRsi,
    /// Neither window's move cleared the percent threshold.
    SmallMove,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::ShortHistory => "short_history",
            SkipReason::WeakRsi => "weak_rsi",
            SkipReason::SmallMove => "small_move",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Trigger {
        window: MoveWindow,
        change_pct: f64,
        rsi: f64,
    },
    Skip(SkipReason),
}

/// Derived momentum readings for one symbol, recomputed fresh every pass.
#[derive(Debug, Clone, Copy)]
pub struct MomentumSignal {
    pub rsi: Option<f64>,
    pub change_5m: f64,
    pub change_15m: f64,
}

/// Measure momentum against the live price. Needs at least 4 closes to
/// address both window baselines; `rsi` is `None` until `period + 1` closes
/// exist.
pub fn measure(closes: &[f64], live_price: f64, period: usize) -> Option<MomentumSignal> {
    if closes.len() < 4 {
        return None;
    }
    Some(MomentumSignal {
        rsi: rsi(closes, period),
        change_5m: percent_change(closes[closes.len() - 2], live_price),
        change_15m: percent_change(closes[closes.len() - 4], live_price),
    })
}

/// Decide whether one symbol alerts this pass.
///
/// The 5-minute window is checked first and wins outright when both windows
/// clear the threshold. A window whose baseline close is unusable (zero or
/// garbage, giving a non-finite change) simply does not qualify.
pub fn evaluate(closes: &[f64], live_price: f64, cfg: &Config) -> Evaluation {
    if closes.len() < cfg.rsi_period + 1 {
        return Evaluation::Skip(SkipReason::ShortHistory);
    }
    let signal = match measure(closes, live_price, cfg.rsi_period) {
        Some(signal) => signal,
        None => return Evaluation::Skip(SkipReason::ShortHistory),
    };
    let rsi = match signal.rsi {
        Some(value) if value >= cfg.rsi_threshold => value,
        _ => return Evaluation::Skip(SkipReason::WeakRsi),
    };
    if signal.change_5m.is_finite() && signal.change_5m.abs() >= cfg.price_change_threshold {
        return Evaluation::Trigger {
            window: MoveWindow::FiveMin,
            change_pct: signal.change_5m,
            rsi,
        };
    }
    if signal.change_15m.is_finite() && signal.change_15m.abs() >= cfg.price_change_threshold {
        return Evaluation::Trigger {
            window: MoveWindow::FifteenMin,
            change_pct: signal.change_15m,
            rsi,
        };
    }
    Evaluation::Skip(SkipReason::SmallMove)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    /// 15 closes whose last four are [100, 101, 104, 103]; RSI = 93.33.
    fn strong_tail() -> Vec<f64> {
        vec![
            90.0, 91.0, 92.0, 93.0, 94.0, 95.0, 96.0, 97.0, 98.0, 99.0, 100.0, 100.0, 101.0,
            104.0, 103.0,
        ]
    }

    #[test]
    fn short_history_skips() {
        let cfg = test_config();
        let closes = vec![100.0; 14];
        assert_eq!(
            evaluate(&closes, 105.0, &cfg),
            Evaluation::Skip(SkipReason::ShortHistory)
        );
    }

    #[test]
    fn pure_uptrend_skips_on_weak_rsi() {
        // Strictly increasing closes pin RSI to 0 under the loss-free policy,
        // so even a large live move never arms the percent check.
        let cfg = test_config();
        let closes: Vec<f64> = (86..=100).map(|v| v as f64).collect();
        assert_eq!(
            evaluate(&closes, 110.0, &cfg),
            Evaluation::Skip(SkipReason::WeakRsi)
        );
    }

    #[test]
    fn fifteen_minute_window_triggers_when_five_minute_is_quiet() {
        // change_5m = (105-104)/104 = 0.96% (below 4%),
        // change_15m = (105-100)/100 = 5.00% (above).
        let cfg = test_config();
        match evaluate(&strong_tail(), 105.0, &cfg) {
            Evaluation::Trigger { window, change_pct, rsi } => {
                assert_eq!(window, MoveWindow::FifteenMin);
                assert!((change_pct - 5.0).abs() < 1e-9, "change={}", change_pct);
                assert!(rsi >= cfg.rsi_threshold);
            }
            other => panic!("expected 15m trigger, got {:?}", other),
        }
    }

    #[test]
    fn five_minute_window_wins_when_both_qualify() {
        // Baselines 2 and 4 candles back are both 100 with live 105, so each
        // window reads +5% and the shorter one must win.
        let cfg = test_config();
        let closes = vec![
            90.0, 91.0, 92.0, 93.0, 94.0, 95.0, 96.0, 97.0, 98.0, 99.0, 100.0, 100.0, 101.0,
            100.0, 102.0,
        ];
        match evaluate(&closes, 105.0, &cfg) {
            Evaluation::Trigger { window, change_pct, .. } => {
                assert_eq!(window, MoveWindow::FiveMin);
                assert!((change_pct - 5.0).abs() < 1e-9, "change={}", change_pct);
            }
            other => panic!("expected 5m trigger, got {:?}", other),
        }
    }

    #[test]
    fn drops_of_either_sign_trigger_on_magnitude() {
        let cfg = test_config();
        // Live price collapsed 5.77% against the 2-candles-back close.
        match evaluate(&strong_tail(), 98.0, &cfg) {
            Evaluation::Trigger { window, change_pct, .. } => {
                assert_eq!(window, MoveWindow::FiveMin);
                assert!(change_pct < -4.0, "change={}", change_pct);
            }
            other => panic!("expected 5m trigger, got {:?}", other),
        }
    }

    #[test]
    fn small_moves_skip() {
        // change_5m = -0.48%, change_15m = +3.5%: both under 4%.
        let cfg = test_config();
        assert_eq!(
            evaluate(&strong_tail(), 103.5, &cfg),
            Evaluation::Skip(SkipReason::SmallMove)
        );
    }

    #[test]
    fn dead_baseline_disqualifies_only_that_window() {
        // A zero close 2 candles back makes change_5m non-finite; the
        // 15-minute window still evaluates normally.
        let cfg = test_config();
        let mut closes = strong_tail();
        let n = closes.len();
        closes[n - 2] = 0.0;
        // Deltas now include 101 -> 0 -> 103; downs are large so force RSI
        // past the gate by lowering the threshold for this case.
        let cfg = Config { rsi_threshold: 0.0, ..cfg };
        match evaluate(&closes, 105.0, &cfg) {
            Evaluation::Trigger { window, change_pct, .. } => {
                assert_eq!(window, MoveWindow::FifteenMin);
                assert!((change_pct - 5.0).abs() < 1e-9);
            }
            other => panic!("expected 15m trigger, got {:?}", other),
        }
    }

    #[test]
    fn measure_reports_components() {
        let signal = measure(&strong_tail(), 105.0, 14).expect("long enough");
        assert_eq!(signal.rsi, Some(93.33));
        assert!((signal.change_5m - 0.9615384615).abs() < 1e-6);
        assert!((signal.change_15m - 5.0).abs() < 1e-9);

        assert!(measure(&[100.0, 101.0, 102.0], 105.0, 14).is_none());
    }

    #[test]
    fn window_labels() {
        assert_eq!(MoveWindow::FiveMin.minutes(), 5);
        assert_eq!(MoveWindow::FifteenMin.minutes(), 15);
        assert_eq!(MoveWindow::FiveMin.as_str(), "5m");
        assert_eq!(SkipReason::WeakRsi.as_str(), "weak_rsi");
    }
}
