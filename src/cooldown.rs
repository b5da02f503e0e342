//! Per-symbol alert cooldown.
//!
//! The gate is plain owned state: the run loop constructs one and lends it
//! to each scan pass, so nothing here needs locks and tests can drive time
//! explicitly.

use std::collections::HashMap;

#[derive(Debug)]
pub struct CooldownGate {
    window_secs: u64,
    last_alert: HashMap<String, u64>,
}

impl CooldownGate {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs,
            last_alert: HashMap::new(),
        }
    }

    /// Returns true when `symbol` may alert at `now`, recording the stamp in
    /// the same step. A suppressed symbol keeps its original stamp, so the
    /// window never slides while alerts are being swallowed.
    pub fn should_alert(&mut self, symbol: &str, now: u64) -> bool {
        if let Some(&last) = self.last_alert.get(symbol) {
            if now.saturating_sub(last) < self.window_secs {
                return false;
            }
        }
        self.last_alert.insert(symbol.to_string(), now);
        true
    }

    pub fn last_alert(&self, symbol: &str) -> Option<u64> {
        self.last_alert.get(symbol).copied()
    }

    /// Symbols with a recorded stamp; exposed for pass summaries.
    pub fn tracked(&self) -> usize {
        self.last_alert.len()
    }
}
