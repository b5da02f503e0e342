//! Eligible-symbol universe and its refresh cadence.
//!
//! The universe is the set of futures symbols worth scanning, projected onto
//! spot tickers. It is fetched rarely and consulted on every pass, so it is
//! a plain owned set with an explicit, clock-driven refresh policy instead
//! of anything self-updating.

use std::collections::HashSet;

/// Contract symbols arrive underscored ("BTC_USDT"); spot tickers do not.
/// Normalizing both sides to bare uppercase makes membership checks exact.
pub fn normalize_symbol(raw: &str) -> String {
    raw.replace('_', "").to_uppercase()
}

#[derive(Debug, Clone)]
pub struct SymbolUniverse {
    symbols: HashSet<String>,
    pub fetched_at: u64,
}

impl SymbolUniverse {
    pub fn new(symbols: Vec<String>, fetched_at: u64) -> Self {
        Self {
            symbols: symbols.into_iter().collect(),
            fetched_at,
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn age_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.fetched_at)
    }

    /// Swap in a freshly fetched set. Callers keep the old set when a
    /// refresh fails, so a flaky endpoint degrades to stale data rather
    /// than an empty scan.
    pub fn replace(&mut self, symbols: Vec<String>, fetched_at: u64) {
        self.symbols = symbols.into_iter().collect();
        self.fetched_at = fetched_at;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    pub interval_secs: u64,
}

impl RefreshPolicy {
    pub fn new(interval_secs: u64) -> Self {
        Self { interval_secs }
    }

    /// Due once the set's age reaches the interval. Saturating math keeps a
    /// backwards clock step from forcing a refresh storm.
    pub fn is_due(&self, fetched_at: u64, now: u64) -> bool {
        now.saturating_sub(fetched_at) >= self.interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_underscores_and_uppercases() {
        assert_eq!(normalize_symbol("BTC_USDT"), "BTCUSDT");
        assert_eq!(normalize_symbol("sol_usdt"), "SOLUSDT");
        assert_eq!(normalize_symbol("BTCUSDT"), "BTCUSDT");
    }

    #[test]
    fn membership_and_size() {
        let universe = SymbolUniverse::new(
            vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            1_000,
        );
        assert!(universe.contains("BTCUSDT"));
        assert!(!universe.contains("DOGEUSDT"));
        assert_eq!(universe.len(), 2);
        assert!(!universe.is_empty());
    }

    #[test]
    fn duplicate_symbols_collapse() {
        let universe = SymbolUniverse::new(
            vec!["BTCUSDT".to_string(), "BTCUSDT".to_string()],
            1_000,
        );
        assert_eq!(universe.len(), 1);
    }

    #[test]
    fn replace_swaps_contents_and_stamp() {
        let mut universe = SymbolUniverse::new(vec!["BTCUSDT".to_string()], 1_000);
        universe.replace(vec!["ETHUSDT".to_string()], 2_000);
        assert!(!universe.contains("BTCUSDT"));
        assert!(universe.contains("ETHUSDT"));
        assert_eq!(universe.fetched_at, 2_000);
        assert_eq!(universe.age_secs(2_500), 500);
    }

    #[test]
    fn refresh_due_at_boundary_not_before() {
        let policy = RefreshPolicy::new(3_600);
        assert!(!policy.is_due(1_000, 4_599));
        assert!(policy.is_due(1_000, 4_600));
        assert!(policy.is_due(1_000, 10_000));
    }

    #[test]
    fn refresh_tolerates_clock_regression() {
        let policy = RefreshPolicy::new(3_600);
        assert!(!policy.is_due(5_000, 4_000));
    }
}
