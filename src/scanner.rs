//! One scan pass over the market: snapshot, filter, fan out kline fetches,
//! evaluate, alert. The run loop owns the clock, the universe, and the
//! cooldown gate; the scanner borrows them for the duration of a pass and
//! reports what happened as data.

use std::time::Instant;

use futures_util::stream::{self, StreamExt};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::cooldown::CooldownGate;
use crate::exchange::{retry_async, MarketData, PriceTick, RetryConfig};
use crate::logging::{self, obj, v_num, v_str, Domain, Level};
use crate::notify::{Alert, AlertSink};
use crate::signal::{evaluate, Evaluation, SkipReason};
use crate::universe::SymbolUniverse;

/// How a pass ended. A failed snapshot aborts the pass before any symbol
/// work; everything after the snapshot degrades per symbol instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Completed,
    SnapshotFailed { reason: String },
}

impl PassOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassOutcome::Completed => "completed",
            PassOutcome::SnapshotFailed { .. } => "snapshot_failed",
        }
    }
}

/// Counters for one pass, logged as the pass summary and asserted on by
/// tests. Skips are routine; failures name things that should have worked.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub started_at: u64,
    pub elapsed_ms: u64,
    pub universe_size: usize,
    pub snapshot_size: usize,
    pub candidates: usize,
    pub skipped_short_history: usize,
    pub skipped_weak_rsi: usize,
    pub skipped_small_move: usize,
    pub fetch_failures: usize,
    pub alerts_sent: usize,
    pub alerts_suppressed: usize,
    pub send_failures: usize,
    pub outcome: PassOutcome,
}

impl PassReport {
    fn started(now: u64, universe_size: usize) -> Self {
        Self {
            started_at: now,
            elapsed_ms: 0,
            universe_size,
            snapshot_size: 0,
            candidates: 0,
            skipped_short_history: 0,
            skipped_weak_rsi: 0,
            skipped_small_move: 0,
            fetch_failures: 0,
            alerts_sent: 0,
            alerts_suppressed: 0,
            send_failures: 0,
            outcome: PassOutcome::Completed,
        }
    }

    pub fn summary_fields(&self) -> Map<String, Value> {
        let mut fields = obj(&[
            ("outcome", v_str(self.outcome.as_str())),
            ("elapsed_ms", serde_json::json!(self.elapsed_ms)),
            ("universe_size", serde_json::json!(self.universe_size)),
            ("snapshot_size", serde_json::json!(self.snapshot_size)),
            ("candidates", serde_json::json!(self.candidates)),
            ("short_history", serde_json::json!(self.skipped_short_history)),
            ("weak_rsi", serde_json::json!(self.skipped_weak_rsi)),
            ("small_move", serde_json::json!(self.skipped_small_move)),
            ("fetch_failures", serde_json::json!(self.fetch_failures)),
            ("alerts_sent", serde_json::json!(self.alerts_sent)),
            ("alerts_suppressed", serde_json::json!(self.alerts_suppressed)),
            ("send_failures", serde_json::json!(self.send_failures)),
        ]);
        if let PassOutcome::SnapshotFailed { reason } = &self.outcome {
            fields.insert("reason".to_string(), v_str(reason));
        }
        fields
    }
}

pub struct Scanner {
    cfg: Config,
    market: Box<dyn MarketData + Send + Sync>,
    sink: Box<dyn AlertSink + Send + Sync>,
    retry: RetryConfig,
}

impl Scanner {
    pub fn new(
        cfg: Config,
        market: Box<dyn MarketData + Send + Sync>,
        sink: Box<dyn AlertSink + Send + Sync>,
    ) -> Self {
        Self {
            cfg,
            market,
            sink,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Refetch the eligible set. On failure the previous set stays in place;
    /// scanning stale symbols beats scanning none.
    pub async fn refresh_universe(&self, universe: &mut SymbolUniverse, now: u64) -> bool {
        let fetched = retry_async(&self.retry, "futures_universe", || {
            self.market.fetch_futures_universe()
        })
        .await;

        match fetched {
            Ok(symbols) => {
                logging::log(
                    Level::Info,
                    Domain::Universe,
                    "universe_refreshed",
                    obj(&[
                        ("size", serde_json::json!(symbols.len())),
                        ("previous_age_secs", serde_json::json!(universe.age_secs(now))),
                    ]),
                );
                universe.replace(symbols, now);
                true
            }
            Err(err) => {
                logging::log(
                    Level::Warn,
                    Domain::Universe,
                    "universe_refresh_failed",
                    obj(&[
                        ("msg", v_str(&format!("{}", err))),
                        ("stale_age_secs", serde_json::json!(universe.age_secs(now))),
                    ]),
                );
                false
            }
        }
    }

    /// Run one pass at time `now`. All cooldown decisions in the pass use
    /// `now`, so two symbols triggering in the same pass are judged against
    /// the same clock.
    pub async fn run_pass(
        &self,
        universe: &SymbolUniverse,
        gate: &mut CooldownGate,
        now: u64,
    ) -> PassReport {
        let timer = Instant::now();
        let mut report = PassReport::started(now, universe.len());

        let snapshot = retry_async(&self.retry, "price_snapshot", || {
            self.market.fetch_price_snapshot()
        })
        .await;

        let ticks = match snapshot {
            Ok(ticks) => ticks,
            Err(err) => {
                let reason = format!("{}", err);
                logging::log(
                    Level::Warn,
                    Domain::Market,
                    "snapshot_failed",
                    obj(&[("msg", v_str(&reason))]),
                );
                report.outcome = PassOutcome::SnapshotFailed { reason };
                report.elapsed_ms = timer.elapsed().as_millis() as u64;
                return report;
            }
        };

        report.snapshot_size = ticks.len();

        // Eligibility is decided on the snapshot: in the futures universe
        // and under the price ceiling. Snapshot order is preserved so alert
        // order is reproducible for a given snapshot.
        let candidates: Vec<PriceTick> = ticks
            .into_iter()
            .filter(|t| universe.contains(&t.symbol) && t.price <= self.cfg.max_price)
            .collect();
        report.candidates = candidates.len();

        let concurrency = self.cfg.fetch_concurrency.max(1);
        let mut fetches = stream::iter(candidates)
            .map(|tick| async move {
                let closes = self
                    .market
                    .fetch_recent_closes(&tick.symbol, &self.cfg.kline_interval, self.cfg.kline_limit)
                    .await;
                (tick, closes)
            })
            .buffered(concurrency);

        while let Some((tick, closes)) = fetches.next().await {
            let closes = match closes {
                Ok(closes) => closes,
                Err(err) => {
                    report.fetch_failures += 1;
                    logging::log(
                        Level::Debug,
                        Domain::Market,
                        "kline_fetch_failed",
                        obj(&[
                            ("symbol", v_str(&tick.symbol)),
                            ("msg", v_str(&format!("{}", err))),
                        ]),
                    );
                    continue;
                }
            };

            match evaluate(&closes, tick.price, &self.cfg) {
                Evaluation::Skip(reason) => {
                    match reason {
                        SkipReason::ShortHistory => report.skipped_short_history += 1,
                        SkipReason::WeakRsi => report.skipped_weak_rsi += 1,
                        SkipReason::SmallMove => report.skipped_small_move += 1,
                    }
                    logging::log(
                        Level::Trace,
                        Domain::Signal,
                        "evaluated",
                        obj(&[
                            ("symbol", v_str(&tick.symbol)),
                            ("skip", v_str(reason.as_str())),
                        ]),
                    );
                }
                Evaluation::Trigger { window, change_pct, rsi } => {
                    if !gate.should_alert(&tick.symbol, now) {
                        report.alerts_suppressed += 1;
                        let since_last = gate
                            .last_alert(&tick.symbol)
                            .map(|last| now.saturating_sub(last))
                            .unwrap_or(0);
                        logging::log(
                            Level::Debug,
                            Domain::Alert,
                            "alert_suppressed",
                            obj(&[
                                ("symbol", v_str(&tick.symbol)),
                                ("window", v_str(window.as_str())),
                                ("since_last_secs", serde_json::json!(since_last)),
                            ]),
                        );
                        continue;
                    }

                    let alert = Alert {
                        symbol: tick.symbol.clone(),
                        price: tick.price,
                        change_pct,
                        window,
                    };
                    logging::log(
                        Level::Info,
                        Domain::Alert,
                        "alert_triggered",
                        obj(&[
                            ("symbol", v_str(&alert.symbol)),
                            ("window", v_str(window.as_str())),
                            ("change_pct", v_num(change_pct)),
                            ("rsi", v_num(rsi)),
                            ("price", v_num(alert.price)),
                        ]),
                    );
                    match self.sink.send(&alert).await {
                        Ok(()) => report.alerts_sent += 1,
                        Err(err) => {
                            report.send_failures += 1;
                            logging::log(
                                Level::Error,
                                Domain::Alert,
                                "alert_send_failed",
                                obj(&[
                                    ("symbol", v_str(&alert.symbol)),
                                    ("msg", v_str(&format!("{}", err))),
                                ]),
                            );
                        }
                    }
                }
            }
        }

        report.elapsed_ms = timer.elapsed().as_millis() as u64;
        report
    }
}
