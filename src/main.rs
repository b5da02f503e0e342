use anyhow::Result;
use serde_json::json;
use tokio::time::{sleep, Duration};

use pumpwatch::config::{now_ts, Config};
use pumpwatch::cooldown::CooldownGate;
use pumpwatch::exchange::{retry_async, MarketData, MexcClient, RetryConfig};
use pumpwatch::logging::{self, obj, v_str, Domain, Level};
use pumpwatch::notify::{AlertSink, NullSink, TelegramSink};
use pumpwatch::scanner::Scanner;
use pumpwatch::universe::{RefreshPolicy, SymbolUniverse};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    logging::log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("config_fingerprint", v_str(&cfg.fingerprint())),
            ("poll_secs", json!(cfg.poll_secs)),
            ("price_change_threshold", json!(cfg.price_change_threshold)),
            ("rsi_threshold", json!(cfg.rsi_threshold)),
            ("max_price", json!(cfg.max_price)),
            ("cooldown_secs", json!(cfg.cooldown_secs)),
            ("fetch_concurrency", json!(cfg.fetch_concurrency)),
        ]),
    );

    let client = MexcClient::new(&cfg)?;

    // Deliver to Telegram when credentials are present, otherwise log-only.
    let sink: Box<dyn AlertSink + Send + Sync> = match (&cfg.bot_token, &cfg.chat_id) {
        (Some(token), Some(chat_id)) => {
            let sink =
                TelegramSink::new(token, chat_id, &cfg.telegram_base, cfg.http_timeout_secs)?;
            logging::log(
                Level::Info,
                Domain::System,
                "sink_selected",
                obj(&[("sink", v_str(sink.name())), ("mode", v_str("live"))]),
            );
            Box::new(sink)
        }
        _ => {
            logging::log(
                Level::Info,
                Domain::System,
                "sink_selected",
                obj(&[
                    ("sink", v_str("null")),
                    ("mode", v_str("dry_run")),
                    ("msg", v_str("BOT_TOKEN/CHAT_ID unset, alerts are logged only")),
                ]),
            );
            Box::new(NullSink)
        }
    };

    let poll = Duration::from_secs(cfg.poll_secs.max(1));
    let refresh = RefreshPolicy::new(cfg.universe_refresh_secs);
    let retry = RetryConfig::default();

    // The first universe fetch is load-bearing: without it every symbol
    // would be filtered out, so exhausting retries here is fatal.
    let symbols = match retry_async(&retry, "bootstrap_universe", || {
        client.fetch_futures_universe()
    })
    .await
    {
        Ok(symbols) => symbols,
        Err(err) => {
            logging::log(
                Level::Fatal,
                Domain::System,
                "bootstrap_failed",
                obj(&[("msg", v_str(&format!("{}", err)))]),
            );
            return Err(err);
        }
    };
    let mut universe = SymbolUniverse::new(symbols, now_ts());
    logging::log(
        Level::Info,
        Domain::Universe,
        "universe_bootstrapped",
        obj(&[("size", json!(universe.len()))]),
    );
    if universe.is_empty() {
        logging::log(
            Level::Warn,
            Domain::Universe,
            "universe_empty",
            obj(&[("msg", v_str("no eligible symbols, passes will be no-ops"))]),
        );
    }

    let mut gate = CooldownGate::new(cfg.cooldown_secs);
    let scanner = Scanner::new(cfg, Box::new(client), sink).with_retry(retry);

    loop {
        let now = now_ts();
        if refresh.is_due(universe.fetched_at, now) {
            scanner.refresh_universe(&mut universe, now).await;
        }

        let report = scanner.run_pass(&universe, &mut gate, now).await;
        logging::log(
            Level::Info,
            Domain::System,
            "pass_summary",
            report.summary_fields(),
        );

        sleep(poll).await;
    }
}
