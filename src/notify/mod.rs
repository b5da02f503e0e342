//! Alert delivery. The scanner emits `Alert`s through the `AlertSink`
//! trait; production wires in Telegram, unconfigured runs get a logging
//! null sink, and tests record into a Vec.

pub mod telegram;

pub use telegram::TelegramSink;

use anyhow::Result;
use async_trait::async_trait;

use crate::logging::{self, Domain, Level};
use crate::signal::MoveWindow;

/// A pump alert ready to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub price: f64,
    pub change_pct: f64,
    pub window: MoveWindow,
}

impl Alert {
    /// Human-readable message body. The change keeps its sign for drops;
    /// price is shown to four decimals since most listings trade well under
    /// a dollar.
    pub fn message_text(&self) -> String {
        format!(
            "🚨 {} moved {:.2}% in last {} min\nPrice: ${:.4}",
            self.symbol,
            self.change_pct,
            self.window.minutes(),
            self.price
        )
    }
}

#[async_trait]
pub trait AlertSink {
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Short tag for startup logs ("telegram", "null").
    fn name(&self) -> &'static str;
}

/// Sink for dry runs: logs the full message and succeeds, so every other
/// part of the pipeline (cooldown stamps included) behaves exactly as live.
pub struct NullSink;

#[async_trait]
impl AlertSink for NullSink {
    async fn send(&self, alert: &Alert) -> Result<()> {
        logging::log(
            Level::Info,
            Domain::Alert,
            "alert_dry_run",
            logging::obj(&[
                ("symbol", logging::v_str(&alert.symbol)),
                ("msg", logging::v_str(&alert.message_text())),
            ]),
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
