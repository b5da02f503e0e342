use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Clone, Serialize)]
pub struct Config {
    pub price_change_threshold: f64,
    pub rsi_threshold: f64,
    pub rsi_period: usize,
    pub max_price: f64,
    pub poll_secs: u64,
    pub cooldown_secs: u64,
    pub universe_refresh_secs: u64,
    pub fetch_concurrency: usize,
    pub kline_limit: u32,
    pub kline_interval: String,
    pub quote_asset: String,
    pub min_leverage: i64,
    pub http_timeout_secs: u64,
    pub spot_base: String,
    pub contract_base: String,
    pub telegram_base: String,
    // Credentials stay out of the serialized form so to_json()/fingerprint()
    // can never leak them.
    #[serde(skip_serializing)]
    pub bot_token: Option<String>,
    #[serde(skip_serializing)]
    pub chat_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price_change_threshold: 4.0,
            rsi_threshold: 65.0,
            rsi_period: 14,
            max_price: 1.5,
            poll_secs: 5,
            cooldown_secs: 600,
            universe_refresh_secs: 3600,
            fetch_concurrency: 8,
            kline_limit: 100,
            kline_interval: "5m".to_string(),
            quote_asset: "USDT".to_string(),
            min_leverage: 50,
            http_timeout_secs: 10,
            spot_base: "https://api.mexc.com".to_string(),
            contract_base: "https://contract.mexc.com".to_string(),
            telegram_base: "https://api.telegram.org".to_string(),
            bot_token: None,
            chat_id: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let base = Config::default();
        Self {
            price_change_threshold: std::env::var("PRICE_CHANGE_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(base.price_change_threshold),
            rsi_threshold: std::env::var("RSI_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(base.rsi_threshold),
            rsi_period: std::env::var("RSI_PERIOD").ok().and_then(|v| v.parse().ok()).unwrap_or(base.rsi_period),
            max_price: std::env::var("MAX_PRICE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_price),
            poll_secs: std::env::var("POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.poll_secs),
            cooldown_secs: std::env::var("COOLDOWN_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.cooldown_secs),
            universe_refresh_secs: std::env::var("UNIVERSE_REFRESH_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.universe_refresh_secs),
            fetch_concurrency: std::env::var("FETCH_CONCURRENCY").ok().and_then(|v| v.parse().ok()).unwrap_or(base.fetch_concurrency),
            kline_limit: std::env::var("KLINE_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(base.kline_limit),
            kline_interval: std::env::var("KLINE_INTERVAL").unwrap_or(base.kline_interval),
            quote_asset: std::env::var("QUOTE_ASSET").unwrap_or(base.quote_asset),
            min_leverage: std::env::var("MIN_LEVERAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.min_leverage),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.http_timeout_secs),
            spot_base: std::env::var("MEXC_SPOT_BASE").unwrap_or(base.spot_base),
            contract_base: std::env::var("MEXC_CONTRACT_BASE").unwrap_or(base.contract_base),
            telegram_base: std::env::var("TELEGRAM_API_BASE").unwrap_or(base.telegram_base),
            bot_token: std::env::var("BOT_TOKEN").ok(),
            chat_id: std::env::var("CHAT_ID").ok(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// SHA256 over the serialized non-secret fields. Logged at startup so a
    /// run can be matched to the configuration that produced it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_json().as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub fn now_ts() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
