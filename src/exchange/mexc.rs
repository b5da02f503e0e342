//! MEXC public-market client: futures contract universe, spot ticker
//! snapshot, spot klines. No credentials, no signing; every call here is an
//! unauthenticated GET.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::universe::normalize_symbol;

use super::{MarketData, PriceTick};

pub struct MexcClient {
    client: reqwest::Client,
    spot_base: String,
    contract_base: String,
    quote_asset: String,
    min_leverage: i64,
}

#[derive(Debug, Deserialize)]
struct ContractDetailResponse {
    #[serde(default)]
    data: Vec<ContractDetail>,
}

#[derive(Debug, Deserialize)]
struct ContractDetail {
    symbol: String,
    #[serde(rename = "quoteCoin", default)]
    quote_coin: String,
    // Observed as a bare number, but tolerate the string form too.
    #[serde(rename = "maxLeverage", default)]
    max_leverage: Value,
}

#[derive(Debug, Deserialize)]
struct SpotTicker {
    symbol: String,
    price: String,
}

impl MexcClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            spot_base: cfg.spot_base.clone(),
            contract_base: cfg.contract_base.clone(),
            quote_asset: cfg.quote_asset.clone(),
            min_leverage: cfg.min_leverage,
        })
    }
}

#[async_trait]
impl MarketData for MexcClient {
    async fn fetch_futures_universe(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/contract/detail", self.contract_base);
        let body: ContractDetailResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding contract detail response")?;

        Ok(select_universe(
            &body.data,
            &self.quote_asset,
            self.min_leverage,
        ))
    }

    async fn fetch_price_snapshot(&self) -> Result<Vec<PriceTick>> {
        let url = format!("{}/api/v3/ticker/price", self.spot_base);
        let body: Vec<SpotTicker> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("decoding ticker snapshot")?;

        Ok(select_ticks(&body, &self.quote_asset))
    }

    async fn fetch_recent_closes(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<f64>> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.spot_base, symbol, interval, limit
        );
        let rows: Vec<Vec<Value>> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding klines for {}", symbol))?;

        rows.iter()
            .map(|row| close_of(row))
            .collect::<Result<Vec<f64>>>()
            .with_context(|| format!("parsing closes for {}", symbol))
    }
}

/// Futures contracts worth scanning: right quote coin, enough leverage to
/// matter, symbol normalized to its spot form.
fn select_universe(contracts: &[ContractDetail], quote_asset: &str, min_leverage: i64) -> Vec<String> {
    contracts
        .iter()
        .filter(|c| c.quote_coin == quote_asset && leverage_of(&c.max_leverage) >= min_leverage)
        .map(|c| normalize_symbol(&c.symbol))
        .collect()
}

/// Spot tickers quoted in the configured asset, with unparseable prices
/// dropped. Exchange order is preserved.
fn select_ticks(tickers: &[SpotTicker], quote_asset: &str) -> Vec<PriceTick> {
    tickers
        .iter()
        .filter(|t| t.symbol.ends_with(quote_asset))
        .filter_map(|t| {
            t.price.parse::<f64>().ok().map(|price| PriceTick {
                symbol: t.symbol.clone(),
                price,
            })
        })
        .collect()
}

fn leverage_of(raw: &Value) -> i64 {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

/// Kline rows are positional arrays; the close sits at index 4 and arrives
/// as a string on spot. A malformed row fails the whole fetch rather than
/// smuggling a zero into the indicator window.
fn close_of(row: &[Value]) -> Result<f64> {
    let cell = match row.get(4) {
        Some(cell) => cell,
        None => bail!("kline row has {} columns, need at least 5", row.len()),
    };
    match cell {
        Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("unparseable close {:?}", s)),
        Value::Number(n) => n.as_f64().context("close out of f64 range"),
        other => bail!("unexpected close cell: {}", other),
    }
}
