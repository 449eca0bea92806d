//! Bithumb public ticker client
//!
//! REST endpoint `/public/ticker/{ASSET}_KRW`; all numeric fields arrive as
//! strings.

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{check_status, parse_decimal, SourceError, SourceResult, SpotSource};
use crate::types::{SpotAsset, SpotTicker};

const BITHUMB_TICKER_URL: &str = "https://api.bithumb.com/public/ticker";
const STATUS_OK: &str = "0000";

#[derive(Debug, Clone, Deserialize)]
struct TickerResponse {
    status: String,
    message: Option<String>,
    data: Option<TickerData>,
}

#[derive(Debug, Clone, Deserialize)]
struct TickerData {
    closing_price: String,
    prev_closing_price: String,
    max_price: Option<String>,
    min_price: Option<String>,
    #[serde(rename = "units_traded_24H")]
    units_traded_24h: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BithumbClient {
    client: Client,
    base_url: String,
}

impl BithumbClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: BITHUMB_TICKER_URL.to_string(),
        }
    }
}

#[async_trait]
impl SpotSource for BithumbClient {
    fn name(&self) -> &'static str {
        "Bithumb"
    }

    async fn fetch_ticker(&self, asset: SpotAsset) -> SourceResult<SpotTicker> {
        let url = format!("{}/{}", self.base_url, asset.krw_pair());
        let response = self.client.get(&url).send().await?;
        let body = check_status(response)?.text().await?;
        parse_ticker_response(asset, &body)
    }
}

fn required(field: &str, raw: &str) -> SourceResult<Decimal> {
    parse_decimal(raw).ok_or_else(|| SourceError::Malformed(format!("bad {}: {:?}", field, raw)))
}

/// Decode a ticker body and derive the change against the previous close
pub fn parse_ticker_response(asset: SpotAsset, body: &str) -> SourceResult<SpotTicker> {
    let response: TickerResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if response.status != STATUS_OK {
        return Err(SourceError::Upstream(format!(
            "status {}: {}",
            response.status,
            response.message.unwrap_or_else(|| "unknown error".into())
        )));
    }

    let data = response
        .data
        .ok_or_else(|| SourceError::Malformed("missing data".into()))?;

    let price = required("closing_price", &data.closing_price)?;
    let prev_close = required("prev_closing_price", &data.prev_closing_price)?;
    let change_amount = price - prev_close;
    let change_rate = if prev_close > Decimal::ZERO {
        change_amount / prev_close * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    Ok(SpotTicker {
        asset,
        price,
        prev_close,
        change_amount,
        change_rate,
        high: data.max_price.as_deref().and_then(parse_decimal),
        low: data.min_price.as_deref().and_then(parse_decimal),
        volume_24h: data.units_traded_24h.as_deref().and_then(parse_decimal),
    })
}
