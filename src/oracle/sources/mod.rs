//! Rate source implementations (Shinhan, KB, Hana, Investing, Bithumb)

mod bithumb;
mod hana;
mod investing;
mod kbstar;
mod shinhan;

pub use bithumb::BithumbClient;
pub use hana::HanaClient;
pub use investing::InvestingClient;
pub use kbstar::KbStarClient;
pub use shinhan::ShinhanClient;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{FetchMode, JpyUnit, Quote, SourceId, SpotAsset, SpotTicker};

/// Failure returned across the adapter boundary. Callers treat every variant
/// the same way: the attempt produced no data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("publication is for {published}, requested {requested}")]
    DateMismatch {
        requested: NaiveDate,
        published: NaiveDate,
    },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Trait for sources that publish USD and JPY rates against KRW
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fixed at construction
    fn mode(&self) -> FetchMode;

    /// Unit of the `jpy_rate` this source returns
    fn jpy_unit(&self) -> JpyUnit {
        JpyUnit::PerHundred
    }

    /// One round trip. `target_date` is ignored by `CurrentOnly` sources.
    async fn fetch(&self, target_date: Option<NaiveDate>) -> SourceResult<Quote>;
}

/// Trait for exchange tickers (current price only)
#[async_trait]
pub trait SpotSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_ticker(&self, asset: SpotAsset) -> SourceResult<SpotTicker>;
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

/// Shared HTTP client; `timeout` applies to each request independently
pub fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).context("Invalid user agent")?,
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
    );

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("Failed to create HTTP client")
}

/// Map non-2xx responses to `SourceError::Status`
pub(crate) fn check_status(response: reqwest::Response) -> SourceResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status(status.as_u16()))
    }
}

/// Parse a published number such as "1,380.50". Empty or dash cells are None.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Accepts a JSON number or numeric string
pub(crate) fn decimal_from_json(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::String(s) => parse_decimal(s),
        serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

/// Accepts a JSON string or number and renders it as text; empty is None
pub(crate) fn text_from_json(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collapse runs of whitespace from scraped cell text
pub(crate) fn squash_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}
