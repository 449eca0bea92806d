//! Investing.com cross-rate table client (reference rate)
//!
//! The table carries no publication time, so the fetch time in KST is used.
//! JPY/KRW is quoted per 1 yen.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use scraper::{Html, Selector};

use super::{check_status, parse_decimal, squash_text, QuoteSource, SourceError, SourceResult};
use crate::oracle::clock::{Clock, SeoulClock};
use crate::types::{FetchMode, JpyUnit, Quote, SourceId};

const INVESTING_URL: &str = "https://kr.investing.com/currencies/exchange-rates-table";
const USD_KRW_CELL: &str = "table#exchange_rates_1 tr#pair_12 td#last_12_28";
const JPY_KRW_CELL: &str = "table#exchange_rates_1 tr#pair_2 td#last_2_28";

#[derive(Debug, Clone)]
pub struct InvestingClient {
    client: Client,
    url: String,
}

impl InvestingClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: INVESTING_URL.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for InvestingClient {
    fn id(&self) -> SourceId {
        SourceId::Investing
    }

    fn mode(&self) -> FetchMode {
        FetchMode::CurrentOnly
    }

    fn jpy_unit(&self) -> JpyUnit {
        JpyUnit::PerOne
    }

    async fn fetch(&self, _target_date: Option<NaiveDate>) -> SourceResult<Quote> {
        let response = self.client.get(&self.url).send().await?;
        let html = check_status(response)?.text().await?;
        parse_investing_page(&html, SeoulClock.now())
    }
}

fn select_number(doc: &Html, css: &str) -> SourceResult<Option<rust_decimal::Decimal>> {
    let selector = Selector::parse(css).map_err(|e| SourceError::Malformed(e.to_string()))?;
    Ok(doc
        .select(&selector)
        .next()
        .and_then(|cell| parse_decimal(&squash_text(cell.text()))))
}

/// Read USD/KRW and JPY/KRW (per 1 yen) from the rates table
pub fn parse_investing_page(html: &str, fetched_at: NaiveDateTime) -> SourceResult<Quote> {
    let doc = Html::parse_document(html);
    let table = Selector::parse("table#exchange_rates_1")
        .map_err(|e| SourceError::Malformed(e.to_string()))?;
    if doc.select(&table).next().is_none() {
        return Err(SourceError::Malformed("exchange rate table not found".into()));
    }

    let mut quote = Quote::new(SourceId::Investing);
    quote.observed_date = Some(fetched_at.date());
    quote.observed_time = Some(fetched_at.time());
    quote.usd_rate = select_number(&doc, USD_KRW_CELL)?;
    quote.jpy_rate = select_number(&doc, JPY_KRW_CELL)?;
    Ok(quote)
}
