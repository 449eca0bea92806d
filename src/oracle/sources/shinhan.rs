//! Shinhan Bank rate board client
//!
//! Calls the bank's JSON service endpoint (service F3730), which accepts an
//! inquiry date and returns that day's latest announcement.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::{json, Value};

use super::{
    check_status, decimal_from_json, text_from_json, QuoteSource, SourceError, SourceResult,
};
use crate::oracle::clock::{Clock, SeoulClock};
use crate::types::{FetchMode, Quote, SourceId};

const SHINHAN_URL: &str = "https://bank.shinhan.com/serviceEndpoint/httpDigital";
const RATE_LIST_KEY: &str = "R_RIBF3730_1";

#[derive(Debug, Clone)]
pub struct ShinhanClient {
    client: Client,
    url: String,
}

impl ShinhanClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: SHINHAN_URL.to_string(),
        }
    }

    fn build_request_body(date: NaiveDate) -> Value {
        json!({
            "dataBody": {
                "ricInptRootInfo": {
                    "serviceType": "GU",
                    "serviceCode": "F3730",
                    "language": "ko",
                    "callBack": "shbObj.fncF3730Callback",
                    "isRule": "N",
                    "webUri": "/index.jsp"
                },
                "조회구분": "",
                "조회일자": date.format("%Y%m%d").to_string(),
                "고시회차": 0,
                "조회일자_display": "",
                "startPoint": "",
                "endPoint": ""
            },
            "dataHeader": {
                "trxCd": "RSHRC0213A01",
                "language": "ko",
                "subChannel": "49",
                "channelGbn": "D0"
            }
        })
    }
}

#[async_trait]
impl QuoteSource for ShinhanClient {
    fn id(&self) -> SourceId {
        SourceId::Shinhan
    }

    fn mode(&self) -> FetchMode {
        FetchMode::DateCapable
    }

    async fn fetch(&self, target_date: Option<NaiveDate>) -> SourceResult<Quote> {
        let date = target_date.unwrap_or_else(|| SeoulClock.now().date());

        tracing::debug!(source = %"Shinhan", date = %date, "Requesting rate board");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json; charset=\"UTF-8\"")
            .header("Origin", "https://bank.shinhan.com")
            .header("Referer", "https://bank.shinhan.com/index.jsp")
            .header("submissionid", "sbm_F3730")
            .json(&Self::build_request_body(date))
            .send()
            .await?;

        let body: Value = check_status(response)?.json().await?;
        parse_shinhan_response(&body)
    }
}

/// Extract the announcement and USD/JPY base rates from the service response
pub fn parse_shinhan_response(body: &Value) -> SourceResult<Quote> {
    let data = body
        .get("dataBody")
        .filter(|v| v.is_object())
        .ok_or_else(|| SourceError::Malformed("missing dataBody".into()))?;

    let mut quote = Quote::new(SourceId::Shinhan);
    quote.observed_date = data
        .get("고시일자")
        .and_then(text_from_json)
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y%m%d").ok());
    quote.observed_time = data
        .get("고시시간")
        .and_then(text_from_json)
        .and_then(|s| NaiveTime::parse_from_str(&s, "%H%M%S").ok());
    quote.sequence_label = data.get("고시회차").and_then(text_from_json);

    let rates = data
        .get(RATE_LIST_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| SourceError::Malformed(format!("missing {}", RATE_LIST_KEY)))?;

    for item in rates {
        let code = item.get("통화CODE").and_then(Value::as_str).unwrap_or("");
        let rate = item.get("매매기준환율").and_then(decimal_from_json);
        match code.trim() {
            "USD" => quote.usd_rate = rate,
            "JPY" => quote.jpy_rate = rate,
            _ => {}
        }
    }

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_rate_board() {
        let body = json!({
            "dataBody": {
                "고시일자": "20251127",
                "고시시간": "192713",
                "고시회차": 584,
                "R_RIBF3730_1": [
                    { "통화CODE": "USD", "매매기준환율": 1468.5 },
                    { "통화CODE": "EUR", "매매기준환율": 1701.2 },
                    { "통화CODE": "JPY", "매매기준환율": "941.53" }
                ]
            }
        });

        let quote = parse_shinhan_response(&body).unwrap();
        assert_eq!(quote.source, SourceId::Shinhan);
        assert_eq!(quote.observed_date, NaiveDate::from_ymd_opt(2025, 11, 27));
        assert_eq!(quote.observed_time, NaiveTime::from_hms_opt(19, 27, 13));
        assert_eq!(quote.sequence_label.as_deref(), Some("584"));
        assert_eq!(quote.usd_rate, Some(dec!(1468.5)));
        assert_eq!(quote.jpy_rate, Some(dec!(941.53)));
        assert!(!quote.is_stale);
    }

    #[test]
    fn empty_board_yields_quote_without_rates() {
        // No announcement yet for the requested day
        let body = json!({ "dataBody": { "고시일자": "", "R_RIBF3730_1": [] } });
        let quote = parse_shinhan_response(&body).unwrap();
        assert!(quote.is_empty());
        assert_eq!(quote.observed_date, None);
    }

    #[test]
    fn missing_body_is_malformed() {
        let err = parse_shinhan_response(&json!({ "dataHeader": {} })).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn request_carries_inquiry_date() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();
        let body = ShinhanClient::build_request_body(date);
        assert_eq!(body["dataBody"]["조회일자"], "20251128");
    }
}
