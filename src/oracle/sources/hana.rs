//! Hana Bank rate board client
//!
//! Posts the same AJAX form the bank's rate page uses; the inquiry date is a
//! form field, so historical boards can be requested directly.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{header::ACCEPT, Client};
use scraper::{Html, Selector};

use super::{check_status, parse_decimal, squash_text, QuoteSource, SourceError, SourceResult};
use crate::oracle::clock::{Clock, SeoulClock};
use crate::types::{FetchMode, Quote, SourceId};

const HANA_URL: &str = "https://www.kebhana.com/cms/rate/wpfxd651_01i_01.do";
const HANA_REFERER: &str =
    "https://www.kebhana.com/cms/rate/index.do?contentUrl=/cms/rate/wpfxd651_01i.do";

/// Column holding the base rate (매매기준율)
const BASE_RATE_COLUMN: usize = 8;

#[derive(Debug, Clone)]
pub struct HanaClient {
    client: Client,
    url: String,
}

impl HanaClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: HANA_URL.to_string(),
        }
    }

    fn build_form(date: NaiveDate) -> Vec<(&'static str, String)> {
        vec![
            ("ajax", "true".to_string()),
            ("curCd", String::new()),
            ("tmpInqStrDt", date.format("%Y-%m-%d").to_string()),
            // 3 = latest board of the day
            ("pbldDvCd", "3".to_string()),
            ("pbldSqn", String::new()),
            ("inqStrDt", date.format("%Y%m%d").to_string()),
            ("inqKindCd", "1".to_string()),
            ("hid_key_data", String::new()),
            ("hid_enc_data", String::new()),
            ("requestTarget", "searchContentDiv".to_string()),
        ]
    }
}

#[async_trait]
impl QuoteSource for HanaClient {
    fn id(&self) -> SourceId {
        SourceId::Hana
    }

    fn mode(&self) -> FetchMode {
        FetchMode::DateCapable
    }

    async fn fetch(&self, target_date: Option<NaiveDate>) -> SourceResult<Quote> {
        let date = target_date.unwrap_or_else(|| SeoulClock.now().date());

        tracing::debug!(source = %"Hana", date = %date, "Requesting rate board");

        let response = self
            .client
            .post(&self.url)
            .header(ACCEPT, "text/javascript, text/html, application/xml, text/xml, */*")
            .header("Origin", "https://www.kebhana.com")
            .header("Referer", HANA_REFERER)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&Self::build_form(date))
            .send()
            .await?;

        let html = check_status(response)?.text().await?;
        parse_hana_page(&html)
    }
}

/// Trailing run of ASCII digits in `head`, parsed
fn trailing_number(head: &str) -> Option<u32> {
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    head[start..].parse().ok()
}

/// Split at `marker` and read the number right before it
fn number_before<'a>(text: &'a str, marker: &str) -> Option<(u32, &'a str)> {
    let (head, tail) = text.split_once(marker)?;
    Some((trailing_number(head)?, tail))
}

/// Find "2025년11월27일 19시36분00초 (731회차)" anywhere in the page text
fn parse_announcement(text: &str) -> Option<(NaiveDate, NaiveTime, String)> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

    let (year, rest) = number_before(&compact, "년")?;
    let (month, rest) = number_before(rest, "월")?;
    let (day, rest) = number_before(rest, "일")?;
    let (hour, rest) = number_before(rest, "시")?;
    let (minute, rest) = number_before(rest, "분")?;
    let (second, rest) = number_before(rest, "초")?;
    let (round, _) = number_before(rest, "회차")?;

    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some((date, time, round.to_string()))
}

/// Extract the announcement and USD/JPY base rates from the board fragment
pub fn parse_hana_page(html: &str) -> SourceResult<Quote> {
    let doc = Html::parse_document(html);
    let row_selector =
        Selector::parse("table tr").map_err(|e| SourceError::Malformed(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| SourceError::Malformed(e.to_string()))?;

    let mut quote = Quote::new(SourceId::Hana);

    let page_text = squash_text(doc.root_element().text());
    if let Some((date, time, round)) = parse_announcement(&page_text) {
        quote.observed_date = Some(date);
        quote.observed_time = Some(time);
        quote.sequence_label = Some(round);
    }

    let mut saw_rows = false;
    for row in doc.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|td| squash_text(td.text()))
            .collect();
        if cells.len() <= BASE_RATE_COLUMN {
            continue;
        }
        saw_rows = true;

        let label = cells[0].as_str();
        if label.contains("미국 USD") {
            quote.usd_rate = parse_decimal(&cells[BASE_RATE_COLUMN]);
        } else if label.contains("일본 JPY") || label.contains("JPY (100)") {
            quote.jpy_rate = parse_decimal(&cells[BASE_RATE_COLUMN]);
        }
    }

    if !saw_rows && quote.observed_date.is_none() {
        return Err(SourceError::Malformed("no rate board in response".into()));
    }

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const FRAGMENT: &str = r#"
        <div class="searchContentDiv">
          <p class="txtRateBox">
            <span>고시일시 : 2025년11월27일 19시36분00초</span>
            <span>( 731회차 )</span>
          </p>
          <table>
            <thead><tr><th>통화</th></tr></thead>
            <tbody>
              <tr>
                <td>미국 USD</td><td>1,494.19</td><td>1.75</td><td>1,442.81</td><td>1.75</td>
                <td>1,482.80</td><td>1,454.20</td><td>1,454.20</td><td>1,468.50</td><td>1.0000</td>
              </tr>
              <tr>
                <td>일본 JPY (100)</td><td>958.00</td><td>1.75</td><td>925.06</td><td>1.75</td>
                <td>950.75</td><td>932.31</td><td>932.31</td><td>941.53</td><td>0.6411</td>
              </tr>
            </tbody>
          </table>
        </div>
    "#;

    #[test]
    fn parses_board_fragment() {
        let quote = parse_hana_page(FRAGMENT).unwrap();
        assert_eq!(quote.observed_date, NaiveDate::from_ymd_opt(2025, 11, 27));
        assert_eq!(quote.observed_time, NaiveTime::from_hms_opt(19, 36, 0));
        assert_eq!(quote.sequence_label.as_deref(), Some("731"));
        assert_eq!(quote.usd_rate, Some(dec!(1468.50)));
        assert_eq!(quote.jpy_rate, Some(dec!(941.53)));
    }

    #[test]
    fn unrelated_markup_is_malformed() {
        let err = parse_hana_page("<div>세션이 만료되었습니다</div>").unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn form_carries_both_date_formats() {
        let form = HanaClient::build_form(NaiveDate::from_ymd_opt(2025, 11, 28).unwrap());
        assert!(form.contains(&("inqStrDt", "20251128".to_string())));
        assert!(form.contains(&("tmpInqStrDt", "2025-11-28".to_string())));
    }

    #[test]
    fn trailing_number_reads_digits_before_marker() {
        assert_eq!(number_before("고시일시:2025년11월", "년").map(|(n, _)| n), Some(2025));
        assert_eq!(number_before("(731회차)", "회차").map(|(n, _)| n), Some(731));
        assert_eq!(number_before("abc년", "년"), None);
    }
}
