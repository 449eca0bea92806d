//! KB Kookmin Bank rate board client
//!
//! Scrapes the public rate page. The page always shows the latest board and
//! takes no date, so a requested date is checked against the board's own
//! announcement date instead.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{header::ACCEPT, Client};
use scraper::{Html, Selector};

use super::{check_status, parse_decimal, squash_text, QuoteSource, SourceError, SourceResult};
use crate::types::{FetchMode, Quote, SourceId};

const KBSTAR_URL: &str = "https://obank.kbstar.com/quics?page=C101423";

#[derive(Debug, Clone)]
pub struct KbStarClient {
    client: Client,
    url: String,
}

impl KbStarClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            url: KBSTAR_URL.to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for KbStarClient {
    fn id(&self) -> SourceId {
        SourceId::KbStar
    }

    fn mode(&self) -> FetchMode {
        FetchMode::DateCapable
    }

    async fn fetch(&self, target_date: Option<NaiveDate>) -> SourceResult<Quote> {
        let response = self
            .client
            .get(&self.url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let html = check_status(response)?.text().await?;
        check_board_date(target_date, parse_kbstar_page(&html)?)
    }
}

/// Accept the board only when it was published on the requested date.
///
/// An undated board cannot answer a dated request.
pub fn check_board_date(requested: Option<NaiveDate>, quote: Quote) -> SourceResult<Quote> {
    let Some(requested) = requested else {
        return Ok(quote);
    };
    match quote.observed_date {
        Some(published) if published == requested => Ok(quote),
        Some(published) => Err(SourceError::DateMismatch {
            requested,
            published,
        }),
        None => Err(SourceError::Malformed(format!(
            "board has no announcement date (requested {})",
            requested
        ))),
    }
}

/// Parse "2025.11.27 19:27:13 (584회차)" into its timestamp and round
fn parse_announcement(text: &str) -> Option<(NaiveDateTime, String)> {
    let (stamp, rest) = text.split_once('(')?;
    let stamp = NaiveDateTime::parse_from_str(stamp.trim(), "%Y.%m.%d %H:%M:%S").ok()?;
    let round = rest.split_once("회차")?.0.trim();
    if round.is_empty() || !round.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((stamp, round.to_string()))
}

/// Extract the announcement header and USD/JPY base rates (third column)
pub fn parse_kbstar_page(html: &str) -> SourceResult<Quote> {
    let doc = Html::parse_document(html);
    let row_selector =
        Selector::parse("table tr").map_err(|e| SourceError::Malformed(e.to_string()))?;
    let cell_selector = Selector::parse("td").map_err(|e| SourceError::Malformed(e.to_string()))?;

    let mut quote = Quote::new(SourceId::KbStar);
    let mut saw_table = false;

    for row in doc.select(&row_selector) {
        saw_table = true;
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|td| squash_text(td.text()))
            .collect();

        let Some(first) = cells.first() else {
            continue;
        };

        if quote.observed_date.is_none() {
            if let Some((stamp, round)) = parse_announcement(first) {
                quote.observed_date = Some(stamp.date());
                quote.observed_time = Some(stamp.time());
                quote.sequence_label = Some(round);
                continue;
            }
        }

        if cells.len() < 3 {
            continue;
        }
        match first.as_str() {
            "USD" if quote.usd_rate.is_none() => quote.usd_rate = parse_decimal(&cells[2]),
            "JPY" if quote.jpy_rate.is_none() => quote.jpy_rate = parse_decimal(&cells[2]),
            _ => {}
        }
    }

    if !saw_table {
        return Err(SourceError::Malformed("no rate tables on page".into()));
    }

    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    const PAGE: &str = r#"
        <html><body>
        <table><tbody><tr><td>환율등록일시(회차)</td></tr></tbody></table>
        <table><tbody><tr><td> 2025.11.27 19:27:13 (584회차) </td></tr></tbody></table>
        <table><tbody>
            <tr><td>USD</td><td>미국 달러</td><td>1,468.50</td><td>1,494.19</td></tr>
            <tr><td>JPY</td><td>일본 엔(100)</td><td>941.53</td><td>958.00</td></tr>
            <tr><td>EUR</td><td>유로</td><td>1,701.20</td><td>1,735.04</td></tr>
        </tbody></table>
        </body></html>
    "#;

    #[test]
    fn parses_announcement_and_rates() {
        let quote = parse_kbstar_page(PAGE).unwrap();
        assert_eq!(quote.observed_date, NaiveDate::from_ymd_opt(2025, 11, 27));
        assert_eq!(quote.observed_time, NaiveTime::from_hms_opt(19, 27, 13));
        assert_eq!(quote.sequence_label.as_deref(), Some("584"));
        assert_eq!(quote.usd_rate, Some(dec!(1468.50)));
        assert_eq!(quote.jpy_rate, Some(dec!(941.53)));
    }

    #[test]
    fn page_without_tables_is_malformed() {
        let err = parse_kbstar_page("<html><body>점검중</body></html>").unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn board_date_matching_request_is_accepted() {
        let quote = parse_kbstar_page(PAGE).unwrap();
        let checked = check_board_date(NaiveDate::from_ymd_opt(2025, 11, 27), quote).unwrap();
        assert_eq!(checked.usd_rate, Some(dec!(1468.50)));
    }

    #[test]
    fn board_from_another_day_is_a_mismatch() {
        let quote = parse_kbstar_page(PAGE).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        match check_board_date(Some(monday), quote) {
            Err(SourceError::DateMismatch {
                requested,
                published,
            }) => {
                assert_eq!(requested, monday);
                assert_eq!(published, NaiveDate::from_ymd_opt(2025, 11, 27).unwrap());
            }
            other => panic!("expected DateMismatch, got {:?}", other),
        }
    }

    #[test]
    fn undated_board_cannot_answer_a_dated_request() {
        let mut quote = Quote::new(SourceId::KbStar);
        quote.usd_rate = Some(dec!(1468.50));
        quote.jpy_rate = Some(dec!(941.53));

        let monday = NaiveDate::from_ymd_opt(2025, 12, 1);
        let err = check_board_date(monday, quote.clone()).unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));

        // Undated request passes the board through unchanged
        assert_eq!(check_board_date(None, quote.clone()).unwrap(), quote);
    }

    #[test]
    fn announcement_requires_round() {
        assert!(parse_announcement("2025.11.27 19:27:13").is_none());
        assert!(parse_announcement("2025.11.27 19:27:13 (회차)").is_none());
        let (stamp, round) = parse_announcement("2025.11.27 09:01:02 (3회차)").unwrap();
        assert_eq!(stamp.time(), NaiveTime::from_hms_opt(9, 1, 2).unwrap());
        assert_eq!(round, "3");
    }
}
