//! Dashboard API Types
//!
//! Display-ready DTOs; rates keep their raw value next to the formatted one.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::report::{format_amount, format_rate_with_diff};
use crate::types::{BankRate, Snapshot, SourceId, SpotTicker};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankRowView {
    pub source: SourceId,
    pub name: String,
    /// "YYYY-MM-DD HH:MM:SS" or "-"
    pub observed_at: String,
    pub round: String,
    pub usd_rate: Option<Decimal>,
    pub usd_diff: Option<Decimal>,
    /// "1,380.50 (+4.50)"
    pub usd_display: String,
    pub jpy_rate: Option<Decimal>,
    pub jpy_diff: Option<Decimal>,
    pub jpy_display: String,
    pub is_stale: bool,
}

impl From<&BankRate> for BankRowView {
    fn from(bank: &BankRate) -> Self {
        let quote = &bank.quote;
        Self {
            source: quote.source,
            name: quote.source.display_name().to_string(),
            observed_at: quote.observed_label(),
            round: quote.round_label(),
            usd_rate: quote.usd_rate,
            usd_diff: bank.usd_diff,
            usd_display: format_rate_with_diff(quote.usd_rate, bank.usd_diff),
            jpy_rate: quote.jpy_rate,
            jpy_diff: bank.jpy_diff,
            jpy_display: format_rate_with_diff(quote.jpy_rate, bank.jpy_diff),
            is_stale: quote.is_stale,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceView {
    pub source: SourceId,
    /// "YYYY-MM-DD HH:MM:SS" or "-"
    pub observed_at: String,
    pub usd_krw: Option<Decimal>,
    pub jpy_krw_per_100: Option<Decimal>,
    pub usd_display: String,
    pub jpy_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotView {
    pub pair: String,
    pub price: Decimal,
    pub price_display: String,
    pub change_amount: Decimal,
    pub change_rate: Decimal,
}

impl From<&SpotTicker> for SpotView {
    fn from(ticker: &SpotTicker) -> Self {
        Self {
            pair: ticker.asset.krw_pair().to_string(),
            price: ticker.price,
            price_display: format_amount(ticker.price, 0),
            change_amount: ticker.change_amount,
            change_rate: ticker.change_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotView {
    /// Oldest observation first
    pub banks: Vec<BankRowView>,
    pub reference: Option<ReferenceView>,
    pub spot_main: Option<SpotView>,
    pub spot_secondary: Option<SpotView>,
    pub premium_pct: Option<Decimal>,
    pub has_stale_banks: bool,
}

impl From<&Snapshot> for SnapshotView {
    fn from(snapshot: &Snapshot) -> Self {
        let mut ordered: Vec<&BankRate> = snapshot.banks.iter().collect();
        ordered.sort_by_key(|b| (b.quote.observed_date, b.quote.observed_time));

        Self {
            banks: ordered.into_iter().map(BankRowView::from).collect(),
            reference: snapshot.reference.as_ref().map(|r| ReferenceView {
                source: r.source,
                observed_at: r.observed_label(),
                usd_krw: r.usd_krw,
                jpy_krw_per_100: r.jpy_krw_per_100,
                usd_display: format_rate_with_diff(r.usd_krw, None),
                jpy_display: format_rate_with_diff(r.jpy_krw_per_100, None),
            }),
            spot_main: snapshot.spot.main.as_ref().map(SpotView::from),
            spot_secondary: snapshot.spot.secondary.as_ref().map(SpotView::from),
            premium_pct: snapshot
                .premium_pct
                .map(|p| p.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)),
            has_stale_banks: snapshot.has_stale_banks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: i64,
}

// ─────────────────────────────────────────────────────────────────
// API Response Wrapper
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Quote, ReferenceRate};
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn bank(source: SourceId, hour: u32, usd: Decimal) -> BankRate {
        let mut quote = Quote::new(source);
        quote.observed_date = NaiveDate::from_ymd_opt(2025, 11, 27);
        quote.observed_time = NaiveTime::from_hms_opt(hour, 0, 0);
        quote.usd_rate = Some(usd);
        BankRate {
            quote,
            usd_diff: Some(dec!(4.5)),
            jpy_diff: None,
        }
    }

    #[test]
    fn rows_are_sorted_by_observation() {
        let snapshot = Snapshot {
            banks: vec![
                bank(SourceId::Shinhan, 18, dec!(1380.5)),
                bank(SourceId::KbStar, 9, dec!(1381)),
                bank(SourceId::Hana, 12, dec!(1379)),
            ],
            ..Snapshot::default()
        };

        let view = SnapshotView::from(&snapshot);
        let order: Vec<SourceId> = view.banks.iter().map(|b| b.source).collect();
        assert_eq!(order, vec![SourceId::KbStar, SourceId::Hana, SourceId::Shinhan]);

        let shinhan = &view.banks[2];
        assert_eq!(shinhan.usd_display, "1,380.50 (+4.50)");
        assert_eq!(shinhan.jpy_display, "-");
        assert_eq!(shinhan.observed_at, "2025-11-27 18:00:00");
        assert_eq!(shinhan.name, "신한은행");
    }

    #[test]
    fn reference_keeps_its_observation_time() {
        let snapshot = Snapshot {
            reference: Some(ReferenceRate {
                source: SourceId::Investing,
                observed_date: NaiveDate::from_ymd_opt(2025, 11, 27),
                observed_time: NaiveTime::from_hms_opt(19, 40, 5),
                usd_krw: Some(dec!(1470.35)),
                jpy_krw_per_100: None,
            }),
            ..Snapshot::default()
        };

        let reference = SnapshotView::from(&snapshot).reference.unwrap();
        assert_eq!(reference.observed_at, "2025-11-27 19:40:05");
        assert_eq!(reference.usd_display, "1,470.35");
        assert_eq!(reference.jpy_display, "-");
    }

    #[test]
    fn error_response_has_no_data() {
        let resp = ApiResponse::<SnapshotView>::error("unavailable");
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error.as_deref(), Some("unavailable"));
    }
}
