//! Core types used throughout fxboard
//!
//! Defines the normalized quote record every source adapter produces and the
//! snapshot the aggregator assembles from them.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream sources wired into the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceId {
    Shinhan,
    KbStar,
    Hana,
    /// Reference-rate aggregator site
    Investing,
    /// Crypto exchange public ticker
    Bithumb,
}

impl SourceId {
    /// Bank sources in the order they are queried and reported
    pub const BANKS: [SourceId; 3] = [SourceId::Shinhan, SourceId::KbStar, SourceId::Hana];

    /// Full display name (e.g., "신한은행")
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Shinhan => "신한은행",
            SourceId::KbStar => "국민은행",
            SourceId::Hana => "하나은행",
            SourceId::Investing => "Investing.com",
            SourceId::Bithumb => "빗썸",
        }
    }

    /// Short label used in chat reports (e.g., "신한")
    pub fn short_name(&self) -> &'static str {
        match self {
            SourceId::Shinhan => "신한",
            SourceId::KbStar => "국민",
            SourceId::Hana => "하나",
            SourceId::Investing => "Investing",
            SourceId::Bithumb => "빗썸",
        }
    }

    pub fn is_bank(&self) -> bool {
        matches!(self, SourceId::Shinhan | SourceId::KbStar | SourceId::Hana)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Shinhan => write!(f, "Shinhan"),
            SourceId::KbStar => write!(f, "KbStar"),
            SourceId::Hana => write!(f, "Hana"),
            SourceId::Investing => write!(f, "Investing"),
            SourceId::Bithumb => write!(f, "Bithumb"),
        }
    }
}

/// Whether an adapter can be asked for a specific publication date.
///
/// Fixed when the adapter is constructed; the fallback policy reads it once
/// per walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    /// Always returns the current publication, takes no date
    CurrentOnly,
    /// Honors a requested calendar date
    DateCapable,
}

/// Unit the upstream uses for the JPY rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JpyUnit {
    /// KRW per 1 JPY
    PerOne,
    /// KRW per 100 JPY (the unit used everywhere inside fxboard)
    PerHundred,
}

impl JpyUnit {
    /// Convert a rate in this unit to KRW per 100 JPY
    pub fn to_per_hundred(&self, rate: Decimal) -> Decimal {
        match self {
            JpyUnit::PerOne => rate * Decimal::ONE_HUNDRED,
            JpyUnit::PerHundred => rate,
        }
    }
}

fn observed_label(date: Option<NaiveDate>, time: Option<NaiveTime>) -> String {
    match (date, time) {
        (Some(d), Some(t)) => format!("{} {}", d.format("%Y-%m-%d"), t.format("%H:%M:%S")),
        (Some(d), None) => d.format("%Y-%m-%d").to_string(),
        _ => "-".to_string(),
    }
}

/// One source's currency-rate reading.
///
/// `observed_date`/`observed_time` are what the source attributes to the
/// publication, not the wall clock at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source: SourceId,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    /// KRW per 1 USD
    pub usd_rate: Option<Decimal>,
    /// KRW per 100 JPY
    pub jpy_rate: Option<Decimal>,
    /// Publication counter ("회차"), display only
    pub sequence_label: Option<String>,
    /// True when produced by a lookback to an earlier business day
    pub is_stale: bool,
}

impl Quote {
    pub fn new(source: SourceId) -> Self {
        Self {
            source,
            observed_date: None,
            observed_time: None,
            usd_rate: None,
            jpy_rate: None,
            sequence_label: None,
            is_stale: false,
        }
    }

    /// Both rates present and non-zero
    pub fn is_complete(&self) -> bool {
        let usable = |rate: Option<Decimal>| rate.is_some_and(|r| !r.is_zero());
        usable(self.usd_rate) && usable(self.jpy_rate)
    }

    /// Neither rate present; equivalent to no data
    pub fn is_empty(&self) -> bool {
        self.usd_rate.is_none() && self.jpy_rate.is_none()
    }

    /// Observed timestamp rendered as `YYYY-MM-DD HH:MM:SS`, or "-"
    pub fn observed_label(&self) -> String {
        observed_label(self.observed_date, self.observed_time)
    }

    /// Round label rendered as "N회차", or "-"
    pub fn round_label(&self) -> String {
        match &self.sequence_label {
            Some(round) if !round.is_empty() => format!("{}회차", round),
            _ => "-".to_string(),
        }
    }
}

/// Assets quoted by the exchange source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpotAsset {
    USDT,
    BTC,
}

impl SpotAsset {
    /// Ticker path segment for the KRW market (e.g., "USDT_KRW")
    pub fn krw_pair(&self) -> &'static str {
        match self {
            SpotAsset::USDT => "USDT_KRW",
            SpotAsset::BTC => "BTC_KRW",
        }
    }
}

impl fmt::Display for SpotAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotAsset::USDT => write!(f, "USDT"),
            SpotAsset::BTC => write!(f, "BTC"),
        }
    }
}

/// Exchange ticker reading for one asset, in KRW
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotTicker {
    pub asset: SpotAsset,
    pub price: Decimal,
    pub prev_close: Decimal,
    pub change_amount: Decimal,
    /// Percent change against the previous close
    pub change_rate: Decimal,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub volume_24h: Option<Decimal>,
}

/// Main and secondary asset quotes from the exchange; each is independent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotPair {
    pub main: Option<SpotTicker>,
    pub secondary: Option<SpotTicker>,
}

/// Reference rate after ingestion; JPY is always per 100 units here
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRate {
    pub source: SourceId,
    pub observed_date: Option<NaiveDate>,
    pub observed_time: Option<NaiveTime>,
    pub usd_krw: Option<Decimal>,
    pub jpy_krw_per_100: Option<Decimal>,
}

impl ReferenceRate {
    pub fn observed_label(&self) -> String {
        observed_label(self.observed_date, self.observed_time)
    }
}

/// A bank quote plus its signed distance from the reference rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRate {
    pub quote: Quote,
    /// reference - bank; positive means the bank quotes below reference
    pub usd_diff: Option<Decimal>,
    pub jpy_diff: Option<Decimal>,
}

/// Result of one aggregation call. Not persisted; consumers get a copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// In call order
    pub banks: Vec<BankRate>,
    pub reference: Option<ReferenceRate>,
    pub spot: SpotPair,
    /// Percent premium of the main spot asset over the reference USD rate
    pub premium_pct: Option<Decimal>,
}

impl Snapshot {
    pub fn bank(&self, source: SourceId) -> Option<&BankRate> {
        self.banks.iter().find(|b| b.quote.source == source)
    }

    pub fn has_stale_banks(&self) -> bool {
        self.banks.iter().any(|b| b.quote.is_stale)
    }

    /// Nothing usable came back from any source
    pub fn is_empty(&self) -> bool {
        self.banks.is_empty()
            && self.reference.is_none()
            && self.spot.main.is_none()
            && self.spot.secondary.is_none()
    }
}
