//! Rate Aggregator - Combines bank, reference and exchange sources
//!
//! Queries every configured source one after another, keeps whichever
//! succeed, and derives the cross-source figures (per-bank difference from
//! the reference rate, spot premium). A failing source only drops out of the
//! snapshot; it never aborts the batch.

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::oracle::clock::{Clock, SeoulClock};
use crate::oracle::fallback::FallbackPolicy;
use crate::oracle::sources::{QuoteSource, SpotSource};
use crate::types::{BankRate, Quote, ReferenceRate, Snapshot, SpotAsset, SpotPair, SpotTicker};

/// Percent premium of `spot` over `reference`: (spot - reference) / reference * 100.
///
/// None when there is no baseline (reference missing or zero) or the result
/// does not fit in a `Decimal`.
pub fn premium_pct(spot: Decimal, reference: Option<Decimal>) -> Option<Decimal> {
    let reference = reference.filter(|r| !r.is_zero())?;
    spot.checked_sub(reference)?
        .checked_div(reference)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// reference - bank, when both sides are present
pub fn rate_diff(reference: Option<Decimal>, bank: Option<Decimal>) -> Option<Decimal> {
    reference?.checked_sub(bank?)
}

pub struct RateAggregator {
    banks: Vec<Box<dyn QuoteSource>>,
    reference: Option<Box<dyn QuoteSource>>,
    spot: Option<Box<dyn SpotSource>>,
    spot_assets: (SpotAsset, SpotAsset),
    policy: FallbackPolicy,
    clock: Arc<dyn Clock>,
}

impl RateAggregator {
    pub fn new(policy: FallbackPolicy) -> Self {
        Self {
            banks: Vec::new(),
            reference: None,
            spot: None,
            spot_assets: (SpotAsset::USDT, SpotAsset::BTC),
            policy,
            clock: Arc::new(SeoulClock),
        }
    }

    /// Add a bank source; banks are queried in insertion order
    pub fn with_bank<S: QuoteSource + 'static>(mut self, source: S) -> Self {
        self.banks.push(Box::new(source));
        self
    }

    pub fn with_reference<S: QuoteSource + 'static>(mut self, source: S) -> Self {
        self.reference = Some(Box::new(source));
        self
    }

    pub fn with_spot<S: SpotSource + 'static>(mut self, source: S) -> Self {
        self.spot = Some(Box::new(source));
        self
    }

    /// Main asset (used for the premium) and secondary asset
    pub fn with_spot_assets(mut self, main: SpotAsset, secondary: SpotAsset) -> Self {
        self.spot_assets = (main, secondary);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    /// Run one full aggregation pass
    pub async fn get_snapshot(&self) -> Snapshot {
        let now = self.clock.now();

        let mut quotes: Vec<Quote> = Vec::with_capacity(self.banks.len());
        for source in &self.banks {
            if let Some(quote) = self.policy.fetch(source.as_ref(), now).await {
                quotes.push(quote);
            }
        }

        let reference = self.fetch_reference().await;
        let spot = self.fetch_spot().await;

        let usd_ref = reference.as_ref().and_then(|r| r.usd_krw);
        let jpy_ref = reference.as_ref().and_then(|r| r.jpy_krw_per_100);

        let banks: Vec<BankRate> = quotes
            .into_iter()
            .map(|quote| BankRate {
                usd_diff: rate_diff(usd_ref, quote.usd_rate),
                jpy_diff: rate_diff(jpy_ref, quote.jpy_rate),
                quote,
            })
            .collect();

        let premium = spot
            .main
            .as_ref()
            .and_then(|ticker| premium_pct(ticker.price, usd_ref));

        tracing::info!(
            banks = banks.len(),
            configured_banks = self.banks.len(),
            reference = reference.is_some(),
            spot_main = spot.main.is_some(),
            spot_secondary = spot.secondary.is_some(),
            "📊 Snapshot assembled"
        );

        Snapshot {
            banks,
            reference,
            spot,
            premium_pct: premium,
        }
    }

    /// Current-only, single attempt. A record with no rates is still kept.
    async fn fetch_reference(&self) -> Option<ReferenceRate> {
        let source = self.reference.as_ref()?;
        let quote = match source.fetch(None).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(source = %source.id(), error = %e, "Reference rate unavailable");
                return None;
            }
        };

        // JPY is normalized to per-100 here and nowhere else
        let unit = source.jpy_unit();
        Some(ReferenceRate {
            source: quote.source,
            observed_date: quote.observed_date,
            observed_time: quote.observed_time,
            usd_krw: quote.usd_rate,
            jpy_krw_per_100: quote.jpy_rate.map(|r| unit.to_per_hundred(r)),
        })
    }

    async fn fetch_spot(&self) -> SpotPair {
        let Some(source) = self.spot.as_ref() else {
            return SpotPair::default();
        };
        let (main, secondary) = self.spot_assets;
        SpotPair {
            main: Self::fetch_ticker(source.as_ref(), main).await,
            secondary: Self::fetch_ticker(source.as_ref(), secondary).await,
        }
    }

    async fn fetch_ticker(source: &dyn SpotSource, asset: SpotAsset) -> Option<SpotTicker> {
        match source.fetch_ticker(asset).await {
            Ok(ticker) => Some(ticker),
            Err(e) => {
                tracing::warn!(source = %source.name(), asset = %asset, error = %e, "Ticker unavailable");
                None
            }
        }
    }
}
