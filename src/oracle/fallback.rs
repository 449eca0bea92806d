//! Fallback fetch policy
//!
//! Wraps one quote source and walks backward over recent business days until
//! the source returns a usable quote (both USD and JPY present) or the
//! lookback budget runs out. Failed attempts are logged and skipped; running
//! out of days is reported as absence, not as an error.

use chrono::NaiveDateTime;

use crate::oracle::calendar::BusinessDays;
use crate::oracle::sources::QuoteSource;
use crate::types::{FetchMode, Quote};

/// Default number of business days tried for a date-capable source
pub const MAX_LOOKBACK_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    max_lookback_days: usize,
}

impl FallbackPolicy {
    pub fn new(max_lookback_days: usize) -> Self {
        Self { max_lookback_days }
    }

    pub fn max_lookback_days(&self) -> usize {
        self.max_lookback_days
    }

    /// Most recent usable quote from `source`, or None.
    ///
    /// `now` is read once by the caller; it fixes both the first candidate
    /// date and the staleness comparison for the whole walk.
    pub async fn fetch(&self, source: &dyn QuoteSource, now: NaiveDateTime) -> Option<Quote> {
        let id = source.id();

        match source.mode() {
            FetchMode::CurrentOnly => match source.fetch(None).await {
                Ok(quote) if quote.is_empty() => {
                    tracing::debug!(source = %id, "Current quote carries no rates");
                    None
                }
                Ok(mut quote) => {
                    quote.is_stale = false;
                    Some(quote)
                }
                Err(e) => {
                    tracing::warn!(source = %id, error = %e, "Fetch failed (current)");
                    None
                }
            },
            FetchMode::DateCapable => {
                let today = now.date();

                for candidate in BusinessDays::back_from(today, self.max_lookback_days) {
                    let mut quote = match source.fetch(Some(candidate)).await {
                        Ok(quote) => quote,
                        Err(e) => {
                            tracing::warn!(
                                source = %id,
                                date = %candidate,
                                error = %e,
                                "Fetch failed, trying previous business day"
                            );
                            continue;
                        }
                    };

                    if !quote.is_complete() {
                        tracing::debug!(
                            source = %id,
                            date = %candidate,
                            has_usd = quote.usd_rate.is_some(),
                            has_jpy = quote.jpy_rate.is_some(),
                            "Incomplete quote, trying previous business day"
                        );
                        continue;
                    }

                    quote.is_stale = candidate != today;
                    if quote.is_stale {
                        tracing::info!(source = %id, date = %candidate, "Using earlier business day");
                    }
                    return Some(quote);
                }

                tracing::warn!(
                    source = %id,
                    days = self.max_lookback_days,
                    "No usable quote within lookback window"
                );
                None
            }
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(MAX_LOOKBACK_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::sources::{MockQuoteSource, SourceError};
    use crate::types::SourceId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn monday_morning() -> NaiveDateTime {
        // 2025-12-01 is a Monday
        NaiveDate::from_ymd_opt(2025, 12, 1)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap()
    }

    fn full_quote(date: Option<NaiveDate>) -> Quote {
        let mut q = Quote::new(SourceId::Shinhan);
        q.observed_date = date;
        q.usd_rate = Some(dec!(1468.5));
        q.jpy_rate = Some(dec!(941.53));
        q
    }

    fn date_capable() -> MockQuoteSource {
        let mut source = MockQuoteSource::new();
        source.expect_id().return_const(SourceId::Shinhan);
        source.expect_mode().return_const(FetchMode::DateCapable);
        source
    }

    #[tokio::test]
    async fn current_only_source_is_called_exactly_once_on_failure() {
        let mut source = MockQuoteSource::new();
        source.expect_id().return_const(SourceId::Investing);
        source.expect_mode().return_const(FetchMode::CurrentOnly);
        source
            .expect_fetch()
            .withf(|date| date.is_none())
            .times(1)
            .returning(|_| Err(SourceError::Status(503)));

        let policy = FallbackPolicy::default();
        assert!(policy.fetch(&source, monday_morning()).await.is_none());
    }

    #[tokio::test]
    async fn current_only_result_is_never_stale() {
        let mut source = MockQuoteSource::new();
        source.expect_id().return_const(SourceId::Investing);
        source.expect_mode().return_const(FetchMode::CurrentOnly);
        source.expect_fetch().times(1).returning(|_| {
            let mut q = full_quote(None);
            q.is_stale = true;
            Ok(q)
        });

        let quote = FallbackPolicy::default()
            .fetch(&source, monday_morning())
            .await
            .unwrap();
        assert!(!quote.is_stale);
    }

    #[tokio::test]
    async fn current_only_empty_quote_is_absent() {
        let mut source = MockQuoteSource::new();
        source.expect_id().return_const(SourceId::Investing);
        source.expect_mode().return_const(FetchMode::CurrentOnly);
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(Quote::new(SourceId::Investing)));

        let policy = FallbackPolicy::default();
        assert!(policy.fetch(&source, monday_morning()).await.is_none());
    }

    #[tokio::test]
    async fn first_day_success_is_fresh() {
        let mut source = date_capable();
        source
            .expect_fetch()
            .times(1)
            .returning(|date| Ok(full_quote(date)));

        let quote = FallbackPolicy::default()
            .fetch(&source, monday_morning())
            .await
            .unwrap();
        assert!(!quote.is_stale);
        assert_eq!(quote.observed_date, NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[tokio::test]
    async fn monday_failure_falls_back_to_friday() {
        let monday = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let friday = NaiveDate::from_ymd_opt(2025, 11, 28).unwrap();

        let mut source = date_capable();
        source
            .expect_fetch()
            .withf(move |date| *date == Some(monday))
            .times(1)
            .returning(|_| Err(SourceError::Malformed("not yet published".into())));
        source
            .expect_fetch()
            .withf(move |date| *date == Some(friday))
            .times(1)
            .returning(|date| Ok(full_quote(date)));

        let quote = FallbackPolicy::default()
            .fetch(&source, monday_morning())
            .await
            .unwrap();
        assert!(quote.is_stale);
        assert_eq!(quote.observed_date, Some(friday));
    }

    #[tokio::test]
    async fn usd_only_quote_is_skipped() {
        let monday = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let mut source = date_capable();
        source
            .expect_fetch()
            .withf(move |date| *date == Some(monday))
            .times(1)
            .returning(|date| {
                let mut q = full_quote(date);
                q.jpy_rate = None;
                Ok(q)
            });
        source
            .expect_fetch()
            .withf(move |date| *date != Some(monday))
            .times(1)
            .returning(|date| Ok(full_quote(date)));

        let quote = FallbackPolicy::default()
            .fetch(&source, monday_morning())
            .await
            .unwrap();
        assert!(quote.is_stale);
        assert!(quote.is_complete());
    }

    #[tokio::test]
    async fn exhaustion_uses_whole_budget_then_returns_none() {
        let mut source = date_capable();
        source
            .expect_fetch()
            .withf(|date| date.is_some())
            .times(MAX_LOOKBACK_DAYS)
            .returning(|_| Err(SourceError::Status(500)));

        let policy = FallbackPolicy::default();
        assert!(policy.fetch(&source, monday_morning()).await.is_none());
    }

    #[tokio::test]
    async fn custom_budget_limits_attempts() {
        let mut source = date_capable();
        source
            .expect_fetch()
            .times(3)
            .returning(|_| Ok(Quote::new(SourceId::Shinhan)));

        let policy = FallbackPolicy::new(3);
        assert!(policy.fetch(&source, monday_morning()).await.is_none());
    }
}
