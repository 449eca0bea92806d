//! Oracle module - Multi-source rate aggregation
//!
//! Collects USD/JPY vs KRW rates from the bank boards, the reference rate
//! site and the exchange ticker, and produces one unified snapshot per call.

mod aggregator;
mod cache;
pub mod calendar;
pub mod clock;
mod fallback;
pub mod sources;

pub use aggregator::{premium_pct, rate_diff, RateAggregator};
pub use cache::{get_or_compute, SnapshotCache, SnapshotService, TtlCache};
pub use clock::{Clock, FixedClock, SeoulClock};
pub use fallback::{FallbackPolicy, MAX_LOOKBACK_DAYS};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use sources::{
    build_http_client, BithumbClient, HanaClient, InvestingClient, KbStarClient, ShinhanClient,
};

/// Wire the enabled production sources into an aggregator
pub fn build_aggregator(cfg: &AppConfig) -> Result<RateAggregator> {
    let client = build_http_client(
        Duration::from_secs(cfg.fetch.timeout_secs),
        &cfg.fetch.user_agent,
    )?;

    let mut aggregator = RateAggregator::new(FallbackPolicy::new(cfg.fetch.lookback_days));

    if cfg.sources.shinhan_enabled {
        aggregator = aggregator.with_bank(ShinhanClient::new(client.clone()));
    }
    if cfg.sources.kbstar_enabled {
        aggregator = aggregator.with_bank(KbStarClient::new(client.clone()));
    }
    if cfg.sources.hana_enabled {
        aggregator = aggregator.with_bank(HanaClient::new(client.clone()));
    }
    if cfg.sources.investing_enabled {
        aggregator = aggregator.with_reference(InvestingClient::new(client.clone()));
    }
    if cfg.sources.bithumb_enabled {
        aggregator = aggregator.with_spot(BithumbClient::new(client));
    }

    tracing::info!(
        banks = aggregator.bank_count(),
        lookback_days = cfg.fetch.lookback_days,
        timeout_secs = cfg.fetch.timeout_secs,
        "Rate aggregator configured"
    );

    Ok(aggregator)
}

/// Aggregator wrapped with the configured cache
pub fn build_service(cfg: &AppConfig) -> Result<SnapshotService> {
    let service = SnapshotService::new(build_aggregator(cfg)?);
    if cfg.cache.enabled {
        Ok(service.with_cache(
            Arc::new(TtlCache::new()),
            Duration::from_secs(cfg.cache.ttl_secs),
        ))
    } else {
        Ok(service)
    }
}
