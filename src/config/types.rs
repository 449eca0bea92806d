//! Configuration section types

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Business days walked back for date-capable sources
    pub lookback_days: usize,
    /// Per-request timeout in seconds, applied to every attempt
    pub timeout_secs: u64,
    /// User-Agent sent to every upstream
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub shinhan_enabled: bool,
    pub kbstar_enabled: bool,
    pub hana_enabled: bool,
    /// Reference rate (Investing.com)
    pub investing_enabled: bool,
    /// Exchange ticker (Bithumb)
    pub bithumb_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Snapshot time-to-live in seconds
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Link appended to reports ("상세: ...")
    pub detail_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramSettings {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

/// Kakao "send to me" memo channel
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KakaoSettings {
    pub access_token: Option<String>,
    /// Used once to renew an expired access token
    pub refresh_token: Option<String>,
    /// App REST API key, the client id for token renewal
    pub rest_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Listen address for the JSON API
    pub bind_addr: String,
}
