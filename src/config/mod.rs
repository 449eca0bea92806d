//! Configuration management for fxboard
//!
//! Loads built-in defaults, optional config files and environment variables
//! (after reading `.env`).

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::oracle::sources::DEFAULT_USER_AGENT;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub kakao: KakaoSettings,
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Load configuration from defaults, files and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (FXBOARD__FETCH__TIMEOUT_SECS=5)
            .add_source(Environment::with_prefix("FXBOARD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Built-in defaults only; no files or environment
    pub fn defaults() -> Result<Self> {
        Self::builder()?
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            // Fetch defaults
            .set_default("fetch.lookback_days", 7)?
            .set_default("fetch.timeout_secs", 10)?
            .set_default("fetch.user_agent", DEFAULT_USER_AGENT)?
            // Source toggles
            .set_default("sources.shinhan_enabled", true)?
            .set_default("sources.kbstar_enabled", true)?
            .set_default("sources.hana_enabled", true)?
            .set_default("sources.investing_enabled", true)?
            .set_default("sources.bithumb_enabled", true)?
            // Cache defaults
            .set_default("cache.enabled", true)?
            .set_default("cache.ttl_secs", 60)?
            // Dashboard defaults
            .set_default("dashboard.bind_addr", "127.0.0.1:8080")?)
    }

    fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            bail!("fetch.timeout_secs must be greater than zero");
        }
        if self.fetch.lookback_days == 0 {
            tracing::warn!("fetch.lookback_days is 0; date-capable sources will never be queried");
        }
        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        let enabled: Vec<&str> = [
            ("shinhan", self.sources.shinhan_enabled),
            ("kbstar", self.sources.kbstar_enabled),
            ("hana", self.sources.hana_enabled),
            ("investing", self.sources.investing_enabled),
            ("bithumb", self.sources.bithumb_enabled),
        ]
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| *name)
        .collect();

        format!(
            "sources={:?} lookback_days={} timeout={}s cache={} ttl={}s telegram={} kakao={}",
            enabled,
            self.fetch.lookback_days,
            self.fetch.timeout_secs,
            self.cache.enabled,
            self.cache.ttl_secs,
            self.telegram.bot_token.is_some(),
            self.kakao.access_token.is_some(),
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
