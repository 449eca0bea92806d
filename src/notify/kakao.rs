//! Kakao "send to me" memo channel
//!
//! Access tokens expire after a few hours. A 401 is answered by renewing the
//! token once through the refresh token and resending; the renewed token is
//! kept for the rest of the process.

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::{NotificationError, NotificationResult, Notifier};
use crate::config::KakaoSettings;

const KAKAO_MEMO_URL: &str = "https://kapi.kakao.com/v2/api/talk/memo/default/send";
const KAKAO_TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const BUTTON_TITLE: &str = "환율 정보 보기";

#[derive(Debug, Clone)]
pub struct KakaoConfig {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub rest_api_key: Option<String>,
    /// Target of the message button
    pub link_url: Option<String>,
}

impl KakaoConfig {
    /// Config section first, then KAKAO_ACCESS_TOKEN / KAKAO_REFRESH_TOKEN /
    /// KAKAO_REST_API_KEY
    pub fn resolve(settings: &KakaoSettings, link_url: Option<String>) -> NotificationResult<Self> {
        let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let access_token = settings
            .access_token
            .clone()
            .or_else(|| from_env("KAKAO_ACCESS_TOKEN"))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| NotificationError::InvalidConfig("missing Kakao access token".into()))?;

        Ok(Self {
            access_token,
            refresh_token: settings
                .refresh_token
                .clone()
                .or_else(|| from_env("KAKAO_REFRESH_TOKEN"))
                .filter(|t| !t.is_empty()),
            rest_api_key: settings
                .rest_api_key
                .clone()
                .or_else(|| from_env("KAKAO_REST_API_KEY")),
            link_url: link_url.filter(|u| !u.is_empty()),
        })
    }
}

/// `template_object` form value for a plain text memo
pub fn template_object(text: &str, link_url: Option<&str>) -> String {
    let link = match link_url {
        Some(url) => serde_json::json!({ "web_url": url, "mobile_web_url": url }),
        None => serde_json::json!({}),
    };
    serde_json::json!({
        "object_type": "text",
        "text": text,
        "link": link,
        "button_title": BUTTON_TITLE,
    })
    .to_string()
}

/// Renew only on 401, and only when there is something to renew with
pub fn should_refresh(status: StatusCode, has_refresh_token: bool) -> bool {
    status == StatusCode::UNAUTHORIZED && has_refresh_token
}

/// Pull `access_token` out of the OAuth token response
pub fn parse_token_response(body: &serde_json::Value) -> NotificationResult<String> {
    body.get("access_token")
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| NotificationError::SendFailed("token response without access_token".into()))
}

pub struct KakaoNotifier {
    config: KakaoConfig,
    client: reqwest::Client,
    access_token: RwLock<String>,
}

impl KakaoNotifier {
    pub fn new(config: KakaoConfig, client: reqwest::Client) -> Self {
        let access_token = RwLock::new(config.access_token.clone());
        Self {
            config,
            client,
            access_token,
        }
    }

    async fn post_memo(&self, token: &str, text: &str) -> NotificationResult<reqwest::Response> {
        let template = template_object(text, self.config.link_url.as_deref());
        let response = self
            .client
            .post(KAKAO_MEMO_URL)
            .bearer_auth(token)
            .form(&[("template_object", template.as_str())])
            .send()
            .await?;
        Ok(response)
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> NotificationResult<String> {
        let client_id = self.config.rest_api_key.as_deref().unwrap_or_default();
        let response = self
            .client
            .post(KAKAO_TOKEN_URL)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed(format!(
                "token refresh HTTP {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response.json().await?;
        parse_token_response(&body)
    }
}

#[async_trait]
impl Notifier for KakaoNotifier {
    fn name(&self) -> &str {
        "kakao"
    }

    fn is_enabled(&self) -> bool {
        !self.config.access_token.is_empty()
    }

    async fn send(&self, text: &str) -> NotificationResult<()> {
        let token = self.access_token.read().await.clone();
        debug!("Sending Kakao memo");
        let mut response = self.post_memo(&token, text).await?;

        let refresh_token = self.config.refresh_token.as_deref();
        if let (true, Some(refresh_token)) = (
            should_refresh(response.status(), refresh_token.is_some()),
            refresh_token,
        ) {
            warn!("Kakao access token rejected, refreshing once");
            let renewed = self.refresh_access_token(refresh_token).await?;
            *self.access_token.write().await = renewed.clone();
            response = self.post_memo(&renewed, text).await?;
            if response.status().is_success() {
                info!("Kakao access token renewed; update KAKAO_ACCESS_TOKEN for the next run");
            }
        }

        let status = response.status();
        if status.is_success() {
            info!("Kakao memo sent");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Kakao rate limited");
            return Err(NotificationError::RateLimited(60));
        }

        error!(status = %status, body = %body, "Kakao send failed");
        Err(NotificationError::SendFailed(format!("HTTP {}: {}", status, body)))
    }
}
