//! Report delivery channels
//!
//! A `Notifier` pushes one rendered report somewhere. Delivery failures are
//! reported per channel and never abort the remaining channels.

mod kakao;
mod telegram;

pub use kakao::{KakaoConfig, KakaoNotifier};
pub use telegram::{TelegramConfig, TelegramNotifier};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("invalid notifier config: {0}")]
    InvalidConfig(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn is_enabled(&self) -> bool;

    /// Deliver one plain-text message
    async fn send(&self, text: &str) -> NotificationResult<()>;
}

/// Writes the report to stdout; used for dry runs
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "console"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, text: &str) -> NotificationResult<()> {
        println!("{}", text);
        Ok(())
    }
}

/// Chat channels a report can be pushed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Kakao,
    Telegram,
}

/// Channels named by the report flags; Kakao when none is named
pub fn requested_channels(kakao: bool, telegram: bool, all: bool) -> Vec<Channel> {
    let mut channels = Vec::new();
    if all || kakao || !telegram {
        channels.push(Channel::Kakao);
    }
    if all || telegram {
        channels.push(Channel::Telegram);
    }
    channels
}

/// Send `text` through every enabled notifier.
///
/// Returns the number of successful deliveries.
pub async fn notify_all(notifiers: &[Box<dyn Notifier>], text: &str) -> usize {
    let mut delivered = 0;
    for notifier in notifiers {
        if !notifier.is_enabled() {
            debug!(notifier = notifier.name(), "Notifier disabled, skipping");
            continue;
        }
        match notifier.send(text).await {
            Ok(()) => {
                delivered += 1;
                info!(notifier = notifier.name(), "Report delivered");
            }
            Err(e) => {
                warn!(notifier = notifier.name(), error = %e, "Report delivery failed");
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        enabled: bool,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Notifier for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn send(&self, _text: &str) -> NotificationResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotificationError::SendFailed("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn failures_do_not_stop_other_channels() {
        let calls = Arc::new(AtomicUsize::new(0));
        let notifiers: Vec<Box<dyn Notifier>> = vec![
            Box::new(Counting { enabled: true, fail: true, calls: calls.clone() }),
            Box::new(Counting { enabled: false, fail: false, calls: calls.clone() }),
            Box::new(Counting { enabled: true, fail: false, calls: calls.clone() }),
        ];

        let delivered = notify_all(&notifiers, "hello").await;

        assert_eq!(delivered, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn channel_flags() {
        assert_eq!(requested_channels(false, false, false), vec![Channel::Kakao]);
        assert_eq!(requested_channels(true, false, false), vec![Channel::Kakao]);
        assert_eq!(requested_channels(false, true, false), vec![Channel::Telegram]);
        assert_eq!(
            requested_channels(true, true, false),
            vec![Channel::Kakao, Channel::Telegram]
        );
        assert_eq!(
            requested_channels(false, false, true),
            vec![Channel::Kakao, Channel::Telegram]
        );
    }

    #[tokio::test]
    async fn console_always_succeeds() {
        let console = ConsoleNotifier;
        assert!(console.is_enabled());
        assert!(console.send("test").await.is_ok());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            NotificationError::RateLimited(60).to_string(),
            "rate limited, retry after 60s"
        );
    }
}
