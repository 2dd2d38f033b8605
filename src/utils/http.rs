// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
///
/// The client keeps cookies so a login carries over to later requests.
pub fn create_client(config: &CrawlerConfig, user_agent: &str) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

/// Client for first-pass requests.
pub fn create_default_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    create_client(config, &config.user_agent)
}

/// Distinct session presenting a browser User-Agent, for the second pass.
pub fn create_fallback_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    create_client(config, &config.fallback_user_agent)
}

/// Enforces a fixed minimum interval between outbound requests.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Mutex::new(None),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Wait until the interval since the previous request has elapsed.
    ///
    /// The first call returns immediately.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            let next = prev + self.interval;
            if next > Instant::now() {
                tokio::time::sleep_until(next).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_request_is_not_delayed() {
        let pacer = Pacer::from_millis(5000);
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_requests_are_spaced() {
        let pacer = Pacer::from_millis(1000);
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[test]
    fn clients_build_with_both_user_agents() {
        let config = CrawlerConfig::default();
        assert!(create_default_client(&config).is_ok());
        assert!(create_fallback_client(&config).is_ok());
    }
}
