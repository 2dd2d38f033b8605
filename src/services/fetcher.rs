//! Page fetching.
//!
//! `PageFetcher` is the seam between the scraping services and the network.
//! Implementations return the body of a validated HTML response; callers
//! parse it with `scraper::Html` where they need it.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::http::Pacer;

/// Source of HTML pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return its body if the response is an HTML page.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `PageFetcher` backed by a reqwest client, paced between requests.
///
/// Fetchers sharing one `Pacer` keep the interval between each other's
/// requests too.
pub struct HttpFetcher {
    client: Client,
    pacer: Arc<Pacer>,
}

impl HttpFetcher {
    pub fn new(client: Client, pacer: Arc<Pacer>) -> Self {
        Self { client, pacer }
    }

    /// POST a form through the same session and pacing as `fetch`.
    pub async fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<Response> {
        self.pacer.wait().await;
        log::debug!("POST {}", url);
        Ok(self.client.post(url).form(form).send().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pacer.wait().await;
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !is_html_response(status, &content_type) {
            return Err(AppError::NonHtml {
                url: url.to_string(),
                status: status.as_u16(),
                content_type,
            });
        }

        Ok(response.text().await?)
    }
}

/// A response is usable when it is a 200 with an HTML content type.
fn is_html_response(status: StatusCode, content_type: &str) -> bool {
    status == StatusCode::OK && content_type.contains("html")
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory fetcher that records every requested URL.
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
            self.pages.insert(url.into(), body.into());
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| AppError::NonHtml {
                url: url.to_string(),
                status: 404,
                content_type: "text/html".to_string(),
            })
        }
    }
}
