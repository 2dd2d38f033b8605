//! Site login.
//!
//! The search endpoint only answers logged-in sessions. Logging in means
//! reading the hidden `session_key` from the login form and posting it back
//! with the credentials; the client's cookie store keeps the session.

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Credentials, SelectorConfig, SiteConfig, parse_selector};
use crate::services::{HttpFetcher, PageFetcher};

/// Read the `value` of the session-key input from a login page.
pub fn extract_session_key(body: &str, selector: &Selector) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(String::from)
}

/// Log `fetcher`'s session into the site.
pub async fn login(
    fetcher: &HttpFetcher,
    site: &SiteConfig,
    selectors: &SelectorConfig,
    credentials: &Credentials,
) -> Result<()> {
    let login_url = site.login_url()?;
    let key_selector = parse_selector(&selectors.session_key)?;

    let body = fetcher.fetch(login_url.as_str()).await?;
    let session_key = extract_session_key(&body, &key_selector)
        .ok_or_else(|| AppError::login("login page has no session key"))?;

    let response = fetcher
        .post_form(
            login_url,
            &[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
                ("session_key", session_key.as_str()),
            ],
        )
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::login(format!("login POST returned {}", status)));
    }

    log::info!("Logged in as {}", credentials.username);
    Ok(())
}
