//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Alias;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client and pacing settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Target site endpoints
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for the site's markup
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Table locations, relative to the storage directory
    #[serde(default)]
    pub paths: PathsConfig,

    /// Roster column names
    #[serde(default)]
    pub roster: RosterConfig,

    /// Logging behavior
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Brewery names that need a different search term (blank = not on the site)
    #[serde(default = "defaults::aliases")]
    pub aliases: Vec<Alias>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.fallback_user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.fallback_user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        self.site.base()?;
        self.selectors.check()?;
        if self.roster.name_column.trim().is_empty() {
            return Err(AppError::validation("roster.name_column is empty"));
        }
        if self.roster.url_column.trim().is_empty() {
            return Err(AppError::validation("roster.url_column is empty"));
        }
        if self.roster.name_column == self.roster.url_column {
            return Err(AppError::validation(
                "roster.name_column and roster.url_column must differ",
            ));
        }

        let mut seen = HashSet::new();
        for alias in &self.aliases {
            if !seen.insert(alias.name.as_str()) {
                return Err(AppError::validation(format!(
                    "Duplicate alias for '{}'",
                    alias.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            site: SiteConfig::default(),
            selectors: SelectorConfig::default(),
            paths: PathsConfig::default(),
            roster: RosterConfig::default(),
            logging: LoggingConfig::default(),
            aliases: defaults::aliases(),
        }
    }
}

/// HTTP client and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for first-pass requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Browser User-Agent used by the second-pass session
    #[serde(default = "defaults::fallback_user_agent")]
    pub fallback_user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum interval between search requests in milliseconds
    #[serde(default = "defaults::search_delay")]
    pub search_delay_ms: u64,

    /// Minimum interval between brewery page requests in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Run one more pass over failed pages with the fallback session
    #[serde(default = "defaults::retry_failed")]
    pub retry_failed: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            fallback_user_agent: defaults::fallback_user_agent(),
            timeout_secs: defaults::timeout(),
            search_delay_ms: defaults::search_delay(),
            page_delay_ms: defaults::page_delay(),
            retry_failed: defaults::retry_failed(),
        }
    }
}

/// Target site endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site root, e.g. `https://untappd.com`
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Search endpoint path
    #[serde(default = "defaults::search_path")]
    pub search_path: String,

    /// Value of the search `type` parameter
    #[serde(default = "defaults::search_type")]
    pub search_type: String,

    /// Login page path (GET for the form, POST to submit)
    #[serde(default = "defaults::login_path")]
    pub login_path: String,

    /// Suffix appended to a brewery URL to reach its beer listing
    #[serde(default = "defaults::beer_path")]
    pub beer_path: String,
}

impl SiteConfig {
    /// Parse the base URL.
    pub fn base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            AppError::validation(format!("site.base_url '{}' is invalid: {}", self.base_url, e))
        })
    }

    /// Absolute URL of the login page.
    pub fn login_url(&self) -> Result<Url> {
        Ok(self.base()?.join(&self.login_path)?)
    }

    /// Beer listing URL for a brewery page.
    pub fn beer_url(&self, brewery_url: &str) -> String {
        format!("{}{}", brewery_url.trim_end_matches('/'), self.beer_path)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            search_path: defaults::search_path(),
            search_type: defaults::search_type(),
            login_path: defaults::login_path(),
            beer_path: defaults::beer_path(),
        }
    }
}

/// CSS selectors describing the site's markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub results_container: String,
    pub result_name: String,
    pub result_link: String,
    pub session_key: String,
    pub aggregate_rating: String,
    pub aggregate_rating_value: String,
    pub aggregate_raters: String,
    pub aggregate_beer_count: String,
    pub beer_details: String,
    pub beer_stats: String,
    pub beer_name: String,
    pub beer_style: String,
    pub beer_abv: String,
    pub beer_ibu: String,
    pub beer_rating: String,
    pub beer_raters: String,
}

impl SelectorConfig {
    fn all(&self) -> [&str; 16] {
        [
            self.results_container.as_str(),
            self.result_name.as_str(),
            self.result_link.as_str(),
            self.session_key.as_str(),
            self.aggregate_rating.as_str(),
            self.aggregate_rating_value.as_str(),
            self.aggregate_raters.as_str(),
            self.aggregate_beer_count.as_str(),
            self.beer_details.as_str(),
            self.beer_stats.as_str(),
            self.beer_name.as_str(),
            self.beer_style.as_str(),
            self.beer_abv.as_str(),
            self.beer_ibu.as_str(),
            self.beer_rating.as_str(),
            self.beer_raters.as_str(),
        ]
    }

    /// Check that every selector compiles.
    fn check(&self) -> Result<()> {
        for s in self.all() {
            parse_selector(s)?;
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            results_container: "div.results-container".into(),
            result_name: "p.name".into(),
            result_link: "a".into(),
            session_key: "form input[name=\"session_key\"]".into(),
            aggregate_rating: "p.rating".into(),
            aggregate_rating_value: "span.num".into(),
            aggregate_raters: "p.raters".into(),
            aggregate_beer_count: "p.count".into(),
            beer_details: "div.beer-details".into(),
            beer_stats: "div.details".into(),
            beer_name: "p.name".into(),
            beer_style: "p.style".into(),
            beer_abv: "p.abv".into(),
            beer_ibu: "p.ibu".into(),
            beer_rating: "p.rating".into(),
            beer_raters: "p.raters".into(),
        }
    }
}

/// Compile a CSS selector, mapping failures to `AppError::Selector`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Table locations, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub roster: String,
    pub credentials: String,
    pub ratings: String,
    pub beers: String,
    pub stats: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            roster: "breweries.csv".into(),
            credentials: "credentials.toml".into(),
            ratings: "brewery_ratings.csv".into(),
            beers: "beers.csv".into(),
            stats: "stats.json".into(),
        }
    }
}

/// Roster column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Column holding the brewery display name
    pub name_column: String,

    /// Column holding the resolved page URL (added if missing)
    pub url_column: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            name_column: "brewery".into(),
            url_column: "untappd_url".into(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log one line per roster entry
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            show_progress: true,
        }
    }
}

mod defaults {
    use super::Alias;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; brewmap/0.1)".into()
    }
    pub fn fallback_user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_4) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/66.0.3359.139 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn search_delay() -> u64 {
        1000
    }
    pub fn page_delay() -> u64 {
        5000
    }
    pub fn retry_failed() -> bool {
        true
    }

    // Site defaults
    pub fn base_url() -> String {
        "https://untappd.com".into()
    }
    pub fn search_path() -> String {
        "/search".into()
    }
    pub fn search_type() -> String {
        "brewery".into()
    }
    pub fn login_path() -> String {
        "/login".into()
    }
    pub fn beer_path() -> String {
        "/beer".into()
    }

    // Known search exceptions
    pub fn aliases() -> Vec<Alias> {
        [
            ("Aleman", "Aleman Brewing"),
            ("Bixi Brewery", ""),
            ("Crown Brewing", "Crown Brewing Company"),
            ("Englewood Brews", ""),
            ("FIBS Brewing", ""),
            ("Lake Effect Brewing Co.", "Lake Effect Brewing"),
            ("McHenry Brewing Company", "Chain O'Lakes Brewing Company"),
            ("Oak Park Brewing Co.", "Oak Park Brewing Company (IL)"),
            ("Strike Ten Brewing Co.", ""),
            ("Scallywag Brewing", ""),
            ("Whiner Brewery", ""),
        ]
        .into_iter()
        .map(|(name, search)| Alias::new(name, search))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.selectors.beer_abv = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_alias() {
        let mut config = Config::default();
        config.aliases.push(Alias::new("Crown Brewing", "Crown"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_same_columns() {
        let mut config = Config::default();
        config.roster.url_column = config.roster.name_column.clone();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [crawler]
            page_delay_ms = 0

            [site]
            base_url = "http://127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.crawler.page_delay_ms, 0);
        assert_eq!(config.crawler.search_delay_ms, 1000);
        assert_eq!(config.site.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.site.search_path, "/search");
        assert_eq!(config.roster.name_column, "brewery");
        assert_eq!(config.aliases.len(), 11);
    }

    #[test]
    fn explicit_empty_aliases_override_defaults() {
        let config: Config = toml::from_str("aliases = []").unwrap();
        assert!(config.aliases.is_empty());
    }

    #[test]
    fn beer_url_appends_suffix_once() {
        let site = SiteConfig::default();
        assert_eq!(
            site.beer_url("https://untappd.com/HalfAcreBeerCompany/"),
            "https://untappd.com/HalfAcreBeerCompany/beer"
        );
        assert_eq!(
            site.beer_url("https://untappd.com/HalfAcreBeerCompany"),
            "https://untappd.com/HalfAcreBeerCompany/beer"
        );
    }

    #[test]
    fn login_url_joins_base() {
        let site = SiteConfig::default();
        assert_eq!(
            site.login_url().unwrap().as_str(),
            "https://untappd.com/login"
        );
    }
}
