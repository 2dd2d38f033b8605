//! Brewery name resolution.
//!
//! Maps a roster name to the brewery's page URL by searching the site. When
//! a search finds nothing, the query loses its last word and is retried,
//! down to a single word.

use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::{AliasTable, SelectorConfig, SiteConfig, parse_selector};
use crate::services::PageFetcher;
use crate::utils::url::{resolve_url, search_url};

/// Drop any suffix after a dash-like separator and trim.
///
/// Roster names carry location suffixes such as `Revolution Brewing – Brewpub`.
pub fn normalize_name(name: &str) -> &str {
    name.split(|c: char| c == '–' || c == '—')
        .next()
        .unwrap_or("")
        .trim()
}

/// Search terms to try for `name`, longest first, each one word shorter.
pub fn shortened_queries(name: &str) -> Vec<String> {
    let words: Vec<&str> = normalize_name(name).split_whitespace().collect();
    (1..=words.len())
        .rev()
        .map(|n| words[..n].join(" "))
        .collect()
}

/// Resolves brewery names through the site search.
pub struct NameResolver<'a> {
    fetcher: &'a dyn PageFetcher,
    site: &'a SiteConfig,
    aliases: AliasTable,
    container: Selector,
    result_name: Selector,
    result_link: Selector,
}

impl<'a> NameResolver<'a> {
    /// Create a resolver; fails only if a configured selector does not compile.
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        site: &'a SiteConfig,
        selectors: &SelectorConfig,
        aliases: AliasTable,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            site,
            aliases,
            container: parse_selector(&selectors.results_container)?,
            result_name: parse_selector(&selectors.result_name)?,
            result_link: parse_selector(&selectors.result_link)?,
        })
    }

    /// Resolve `name` to an absolute brewery page URL.
    ///
    /// `Ok(None)` means no match: the alias table marks the brewery as absent,
    /// the name is empty, or every shortened query came back without a result.
    /// A failed request or a results page without the expected markup only
    /// moves on to the next, shorter query. `Err` is reserved for a base URL
    /// that does not parse.
    pub async fn resolve(&self, name: &str) -> Result<Option<String>> {
        let Some(term) = self.aliases.search_term(name) else {
            log::debug!("'{}' is listed as absent from the site", name);
            return Ok(None);
        };
        if term != name {
            log::debug!("Searching '{}' as '{}'", name, term);
        }

        let base = self.site.base()?;
        for query in shortened_queries(term) {
            let url = search_url(self.site, &query)?;
            let body = match self.fetcher.fetch(url.as_str()).await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Search for '{}' failed: {}", query, e);
                    continue;
                }
            };

            match self.top_result(&body) {
                Some(href) => return Ok(Some(resolve_url(&base, &href))),
                None => log::debug!("No search result for '{}'", query),
            }
        }

        Ok(None)
    }

    /// Link of the first search result, if the page has one.
    fn top_result(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        let container = document.select(&self.container).next()?;
        let name = container.select(&self.result_name).next()?;
        let link = name.select(&self.result_link).next()?;
        link.value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(String::from)
    }
}
