// src/pipeline/resolve.rs

//! Brewery URL resolution stage.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AliasTable, Config, Roster, RunStats};
use crate::services::{HttpFetcher, NameResolver, session};
use crate::storage::TableStorage;
use crate::utils::http::{Pacer, create_default_client};
use crate::utils::log;

/// Resolved URL per distinct roster name.
pub type UrlCache = HashMap<String, Option<String>>;

/// Resolve every distinct name in `roster`, in roster order.
///
/// Repeated names reuse the first result without another search.
pub async fn resolve_roster(
    resolver: &NameResolver<'_>,
    roster: &Roster,
    show_progress: bool,
) -> Result<(UrlCache, RunStats)> {
    let mut stats = RunStats::begin("resolve");
    let mut cache = UrlCache::new();

    for name in roster.names() {
        if cache.contains_key(name) {
            continue;
        }
        stats.total += 1;

        let url = resolver.resolve(name).await?;
        match &url {
            Some(url) => {
                stats.succeeded += 1;
                if show_progress {
                    log::sub_item(&format!("{} -> {}", name, url));
                }
            }
            None => {
                stats.failed.push(name.to_string());
                log::sub_item(&format!("{} -> no match", name));
            }
        }
        cache.insert(name.to_string(), url);
    }

    Ok((cache, stats.finish()))
}

/// Run the resolve stage: log in, resolve the roster, write the URL column back.
pub async fn run_resolver(config: &Config, storage: &dyn TableStorage) -> Result<RunStats> {
    log::header("Resolving brewery URLs");

    let mut roster = storage
        .load_roster(&config.paths.roster, &config.roster)
        .await?;
    log::info(&format!("Loaded {} breweries", roster.len()));

    let client = create_default_client(&config.crawler)?;
    let pacer = Arc::new(Pacer::from_millis(config.crawler.search_delay_ms));
    let fetcher = HttpFetcher::new(client, pacer);

    log::step(1, 3, "Logging in");
    match storage.load_credentials(&config.paths.credentials).await {
        Ok(credentials) => {
            if let Err(e) =
                session::login(&fetcher, &config.site, &config.selectors, &credentials).await
            {
                log::warn(&format!("{}; searching without a session", e));
            }
        }
        Err(e) => log::warn(&format!(
            "No usable credentials ({}); searching without a session",
            e
        )),
    }

    log::step(2, 3, "Searching");
    let resolver = NameResolver::new(
        &fetcher,
        &config.site,
        &config.selectors,
        AliasTable::new(&config.aliases),
    )?;
    let (urls, stats) = resolve_roster(&resolver, &roster, config.logging.show_progress).await?;

    log::step(3, 3, "Saving roster");
    roster.set_urls(&config.roster.url_column, &urls);
    storage.save_roster(&config.paths.roster, &roster).await?;
    storage.save_stats(&config.paths.stats, &stats).await?;

    log::summary(
        "Resolve",
        &[
            ("Names", stats.total.to_string()),
            ("Resolved", stats.succeeded.to_string()),
            ("No match", stats.failed.len().to_string()),
        ],
    );
    log::success(&format!("Roster saved to {}", config.paths.roster));

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RosterConfig, SelectorConfig, SiteConfig};
    use crate::services::fetcher::testing::StaticFetcher;
    use crate::utils::url::search_url;

    fn search(term: &str) -> String {
        search_url(&SiteConfig::default(), term).unwrap().to_string()
    }

    fn hit(href: &str) -> String {
        format!(r#"<div class="results-container"><p class="name"><a href="{href}">x</a></p></div>"#)
    }

    fn roster(names: &[&str]) -> Roster {
        Roster::new(
            vec!["brewery".to_string()],
            names.iter().map(|n| vec![n.to_string()]).collect(),
            &RosterConfig::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_roster_searches_each_name_once() {
        let fetcher = StaticFetcher::new()
            .with_page(search("Half Acre"), hit("/HalfAcreBeer"))
            .with_page(search("Metropolitan"), hit("/w/metropolitan/1"));
        let site = SiteConfig::default();
        let resolver =
            NameResolver::new(&fetcher, &site, &SelectorConfig::default(), AliasTable::default())
                .unwrap();

        let (urls, stats) = resolve_roster(
            &resolver,
            &roster(&["Half Acre", "Metropolitan", "Half Acre"]),
            true,
        )
        .await
        .unwrap();

        assert_eq!(fetcher.requests().len(), 2);
        assert_eq!(
            urls["Half Acre"].as_deref(),
            Some("https://untappd.com/HalfAcreBeer")
        );
        assert_eq!(stats.total, 2);
        assert_eq!(stats.succeeded, 2);
    }

    #[tokio::test]
    async fn test_resolve_roster_records_unmatched_names() {
        let fetcher = StaticFetcher::new();
        let site = SiteConfig::default();
        let resolver =
            NameResolver::new(&fetcher, &site, &SelectorConfig::default(), AliasTable::default())
                .unwrap();

        let (urls, stats) = resolve_roster(&resolver, &roster(&["Ghost Brewing"]), false)
            .await
            .unwrap();

        assert_eq!(urls["Ghost Brewing"], None);
        assert_eq!(stats.failed, vec!["Ghost Brewing".to_string()]);
        assert_eq!(stats.succeeded, 0);
    }
}
