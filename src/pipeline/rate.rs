// src/pipeline/rate.rs

//! Rating extraction stage.
//!
//! Visits each distinct resolved brewery page once. Pages that fail are
//! tried one more time through a separate session presenting a browser
//! User-Agent; whatever still fails is reported and left out of the tables.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{BeerRecord, BreweryRating, Config, RunStats};
use crate::services::{HttpFetcher, RatingExtractor};
use crate::storage::TableStorage;
use crate::utils::http::{Pacer, create_default_client, create_fallback_client};
use crate::utils::log;

/// Which tables a rate run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTarget {
    Ratings,
    Beers,
    Both,
}

impl RateTarget {
    fn stage(self) -> &'static str {
        match self {
            Self::Ratings => "ratings",
            Self::Beers => "beers",
            Self::Both => "rate",
        }
    }

    fn includes_ratings(self) -> bool {
        matches!(self, Self::Ratings | Self::Both)
    }

    fn includes_beers(self) -> bool {
        matches!(self, Self::Beers | Self::Both)
    }
}

/// Tables and counters from one rate run.
#[derive(Debug)]
pub struct RateOutcome {
    pub ratings: Vec<BreweryRating>,
    pub beers: Vec<BeerRecord>,
    pub stats: RunStats,
}

/// What one brewery page has yielded so far.
#[derive(Debug, Default)]
struct PageResult {
    rating: Option<BreweryRating>,
    beers: Option<Vec<BeerRecord>>,
}

impl PageResult {
    fn needs_rating(&self, target: RateTarget) -> bool {
        target.includes_ratings() && self.rating.is_none()
    }

    fn needs_beers(&self, target: RateTarget) -> bool {
        target.includes_beers() && self.beers.is_none()
    }

    fn is_complete(&self, target: RateTarget) -> bool {
        !self.needs_rating(target) && !self.needs_beers(target)
    }

    fn keep_rating(&mut self, rating: Result<BreweryRating>, errors: &mut Vec<AppError>) {
        match rating {
            Ok(rating) => self.rating = Some(rating),
            Err(e) => errors.push(e),
        }
    }

    fn keep_beers(&mut self, beers: Result<Vec<BeerRecord>>, errors: &mut Vec<AppError>) {
        match beers {
            Ok(beers) => self.beers = Some(beers),
            Err(e) => errors.push(e),
        }
    }
}

/// Fill in whichever tables `page` still lacks; returns what went wrong.
///
/// When both tables are missing the page is fetched once.
async fn scrape(
    extractor: &RatingExtractor<'_>,
    url: &str,
    target: RateTarget,
    page: &mut PageResult,
) -> Vec<AppError> {
    let mut errors = Vec::new();
    match (page.needs_rating(target), page.needs_beers(target)) {
        (true, true) => match extractor.extract(url).await {
            Ok(extract) => {
                page.keep_rating(extract.rating, &mut errors);
                page.keep_beers(extract.beers, &mut errors);
            }
            Err(e) => errors.push(e),
        },
        (true, false) => {
            let rating = extractor.extract_aggregate(url).await;
            page.keep_rating(rating, &mut errors);
        }
        (false, true) => {
            let beers = extractor.extract_beer_list(Some(url)).await;
            page.keep_beers(beers, &mut errors);
        }
        (false, false) => {}
    }
    errors
}

fn report(url: &str, page: &PageResult, show_progress: bool) {
    if !show_progress {
        return;
    }
    let listed = page.beers.as_ref().map_or(0, Vec::len);
    match &page.rating {
        Some(rating) => log::sub_item(&format!(
            "{} ({}, {} raters, {} beers; {} listed)",
            url,
            rating
                .average_rating
                .map_or_else(|| "N/A".to_string(), |r| format!("{:.2}", r)),
            rating.rater_count,
            rating.beer_count,
            listed
        )),
        None => log::sub_item(&format!("{} ({} listed)", url, listed)),
    }
}

/// Extract `urls` with `primary`, then retry failures once with `fallback`.
///
/// Each table is kept or failed on its own: a page whose aggregate parses
/// but whose listing does not still contributes its rating row, and only
/// the missing table is retried. Output rows follow the order of `urls`
/// regardless of which pass produced them.
pub async fn rate_urls(
    primary: &RatingExtractor<'_>,
    fallback: Option<&RatingExtractor<'_>>,
    urls: &[String],
    target: RateTarget,
    show_progress: bool,
) -> RateOutcome {
    let mut stats = RunStats::begin(target.stage());
    stats.total = urls.len();

    let mut results: HashMap<&str, PageResult> = HashMap::new();
    let mut failed = Vec::new();

    for url in urls {
        let page = results.entry(url.as_str()).or_default();
        let errors = scrape(primary, url, target, page).await;
        for e in &errors {
            log::warn(&format!("{}: {}", url, e));
        }
        if page.is_complete(target) {
            report(url, page, show_progress);
        } else {
            failed.push(url.as_str());
        }
    }

    if let Some(fallback) = fallback {
        if !failed.is_empty() {
            log::info(&format!("Retrying {} pages with a browser session", failed.len()));
            let mut still_failing = Vec::new();
            for url in failed {
                let page = results.entry(url).or_default();
                let errors = scrape(fallback, url, target, page).await;
                for e in &errors {
                    log::warn(&format!("{}: {} (after retry)", url, e));
                }
                if page.is_complete(target) {
                    report(url, page, show_progress);
                    stats.recovered += 1;
                } else {
                    still_failing.push(url);
                }
            }
            failed = still_failing;
        }
    }

    let mut ratings = Vec::new();
    let mut beers = Vec::new();
    for url in urls {
        if let Some(page) = results.remove(url.as_str()) {
            ratings.extend(page.rating);
            beers.extend(page.beers.into_iter().flatten());
        }
    }

    stats.succeeded = urls.len() - failed.len();
    stats.failed = failed.into_iter().map(String::from).collect();

    RateOutcome {
        ratings,
        beers,
        stats: stats.finish(),
    }
}

async fn run_rate_stage(
    config: &Config,
    storage: &dyn TableStorage,
    target: RateTarget,
) -> Result<RunStats> {
    log::header(&format!("Extracting {}", target.stage()));

    let roster = storage
        .load_roster(&config.paths.roster, &config.roster)
        .await?;
    let urls = roster.unique_urls();
    log::info(&format!(
        "{} distinct brewery pages in {} roster rows",
        urls.len(),
        roster.len()
    ));

    let pacer = Arc::new(Pacer::from_millis(config.crawler.page_delay_ms));
    let primary_fetcher = HttpFetcher::new(create_default_client(&config.crawler)?, pacer.clone());
    let primary = RatingExtractor::new(&primary_fetcher, &config.site, &config.selectors)?;

    let fallback_fetcher = if config.crawler.retry_failed {
        Some(HttpFetcher::new(
            create_fallback_client(&config.crawler)?,
            pacer,
        ))
    } else {
        None
    };
    let fallback = fallback_fetcher
        .as_ref()
        .map(|f| RatingExtractor::new(f, &config.site, &config.selectors))
        .transpose()?;

    let outcome = rate_urls(
        &primary,
        fallback.as_ref(),
        &urls,
        target,
        config.logging.show_progress,
    )
    .await;

    if target.includes_ratings() {
        storage
            .save_ratings(&config.paths.ratings, &outcome.ratings)
            .await?;
    }
    if target.includes_beers() {
        storage.save_beers(&config.paths.beers, &outcome.beers).await?;
    }
    storage.save_stats(&config.paths.stats, &outcome.stats).await?;

    let stats = outcome.stats;
    log::summary(
        target.stage(),
        &[
            ("Pages", stats.total.to_string()),
            ("Succeeded", stats.succeeded.to_string()),
            ("Recovered on retry", stats.recovered.to_string()),
            ("Failed", stats.failed.len().to_string()),
            ("Success rate", format!("{:.1}%", stats.success_rate() * 100.0)),
            ("Beers", outcome.beers.len().to_string()),
        ],
    );
    for url in &stats.failed {
        log::sub_item(&format!("failed: {}", url));
    }

    Ok(stats)
}

/// Extract aggregate ratings for every resolved brewery.
pub async fn run_ratings(config: &Config, storage: &dyn TableStorage) -> Result<RunStats> {
    run_rate_stage(config, storage, RateTarget::Ratings).await
}

/// Extract ranked beer listings for every resolved brewery.
pub async fn run_beers(config: &Config, storage: &dyn TableStorage) -> Result<RunStats> {
    run_rate_stage(config, storage, RateTarget::Beers).await
}

/// Extract both tables with one page visit per brewery.
pub async fn run_rate(config: &Config, storage: &dyn TableStorage) -> Result<RunStats> {
    run_rate_stage(config, storage, RateTarget::Both).await
}
