//! Rating extraction from a brewery's beer page.
//!
//! One page (`{brewery}/beer`) carries both the brewery's aggregate figures
//! and its listing of most popular beers.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    BeerRecord, BeerStats, BreweryRating, MAX_BEERS_PER_BREWERY, SelectorConfig, SiteConfig,
    parse_selector, rank_beers,
};
use crate::services::{PageFetcher, fields};
use crate::utils::normalize_whitespace;

struct AggregateSelectors {
    rating: Selector,
    rating_value: Selector,
    raters: Selector,
    beer_count: Selector,
}

struct ListingSelectors {
    details: Selector,
    stats: Selector,
    name: Selector,
    style: Selector,
    abv: Selector,
    ibu: Selector,
    rating: Selector,
    raters: Selector,
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Both tables read from one fetch of a beer page.
///
/// The aggregate and the listing parse independently, so a malformed beer
/// entry does not cost the brewery its rating row, and the reverse.
#[derive(Debug)]
pub struct PageExtract {
    pub rating: Result<BreweryRating>,
    pub beers: Result<Vec<BeerRecord>>,
}

/// Extracts aggregate ratings and beer listings.
pub struct RatingExtractor<'a> {
    fetcher: &'a dyn PageFetcher,
    site: &'a SiteConfig,
    aggregate: AggregateSelectors,
    listing: ListingSelectors,
}

impl<'a> RatingExtractor<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        site: &'a SiteConfig,
        selectors: &SelectorConfig,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            site,
            aggregate: AggregateSelectors {
                rating: parse_selector(&selectors.aggregate_rating)?,
                rating_value: parse_selector(&selectors.aggregate_rating_value)?,
                raters: parse_selector(&selectors.aggregate_raters)?,
                beer_count: parse_selector(&selectors.aggregate_beer_count)?,
            },
            listing: ListingSelectors {
                details: parse_selector(&selectors.beer_details)?,
                stats: parse_selector(&selectors.beer_stats)?,
                name: parse_selector(&selectors.beer_name)?,
                style: parse_selector(&selectors.beer_style)?,
                abv: parse_selector(&selectors.beer_abv)?,
                ibu: parse_selector(&selectors.beer_ibu)?,
                rating: parse_selector(&selectors.beer_rating)?,
                raters: parse_selector(&selectors.beer_raters)?,
            },
        })
    }

    /// Fetch the aggregate rating triple for a brewery page URL.
    pub async fn extract_aggregate(&self, url: &str) -> Result<BreweryRating> {
        let page = self.site.beer_url(url);
        let body = self.fetcher.fetch(&page).await?;
        self.parse_aggregate(&body, url, &page)
    }

    /// Fetch the ranked popular-beer listing for a brewery page URL.
    ///
    /// A missing or empty URL yields an empty list without a request.
    pub async fn extract_beer_list(&self, url: Option<&str>) -> Result<Vec<BeerRecord>> {
        let Some(url) = url.map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(Vec::new());
        };
        let page = self.site.beer_url(url);
        let body = self.fetcher.fetch(&page).await?;
        let listing = self.parse_beer_list(&body, &page)?;
        Ok(rank_beers(url, listing))
    }

    /// Both extractions from a single fetch of the beer page.
    ///
    /// `Err` means the page itself could not be fetched.
    pub async fn extract(&self, url: &str) -> Result<PageExtract> {
        let page = self.site.beer_url(url);
        let body = self.fetcher.fetch(&page).await?;
        Ok(PageExtract {
            rating: self.parse_aggregate(&body, url, &page),
            beers: self
                .parse_beer_list(&body, &page)
                .map(|listing| rank_beers(url, listing)),
        })
    }

    /// Parse the aggregate figures; `context` names the page in errors.
    pub fn parse_aggregate(&self, body: &str, url: &str, context: &str) -> Result<BreweryRating> {
        let document = Html::parse_document(body);
        let sel = &self.aggregate;

        let rating_text = document
            .select(&sel.rating)
            .next()
            .and_then(|p| p.select(&sel.rating_value).next())
            .map(text_of)
            .ok_or_else(|| AppError::absent(context, "aggregate rating"))?;
        let raters_text = document
            .select(&sel.raters)
            .next()
            .map(text_of)
            .ok_or_else(|| AppError::absent(context, "rater count"))?;
        let beers_text = document
            .select(&sel.beer_count)
            .next()
            .map(text_of)
            .ok_or_else(|| AppError::absent(context, "beer count"))?;

        Ok(BreweryRating {
            url: url.to_string(),
            average_rating: fields::aggregate_rating(&rating_text)?,
            rater_count: fields::count("raters", &raters_text)?,
            beer_count: fields::count("beers", &beers_text)?,
        })
    }

    /// Parse up to 25 listing entries in page order.
    ///
    /// The first stats block on the page belongs to the brewery header, so
    /// stats blocks are paired with name blocks starting from the second.
    pub fn parse_beer_list(&self, body: &str, context: &str) -> Result<Vec<BeerStats>> {
        let document = Html::parse_document(body);
        let details = document.select(&self.listing.details);
        let stats = document.select(&self.listing.stats).skip(1);

        details
            .zip(stats)
            .take(MAX_BEERS_PER_BREWERY)
            .map(|(details, stats)| self.parse_beer(details, stats, context))
            .collect()
    }

    fn parse_beer(
        &self,
        details: ElementRef<'_>,
        stats: ElementRef<'_>,
        context: &str,
    ) -> Result<BeerStats> {
        let sel = &self.listing;
        let name = details
            .select(&sel.name)
            .next()
            .map(text_of)
            .ok_or_else(|| AppError::absent(context, "beer name"))?;
        let style = details
            .select(&sel.style)
            .next()
            .map(text_of)
            .ok_or_else(|| AppError::absent(context, "beer style"))?;

        let stat = |selector: &Selector| stats.select(selector).next().map(text_of);

        Ok(BeerStats {
            name: normalize_whitespace(&name),
            style: normalize_whitespace(&style),
            abv: stat(&sel.abv).as_deref().and_then(fields::abv),
            ibu: stat(&sel.ibu).as_deref().and_then(fields::ibu),
            rating: stat(&sel.rating).as_deref().and_then(fields::rating),
            rater_count: stat(&sel.raters).as_deref().and_then(fields::raters),
        })
    }
}
