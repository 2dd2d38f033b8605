//! Per-beer rating records.

use serde::{Deserialize, Serialize};

/// Fields parsed from one entry of a brewery's beer listing.
#[derive(Debug, Clone, PartialEq)]
pub struct BeerStats {
    pub name: String,
    pub style: String,
    pub abv: Option<f64>,
    pub ibu: Option<f64>,
    pub rating: Option<f64>,
    pub rater_count: Option<u64>,
}

/// A beer row in the output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeerRecord {
    pub name: String,
    pub style: String,
    #[serde(rename = "ABV")]
    pub abv: Option<f64>,
    #[serde(rename = "IBU")]
    pub ibu: Option<f64>,
    pub rating: Option<f64>,
    /// Number of ratings behind `rating`, an integer rather than a float:
    /// the `raters` cell reads `61234`, not `61234.0`. Empty for a placeholder.
    #[serde(rename = "raters")]
    pub rater_count: Option<u64>,
    #[serde(rename = "brewery_URL")]
    pub brewery_url: String,
    /// 1-based position in the site's popularity listing
    #[serde(rename = "rank")]
    pub popularity_rank: u32,
}

impl BeerRecord {
    fn from_stats(stats: BeerStats, brewery_url: &str, popularity_rank: u32) -> Self {
        Self {
            name: stats.name,
            style: stats.style,
            abv: stats.abv,
            ibu: stats.ibu,
            rating: stats.rating,
            rater_count: stats.rater_count,
            brewery_url: brewery_url.to_string(),
            popularity_rank,
        }
    }
}

/// Stamp brewery URL and dense 1-based ranks onto listing entries, in order.
pub fn rank_beers(brewery_url: &str, listing: Vec<BeerStats>) -> Vec<BeerRecord> {
    listing
        .into_iter()
        .zip(1..)
        .map(|(stats, rank)| BeerRecord::from_stats(stats, brewery_url, rank))
        .collect()
}
