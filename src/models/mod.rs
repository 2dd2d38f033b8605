// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod alias;
mod beer;
mod brewery;
mod config;
mod credentials;
mod stats;

// Re-export all public types
pub use alias::{Alias, AliasTable};
pub use beer::{BeerRecord, BeerStats, rank_beers};
pub use brewery::{BreweryRating, BreweryRecord, Roster};
pub use config::{
    Config, CrawlerConfig, LoggingConfig, PathsConfig, RosterConfig, SelectorConfig, SiteConfig,
    parse_selector,
};
pub use credentials::Credentials;
pub use stats::RunStats;

/// Hard cap on beers per brewery; the listing page shows at most this many.
pub const MAX_BEERS_PER_BREWERY: usize = 25;
