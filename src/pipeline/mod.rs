//! Pipeline entry points for scraper operations.
//!
//! - `run_resolver`: Map roster names to brewery page URLs
//! - `run_ratings` / `run_beers` / `run_rate`: Extract ratings from resolved pages

pub mod rate;
pub mod resolve;

pub use rate::{RateOutcome, RateTarget, rate_urls, run_beers, run_rate, run_ratings};
pub use resolve::{UrlCache, resolve_roster, run_resolver};
