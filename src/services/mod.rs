//! Service layer for the scraper.
//!
//! This module contains the site-facing logic:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Login (`session`)
//! - Name resolution (`NameResolver`)
//! - Rating extraction (`RatingExtractor`)
//! - Field parsing (`fields`)

pub mod fetcher;
pub mod fields;
mod ratings;
mod resolver;
pub mod session;

pub use fetcher::{HttpFetcher, PageFetcher};
pub use ratings::{PageExtract, RatingExtractor};
pub use resolver::{NameResolver, normalize_name, shortened_queries};
