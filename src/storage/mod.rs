//! Storage abstractions for roster and result tables.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Scraper configuration
//! ├── credentials.toml      # Site login
//! ├── breweries.csv         # Roster (URL column written by `resolve`)
//! ├── brewery_ratings.csv   # Aggregate ratings per brewery page
//! ├── beers.csv             # Ranked popular beers per brewery
//! └── stats.json            # Last run summary
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{BeerRecord, BreweryRating, Credentials, Roster, RosterConfig, RunStats};

pub use local::LocalStorage;

/// Trait for table storage backends. Keys are paths relative to the backend root.
#[async_trait]
pub trait TableStorage: Send + Sync {
    /// Load the roster table, locating the configured columns.
    async fn load_roster(&self, key: &str, columns: &RosterConfig) -> Result<Roster>;

    /// Write the roster back, all columns included.
    async fn save_roster(&self, key: &str, roster: &Roster) -> Result<()>;

    async fn load_credentials(&self, key: &str) -> Result<Credentials>;

    async fn save_ratings(&self, key: &str, ratings: &[BreweryRating]) -> Result<()>;

    async fn save_beers(&self, key: &str, beers: &[BeerRecord]) -> Result<()>;

    /// Write a run summary for inspection.
    async fn save_stats(&self, key: &str, stats: &RunStats) -> Result<()>;
}
