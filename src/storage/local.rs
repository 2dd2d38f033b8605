//! Local filesystem storage implementation.
//!
//! Tables are CSV with a header row; the run summary is pretty-printed JSON.
//! Every write goes to a temp file first and is renamed into place, so an
//! interrupted run never leaves a half-written roster behind.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{BeerRecord, BreweryRating, Credentials, Roster, RosterConfig, RunStats};
use crate::storage::TableStorage;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn read_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path(key);
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::config(format!("{} not found", path.display()))
            } else {
                AppError::Io(e)
            }
        })
    }

    /// Serialize records as CSV with a header row taken from the field names.
    async fn write_csv<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in records {
            writer.serialize(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))?;
        self.write_bytes(key, &bytes).await?;
        log::info!("Wrote {} rows to {}", records.len(), key);
        Ok(())
    }
}

#[async_trait]
impl TableStorage for LocalStorage {
    async fn load_roster(&self, key: &str, columns: &RosterConfig) -> Result<Roster> {
        let bytes = self.read_bytes(key).await?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(String::from).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;

        let roster = Roster::new(headers, rows, columns)?;
        log::info!("Loaded {} roster rows from {}", roster.len(), key);
        Ok(roster)
    }

    async fn save_roster(&self, key: &str, roster: &Roster) -> Result<()> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(roster.headers())?;
        for row in roster.rows() {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))?;
        self.write_bytes(key, &bytes).await
    }

    async fn load_credentials(&self, key: &str) -> Result<Credentials> {
        let bytes = self.read_bytes(key).await?;
        let content = String::from_utf8(bytes)
            .map_err(|_| AppError::config(format!("{} is not valid UTF-8", key)))?;
        Credentials::parse(&content)
    }

    async fn save_ratings(&self, key: &str, ratings: &[BreweryRating]) -> Result<()> {
        self.write_csv(key, ratings).await
    }

    async fn save_beers(&self, key: &str, beers: &[BeerRecord]) -> Result<()> {
        self.write_csv(key, beers).await
    }

    async fn save_stats(&self, key: &str, stats: &RunStats) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(stats)?;
        self.write_bytes(key, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_bytes_replaces_atomically() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("nested/out.csv", b"a").await.unwrap();
        storage.write_bytes("nested/out.csv", b"b").await.unwrap();

        assert_eq!(storage.read_bytes("nested/out.csv").await.unwrap(), b"b".to_vec());
        assert!(!storage.path("nested/out.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_roster_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = storage
            .load_roster("breweries.csv", &RosterConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_roster_keeps_columns_and_adds_url() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(
            tmp.path().join("breweries.csv"),
            "brewery,city\nHalf Acre,Chicago\n\"Crown Brewing\",Crown Point\n",
        )
        .unwrap();
        let columns = RosterConfig::default();

        let mut roster = storage.load_roster("breweries.csv", &columns).await.unwrap();
        let urls = HashMap::from([
            ("Half Acre".to_string(), Some("https://untappd.com/HalfAcreBeer".to_string())),
            ("Crown Brewing".to_string(), None),
        ]);
        roster.set_urls(&columns.url_column, &urls);
        storage.save_roster("breweries.csv", &roster).await.unwrap();

        let written = std::fs::read_to_string(tmp.path().join("breweries.csv")).unwrap();
        assert_eq!(
            written,
            "brewery,city,untappd_url\n\
             Half Acre,Chicago,https://untappd.com/HalfAcreBeer\n\
             Crown Brewing,Crown Point,\n"
        );

        let reloaded = storage.load_roster("breweries.csv", &columns).await.unwrap();
        assert_eq!(reloaded.unique_urls(), vec!["https://untappd.com/HalfAcreBeer"]);
    }

    #[tokio::test]
    async fn test_ratings_write_empty_cell_for_missing_rating() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let ratings = vec![
            BreweryRating {
                url: "https://untappd.com/a".to_string(),
                average_rating: Some(3.75),
                rater_count: 1234,
                beer_count: 12,
            },
            BreweryRating {
                url: "https://untappd.com/b".to_string(),
                average_rating: None,
                rater_count: 0,
                beer_count: 1,
            },
        ];

        storage.save_ratings("brewery_ratings.csv", &ratings).await.unwrap();

        let written = std::fs::read_to_string(tmp.path().join("brewery_ratings.csv")).unwrap();
        assert_eq!(
            written,
            "url,rating,raters,beers\n\
             https://untappd.com/a,3.75,1234,12\n\
             https://untappd.com/b,,0,1\n"
        );
    }

    #[tokio::test]
    async fn test_beers_header_matches_output_columns() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let beers = vec![BeerRecord {
            name: "Daisy Cutter".to_string(),
            style: "Pale Ale - American".to_string(),
            abv: Some(5.2),
            ibu: None,
            rating: Some(3.98),
            rater_count: Some(61234),
            brewery_url: "https://untappd.com/HalfAcreBeer".to_string(),
            popularity_rank: 1,
        }];

        storage.save_beers("beers.csv", &beers).await.unwrap();

        let written = std::fs::read_to_string(tmp.path().join("beers.csv")).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("name,style,ABV,IBU,rating,raters,brewery_URL,rank")
        );
        assert_eq!(
            lines.next(),
            Some("Daisy Cutter,Pale Ale - American,5.2,,3.98,61234,https://untappd.com/HalfAcreBeer,1")
        );
    }

    #[tokio::test]
    async fn test_credentials_and_stats() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        std::fs::write(
            tmp.path().join("credentials.toml"),
            "username = \"hophead\"\npassword = \"pw\"\n",
        )
        .unwrap();

        let creds = storage.load_credentials("credentials.toml").await.unwrap();
        assert_eq!(creds.username, "hophead");

        let stats = RunStats::begin("rate").finish();
        storage.save_stats("stats.json", &stats).await.unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(tmp.path().join("stats.json")).unwrap()).unwrap();
        assert_eq!(json["stage"], "rate");
    }
}
