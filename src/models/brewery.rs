//! Brewery roster and aggregate rating structures.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RosterConfig;

/// A roster entry and the page it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreweryRecord {
    pub name: String,
    pub resolved_url: Option<String>,
}

/// Aggregate rating figures for one brewery page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreweryRating {
    pub url: String,
    /// `None` when the site shows N/A
    #[serde(rename = "rating")]
    pub average_rating: Option<f64>,
    #[serde(rename = "raters")]
    pub rater_count: u64,
    #[serde(rename = "beers")]
    pub beer_count: u64,
}

/// The input brewery table.
///
/// All input columns are kept so the resolve stage can write the table back
/// with only the URL column touched.
#[derive(Debug, Clone)]
pub struct Roster {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    name_index: usize,
    url_index: Option<usize>,
}

impl Roster {
    /// Build a roster from raw rows, locating the configured columns.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, columns: &RosterConfig) -> Result<Self> {
        let name_index = headers
            .iter()
            .position(|h| h == &columns.name_column)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "Roster has no '{}' column (found: {})",
                    columns.name_column,
                    headers.join(", ")
                ))
            })?;
        let url_index = headers.iter().position(|h| h == &columns.url_column);

        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self {
            headers,
            rows,
            name_index,
            url_index,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Brewery names in roster order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row[self.name_index].as_str())
    }

    /// One record per row; empty URL cells read as unresolved.
    pub fn records(&self) -> Vec<BreweryRecord> {
        self.rows
            .iter()
            .map(|row| BreweryRecord {
                name: row[self.name_index].clone(),
                resolved_url: self
                    .url_index
                    .map(|i| row[i].trim())
                    .filter(|url| !url.is_empty())
                    .map(String::from),
            })
            .collect()
    }

    /// Distinct resolved URLs in first-seen order.
    pub fn unique_urls(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records()
            .into_iter()
            .filter_map(|r| r.resolved_url)
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    /// Write resolved URLs into the URL column, adding the column if needed.
    ///
    /// Rows whose name is not in `urls` keep their current value.
    pub fn set_urls(&mut self, url_column: &str, urls: &HashMap<String, Option<String>>) {
        let index = match self.url_index {
            Some(i) => i,
            None => {
                self.headers.push(url_column.to_string());
                for row in &mut self.rows {
                    row.push(String::new());
                }
                let i = self.headers.len() - 1;
                self.url_index = Some(i);
                i
            }
        };

        for row in &mut self.rows {
            if let Some(url) = urls.get(&row[self.name_index]) {
                row[index] = url.clone().unwrap_or_default();
            }
        }
    }
}
