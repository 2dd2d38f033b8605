//! brewmap CLI
//!
//! Local execution entry point.

use std::path::PathBuf;

use brewmap::{error::Result, models::Config, pipeline, storage::LocalStorage};
use clap::{Parser, Subcommand, ValueEnum};

/// brewmap - Brewery rating scraper
#[derive(Parser, Debug)]
#[command(
    name = "brewmap",
    version,
    about = "Resolve breweries on Untappd and scrape their beer ratings"
)]
struct Cli {
    /// Path to storage directory containing config and tables
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find each roster brewery's page and write it into the roster
    Resolve,

    /// Scrape ratings for every resolved brewery
    Rate {
        /// Produce only one of the tables
        #[arg(long, value_enum)]
        only: Option<Table>,

        /// Skip the second pass over failed pages
        #[arg(long)]
        no_retry: bool,
    },

    /// Run full pipeline: Resolve → Rate
    Pipeline {
        /// Skip the second pass over failed pages
        #[arg(long)]
        no_retry: bool,
    },

    /// Validate configuration files
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Table {
    Ratings,
    Beers,
}

/// Default log filter: the configured level, with `-v` raising only this
/// crate's own targets to debug.
fn log_filter(verbose: bool, level: &str) -> String {
    if verbose {
        format!("{},brewmap=debug", level)
    } else {
        level.to_string()
    }
}

/// Initialize logging; `RUST_LOG` still overrides the default filter.
fn init_logging(verbose: bool, level: &str) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(verbose, level)),
    )
    .format_timestamp_secs()
    .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let loaded = Config::load(&config_path);
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(cli.verbose, &level);

    let mut config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Config::default()
        }
    };

    let storage = LocalStorage::new(&cli.storage_dir);

    match cli.command {
        Command::Resolve => {
            config.validate()?;
            pipeline::run_resolver(&config, &storage).await?;
        }

        Command::Rate { only, no_retry } => {
            if no_retry {
                config.crawler.retry_failed = false;
            }
            config.validate()?;
            match only {
                Some(Table::Ratings) => pipeline::run_ratings(&config, &storage).await?,
                Some(Table::Beers) => pipeline::run_beers(&config, &storage).await?,
                None => pipeline::run_rate(&config, &storage).await?,
            };
        }

        Command::Pipeline { no_retry } => {
            if no_retry {
                config.crawler.retry_failed = false;
            }
            config.validate()?;

            log::info!("Step 1/2: Resolving brewery URLs...");
            pipeline::run_resolver(&config, &storage).await?;

            log::info!("Step 2/2: Scraping ratings...");
            pipeline::run_rate(&config, &storage).await?;

            log::info!("Pipeline complete!");
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK ({} aliases, selectors compile)",
                config.aliases.len()
            );

            let roster_path = storage.path(&config.paths.roster);
            if roster_path.exists() {
                log::info!("✓ Roster found at {}", roster_path.display());
            } else {
                log::warn!("Roster not found at {}", roster_path.display());
            }
            let credentials_path = storage.path(&config.paths.credentials);
            if !credentials_path.exists() {
                log::warn!(
                    "No credentials at {}; search will run without a session",
                    credentials_path.display()
                );
            }

            log::info!("All validations passed!");
        }
    }

    log::info!("Done!");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_uses_configured_level() {
        assert_eq!(log_filter(false, "warn"), "warn");
    }

    #[test]
    fn test_log_filter_verbose_raises_only_own_crate() {
        assert_eq!(log_filter(true, "info"), "info,brewmap=debug");
    }
}
