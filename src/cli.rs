//! Command-line interface parsing for carimage
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into the resolver configuration and the list of descriptors to resolve.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::cache::{SessionStore, DEFAULT_SESSION_TTL_HOURS};
use crate::data::provider::{DEFAULT_CUSTOMER, DEFAULT_PROVIDER_URL};
use crate::data::search::{DEFAULT_SEARCH_URL, DEFAULT_THUMB_WIDTH};
use crate::data::{CarImageDescriptor, ImageProvider};
use crate::resolver::{ResolverConfig, DEFAULT_MAX_CONCURRENT_LOOKUPS};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The listings file could not be read
    #[error("Failed to read listings file '{path}': {source}")]
    ReadListings {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The listings file is not a JSON array of descriptors
    #[error("Failed to parse listings file '{path}': {source}")]
    ParseListings {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A single-descriptor lookup is missing a required flag
    #[error("Missing required argument: --{0}")]
    MissingField(&'static str),
}

/// carimage - Resolve representative photo URLs for car listings
#[derive(Parser, Debug)]
#[command(name = "carimage")]
#[command(about = "Resolve representative photo URLs for car listings")]
#[command(version)]
pub struct Cli {
    /// Manufacturer, e.g. Toyota
    #[arg(long, conflicts_with = "listings")]
    pub brand: Option<String>,

    /// Model name, e.g. Corolla
    #[arg(long, conflicts_with = "listings")]
    pub model: Option<String>,

    /// Model year
    #[arg(long, conflicts_with = "listings", allow_negative_numbers = true)]
    pub year: Option<i32>,

    /// Listing identifier used as the cache key
    #[arg(long, conflicts_with = "listings")]
    pub id: Option<String>,

    /// JSON file with an array of {id?, brand, model, year} objects
    #[arg(long, value_name = "FILE")]
    pub listings: Option<PathBuf>,

    /// Directory for the persisted cache (defaults to the XDG cache dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep results in memory only
    #[arg(long, conflicts_with = "cache_dir")]
    pub no_session_cache: bool,

    /// Hours a persisted result (including "no image") is reused before looking up again
    #[arg(long, value_name = "HOURS", default_value_t = DEFAULT_SESSION_TTL_HOURS)]
    pub session_ttl_hours: u64,

    /// Maximum number of listings resolved at once
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CONCURRENT_LOOKUPS)]
    pub concurrency: usize,

    /// Never synthesize provider URLs; always use the media search
    #[arg(long)]
    pub no_synthesis: bool,

    /// Image provider render endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_PROVIDER_URL)]
    pub provider_url: String,

    /// Image provider customer identifier
    #[arg(long, default_value = DEFAULT_CUSTOMER)]
    pub customer: String,

    /// Media search API endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_SEARCH_URL)]
    pub search_url: String,

    /// Thumbnail width requested from the media search
    #[arg(long, value_name = "PX", default_value_t = DEFAULT_THUMB_WIDTH)]
    pub thumb_width: u32,

    /// Only run the full "year brand model" search query
    #[arg(long)]
    pub no_broaden: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl ResolverConfig {
    /// Creates a ResolverConfig from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let provider = if cli.no_synthesis {
            None
        } else {
            Some(ImageProvider::new(&cli.provider_url, &cli.customer))
        };

        let session = if cli.no_session_cache {
            None
        } else {
            match &cli.cache_dir {
                Some(dir) => Some(SessionStore::with_dir(dir.clone())),
                None => SessionStore::new(),
            }
        };

        ResolverConfig {
            provider,
            search_url: cli.search_url.clone(),
            thumb_width: cli.thumb_width,
            broaden_search: !cli.no_broaden,
            session,
            session_ttl_hours: cli.session_ttl_hours,
            max_concurrent_lookups: cli.concurrency,
            ..ResolverConfig::default()
        }
    }
}

/// Collects the descriptors to resolve from CLI arguments.
///
/// # Returns
/// * `Ok(Vec<CarImageDescriptor>)` from `--listings`, or a single descriptor
///   built from `--brand`, `--model`, `--year` and `--id`
/// * `Err(CliError)` if the listings file is unreadable or malformed, or a
///   single-descriptor flag is missing
pub fn descriptors_from_cli(cli: &Cli) -> Result<Vec<CarImageDescriptor>, CliError> {
    if let Some(path) = &cli.listings {
        let content = fs::read_to_string(path).map_err(|source| CliError::ReadListings {
            path: path.clone(),
            source,
        })?;
        return serde_json::from_str(&content).map_err(|source| CliError::ParseListings {
            path: path.clone(),
            source,
        });
    }

    let brand = cli.brand.clone().ok_or(CliError::MissingField("brand"))?;
    let model = cli.model.clone().ok_or(CliError::MissingField("model"))?;
    let year = cli.year.ok_or(CliError::MissingField("year"))?;

    Ok(vec![CarImageDescriptor {
        id: cli.id.clone(),
        brand,
        model,
        year,
    }])
}
