//! Wikimedia Commons media search client
//!
//! Used as the fallback image source when a render URL cannot be
//! synthesized. Queries the MediaWiki API for the first file matching a
//! free-text search and extracts a thumbnail (or original) URL.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Default MediaWiki API endpoint
pub const DEFAULT_SEARCH_URL: &str = "https://commons.wikimedia.org/w/api.php";

/// Default thumbnail width requested from the search API, in pixels
pub const DEFAULT_THUMB_WIDTH: u32 = 640;

/// User-Agent sent with every search request; Wikimedia rejects anonymous clients
pub const USER_AGENT: &str = concat!(
    "carimage/",
    env!("CARGO_PKG_VERSION"),
    " (car listing image resolver)"
);

/// MediaWiki namespace holding uploaded files
const FILE_NAMESPACE: &str = "6";

/// Errors that can occur when querying the media search API
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Search API responded with status {0}")]
    Status(u16),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What a search response contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The response had no result pages
    NoPages,
    /// A page was found but carried no usable image URL
    NoImageInfo,
    /// An image URL was found
    Found(String),
}

impl SearchOutcome {
    /// Returns the URL if one was found
    pub fn into_url(self) -> Option<String> {
        match self {
            SearchOutcome::Found(url) => Some(url),
            SearchOutcome::NoPages | SearchOutcome::NoImageInfo => None,
        }
    }
}

/// Top-level MediaWiki query response
#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

/// A single result page from the search generator
#[derive(Debug, Deserialize)]
struct Page {
    /// Rank of the page within the search results
    index: Option<u32>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    thumburl: Option<String>,
    url: Option<String>,
}

/// Client for the media search fallback
#[derive(Debug, Clone)]
pub struct MediaSearchClient {
    /// HTTP client for making requests
    http_client: Client,
    /// API endpoint (allows override for testing)
    base_url: String,
    /// Requested thumbnail width in pixels
    thumb_width: u32,
}

impl Default for MediaSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSearchClient {
    /// Creates a new MediaSearchClient against Wikimedia Commons
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self::with_client(client)
    }

    /// Creates a new MediaSearchClient with a custom HTTP client
    ///
    /// The client should carry a User-Agent; see [`USER_AGENT`].
    pub fn with_client(http_client: Client) -> Self {
        Self {
            http_client,
            base_url: DEFAULT_SEARCH_URL.to_string(),
            thumb_width: DEFAULT_THUMB_WIDTH,
        }
    }

    /// Overrides the API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the requested thumbnail width
    pub fn with_thumb_width(mut self, thumb_width: u32) -> Self {
        self.thumb_width = thumb_width;
        self
    }

    /// Searches for the first file matching `query`
    ///
    /// # Returns
    /// * `Ok(SearchOutcome)` - What the response contained
    /// * `Err(SearchError)` - If the request failed, the status was not a
    ///   success, or the body was not the expected JSON
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, SearchError> {
        let thumb_width = self.thumb_width.to_string();

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrnamespace", FILE_NAMESPACE),
                ("gsrlimit", "1"),
                ("prop", "imageinfo"),
                ("iiprop", "url"),
                ("iiurlwidth", thumb_width.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        parse_response(&text)
    }
}

/// Reduces a raw search response body to a SearchOutcome
pub fn parse_response(body: &str) -> Result<SearchOutcome, SearchError> {
    let response: ApiResponse = serde_json::from_str(body)?;

    let page = response
        .query
        .and_then(|q| q.pages.into_values().min_by_key(|p| p.index.unwrap_or(u32::MAX)));

    let Some(page) = page else {
        return Ok(SearchOutcome::NoPages);
    };

    let url = page.imageinfo.into_iter().next().and_then(|info| {
        info.thumburl
            .filter(|u| !u.is_empty())
            .or(info.url.filter(|u| !u.is_empty()))
    });

    Ok(match url {
        Some(url) => SearchOutcome::Found(url),
        None => SearchOutcome::NoImageInfo,
    })
}
