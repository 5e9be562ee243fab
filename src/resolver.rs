//! Car image resolution
//!
//! `CarImageResolver` turns a `CarImageDescriptor` into a best-effort image
//! URL. Lookups go memory tier, then session store, then URL synthesis, then
//! the media search fallback, and every outcome (including "no image") is
//! written back to both cache tiers so each key costs at most one lookup per
//! session store lifetime.
//!
//! Resolution never fails: network errors, bad responses and storage
//! problems all degrade to `None`, which callers render as a placeholder.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use thiserror::Error;

use crate::cache::{MemoryCache, SessionStore, DEFAULT_SESSION_TTL_HOURS};
use crate::data::search::{DEFAULT_SEARCH_URL, DEFAULT_THUMB_WIDTH, USER_AGENT};
use crate::data::{CarImageDescriptor, ImageProvider, MediaSearchClient};

/// Errors that can occur when building a resolver
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Default number of descriptors `resolve_all` works on at once
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Settings for a resolver instance
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Provider used for URL synthesis; `None` always uses the search
    pub provider: Option<ImageProvider>,
    /// Media search API endpoint
    pub search_url: String,
    /// Thumbnail width requested from the search API
    pub thumb_width: u32,
    /// Retry the search with `brand model` and `model` after a miss
    pub broaden_search: bool,
    /// Persisted tier; `None` keeps results in memory only
    pub session: Option<SessionStore>,
    /// Lifetime of entries written to the session store, in hours
    pub session_ttl_hours: u64,
    /// Per-request timeout for the search API
    pub request_timeout: Option<Duration>,
    /// Upper bound on concurrent lookups in `resolve_all`
    pub max_concurrent_lookups: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider: Some(ImageProvider::default()),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            thumb_width: DEFAULT_THUMB_WIDTH,
            broaden_search: true,
            session: SessionStore::new(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            request_timeout: Some(Duration::from_secs(10)),
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

/// Resolves image URLs for car descriptors through a layered cache
#[derive(Debug)]
pub struct CarImageResolver {
    provider: Option<ImageProvider>,
    search: MediaSearchClient,
    broaden_search: bool,
    memory: MemoryCache,
    session: Option<SessionStore>,
    max_concurrent_lookups: usize,
}

impl CarImageResolver {
    /// Creates a resolver with its own empty memory tier
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let search = MediaSearchClient::with_client(http_client)
            .with_base_url(config.search_url)
            .with_thumb_width(config.thumb_width);

        Ok(Self {
            provider: config.provider,
            search,
            broaden_search: config.broaden_search,
            memory: MemoryCache::new(),
            session: config
                .session
                .map(|store| store.with_ttl_hours(config.session_ttl_hours)),
            max_concurrent_lookups: config.max_concurrent_lookups.max(1),
        })
    }

    /// Resolves an image URL for a descriptor
    ///
    /// # Returns
    /// * `Some(url)` - A render URL or a search result
    /// * `None` - No image is available, or the lookup failed
    ///
    /// # Behavior
    /// - Returns a memory hit (URL or confirmed absence) without I/O
    /// - Otherwise returns a session hit and copies it into memory
    /// - Otherwise synthesizes a provider URL when brand, model and year are usable
    /// - Otherwise runs the media search, treating any failure as no result
    /// - Writes whatever was found to both tiers before returning
    pub async fn resolve(&self, descriptor: &CarImageDescriptor) -> Option<String> {
        let key = descriptor.cache_key();

        if let Some(cached) = self.memory.get(&key) {
            log::debug!("Image memory hit for {}", key);
            return cached;
        }

        if let Some(ref session) = self.session {
            if let Some(stored) = session.read(&key) {
                log::debug!("Image session hit for {}, promoting to memory", key);
                self.memory.insert(key, stored.clone());
                return stored;
            }
        }

        let resolved = match self
            .provider
            .as_ref()
            .and_then(|provider| provider.synthesize(descriptor))
        {
            Some(url) => Some(url),
            None => self.search_fallback(descriptor).await,
        };

        self.store(key, resolved.clone());
        resolved
    }

    /// Resolves many descriptors concurrently, preserving input order
    ///
    /// At most `max_concurrent_lookups` resolutions run at once. Duplicate
    /// uncached keys in the same batch may each hit the network; they
    /// converge on the same cached value.
    pub async fn resolve_all(&self, descriptors: &[CarImageDescriptor]) -> Vec<Option<String>> {
        stream::iter(descriptors.iter().map(|d| self.resolve(d)))
            .buffered(self.max_concurrent_lookups)
            .collect()
            .await
    }

    /// Peeks at the memory tier without any I/O
    ///
    /// The outer `None` means the descriptor has not been resolved by this
    /// resolver yet; `Some(None)` means it resolved to no image.
    pub fn cached(&self, descriptor: &CarImageDescriptor) -> Option<Option<String>> {
        self.memory.get(&descriptor.cache_key())
    }

    /// Empties the memory tier; the session store is left untouched
    pub fn clear_memory(&self) {
        self.memory.clear();
    }

    /// Runs the media search, trying broader queries after a miss
    async fn search_fallback(&self, descriptor: &CarImageDescriptor) -> Option<String> {
        for query in descriptor.search_queries(self.broaden_search) {
            log::info!("Searching media index for \"{}\"", query);
            match self.search.search(&query).await {
                Ok(outcome) => {
                    if let Some(url) = outcome.into_url() {
                        return Some(url);
                    }
                }
                Err(e) => {
                    log::warn!(
                        "Failed fetching car image for {} {} {}: {}",
                        descriptor.brand,
                        descriptor.model,
                        descriptor.year,
                        e
                    );
                }
            }
        }
        None
    }

    /// Writes a result to memory and, best effort, to the session store
    fn store(&self, key: String, value: Option<String>) {
        if let Some(ref session) = self.session {
            if let Err(e) = session.write(&key, value.as_deref()) {
                log::warn!("Failed to persist image for {}: {}", key, e);
            }
        }
        self.memory.insert(key, value);
    }
}
