//! Core data models for car image resolution
//!
//! This module contains the descriptor type identifying a vehicle, plus the
//! two sources an image URL can come from: the image provider template and
//! the media search fallback.

pub mod provider;
pub mod search;

pub use provider::ImageProvider;
pub use search::{MediaSearchClient, SearchError, SearchOutcome};

use serde::{Deserialize, Serialize};

/// Identifies a vehicle for image lookup purposes
///
/// Listing pages build one of these per card. `id` is optional; when it is
/// missing the cache key is derived from brand, model and year instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarImageDescriptor {
    /// Opaque listing identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Manufacturer, free text (e.g. "Toyota")
    pub brand: String,
    /// Model name, free text (e.g. "Corolla Cross")
    pub model: String,
    /// Model year
    pub year: i32,
}

impl CarImageDescriptor {
    /// Creates a descriptor without a listing id
    pub fn new(brand: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            id: None,
            brand: brand.into(),
            model: model.into(),
            year,
        }
    }

    /// Attaches a listing id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the normalized cache key for this descriptor
    ///
    /// The listing id wins when present and not blank. Otherwise the key is
    /// `brand|model|year` with brand and model trimmed and lowercased, so the
    /// same vehicle lands in the same slot regardless of listing source.
    pub fn cache_key(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => format!(
                "{}|{}|{}",
                self.brand.trim().to_lowercase(),
                self.model.trim().to_lowercase(),
                self.year
            ),
        }
    }

    /// Whether brand, model and year are all usable for URL synthesis
    pub fn is_complete(&self) -> bool {
        !self.brand.trim().is_empty() && !self.model.trim().is_empty() && self.year != 0
    }

    /// Search queries for the fallback lookup, most specific first
    ///
    /// Blank and duplicate queries are dropped. With `broaden` unset only the
    /// full `year brand model` query is returned.
    pub fn search_queries(&self, broaden: bool) -> Vec<String> {
        let brand = self.brand.trim();
        let model = self.model.trim();

        let mut candidates = vec![join_words(&[&self.year.to_string(), brand, model])];
        if broaden {
            candidates.push(join_words(&[brand, model]));
            candidates.push(model.to_string());
        }

        let mut queries: Vec<String> = Vec::with_capacity(candidates.len());
        for query in candidates {
            if !query.is_empty() && !queries.contains(&query) {
                queries.push(query);
            }
        }
        queries
    }
}

/// Joins the non-empty parts with single spaces
fn join_words(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_case_insensitive() {
        let a = CarImageDescriptor::new("Toyota", "Corolla", 2020);
        let b = CarImageDescriptor::new("TOYOTA", "corolla", 2020);

        assert_eq!(a.cache_key(), "toyota|corolla|2020");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_trims_whitespace() {
        let a = CarImageDescriptor::new("  Volvo ", " XC60", 2018);
        assert_eq!(a.cache_key(), "volvo|xc60|2018");
    }

    #[test]
    fn test_cache_key_prefers_id() {
        let a = CarImageDescriptor::new("Toyota", "Corolla", 2020).with_id("listing-42");
        let b = CarImageDescriptor::new("Honda", "Civic", 2015).with_id("listing-42");
        let c = CarImageDescriptor::new("Toyota", "Corolla", 2020).with_id("listing-43");

        assert_eq!(a.cache_key(), "listing-42");
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_cache_key_ignores_blank_id() {
        let a = CarImageDescriptor::new("Toyota", "Corolla", 2020).with_id("   ");
        assert_eq!(a.cache_key(), "toyota|corolla|2020");
    }

    #[test]
    fn test_is_complete() {
        assert!(CarImageDescriptor::new("Toyota", "Corolla", 2020).is_complete());
        assert!(!CarImageDescriptor::new("", "Corolla", 2020).is_complete());
        assert!(!CarImageDescriptor::new("Toyota", "  ", 2020).is_complete());
        assert!(!CarImageDescriptor::new("Toyota", "Corolla", 0).is_complete());
    }

    #[test]
    fn test_search_queries_broadened() {
        let d = CarImageDescriptor::new("Toyota", "Corolla", 2020);
        assert_eq!(
            d.search_queries(true),
            vec!["2020 Toyota Corolla", "Toyota Corolla", "Corolla"]
        );
    }

    #[test]
    fn test_search_queries_single() {
        let d = CarImageDescriptor::new("Toyota", "Corolla", 2020);
        assert_eq!(d.search_queries(false), vec!["2020 Toyota Corolla"]);
    }

    #[test]
    fn test_search_queries_skip_blank_and_duplicates() {
        let d = CarImageDescriptor::new("", "", 0);
        assert_eq!(d.search_queries(true), vec!["0"]);

        let d = CarImageDescriptor::new("", "Model S", 2021);
        assert_eq!(d.search_queries(true), vec!["2021 Model S", "Model S"]);
    }

    #[test]
    fn test_descriptor_deserializes_without_id() {
        let json = r#"{"brand": "BMW", "model": "320d", "year": 2017}"#;
        let d: CarImageDescriptor = serde_json::from_str(json).expect("Should parse descriptor");

        assert!(d.id.is_none());
        assert_eq!(d.brand, "BMW");
        assert_eq!(d.year, 2017);
    }
}
