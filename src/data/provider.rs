//! Image provider URL synthesis
//!
//! Builds a render URL for a vehicle from a fixed template. No request is
//! made here; the provider is trusted to serve either a render or its own
//! placeholder, and image load failures are handled by whoever displays it.

use reqwest::Url;

use super::CarImageDescriptor;

/// Default render endpoint of the image provider
pub const DEFAULT_PROVIDER_URL: &str = "https://cdn.imagin.studio/getImage";

/// Default customer identifier sent to the provider
pub const DEFAULT_CUSTOMER: &str = "img";

/// Image provider settings used for URL synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageProvider {
    /// Render endpoint
    pub base_url: String,
    /// Customer identifier issued by the provider
    pub customer: String,
    /// Framing of the render
    pub zoom_type: String,
    /// Camera angle of the render
    pub angle: String,
}

impl Default for ImageProvider {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            customer: DEFAULT_CUSTOMER.to_string(),
            zoom_type: "fullscreen".to_string(),
            angle: "23".to_string(),
        }
    }
}

impl ImageProvider {
    /// Creates a provider with a custom endpoint and customer, keeping the default framing
    pub fn new(base_url: impl Into<String>, customer: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            customer: customer.into(),
            ..Self::default()
        }
    }

    /// Builds the render URL for a descriptor
    ///
    /// Returns `None` when brand or model is blank, the year is zero, or the
    /// configured base URL does not parse.
    pub fn synthesize(&self, descriptor: &CarImageDescriptor) -> Option<String> {
        if !descriptor.is_complete() {
            return None;
        }

        let make = descriptor.brand.trim();
        let model_family = descriptor.model.split_whitespace().next()?;
        let year = descriptor.year.to_string();

        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("customer", self.customer.as_str()),
                ("make", make),
                ("modelFamily", model_family),
                ("zoomType", self.zoom_type.as_str()),
                ("angle", self.angle.as_str()),
                ("modelYear", year.as_str()),
            ],
        )
        .map_err(|e| log::warn!("Invalid image provider URL {}: {}", self.base_url, e))
        .ok()?;

        Some(url.into())
    }
}
