//! Site extractors and URL dispatch.
//!
//! An [`Extractor`] turns a site URL into a normalized
//! [`MediaDescriptor`](crate::descriptor::MediaDescriptor). Dispatch asks
//! each registered extractor in order whether it recognizes the URL and
//! runs the first match.

pub mod fmplapla;
pub mod planetradio;

use async_trait::async_trait;
use tracing::debug;

use crate::descriptor::MediaDescriptor;
use crate::error::ExtractError;
use crate::http_client::FetchClient;

pub use fmplapla::FmplaplaExtractor;
pub use planetradio::{PlanetRadioLive, PlanetRadioOnDemand};

/// Trait for site-specific stream extractors.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short lowercase extractor name (e.g., `"fmplapla"`).
    fn name(&self) -> &'static str;

    /// Returns `true` if this extractor can handle the given URL.
    fn matches(&self, url: &str) -> bool;

    /// Resolve the URL into a media descriptor. One extraction makes one
    /// or two HTTP calls and holds no state across calls.
    async fn extract(&self, url: &str) -> Result<MediaDescriptor, ExtractError>;
}

/// All extractors in dispatch order. The episode pattern is tried before
/// the broader live patterns on the same hosts.
pub fn all(client: &FetchClient) -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(FmplaplaExtractor::fmplapla(client.clone())),
        Box::new(PlanetRadioOnDemand::new(client.clone())),
        Box::new(PlanetRadioLive::new(client.clone())),
    ]
}

/// Resolve a URL with the first matching extractor.
pub async fn resolve(client: &FetchClient, url: &str) -> Result<MediaDescriptor, ExtractError> {
    for extractor in all(client) {
        if extractor.matches(url) {
            debug!(extractor = extractor.name(), "dispatching");
            return extractor.extract(url).await;
        }
    }
    Err(ExtractError::UnsupportedUrl(url.to_string()))
}
