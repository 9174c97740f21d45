//! fmplapla.com live station extractor.
//!
//! Station metadata is embedded in the station page as a Next.js payload;
//! the stream itself is a websocket session authorized by a short-lived
//! token from the `select_stream` API. The returned descriptor carries
//! the websocket location and token for [`crate::relay`].

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use super::Extractor;
use crate::descriptor::{LiveStatus, MediaDescriptor, Protocol, Thumbnail};
use crate::error::ExtractError;
use crate::http_client::FetchClient;
use crate::nextdata::extract_next_data;
use crate::token::check_geo_restriction;

static STATION_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://fmplapla\.com/(?P<id>[^/?#]+)").unwrap());

/// Thumbnail source fields in ascending preference order: the first one a
/// station carries is the most preferred candidate.
const THUMBNAIL_SOURCES: &[&str] = &["favicon", "logo_url", "icon", "large_icon", "artwork"];

/// Extractor for the fmplapla family of community-FM portals. The origin
/// and token endpoint are per-portal; everything else is shared.
pub struct FmplaplaExtractor {
    client: FetchClient,
    origin: &'static str,
    /// Token endpoint template with a `{station}` placeholder.
    api: &'static str,
}

impl FmplaplaExtractor {
    pub fn fmplapla(client: FetchClient) -> Self {
        Self {
            client,
            origin: "https://fmplapla.com",
            api: "https://fmplapla.com/api/select_stream?station={station}&burst=5",
        }
    }

    fn station_id(url: &str) -> Option<&str> {
        STATION_URL_RE
            .captures(url)
            .and_then(|captures| captures.name("id"))
            .map(|m| m.as_str())
    }

    /// The `select_stream` API wants an empty POST carrying the portal's
    /// own `Origin`; anything else is rejected.
    async fn request_stream_endpoint(&self, station: &str) -> Result<StreamEndpoint, ExtractError> {
        let url = self.api.replace("{station}", station);
        debug!(station, "requesting stream token");

        let response = self
            .client
            .inner()
            .post(&url)
            .header("Origin", self.origin)
            .body("")
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

fn station_from_page(page: &str, station: &str) -> Result<StationInfo, ExtractError> {
    extract_next_data::<NextData>(page)
        .and_then(|data| data.props.page_props.station)
        .ok_or_else(|| ExtractError::StationNotFound {
            station: station.to_string(),
        })
}

#[async_trait]
impl Extractor for FmplaplaExtractor {
    fn name(&self) -> &'static str {
        "fmplapla"
    }

    fn matches(&self, url: &str) -> bool {
        STATION_URL_RE.is_match(url)
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, ExtractError> {
        let station =
            Self::station_id(url).ok_or_else(|| ExtractError::UnsupportedUrl(url.to_string()))?;

        let page = self.client.fetch_page(url).await?;
        let info = station_from_page(&page, station)?;

        let endpoint = self.request_stream_endpoint(station).await?;
        let location = endpoint
            .location
            .ok_or(ExtractError::MissingField("location"))?;
        let token = endpoint.token.ok_or(ExtractError::MissingField("token"))?;
        check_geo_restriction(&token)?;

        let thumbnails = info.thumbnails();
        Ok(MediaDescriptor {
            id: info.id.unwrap_or_else(|| station.to_string()),
            title: info.name.unwrap_or_else(|| station.to_string()),
            description: info.description,
            tags: vec![],
            live_status: LiveStatus::IsLive,
            protocol: Protocol::Fmplapla,
            url: Some(location),
            token: Some(token),
            ext: Some("ogg".to_string()),
            duration_seconds: None,
            thumbnails,
            formats: vec![],
        })
    }
}

#[derive(Debug, Deserialize)]
struct NextData {
    props: NextProps,
}

#[derive(Debug, Deserialize)]
struct NextProps {
    #[serde(rename = "pageProps")]
    page_props: PageProps,
}

#[derive(Debug, Default, Deserialize)]
struct PageProps {
    station: Option<StationInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct StationInfo {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    favicon: Option<String>,
    logo_url: Option<String>,
    icon: Option<String>,
    large_icon: Option<String>,
    artwork: Option<String>,
}

impl StationInfo {
    fn thumbnail_source(&self, source: &str) -> Option<&String> {
        match source {
            "favicon" => self.favicon.as_ref(),
            "logo_url" => self.logo_url.as_ref(),
            "icon" => self.icon.as_ref(),
            "large_icon" => self.large_icon.as_ref(),
            "artwork" => self.artwork.as_ref(),
            _ => None,
        }
    }

    /// Thumbnail candidates in source order; the rank is the source index
    /// so the first listed field stays the most preferred.
    fn thumbnails(&self) -> Vec<Thumbnail> {
        let mut thumbnails = Vec::new();
        for (index, source) in THUMBNAIL_SOURCES.iter().enumerate() {
            if let Some(url) = self.thumbnail_source(source) {
                thumbnails.push(Thumbnail {
                    id: (*source).to_string(),
                    url: url.clone(),
                    preference: i32::try_from(index).unwrap_or(i32::MAX),
                });
            }
        }
        thumbnails
    }
}

#[derive(Debug, Deserialize)]
struct StreamEndpoint {
    location: Option<String>,
    token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_id_is_the_path_segment() {
        assert_eq!(
            FmplaplaExtractor::station_id("https://fmplapla.com/fmnishitokyo"),
            Some("fmnishitokyo")
        );
        assert_eq!(
            FmplaplaExtractor::station_id("https://fmplapla.com/fmnishitokyo?autoplay=1"),
            Some("fmnishitokyo")
        );
        assert_eq!(
            FmplaplaExtractor::station_id("https://fmplapla.com/"),
            None
        );
    }

    #[test]
    fn test_matches() {
        let extractor = FmplaplaExtractor::fmplapla(FetchClient::new().unwrap());
        assert!(extractor.matches("https://fmplapla.com/fmnishitokyo"));
        assert!(extractor.matches("http://fmplapla.com/shibuyanoradio"));
        assert!(!extractor.matches("https://planetradio.co.uk/kiss/player/"));
        assert!(!extractor.matches("https://example.com/fmnishitokyo"));
    }

    #[test]
    fn test_station_payload_parses() {
        let page = r#"
            <html><body>
            <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {"station": {
                    "id": "fmnishitokyo",
                    "name": "エフエム西東京",
                    "favicon": "https://fmplapla.com/fmnishitokyo/img/favicon.png",
                    "artwork": "https://fmplapla.com/fmnishitokyo/img/artwork.png"
                }}}}
            </script>
            </body></html>
        "#;
        let info = station_from_page(page, "fmnishitokyo").unwrap();
        assert_eq!(info.id.as_deref(), Some("fmnishitokyo"));
        assert_eq!(info.name.as_deref(), Some("エフエム西東京"));
    }

    #[test]
    fn test_absent_payload_is_station_not_found() {
        let page = "<html><body>404</body></html>";
        let err = station_from_page(page, "fmnishitokyo").unwrap_err();
        match err {
            ExtractError::StationNotFound { station } => assert_eq!(station, "fmnishitokyo"),
            other => panic!("expected StationNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_payload_without_station_is_station_not_found() {
        let page = r#"
            <script id="__NEXT_DATA__" type="application/json">
                {"props": {"pageProps": {}}}
            </script>
        "#;
        assert!(matches!(
            station_from_page(page, "gone").unwrap_err(),
            ExtractError::StationNotFound { .. }
        ));
    }

    #[test]
    fn test_thumbnails_keep_source_order_as_rank() {
        let info = StationInfo {
            favicon: Some("https://fmplapla.com/x/img/favicon.png".into()),
            icon: Some("https://fmplapla.com/x/img/icon.png".into()),
            artwork: Some("https://fmplapla.com/x/img/artwork.png".into()),
            ..StationInfo::default()
        };
        let thumbnails = info.thumbnails();
        let tags: Vec<&str> = thumbnails.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(tags, vec!["favicon", "icon", "artwork"]);
        // Ranks mirror the source-array index, so gaps are expected.
        let ranks: Vec<i32> = thumbnails.iter().map(|t| t.preference).collect();
        assert_eq!(ranks, vec![0, 2, 4]);
        assert!(ranks.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_thumbnails_empty_when_station_has_none() {
        assert!(StationInfo::default().thumbnails().is_empty());
    }
}
