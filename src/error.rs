//! Error taxonomy for stream extraction.
//!
//! Expected, user-facing failures (absent stations, region locks) are
//! distinct variants carrying the identifier that was attempted. Transport
//! and parse failures pass through untranslated; resilience is the
//! caller's concern, not this crate's.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The station page loaded but carried no station payload.
    #[error("no such station: {station}")]
    StationNotFound { station: String },

    /// The listen-again index had no episode with this identifier.
    #[error("no such episode {episode} for station {station}")]
    EpisodeNotFound { station: String, episode: String },

    /// The issued stream token marks the stream as region-locked.
    #[error("stream is restricted to listeners in {country}")]
    GeoRestricted { country: &'static str },

    /// No registered extractor recognizes this URL.
    #[error("no extractor matches URL: {0}")]
    UnsupportedUrl(String),

    /// A field the site contract requires was absent from an otherwise
    /// well-formed response.
    #[error("missing field in API response: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ExtractError {
    /// Expected failures are reported to the user without a backtrace;
    /// everything else indicates a transport problem or a site change.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::StationNotFound { .. }
                | Self::EpisodeNotFound { .. }
                | Self::GeoRestricted { .. }
                | Self::UnsupportedUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_errors() {
        assert!(ExtractError::StationNotFound {
            station: "fmnishitokyo".into()
        }
        .is_expected());
        assert!(ExtractError::GeoRestricted { country: "Japan" }.is_expected());
        assert!(ExtractError::UnsupportedUrl("https://example.com".into()).is_expected());
        assert!(!ExtractError::MissingField("location").is_expected());
    }

    #[test]
    fn test_display_names_the_identifier() {
        let err = ExtractError::EpisodeNotFound {
            station: "kiss".into(),
            episode: "209567378".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("kiss"));
        assert!(msg.contains("209567378"));
    }
}
