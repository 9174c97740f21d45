//! Normalized output records handed to a download pipeline.
//!
//! A [`MediaDescriptor`] is produced once per resolution call and has no
//! lifecycle beyond it. Single-stream sites fill `url`/`token`/`ext`
//! directly; multi-variant sites fill `formats` and leave the direct
//! fields empty. Everything here is audio-only, so no video codec hints
//! are carried.

use serde::Serialize;

/// How the media bytes are transported once the URL is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain progressive HTTP(S) audio.
    Https,
    /// HLS manifest URL; segment handling belongs to the downstream pipeline.
    Hls,
    /// fmplapla websocket frame stream, recorded by [`crate::relay`].
    Fmplapla,
}

/// Live/on-demand status flag recognized by the downstream pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveStatus {
    IsLive,
    NotLive,
}

/// One thumbnail candidate. Lower `preference` is picked first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    /// Source field tag the URL came from (e.g., `"artwork"`).
    pub id: String,
    pub url: String,
    /// Rank mirroring source-array order: the first candidate a site
    /// lists gets the lowest (most preferred) value.
    pub preference: i32,
}

/// One candidate media representation among which a pipeline selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatVariant {
    /// Stream-type plus quality tier, optionally suffixed `-premium`.
    pub format_id: String,
    pub url: String,
    /// Container extension, when inferable from the stream type or by
    /// probing the resource.
    pub ext: Option<String>,
    /// Bitrate in kbps, where the site reports one.
    pub bitrate: Option<u32>,
    /// Ordinal tie-breaker only, never an absolute bitrate measure.
    pub quality: i32,
    pub preference: i32,
    /// Human-readable qualifier (e.g., `"Premium"`).
    pub note: Option<String>,
    /// Audio codec hint, where known.
    pub acodec: Option<String>,
    pub protocol: Protocol,
}

/// Resolved stream metadata for one station or episode.
#[derive(Debug, Clone, Serialize)]
pub struct MediaDescriptor {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Genre tags, where the site reports them.
    pub tags: Vec<String>,
    pub live_status: LiveStatus,
    pub protocol: Protocol,
    /// Direct media URL for single-stream sites.
    pub url: Option<String>,
    /// Opaque site-issued credential required to open the stream session.
    pub token: Option<String>,
    pub ext: Option<String>,
    pub duration_seconds: Option<u64>,
    pub thumbnails: Vec<Thumbnail>,
    /// Format variants for multi-stream sites; empty when `url` is set.
    pub formats: Vec<FormatVariant>,
}

impl MediaDescriptor {
    /// Default pick among the format variants: highest preference, then
    /// highest quality, then declaration order.
    pub fn best_format(&self) -> Option<&FormatVariant> {
        self.formats
            .iter()
            .enumerate()
            .max_by_key(|(index, f)| (f.preference, f.quality, std::cmp::Reverse(*index)))
            .map(|(_, f)| f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(format_id: &str, quality: i32, preference: i32) -> FormatVariant {
        FormatVariant {
            format_id: format_id.to_string(),
            url: format!("https://stream.example/{format_id}"),
            ext: None,
            bitrate: None,
            quality,
            preference,
            note: None,
            acodec: None,
            protocol: Protocol::Https,
        }
    }

    fn descriptor(formats: Vec<FormatVariant>) -> MediaDescriptor {
        MediaDescriptor {
            id: "kiss".into(),
            title: "KISS".into(),
            description: None,
            tags: vec![],
            live_status: LiveStatus::IsLive,
            protocol: Protocol::Https,
            url: None,
            token: None,
            ext: None,
            duration_seconds: None,
            thumbnails: vec![],
            formats,
        }
    }

    #[test]
    fn test_best_format_prefers_preference_over_quality() {
        let d = descriptor(vec![
            variant("adts-hq", 0, 0),
            variant("adts-hq-premium", 0, 1),
            variant("mp3-lq", -1, 0),
        ]);
        assert_eq!(d.best_format().unwrap().format_id, "adts-hq-premium");
    }

    #[test]
    fn test_best_format_breaks_ties_by_quality_then_order() {
        let d = descriptor(vec![
            variant("adts-hq", 0, 0),
            variant("mp3-lq", -1, 0),
            variant("aac-hq", 0, 0),
        ]);
        // Equal preference and quality: first declared wins.
        assert_eq!(d.best_format().unwrap().format_id, "adts-hq");
    }

    #[test]
    fn test_best_format_empty() {
        assert!(descriptor(vec![]).best_format().is_none());
    }

    #[test]
    fn test_descriptor_serializes_pipeline_keys() {
        let d = descriptor(vec![variant("adts-hq", 0, 0)]);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["live_status"], "is_live");
        assert_eq!(json["protocol"], "https");
        assert_eq!(json["formats"][0]["format_id"], "adts-hq");
    }
}
