//! Planet Radio network extractors.
//!
//! Covers planetradio.co.uk, radioplay.dk/.no/.fi/.se and soundis.ro/.gr,
//! which all sit on the same `listenapi` backend: live stations come from
//! `initdadi` as a multi-variant stream list, "listen again" episodes
//! from a date-keyed `listenagaindadi` index.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::Extractor;
use crate::descriptor::{FormatVariant, LiveStatus, MediaDescriptor, Protocol, Thumbnail};
use crate::error::ExtractError;
use crate::http_client::FetchClient;
use crate::rank::{RankPolicy, VariantFacts};

const LISTEN_API_BASE: &str = "https://listenapi.planetradio.co.uk/api9.2";

static LIVE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:planetradio\.co\.uk|radioplay\.(?:dk|no|fi|se)|soundis\.(?:ro|gr))/(?P<id>[\w-]+)/(?:player|spiller|afspiller|spelare)/?$",
    )
    .unwrap()
});

static ON_DEMAND_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://(?:planetradio\.co\.uk|radioplay\.(?:dk|no|fi)|soundis\.(?:ro|gr))/(?P<station>[\w-]+)/player/(?P<episode>\d+)/?$",
    )
    .unwrap()
});

/// Live station extractor.
pub struct PlanetRadioLive {
    client: FetchClient,
}

impl PlanetRadioLive {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    async fn build_formats(
        &self,
        streams: &[StationStream],
    ) -> Result<Vec<FormatVariant>, ExtractError> {
        let policy = RankPolicy::live();
        let skey = Utc::now().timestamp();
        let mut formats = Vec::new();

        for stream in dedupe_streams(streams) {
            let url = with_cache_buster(&stream.stream_url, skey);
            let stream_type = stream.stream_type.as_deref().unwrap_or("http");
            let premium = stream.stream_premium.unwrap_or(false);

            let ext = match (determine_ext(&url), stream_type) {
                (None, _) => self.probe_ext(&url).await?,
                (_, "adts") => Some("m4a".to_string()),
                (_, "mp3") => Some("mp3".to_string()),
                (from_url, _) => from_url,
            };

            let ranking = policy.rank(&VariantFacts {
                quality_tier: Some(stream.stream_quality.as_str()),
                premium,
                ext: ext.as_deref(),
            });

            let mut format_id = format!("{stream_type}-{}", stream.stream_quality);
            if premium {
                format_id.push_str("-premium");
            }

            let is_hls = stream_type == "hls";
            formats.push(FormatVariant {
                format_id,
                url,
                ext,
                // The manifest carries its own bandwidth declarations.
                bitrate: if is_hls { None } else { stream.stream_bit_rate },
                quality: ranking.quality,
                preference: ranking.preference,
                note: ranking.note.map(str::to_string),
                acodec: None,
                protocol: if is_hls { Protocol::Hls } else { Protocol::Https },
            });
        }

        Ok(formats)
    }

    /// Some stream URLs carry no extension at all; ask the server what it
    /// serves and map the content type to a container.
    async fn probe_ext(&self, url: &str) -> Result<Option<String>, ExtractError> {
        debug!(url, "determining source extension");
        let response = self.client.inner().get(url).send().await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        Ok(content_type.as_deref().and_then(ext_from_content_type))
    }
}

#[async_trait]
impl Extractor for PlanetRadioLive {
    fn name(&self) -> &'static str {
        "planetradio"
    }

    fn matches(&self, url: &str) -> bool {
        LIVE_URL_RE.is_match(url)
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, ExtractError> {
        let station = LIVE_URL_RE
            .captures(url)
            .and_then(|captures| captures.name("id"))
            .map(|m| m.as_str())
            .ok_or_else(|| ExtractError::UnsupportedUrl(url.to_string()))?;

        let meta: StationMeta = self
            .client
            .get_json(&format!("{LISTEN_API_BASE}/initdadi/{station}"))
            .await?;

        let formats = self.build_formats(&meta.station_streams).await?;

        Ok(MediaDescriptor {
            id: station.to_string(),
            title: meta.station_name,
            description: meta
                .positioning_statement_description
                .or(meta.station_strapline),
            tags: meta.station_genre_tags.unwrap_or_default(),
            live_status: LiveStatus::IsLive,
            protocol: Protocol::Https,
            url: None,
            token: None,
            ext: None,
            duration_seconds: None,
            thumbnails: vec![],
            formats,
        })
    }
}

/// "Listen again" episode extractor.
pub struct PlanetRadioOnDemand {
    client: FetchClient,
}

impl PlanetRadioOnDemand {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Extractor for PlanetRadioOnDemand {
    fn name(&self) -> &'static str {
        "planetradio:ondemand"
    }

    fn matches(&self, url: &str) -> bool {
        ON_DEMAND_URL_RE.is_match(url)
    }

    async fn extract(&self, url: &str) -> Result<MediaDescriptor, ExtractError> {
        let captures = ON_DEMAND_URL_RE
            .captures(url)
            .ok_or_else(|| ExtractError::UnsupportedUrl(url.to_string()))?;
        let station = &captures["station"];
        let episode_id: u64 = captures["episode"]
            .parse()
            .map_err(|_| ExtractError::UnsupportedUrl(url.to_string()))?;

        let index: ListenAgainIndex = self
            .client
            .get_json(&format!("{LISTEN_API_BASE}/listenagaindadi/{station}"))
            .await?;

        let episode = find_episode(&index, episode_id).ok_or_else(|| {
            ExtractError::EpisodeNotFound {
                station: station.to_string(),
                episode: episode_id.to_string(),
            }
        })?;

        let policy = RankPolicy::listen_again();
        let mut formats = Vec::new();
        let primary = episode
            .mediaurl
            .as_deref()
            .ok_or(ExtractError::MissingField("mediaurl"))?;
        formats.push(listen_again_variant(primary, &policy));
        if let Some(fallback) = episode.mediaurl_mp3.as_deref() {
            formats.push(listen_again_variant(fallback, &policy));
        }

        let mut thumbnails = Vec::new();
        if let Some(image) = &episode.imageurl {
            thumbnails.push(Thumbnail {
                id: "imageurl".to_string(),
                url: image.clone(),
                preference: -2,
            });
        }
        if let Some(image) = &episode.imageurl_square {
            thumbnails.push(Thumbnail {
                id: "imageurl_square".to_string(),
                url: image.clone(),
                preference: -1,
            });
        }

        Ok(MediaDescriptor {
            id: episode_id.to_string(),
            title: episode.title.clone(),
            description: episode.shortdesc.clone(),
            tags: vec![],
            live_status: LiveStatus::NotLive,
            protocol: Protocol::Https,
            url: None,
            token: None,
            ext: None,
            duration_seconds: episode.duration,
            thumbnails,
            formats,
        })
    }
}

/// Collapse duplicate stream URLs; the first occurrence wins.
fn dedupe_streams(streams: &[StationStream]) -> Vec<&StationStream> {
    let mut seen = HashSet::new();
    streams
        .iter()
        .filter(|stream| seen.insert(stream.stream_url.as_str()))
        .collect()
}

/// Append the ad-decisioning session key. The `aw_*` namespace belongs to
/// the Adswizz provider sitting in front of the stream edge.
fn with_cache_buster(stream_url: &str, skey: i64) -> String {
    match Url::parse(stream_url) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("aw_0_1st.skey", &skey.to_string());
            url.to_string()
        }
        Err(_) => stream_url.to_string(),
    }
}

/// Container extension from the URL path, if it carries a recognizable one.
fn determine_ext(stream_url: &str) -> Option<String> {
    let url = Url::parse(stream_url).ok()?;
    let last_segment = url.path_segments()?.next_back()?;
    let (_, ext) = last_segment.rsplit_once('.')?;
    if !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

/// Map a probed `Content-Type` to a container extension. Raw AAC is
/// reported as `m4a` to match what the mux pipeline expects.
fn ext_from_content_type(content_type: &str) -> Option<String> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase();
    let ext = match mime.as_str() {
        "audio/aac" | "audio/aacp" | "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" | "application/ogg" => "ogg",
        "application/vnd.apple.mpegurl" | "audio/x-mpegurl" => "m3u8",
        _ => return None,
    };
    Some(ext.to_string())
}

/// One variant of a listen-again episode. The media URLs end in an API
/// path, so the container is the final dot segment of the whole URL.
fn listen_again_variant(media_url: &str, policy: &RankPolicy) -> FormatVariant {
    let ext = media_url
        .rsplit('.')
        .next()
        .unwrap_or(media_url)
        .to_ascii_lowercase();
    let ranking = policy.rank(&VariantFacts {
        quality_tier: None,
        premium: false,
        ext: Some(&ext),
    });
    FormatVariant {
        format_id: ext.clone(),
        url: media_url.to_string(),
        ext: Some(ext.clone()),
        bitrate: None,
        quality: ranking.quality,
        preference: ranking.preference,
        note: None,
        acodec: Some(ext),
        protocol: Protocol::Https,
    }
}

/// Linear scan across all dates; episode volume is small enough that an
/// index would be speculative.
fn find_episode(index: &ListenAgainIndex, episode_id: u64) -> Option<&Episode> {
    index
        .values()
        .flat_map(|episodes| episodes.iter())
        .find(|episode| episode.episodeid == episode_id)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationMeta {
    station_name: String,
    station_genre_tags: Option<Vec<String>>,
    positioning_statement_description: Option<String>,
    station_strapline: Option<String>,
    station_streams: Vec<StationStream>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationStream {
    stream_url: String,
    stream_type: Option<String>,
    stream_quality: String,
    stream_bit_rate: Option<u32>,
    stream_premium: Option<bool>,
}

/// `listenagaindadi` response: episode arrays keyed by broadcast date.
type ListenAgainIndex = HashMap<String, Vec<Episode>>;

#[derive(Debug, Deserialize)]
struct Episode {
    episodeid: u64,
    title: String,
    duration: Option<u64>,
    shortdesc: Option<String>,
    mediaurl: Option<String>,
    mediaurl_mp3: Option<String>,
    imageurl: Option<String>,
    imageurl_square: Option<String>,
}
