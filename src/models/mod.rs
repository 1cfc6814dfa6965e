//! Core data model for playback resolution
//!
//! These types mirror what the external extraction component hands over for
//! one playable item: a [`StreamDescriptor`] carrying the candidate
//! renditions, the stream kind and any direct live manifest URLs. The
//! resolver never re-validates extraction output; unknown values arrive as
//! `None` and are handled explicitly where they matter.

use serde::{Deserialize, Serialize};

pub mod rendition;

pub use rendition::{
    AudioRendition, AudioTrackType, ByteRange, MediaProfile, RenditionRef, SegmentTimelineEntry,
    SubtitleRendition, VideoRendition,
};

/// Container/encoding format of a rendition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mpeg4,
    V3gpp,
    WebM,
    M4a,
    WebMa,
    Mp3,
    Opus,
    Vtt,
    Ttml,
    Srt,
}

impl MediaFormat {
    /// Short format name used in cache keys and logs.
    pub fn name(&self) -> &'static str {
        match self {
            MediaFormat::Mpeg4 => "MPEG-4",
            MediaFormat::V3gpp => "3GPP",
            MediaFormat::WebM => "WebM",
            MediaFormat::M4a => "m4a",
            MediaFormat::WebMa => "WebM-audio",
            MediaFormat::Mp3 => "MP3",
            MediaFormat::Opus => "opus",
            MediaFormat::Vtt => "WebVTT",
            MediaFormat::Ttml => "TTML",
            MediaFormat::Srt => "SubRip",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            MediaFormat::Mpeg4 => "mp4",
            MediaFormat::V3gpp => "3gp",
            MediaFormat::WebM => "webm",
            MediaFormat::M4a => "m4a",
            MediaFormat::WebMa => "webm",
            MediaFormat::Mp3 => "mp3",
            MediaFormat::Opus => "opus",
            MediaFormat::Vtt => "vtt",
            MediaFormat::Ttml => "ttml",
            MediaFormat::Srt => "srt",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaFormat::Mpeg4 => "video/mp4",
            MediaFormat::V3gpp => "video/3gpp",
            MediaFormat::WebM => "video/webm",
            MediaFormat::M4a => "audio/mp4",
            MediaFormat::WebMa => "audio/webm",
            MediaFormat::Mp3 => "audio/mpeg",
            MediaFormat::Opus => "audio/opus",
            MediaFormat::Vtt => "text/vtt",
            MediaFormat::Ttml => "application/ttml+xml",
            MediaFormat::Srt => "text/srt",
        }
    }
}

/// How a rendition's bytes are served.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    #[serde(rename = "progressive")]
    ProgressiveHttp,
    Dash,
    Hls,
    #[serde(rename = "smoothstreaming")]
    SmoothStreaming,
    Torrent,
}

impl DeliveryMethod {
    pub fn name(&self) -> &'static str {
        match self {
            DeliveryMethod::ProgressiveHttp => "progressive",
            DeliveryMethod::Dash => "dash",
            DeliveryMethod::Hls => "hls",
            DeliveryMethod::SmoothStreaming => "smoothstreaming",
            DeliveryMethod::Torrent => "torrent",
        }
    }
}

/// A rendition's raw content: either a ready-to-fetch URL or a non-URL
/// template payload (manifest text, playlist text or a segment base URL,
/// depending on the delivery method).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamContent {
    Url(String),
    Template(String),
}

impl StreamContent {
    pub fn is_url(&self) -> bool {
        matches!(self, StreamContent::Url(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            StreamContent::Url(s) | StreamContent::Template(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

/// Broad lifecycle classification of the stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    #[serde(rename = "ondemand")]
    OnDemand,
    Live,
    #[serde(rename = "audiolive")]
    AudioLive,
    #[serde(rename = "endedlive")]
    EndedLive,
}

impl StreamKind {
    /// Currently-live streams play from a direct manifest URL; an ended live
    /// stream is replayed like on-demand content.
    pub fn is_live(&self) -> bool {
        matches!(self, StreamKind::Live | StreamKind::AudioLive)
    }
}

/// Extractor-provided description of one playable item.
///
/// Immutable input to the resolver: created per playback request, read-only
/// here, discarded by the caller when playback ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub service_id: String,
    pub content_id: String,
    pub title: Option<String>,
    pub kind: StreamKind,
    /// Total duration in seconds; 0 for indefinite live streams.
    pub duration_secs: u64,
    pub video_renditions: Vec<VideoRendition>,
    pub video_only_renditions: Vec<VideoRendition>,
    pub audio_renditions: Vec<AudioRendition>,
    pub subtitle_renditions: Vec<SubtitleRendition>,
    /// Direct live HLS manifest URL, when the service provides one.
    pub hls_url: Option<String>,
    /// Direct live DASH manifest URL, when the service provides one.
    pub dash_url: Option<String>,
}

impl StreamDescriptor {
    pub fn new(
        service_id: impl Into<String>,
        content_id: impl Into<String>,
        kind: StreamKind,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            content_id: content_id.into(),
            title: None,
            kind,
            duration_secs: 0,
            video_renditions: Vec::new(),
            video_only_renditions: Vec::new(),
            audio_renditions: Vec::new(),
            subtitle_renditions: Vec::new(),
            hls_url: None,
            dash_url: None,
        }
    }
}
