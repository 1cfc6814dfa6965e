//! Rendition types
//!
//! One rendition is one concrete encoded option for a track of a stream: a
//! specific resolution, bitrate and container served over a specific
//! delivery method. Video, audio and subtitle renditions are distinct types
//! joined by the closed [`RenditionRef`] variant where code needs to treat
//! them uniformly.

use serde::{Deserialize, Serialize};

use super::{DeliveryMethod, MediaFormat, StreamContent};

/// Byte range inside a progressive resource, both ends inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// One entry of an on-the-fly segment timeline: a segment duration and how
/// many additional times it repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentTimelineEntry {
    pub duration_ms: u32,
    #[serde(default)]
    pub repeat_count: u32,
}

/// Codec/segment metadata attached to a rendition by the extractor.
///
/// Manifest synthesis reads from here; every field is optional and each
/// synthesis mode checks for the fields it needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaProfile {
    pub codec: Option<String>,
    /// Bits per second.
    pub bitrate: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<u32>,
    pub audio_channels: Option<u32>,
    pub sample_rate: Option<u32>,
    /// Initialization byte range of a progressive resource.
    pub init_range: Option<ByteRange>,
    /// Segment index byte range of a progressive resource.
    pub index_range: Option<ByteRange>,
    /// Target segment duration of a post-live replay, in seconds.
    pub target_duration_secs: Option<u32>,
    /// Segment timeline of an on-the-fly stream.
    #[serde(default)]
    pub segment_timeline: Vec<SegmentTimelineEntry>,
}

/// Kind of audio track relative to the original production audio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioTrackType {
    Original,
    Dubbed,
    Descriptive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRendition {
    /// Stable rendition id from the extractor, absent when unknown.
    pub id: Option<String>,
    pub format: Option<MediaFormat>,
    pub delivery: DeliveryMethod,
    pub content: StreamContent,
    pub manifest_url: Option<String>,
    /// Resolution label such as "720p" or "1080p60"; `None` when unknown.
    pub resolution: Option<String>,
    pub video_only: bool,
    pub profile: Option<MediaProfile>,
}

impl VideoRendition {
    pub fn resolution_label(&self) -> &str {
        self.resolution.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioRendition {
    /// Stable rendition id from the extractor, absent when unknown.
    pub id: Option<String>,
    pub format: Option<MediaFormat>,
    pub delivery: DeliveryMethod,
    pub content: StreamContent,
    pub manifest_url: Option<String>,
    /// Average bitrate in bits per second; `None` when unknown.
    pub average_bitrate: Option<u32>,
    pub track_id: Option<String>,
    /// BCP-47-ish language code of the track ("en", "de-DE").
    pub track_locale: Option<String>,
    pub track_type: Option<AudioTrackType>,
    pub profile: Option<MediaProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubtitleRendition {
    pub format: Option<MediaFormat>,
    pub delivery: DeliveryMethod,
    pub content: StreamContent,
    pub language: String,
    /// Machine-generated transcripts are tagged as a describing role rather
    /// than a caption so players can distinguish them.
    pub auto_generated: bool,
}

/// Borrowed view over a video or audio rendition for code paths that handle
/// either role the same way (cache keys, generic source building).
#[derive(Debug, Clone, Copy)]
pub enum RenditionRef<'a> {
    Video(&'a VideoRendition),
    Audio(&'a AudioRendition),
}

impl<'a> RenditionRef<'a> {
    pub fn id(&self) -> Option<&str> {
        match self {
            RenditionRef::Video(v) => v.id.as_deref(),
            RenditionRef::Audio(a) => a.id.as_deref(),
        }
    }

    pub fn format(&self) -> Option<MediaFormat> {
        match self {
            RenditionRef::Video(v) => v.format,
            RenditionRef::Audio(a) => a.format,
        }
    }

    pub fn delivery(&self) -> DeliveryMethod {
        match self {
            RenditionRef::Video(v) => v.delivery,
            RenditionRef::Audio(a) => a.delivery,
        }
    }

    pub fn content(&self) -> &'a StreamContent {
        match self {
            RenditionRef::Video(v) => &v.content,
            RenditionRef::Audio(a) => &a.content,
        }
    }

    pub fn manifest_url(&self) -> Option<&str> {
        match self {
            RenditionRef::Video(v) => v.manifest_url.as_deref(),
            RenditionRef::Audio(a) => a.manifest_url.as_deref(),
        }
    }

    pub fn profile(&self) -> Option<&'a MediaProfile> {
        match self {
            RenditionRef::Video(v) => v.profile.as_ref(),
            RenditionRef::Audio(a) => a.profile.as_ref(),
        }
    }

    pub fn is_video_only(&self) -> bool {
        matches!(self, RenditionRef::Video(v) if v.video_only)
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, RenditionRef::Audio(_))
    }
}
