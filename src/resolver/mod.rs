//! Resolution facades
//!
//! Orchestrate filtering, selection, cache-key derivation and source
//! building for the two playback use cases: video playback (video plus
//! audio) and audio-only playback (audio, with a video fallback for
//! services that never separate audio).
//!
//! Transient per-call preferences travel in an explicit [`ResolveRequest`]
//! instead of resolver fields, so a resolver value can be shared across
//! concurrent resolutions of different descriptors without ordering
//! requirements between configuration and `resolve()`.

use crate::config::ResolutionPreference;
use crate::models::{AudioRendition, VideoRendition};
use crate::sources::PlayableUnit;

pub mod audio;
pub mod cache_key;
pub mod video;

pub use audio::AudioResolver;
pub use cache_key::cache_key_of;
pub use video::VideoResolver;

/// Classification of the unit a resolution produced. The UI layer adapts
/// its controls to this (a muxed source cannot offer audio track
/// switching).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Built directly from a live manifest URL.
    LiveStream,
    /// Independent video and audio sources merged together.
    VideoWithSeparatedAudio,
    /// A single muxed source, or an audio-only source.
    VideoWithAudioOrAudioOnly,
}

/// Per-call overrides, passed explicitly into `resolve()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Resolution requested for this playback, overriding the configured
    /// default.
    pub resolution_override: Option<ResolutionPreference>,
    /// Audio track id requested for this playback.
    pub audio_track_override: Option<String>,
}

/// The renditions a resolution actually built sources for.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    pub video: Option<VideoRendition>,
    pub audio: Option<AudioRendition>,
}

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlayback {
    pub unit: PlayableUnit,
    pub source_kind: SourceKind,
    /// `None` for live streams, which are built from a direct manifest URL
    /// without rendition selection.
    pub selection: Option<SelectionResult>,
}
