//! # playback-resolver
//!
//! Playback resolution for extractor-fed media streams: given a
//! [`StreamDescriptor`](models::StreamDescriptor) describing the available
//! renditions of one stream, deterministically select the best video and/or
//! audio rendition, derive a cache-stable identity for each, synthesize a
//! DASH manifest where a service only hands back a content template, and
//! assemble the playable unit an external adaptive playback engine consumes.
//!
//! Resolution is synchronous, performs no network I/O and keeps no mutable
//! state between calls: a resolver can be shared freely across threads and
//! invoked concurrently for different descriptors. Per-call overrides (a
//! requested resolution or audio track) travel in an explicit
//! [`ResolveRequest`](resolver::ResolveRequest).

pub mod config;
pub mod errors;
pub mod manifest;
pub mod models;
pub mod resolver;
pub mod selection;
pub mod sources;
pub mod utils;

pub use config::{AudioPreferences, PlaybackPreferences, ResolutionPreference, VideoPreferences};
pub use errors::{ManifestError, RenditionContext, ResolveError};
pub use manifest::{ManifestSynthesizer, SynthesisMode, SynthesizerRegistry};
pub use models::{
    AudioRendition, AudioTrackType, DeliveryMethod, MediaFormat, MediaProfile, StreamContent,
    StreamDescriptor, StreamKind, SubtitleRendition, VideoRendition,
};
pub use resolver::{
    cache_key_of, AudioResolver, ResolveRequest, ResolvedPlayback, SelectionResult, SourceKind,
    VideoResolver,
};
pub use sources::{MediaSourceSpec, PlayableUnit, SourceTag, TimedTextRole};
