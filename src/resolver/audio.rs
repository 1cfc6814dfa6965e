//! Audio-only playback facade

use tracing::{debug, warn};

use crate::config::PlaybackPreferences;
use crate::errors::ResolveError;
use crate::manifest::SynthesizerRegistry;
use crate::models::rendition::RenditionRef;
use crate::models::StreamDescriptor;
use crate::selection::{
    audio_index, best_video_index, consolidate_audio_tracks, playable_video_renditions,
    sorted_video_renditions,
};
use crate::sources::{build_media_source, maybe_live_source, PlayableUnit, SourceTag};

use super::cache_key::cache_key_of;
use super::{ResolveRequest, ResolvedPlayback, SelectionResult, SourceKind};

/// Resolves a stream descriptor into a single audio-oriented source.
///
/// True audio renditions are preferred; when a service never separates
/// audio from video, the best playable muxed video rendition is used
/// instead so background playback still works.
pub struct AudioResolver {
    prefs: PlaybackPreferences,
    synthesizers: SynthesizerRegistry,
}

impl AudioResolver {
    pub fn new(prefs: PlaybackPreferences) -> Self {
        Self::with_registry(prefs, SynthesizerRegistry::with_default_services())
    }

    pub fn with_registry(prefs: PlaybackPreferences, synthesizers: SynthesizerRegistry) -> Self {
        Self {
            prefs,
            synthesizers,
        }
    }

    pub fn preferences(&self) -> &PlaybackPreferences {
        &self.prefs
    }

    /// Resolve one descriptor to an audio playable unit.
    ///
    /// `Ok(None)` means the descriptor has nothing playable at all; an
    /// error is returned only when a rendition was selected but no source
    /// could be built from any candidate.
    pub fn resolve(
        &self,
        descriptor: &StreamDescriptor,
        request: &ResolveRequest,
    ) -> Result<Option<ResolvedPlayback>, ResolveError> {
        let mut tag = SourceTag::of(descriptor);

        if let Some(live) = maybe_live_source(descriptor, tag.clone()) {
            return Ok(Some(ResolvedPlayback {
                unit: PlayableUnit::Single(live),
                source_kind: SourceKind::LiveStream,
                selection: None,
            }));
        }

        let mut first_error: Option<ResolveError> = None;

        let audio_tracks = consolidate_audio_tracks(&self.prefs.audio, &descriptor.audio_renditions);
        if let Some(idx) = audio_index(
            &self.prefs.audio,
            &audio_tracks,
            request.audio_track_override.as_deref(),
        ) {
            let audio = audio_tracks[idx].clone();
            tag.audio_track = audio.track_id.clone().or_else(|| audio.track_locale.clone());
            let rendition = RenditionRef::Audio(&audio);
            let key = cache_key_of(descriptor, rendition);
            match build_media_source(descriptor, rendition, key, tag.clone(), &self.synthesizers)
            {
                Ok(source) => {
                    debug!(
                        service = %descriptor.service_id,
                        content = %descriptor.content_id,
                        "resolved audio playback from audio rendition"
                    );
                    return Ok(Some(ResolvedPlayback {
                        unit: PlayableUnit::Single(source),
                        source_kind: SourceKind::VideoWithAudioOrAudioOnly,
                        selection: Some(SelectionResult {
                            video: None,
                            audio: Some(audio),
                        }),
                    }));
                }
                Err(e) => {
                    warn!(error = %e, "unable to build audio source, trying video fallback");
                    first_error.get_or_insert(e);
                }
            }
        }

        // No separate audio: fall back to the best muxed video rendition and
        // play it as audio.
        let video_prefs = &self.prefs.video;
        let sorted_videos = sorted_video_renditions(
            video_prefs.preferred_format,
            video_prefs.show_higher_resolutions,
            &playable_video_renditions(
                &descriptor.video_renditions,
                &video_prefs.excluded_formats,
            ),
            &[],
            false,
            false,
        );
        if let Some(idx) = best_video_index(&sorted_videos, video_prefs.preferred_format) {
            let video = sorted_videos[idx].clone();
            tag.audio_track = None;
            tag.video_quality = video.resolution.clone();
            let rendition = RenditionRef::Video(&video);
            let key = cache_key_of(descriptor, rendition);
            match build_media_source(descriptor, rendition, key, tag, &self.synthesizers) {
                Ok(source) => {
                    debug!(
                        service = %descriptor.service_id,
                        content = %descriptor.content_id,
                        "resolved audio playback from muxed video rendition"
                    );
                    return Ok(Some(ResolvedPlayback {
                        unit: PlayableUnit::Single(source),
                        source_kind: SourceKind::VideoWithAudioOrAudioOnly,
                        selection: Some(SelectionResult {
                            video: Some(video),
                            audio: None,
                        }),
                    }));
                }
                Err(e) => {
                    warn!(error = %e, "unable to build audio-oriented video source");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
