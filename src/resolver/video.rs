//! Video playback facade

use tracing::{debug, warn};

use crate::config::PlaybackPreferences;
use crate::errors::ResolveError;
use crate::manifest::SynthesizerRegistry;
use crate::models::rendition::RenditionRef;
use crate::models::{AudioRendition, StreamDescriptor, VideoRendition};
use crate::selection::{
    audio_index, consolidate_audio_tracks, playable_video_renditions, select_video,
};
use crate::sources::{
    build_media_source, build_subtitle_sources, maybe_live_source, PlayableUnit, SourceTag,
};

use super::cache_key::cache_key_of;
use super::{ResolveRequest, ResolvedPlayback, SelectionResult, SourceKind};

/// Resolves a stream descriptor into a video playable unit: one video
/// rendition and, where the video carries no audio of its own, one audio
/// rendition merged alongside, plus subtitle tracks.
pub struct VideoResolver {
    prefs: PlaybackPreferences,
    synthesizers: SynthesizerRegistry,
}

impl VideoResolver {
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

    /// Resolve one descriptor.
    ///
    /// `Ok(None)` means no playable rendition exists; an error is returned
    /// only when renditions were selected but not a single source could be
    /// built from them. A failure limited to one role (video or audio) is
    /// logged and that role dropped.
    pub fn resolve(
        &self,
        descriptor: &StreamDescriptor,
        request: &ResolveRequest,
    ) -> Result<Option<ResolvedPlayback>, ResolveError> {
        let tag = SourceTag::of(descriptor);

        // Live streams play from their direct manifest URL; nothing below
        // applies to them.
        if let Some(live) = maybe_live_source(descriptor, tag.clone()) {
            return Ok(Some(ResolvedPlayback {
                unit: PlayableUnit::Single(live),
                source_kind: SourceKind::LiveStream,
                selection: None,
            }));
        }

        let video_prefs = &self.prefs.video;
        let requested = request
            .resolution_override
            .as_ref()
            .unwrap_or(&video_prefs.default_resolution);
        let (sorted_videos, video_index) = select_video(
            &playable_video_renditions(
                &descriptor.video_renditions,
                &video_prefs.excluded_formats,
            ),
            &playable_video_renditions(
                &descriptor.video_only_renditions,
                &video_prefs.excluded_formats,
            ),
            video_prefs.prefer_video_only,
            video_prefs.show_higher_resolutions,
            video_prefs.preferred_format,
            requested,
        );
        let audio_tracks = consolidate_audio_tracks(&self.prefs.audio, &descriptor.audio_renditions);

        let mut selected_video: Option<VideoRendition> =
            video_index.map(|idx| sorted_videos[idx].clone());
        let selected_audio: Option<AudioRendition> = audio_index(
            &self.prefs.audio,
            &audio_tracks,
            request.audio_track_override.as_deref(),
        )
        .map(|idx| audio_tracks[idx].clone());

        let mut tag = tag;
        tag.video_quality = selected_video
            .as_ref()
            .and_then(|v| v.resolution.clone());
        tag.audio_track = selected_audio
            .as_ref()
            .and_then(|a| a.track_id.clone().or_else(|| a.track_locale.clone()));

        let mut sources = Vec::new();
        let mut first_error: Option<ResolveError> = None;

        if let Some(video) = selected_video.clone() {
            let rendition = RenditionRef::Video(&video);
            let key = cache_key_of(descriptor, rendition);
            match build_media_source(descriptor, rendition, key, tag.clone(), &self.synthesizers)
            {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(error = %e, "unable to build video source, dropping the video role");
                    first_error.get_or_insert(e);
                    selected_video = None;
                }
            }
        }

        // The audio rendition is merged in when the video carries no audio
        // of its own, when an explicit track was requested, or when there is
        // no video at all.
        let audio_wanted = selected_audio.is_some()
            && (selected_video.is_none()
                || selected_video.as_ref().is_some_and(|v| v.video_only)
                || request.audio_track_override.is_some());
        let mut built_audio: Option<AudioRendition> = None;
        if let Some(audio) = selected_audio.as_ref().filter(|_| audio_wanted) {
            let rendition = RenditionRef::Audio(audio);
            let key = cache_key_of(descriptor, rendition);
            match build_media_source(descriptor, rendition, key, tag.clone(), &self.synthesizers)
            {
                Ok(source) => {
                    sources.push(source);
                    built_audio = Some(audio.clone());
                }
                Err(e) => {
                    warn!(error = %e, "unable to build audio source, dropping the audio role");
                    first_error.get_or_insert(e);
                }
            }
        }

        if sources.is_empty() {
            return match first_error {
                Some(e) => Err(e),
                None => Ok(None),
            };
        }

        let source_kind = if selected_video.is_some() && built_audio.is_some() {
            SourceKind::VideoWithSeparatedAudio
        } else {
            SourceKind::VideoWithAudioOrAudioOnly
        };

        sources.extend(build_subtitle_sources(descriptor));
        debug!(
            service = %descriptor.service_id,
            content = %descriptor.content_id,
            sources = sources.len(),
            kind = ?source_kind,
            "resolved video playback"
        );

        let Some(unit) = PlayableUnit::from_sources(sources) else {
            return Ok(None);
        };
        Ok(Some(ResolvedPlayback {
            unit,
            source_kind,
            selection: Some(SelectionResult {
                video: selected_video,
                audio: built_audio,
            }),
        }))
    }
}
