//! Media source construction
//!
//! Builds the final playable description handed to the external playback
//! engine: one [`MediaSourceSpec`] per role plus any subtitle tracks,
//! wrapped into a [`PlayableUnit`]. The engine maps each spec variant onto
//! its own delivery-method-specific factory; this module only decides what
//! to build and assembles manifest text where a rendition arrives as a
//! template instead of a ready URL.

use tracing::{debug, warn};
use url::Url;

use crate::errors::{ManifestError, RenditionContext, ResolveError};
use crate::manifest::{ManifestSynthesizer, SynthesisMode, SynthesizerRegistry};
use crate::manifest::{validate_hls_playlist, validate_xml_manifest};
use crate::models::rendition::RenditionRef;
use crate::models::{
    DeliveryMethod, MediaFormat, StreamContent, StreamDescriptor, StreamKind,
};
use crate::selection::url_and_non_torrent_subtitles;

/// Role of a timed-text track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedTextRole {
    Caption,
    /// Machine-generated transcript describing the audio/video.
    Description,
}

/// Opaque playback metadata attached to every primary source, enough for
/// the engine to report what is currently playing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTag {
    pub service_id: String,
    pub content_id: String,
    pub title: Option<String>,
    /// Resolution label of the selected video rendition, when any.
    pub video_quality: Option<String>,
    /// Track id or locale of the selected audio rendition, when any.
    pub audio_track: Option<String>,
}

impl SourceTag {
    pub fn of(descriptor: &StreamDescriptor) -> Self {
        Self {
            service_id: descriptor.service_id.clone(),
            content_id: descriptor.content_id.clone(),
            title: descriptor.title.clone(),
            video_quality: None,
            audio_track: None,
        }
    }
}

/// Description of one buildable media source.
///
/// Each variant corresponds to one factory of the external playback engine:
/// a URI-or-raw-manifest, an opaque metadata tag and a cache key.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSourceSpec {
    Progressive {
        url: String,
        cache_key: String,
        tag: SourceTag,
    },
    Dash {
        url: String,
        cache_key: String,
        tag: SourceTag,
    },
    /// DASH played from locally-held manifest text instead of a URL.
    DashManifest {
        manifest: String,
        base_uri: Option<String>,
        cache_key: String,
        tag: SourceTag,
    },
    Hls {
        url: String,
        cache_key: String,
        tag: SourceTag,
    },
    /// HLS played from a locally-held playlist string.
    HlsPlaylist {
        playlist: String,
        base_uri: Option<String>,
        cache_key: String,
        tag: SourceTag,
    },
    SmoothStreaming {
        url: String,
        cache_key: String,
        tag: SourceTag,
    },
    /// SmoothStreaming played from locally-held manifest text.
    SmoothStreamingManifest {
        manifest: String,
        base_uri: Option<String>,
        cache_key: String,
        tag: SourceTag,
    },
    LiveHls {
        url: String,
        tag: SourceTag,
    },
    LiveDash {
        url: String,
        tag: SourceTag,
    },
    TimedText {
        url: String,
        language: String,
        role: TimedTextRole,
        format: MediaFormat,
    },
}

/// The final output of resolution: a single source, or an ordered merge of
/// independent sources played together.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayableUnit {
    Single(MediaSourceSpec),
    Merged(Vec<MediaSourceSpec>),
}

impl PlayableUnit {
    /// Wrap built sources; a lone source stays unwrapped.
    pub fn from_sources(mut sources: Vec<MediaSourceSpec>) -> Option<Self> {
        match sources.len() {
            0 => None,
            1 => sources.pop().map(PlayableUnit::Single),
            _ => Some(PlayableUnit::Merged(sources)),
        }
    }

    pub fn sources(&self) -> Vec<&MediaSourceSpec> {
        match self {
            PlayableUnit::Single(source) => vec![source],
            PlayableUnit::Merged(sources) => sources.iter().collect(),
        }
    }
}

fn nonempty_url(
    descriptor: &StreamDescriptor,
    rendition: RenditionRef<'_>,
) -> Result<String, ResolveError> {
    let content = rendition.content();
    if content.is_empty() {
        return Err(ResolveError::empty_content(RenditionContext::new(
            descriptor, rendition,
        )));
    }
    match content {
        StreamContent::Url(url) => Ok(url.clone()),
        StreamContent::Template(_) => Err(ResolveError::unsupported_delivery(
            RenditionContext::new(descriptor, rendition),
        )),
    }
}

/// Build a live source from the descriptor's direct manifest URLs.
///
/// Only applies to live stream kinds; the HLS URL wins over the DASH URL.
/// Malformed URLs are logged and ignored so resolution can fall through to
/// the rendition-based paths.
pub fn maybe_live_source(descriptor: &StreamDescriptor, tag: SourceTag) -> Option<MediaSourceSpec> {
    if !descriptor.kind.is_live() {
        return None;
    }
    let candidates = [
        (descriptor.hls_url.as_deref(), true),
        (descriptor.dash_url.as_deref(), false),
    ];
    for (candidate, is_hls) in candidates {
        let Some(raw) = candidate.filter(|u| !u.trim().is_empty()) else {
            continue;
        };
        match Url::parse(raw) {
            Ok(_) => {
                debug!(
                    service = %descriptor.service_id,
                    content = %descriptor.content_id,
                    hls = is_hls,
                    "resolved live stream from direct manifest url"
                );
                let url = raw.to_string();
                return Some(if is_hls {
                    MediaSourceSpec::LiveHls { url, tag }
                } else {
                    MediaSourceSpec::LiveDash { url, tag }
                });
            }
            Err(e) => {
                warn!(
                    service = %descriptor.service_id,
                    content = %descriptor.content_id,
                    error = %e,
                    "invalid live manifest url, falling back to standard sources"
                );
            }
        }
    }
    None
}

/// Build the source for one selected rendition.
///
/// Services with a registered manifest synthesizer take the template path;
/// everything else dispatches directly on the delivery method.
pub fn build_media_source(
    descriptor: &StreamDescriptor,
    rendition: RenditionRef<'_>,
    cache_key: String,
    tag: SourceTag,
    registry: &SynthesizerRegistry,
) -> Result<MediaSourceSpec, ResolveError> {
    if let Some(synthesizer) = registry.get(&descriptor.service_id) {
        return build_template_source(
            synthesizer.as_ref(),
            descriptor,
            rendition,
            cache_key,
            tag,
        );
    }

    match rendition.delivery() {
        DeliveryMethod::ProgressiveHttp => {
            let url = nonempty_url(descriptor, rendition)?;
            Ok(MediaSourceSpec::Progressive { url, cache_key, tag })
        }
        DeliveryMethod::Dash => match rendition.content() {
            StreamContent::Url(_) => {
                let url = nonempty_url(descriptor, rendition)?;
                Ok(MediaSourceSpec::Dash { url, cache_key, tag })
            }
            StreamContent::Template(manifest) => {
                validate_xml_manifest(manifest).map_err(|e| {
                    ResolveError::manifest(RenditionContext::new(descriptor, rendition), e)
                })?;
                Ok(MediaSourceSpec::DashManifest {
                    manifest: manifest.clone(),
                    base_uri: rendition.manifest_url().map(str::to_string),
                    cache_key,
                    tag,
                })
            }
        },
        DeliveryMethod::Hls => match rendition.content() {
            StreamContent::Url(_) => {
                let url = nonempty_url(descriptor, rendition)?;
                Ok(MediaSourceSpec::Hls { url, cache_key, tag })
            }
            StreamContent::Template(playlist) => {
                validate_hls_playlist(playlist).map_err(|e| {
                    ResolveError::manifest(RenditionContext::new(descriptor, rendition), e)
                })?;
                Ok(MediaSourceSpec::HlsPlaylist {
                    playlist: playlist.clone(),
                    base_uri: rendition.manifest_url().map(str::to_string),
                    cache_key,
                    tag,
                })
            }
        },
        DeliveryMethod::SmoothStreaming => match rendition.content() {
            StreamContent::Url(_) => {
                let url = nonempty_url(descriptor, rendition)?;
                Ok(MediaSourceSpec::SmoothStreaming { url, cache_key, tag })
            }
            StreamContent::Template(manifest) => {
                validate_xml_manifest(manifest).map_err(|e| {
                    ResolveError::manifest(RenditionContext::new(descriptor, rendition), e)
                })?;
                Ok(MediaSourceSpec::SmoothStreamingManifest {
                    manifest: manifest.clone(),
                    base_uri: rendition.manifest_url().map(str::to_string),
                    cache_key,
                    tag,
                })
            }
        },
        DeliveryMethod::Torrent => Err(ResolveError::unsupported_delivery(
            RenditionContext::new(descriptor, rendition),
        )),
    }
}

/// Template-service branch: delivery methods that only carry a content
/// template go through manifest synthesis, with best-effort fallback where
/// a non-synthesized path exists.
fn build_template_source(
    synthesizer: &dyn ManifestSynthesizer,
    descriptor: &StreamDescriptor,
    rendition: RenditionRef<'_>,
    cache_key: String,
    tag: SourceTag,
) -> Result<MediaSourceSpec, ResolveError> {
    let duration = descriptor.duration_secs;
    match descriptor.kind {
        StreamKind::EndedLive => {
            // The content of an ended live stream is its last segment window;
            // there is no non-synthesized path to fall back to.
            let manifest = synthesizer
                .synthesize(SynthesisMode::PostLiveDvr, rendition, duration)
                .map_err(|e| {
                    ResolveError::manifest(RenditionContext::new(descriptor, rendition), e)
                })?;
            Ok(manifest_source(manifest, rendition, cache_key, tag))
        }
        StreamKind::OnDemand => match rendition.delivery() {
            DeliveryMethod::ProgressiveHttp => {
                if rendition.is_video_only() || rendition.is_audio() {
                    match synthesizer.synthesize(SynthesisMode::Progressive, rendition, duration)
                    {
                        Ok(manifest) => {
                            Ok(manifest_source(manifest, rendition, cache_key, tag))
                        }
                        Err(e) => {
                            warn!(
                                service = %descriptor.service_id,
                                content = %descriptor.content_id,
                                error = %e,
                                "manifest synthesis failed for progressive rendition, \
                                 falling back to a plain progressive source"
                            );
                            let url = nonempty_url(descriptor, rendition)?;
                            Ok(MediaSourceSpec::Progressive { url, cache_key, tag })
                        }
                    }
                } else {
                    // Muxed progressive renditions play directly.
                    let url = nonempty_url(descriptor, rendition)?;
                    Ok(MediaSourceSpec::Progressive { url, cache_key, tag })
                }
            }
            DeliveryMethod::Dash => match rendition.content() {
                StreamContent::Url(_) => {
                    let url = nonempty_url(descriptor, rendition)?;
                    Ok(MediaSourceSpec::Dash { url, cache_key, tag })
                }
                StreamContent::Template(_) => {
                    // A non-URL DASH rendition of an on-demand stream is an
                    // OTF template; without synthesis it is structurally
                    // unplayable.
                    let manifest = synthesizer
                        .synthesize(SynthesisMode::Otf, rendition, duration)
                        .map_err(|e| {
                            ResolveError::manifest(
                                RenditionContext::new(descriptor, rendition),
                                e,
                            )
                        })?;
                    Ok(manifest_source(manifest, rendition, cache_key, tag))
                }
            },
            DeliveryMethod::Hls => {
                let url = nonempty_url(descriptor, rendition)?;
                Ok(MediaSourceSpec::Hls { url, cache_key, tag })
            }
            DeliveryMethod::SmoothStreaming | DeliveryMethod::Torrent => Err(
                ResolveError::unsupported_delivery(RenditionContext::new(descriptor, rendition)),
            ),
        },
        StreamKind::Live | StreamKind::AudioLive => Err(ResolveError::manifest(
            RenditionContext::new(descriptor, rendition),
            ManifestError::UnsupportedMode { mode: "live" },
        )),
    }
}

fn manifest_source(
    manifest: String,
    rendition: RenditionRef<'_>,
    cache_key: String,
    tag: SourceTag,
) -> MediaSourceSpec {
    MediaSourceSpec::DashManifest {
        manifest,
        // The synthesized manifest resolves segments relative to the
        // rendition's own content URL.
        base_uri: Some(rendition.content().as_str().to_string()),
        cache_key,
        tag,
    }
}

/// Independent timed-text sources for every supported subtitle rendition.
pub fn build_subtitle_sources(descriptor: &StreamDescriptor) -> Vec<MediaSourceSpec> {
    url_and_non_torrent_subtitles(&descriptor.subtitle_renditions)
        .into_iter()
        .filter_map(|subtitle| {
            let format = subtitle.format?;
            let role = if subtitle.auto_generated {
                TimedTextRole::Description
            } else {
                TimedTextRole::Caption
            };
            Some(MediaSourceSpec::TimedText {
                url: subtitle.content.as_str().to_string(),
                language: subtitle.language.clone(),
                role,
                format,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rendition::{SubtitleRendition, VideoRendition};

    fn descriptor() -> StreamDescriptor {
        StreamDescriptor::new("peertube", "abc123", StreamKind::OnDemand)
    }

    fn tag() -> SourceTag {
        SourceTag::of(&descriptor())
    }

    fn dash_template(manifest: &str) -> VideoRendition {
        VideoRendition {
            id: Some("v1".to_string()),
            format: Some(MediaFormat::Mpeg4),
            delivery: DeliveryMethod::Dash,
            content: StreamContent::Template(manifest.to_string()),
            manifest_url: Some("https://example.com/manifest.mpd".to_string()),
            resolution: Some("720p".to_string()),
            video_only: false,
            profile: None,
        }
    }

    #[test]
    fn test_dash_template_is_validated() {
        let registry = SynthesizerRegistry::new();
        let good = dash_template("<MPD><Period/></MPD>");
        let built = build_media_source(
            &descriptor(),
            RenditionRef::Video(&good),
            "key".to_string(),
            tag(),
            &registry,
        )
        .unwrap();
        assert!(matches!(built, MediaSourceSpec::DashManifest { .. }));

        let bad = dash_template("<MPD><Period></MPD>");
        let err = build_media_source(
            &descriptor(),
            RenditionRef::Video(&bad),
            "key".to_string(),
            tag(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Manifest { .. }));
    }

    #[test]
    fn test_non_url_progressive_is_rejected() {
        let registry = SynthesizerRegistry::new();
        let mut rendition = dash_template("ignored");
        rendition.delivery = DeliveryMethod::ProgressiveHttp;
        let err = build_media_source(
            &descriptor(),
            RenditionRef::Video(&rendition),
            "key".to_string(),
            tag(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::UnsupportedDelivery { .. }));
    }

    #[test]
    fn test_empty_url_content_is_rejected() {
        let registry = SynthesizerRegistry::new();
        let mut rendition = dash_template("");
        rendition.delivery = DeliveryMethod::ProgressiveHttp;
        rendition.content = StreamContent::Url("  ".to_string());
        let err = build_media_source(
            &descriptor(),
            RenditionRef::Video(&rendition),
            "key".to_string(),
            tag(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::EmptyContent { .. }));
    }

    #[test]
    fn test_live_source_prefers_hls() {
        let mut live = StreamDescriptor::new("peertube", "live1", StreamKind::Live);
        live.hls_url = Some("https://example.com/live.m3u8".to_string());
        live.dash_url = Some("https://example.com/live.mpd".to_string());
        let source = maybe_live_source(&live, SourceTag::of(&live)).unwrap();
        assert!(matches!(source, MediaSourceSpec::LiveHls { .. }));

        live.hls_url = None;
        let source = maybe_live_source(&live, SourceTag::of(&live)).unwrap();
        assert!(matches!(source, MediaSourceSpec::LiveDash { .. }));
    }

    #[test]
    fn test_live_source_ignores_on_demand() {
        let mut on_demand = descriptor();
        on_demand.hls_url = Some("https://example.com/live.m3u8".to_string());
        assert!(maybe_live_source(&on_demand, tag()).is_none());
    }

    #[test]
    fn test_subtitle_sources_roles() {
        let mut d = descriptor();
        d.subtitle_renditions = vec![
            SubtitleRendition {
                format: Some(MediaFormat::Vtt),
                delivery: DeliveryMethod::ProgressiveHttp,
                content: StreamContent::Url("https://example.com/en.vtt".to_string()),
                language: "en".to_string(),
                auto_generated: false,
            },
            SubtitleRendition {
                format: Some(MediaFormat::Vtt),
                delivery: DeliveryMethod::ProgressiveHttp,
                content: StreamContent::Url("https://example.com/en-auto.vtt".to_string()),
                language: "en".to_string(),
                auto_generated: true,
            },
            // Non-URL subtitle payloads are unsupported.
            SubtitleRendition {
                format: Some(MediaFormat::Ttml),
                delivery: DeliveryMethod::ProgressiveHttp,
                content: StreamContent::Template("<tt/>".to_string()),
                language: "de".to_string(),
                auto_generated: false,
            },
        ];
        let sources = build_subtitle_sources(&d);
        assert_eq!(sources.len(), 2);
        assert!(matches!(
            sources[0],
            MediaSourceSpec::TimedText {
                role: TimedTextRole::Caption,
                ..
            }
        ));
        assert!(matches!(
            sources[1],
            MediaSourceSpec::TimedText {
                role: TimedTextRole::Description,
                ..
            }
        ));
    }
}
