//! Manifest synthesis
//!
//! Some services hand back a content template instead of a ready playlist:
//! a bare progressive URL that should be played through the DASH pipeline, a
//! segment base URL of a stream still being transcoded (OTF), or the last
//! segment window of an ended live stream. This module turns those
//! templates plus the rendition's [`MediaProfile`] metadata into manifest
//! text.
//!
//! Synthesis is pluggable per service: the resolver consults a
//! [`SynthesizerRegistry`] keyed by service id, so new service quirks get a
//! new [`ManifestSynthesizer`] implementation instead of another branch in
//! the source builder.

use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::ManifestError;
use crate::models::rendition::RenditionRef;
use crate::models::MediaProfile;

pub mod mpd;

use mpd::{
    AdaptationSet, AudioChannelConfiguration, Initialization, Mpd, Representation, SegmentBase,
    SegmentTemplate, SegmentTimeline, TimelineSegment,
};

/// Which manifest shape to synthesize, determined by the stream kind and
/// delivery method of the rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// Re-describe a single progressive URL as a one-segment DASH manifest.
    Progressive,
    /// On-the-fly stream: segment timeline over a segment base URL.
    Otf,
    /// Ended live stream replayed as a fixed-duration segment window.
    PostLiveDvr,
}

impl SynthesisMode {
    pub fn name(&self) -> &'static str {
        match self {
            SynthesisMode::Progressive => "progressive",
            SynthesisMode::Otf => "otf",
            SynthesisMode::PostLiveDvr => "post-live-dvr",
        }
    }
}

/// Synthesizes manifest text for template-delivered renditions of one
/// service.
pub trait ManifestSynthesizer: Send + Sync {
    fn synthesize(
        &self,
        mode: SynthesisMode,
        rendition: RenditionRef<'_>,
        total_duration_secs: u64,
    ) -> Result<String, ManifestError>;
}

/// Per-service synthesizer lookup.
#[derive(Clone, Default)]
pub struct SynthesizerRegistry {
    by_service: HashMap<String, Arc<dyn ManifestSynthesizer>>,
}

impl SynthesizerRegistry {
    /// An empty registry: every service takes the generic, non-synthesizing
    /// source-building path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock template-DASH synthesizer bound to the one
    /// service currently known to need it.
    pub fn with_default_services() -> Self {
        let mut registry = Self::new();
        registry.register("youtube", Arc::new(TemplateDashSynthesizer));
        registry
    }

    pub fn register(
        &mut self,
        service_id: impl Into<String>,
        synthesizer: Arc<dyn ManifestSynthesizer>,
    ) {
        self.by_service.insert(service_id.into(), synthesizer);
    }

    pub fn get(&self, service_id: &str) -> Option<&Arc<dyn ManifestSynthesizer>> {
        self.by_service.get(service_id)
    }
}

/// Stock synthesizer producing the three DASH shapes from a rendition's
/// media profile.
pub struct TemplateDashSynthesizer;

impl TemplateDashSynthesizer {
    fn representation(
        rendition: RenditionRef<'_>,
        profile: &MediaProfile,
    ) -> Result<Representation, ManifestError> {
        let codecs = profile
            .codec
            .clone()
            .ok_or_else(|| ManifestError::missing_field("codec"))?;
        let bandwidth = profile
            .bitrate
            .ok_or_else(|| ManifestError::missing_field("bitrate"))?;
        let id = rendition.id().unwrap_or("0").to_string();

        let mut representation = Representation {
            id,
            codecs,
            bandwidth,
            width: None,
            height: None,
            frame_rate: None,
            audio_sampling_rate: None,
            audio_channel_configuration: None,
            base_url: None,
            segment_base: None,
            segment_template: None,
        };
        if rendition.is_audio() {
            representation.audio_sampling_rate = profile.sample_rate;
            representation.audio_channel_configuration = Some(
                AudioChannelConfiguration::channels(profile.audio_channels.unwrap_or(2)),
            );
        } else {
            representation.width = profile.width;
            representation.height = profile.height;
            representation.frame_rate = profile.frame_rate;
        }
        Ok(representation)
    }

    fn mime_type(rendition: RenditionRef<'_>) -> String {
        match rendition.format() {
            Some(format) => format.mime_type().to_string(),
            None if rendition.is_audio() => "audio/mp4".to_string(),
            None => "video/mp4".to_string(),
        }
    }

    fn segment_url(base: &str, query: &str) -> String {
        if base.contains('?') {
            format!("{base}&{query}")
        } else {
            format!("{base}?{query}")
        }
    }

    fn segment_template(
        base_url: &str,
        segments: Vec<TimelineSegment>,
    ) -> SegmentTemplate {
        SegmentTemplate {
            start_number: 1,
            timescale: 1000,
            initialization: Self::segment_url(base_url, "sq=0"),
            media: Self::segment_url(base_url, "sq=$Number$"),
            segment_timeline: SegmentTimeline { segments },
        }
    }
}

impl ManifestSynthesizer for TemplateDashSynthesizer {
    fn synthesize(
        &self,
        mode: SynthesisMode,
        rendition: RenditionRef<'_>,
        total_duration_secs: u64,
    ) -> Result<String, ManifestError> {
        let profile = rendition.profile().ok_or(ManifestError::MissingProfile)?;
        let mut representation = Self::representation(rendition, profile)?;
        let content = rendition.content().as_str();

        match mode {
            SynthesisMode::Progressive => {
                let init_range = profile
                    .init_range
                    .ok_or_else(|| ManifestError::missing_field("init_range"))?;
                let index_range = profile
                    .index_range
                    .ok_or_else(|| ManifestError::missing_field("index_range"))?;
                representation.base_url = Some(content.to_string());
                representation.segment_base = Some(SegmentBase {
                    index_range: format!("{}-{}", index_range.start, index_range.end),
                    initialization: Initialization {
                        range: format!("{}-{}", init_range.start, init_range.end),
                    },
                });
            }
            SynthesisMode::Otf => {
                if profile.segment_timeline.is_empty() {
                    return Err(ManifestError::EmptyTimeline);
                }
                let segments = profile
                    .segment_timeline
                    .iter()
                    .map(|entry| TimelineSegment {
                        duration: entry.duration_ms,
                        repeat: (entry.repeat_count > 0).then_some(entry.repeat_count),
                    })
                    .collect();
                representation.segment_template = Some(Self::segment_template(content, segments));
            }
            SynthesisMode::PostLiveDvr => {
                let target = profile
                    .target_duration_secs
                    .filter(|t| *t > 0)
                    .ok_or_else(|| ManifestError::missing_field("target_duration_secs"))?;
                if total_duration_secs == 0 {
                    return Err(ManifestError::missing_field("total_duration"));
                }
                let segment_count = total_duration_secs.div_ceil(u64::from(target));
                let segments = vec![TimelineSegment {
                    duration: target * 1000,
                    repeat: u32::try_from(segment_count.saturating_sub(1))
                        .ok()
                        .filter(|r| *r > 0),
                }];
                representation.segment_template = Some(Self::segment_template(content, segments));
            }
        }

        let mpd = Mpd::static_presentation(
            total_duration_secs,
            AdaptationSet::main(Self::mime_type(rendition), representation),
        );
        mpd.render()
    }
}

/// Check that a literal manifest payload is well-formed XML with a root
/// element.
pub fn validate_xml_manifest(text: &str) -> Result<(), ManifestError> {
    let mut reader = quick_xml::Reader::from_str(text);
    let mut saw_element = false;
    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(quick_xml::events::Event::Start(_))
            | Ok(quick_xml::events::Event::Empty(_)) => saw_element = true,
            Ok(_) => {}
            Err(e) => return Err(ManifestError::malformed(e.to_string())),
        }
    }
    if saw_element {
        Ok(())
    } else {
        Err(ManifestError::malformed("no root element"))
    }
}

/// Check that a literal playlist payload parses as an HLS playlist.
pub fn validate_hls_playlist(text: &str) -> Result<(), ManifestError> {
    m3u8_rs::parse_playlist_res(text.as_bytes())
        .map(|_| ())
        .map_err(|e| ManifestError::malformed(format!("{e:?}")))
}
