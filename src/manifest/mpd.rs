//! DASH MPD document model
//!
//! Serde-annotated structs serialized with quick-xml. Only the subset of the
//! MPD vocabulary that synthesized manifests need is modeled; attribute
//! fields use the `@` rename convention and are declared before child
//! elements as the serializer requires.

use serde::Serialize;

use crate::errors::ManifestError;

pub const MPD_XMLNS: &str = "urn:mpeg:DASH:schema:MPD:2011";
pub const MPD_PROFILES: &str = "urn:mpeg:dash:profile:full:2011";
pub const ROLE_SCHEME: &str = "urn:mpeg:DASH:role:2011";
pub const AUDIO_CHANNEL_SCHEME: &str = "urn:mpeg:dash:23003:3:audio_channel_configuration:2011";

#[derive(Debug, Serialize)]
#[serde(rename = "MPD")]
pub struct Mpd {
    #[serde(rename = "@xmlns:xsi")]
    pub xmlns_xsi: String,
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@xsi:schemaLocation")]
    pub schema_location: String,
    #[serde(rename = "@type")]
    pub mpd_type: String,
    #[serde(rename = "@mediaPresentationDuration", skip_serializing_if = "Option::is_none")]
    pub media_presentation_duration: Option<String>,
    #[serde(rename = "@minBufferTime")]
    pub min_buffer_time: String,
    #[serde(rename = "@profiles")]
    pub profiles: String,
    #[serde(rename = "Period")]
    pub period: Period,
}

impl Mpd {
    /// Static on-demand MPD skeleton with the given presentation duration.
    pub fn static_presentation(duration_secs: u64, adaptation_set: AdaptationSet) -> Self {
        Self {
            xmlns_xsi: "http://www.w3.org/2001/XMLSchema-instance".to_string(),
            xmlns: MPD_XMLNS.to_string(),
            schema_location: format!("{MPD_XMLNS} DASH-MPD.xsd"),
            mpd_type: "static".to_string(),
            media_presentation_duration: Some(format!("PT{duration_secs}S")),
            min_buffer_time: "PT1.5S".to_string(),
            profiles: MPD_PROFILES.to_string(),
            period: Period { adaptation_set },
        }
    }

    pub fn render(&self) -> Result<String, ManifestError> {
        let body = quick_xml::se::to_string(self)
            .map_err(|e| ManifestError::serialize(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>{body}"))
    }
}

#[derive(Debug, Serialize)]
pub struct Period {
    #[serde(rename = "AdaptationSet")]
    pub adaptation_set: AdaptationSet,
}

#[derive(Debug, Serialize)]
pub struct AdaptationSet {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@mimeType")]
    pub mime_type: String,
    #[serde(rename = "@startWithSAP")]
    pub start_with_sap: u32,
    #[serde(rename = "@subsegmentAlignment")]
    pub subsegment_alignment: bool,
    #[serde(rename = "Role")]
    pub role: Role,
    #[serde(rename = "Representation")]
    pub representation: Representation,
}

impl AdaptationSet {
    pub fn main(mime_type: impl Into<String>, representation: Representation) -> Self {
        Self {
            id: 0,
            mime_type: mime_type.into(),
            start_with_sap: 1,
            subsegment_alignment: true,
            role: Role {
                scheme_id_uri: ROLE_SCHEME.to_string(),
                value: "main".to_string(),
            },
            representation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Role {
    #[serde(rename = "@schemeIdUri")]
    pub scheme_id_uri: String,
    #[serde(rename = "@value")]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct Representation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@codecs")]
    pub codecs: String,
    #[serde(rename = "@bandwidth")]
    pub bandwidth: u32,
    #[serde(rename = "@width", skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(rename = "@height", skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(rename = "@frameRate", skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<u32>,
    #[serde(rename = "@audioSamplingRate", skip_serializing_if = "Option::is_none")]
    pub audio_sampling_rate: Option<u32>,
    #[serde(
        rename = "AudioChannelConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    pub audio_channel_configuration: Option<AudioChannelConfiguration>,
    #[serde(rename = "BaseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "SegmentBase", skip_serializing_if = "Option::is_none")]
    pub segment_base: Option<SegmentBase>,
    #[serde(rename = "SegmentTemplate", skip_serializing_if = "Option::is_none")]
    pub segment_template: Option<SegmentTemplate>,
}

#[derive(Debug, Serialize)]
pub struct AudioChannelConfiguration {
    #[serde(rename = "@schemeIdUri")]
    pub scheme_id_uri: String,
    #[serde(rename = "@value")]
    pub value: u32,
}

impl AudioChannelConfiguration {
    pub fn channels(count: u32) -> Self {
        Self {
            scheme_id_uri: AUDIO_CHANNEL_SCHEME.to_string(),
            value: count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SegmentBase {
    #[serde(rename = "@indexRange")]
    pub index_range: String,
    #[serde(rename = "Initialization")]
    pub initialization: Initialization,
}

#[derive(Debug, Serialize)]
pub struct Initialization {
    #[serde(rename = "@range")]
    pub range: String,
}

#[derive(Debug, Serialize)]
pub struct SegmentTemplate {
    #[serde(rename = "@startNumber")]
    pub start_number: u32,
    #[serde(rename = "@timescale")]
    pub timescale: u32,
    #[serde(rename = "@initialization")]
    pub initialization: String,
    #[serde(rename = "@media")]
    pub media: String,
    #[serde(rename = "SegmentTimeline")]
    pub segment_timeline: SegmentTimeline,
}

#[derive(Debug, Serialize)]
pub struct SegmentTimeline {
    #[serde(rename = "S")]
    pub segments: Vec<TimelineSegment>,
}

#[derive(Debug, Serialize)]
pub struct TimelineSegment {
    #[serde(rename = "@d")]
    pub duration: u32,
    #[serde(rename = "@r", skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
}
