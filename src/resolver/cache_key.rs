//! Cache-key derivation
//!
//! A cache key identifies a (stream, rendition) pair for the playback
//! engine's local cache. It must survive a URL refresh of the same
//! rendition, so it is built from identifying attributes rather than the
//! content itself; the raw content is hashed in only as a last resort, when
//! neither the format nor a quality signal can tell two renditions apart.

use sha2::{Digest, Sha256};

use crate::models::rendition::RenditionRef;
use crate::models::{AudioRendition, StreamDescriptor, VideoRendition};

const UNKNOWN_ID: &str = "unknown";

fn content_hash(rendition: RenditionRef<'_>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rendition.content().as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(rendition.manifest_url().unwrap_or("").as_bytes());
    format!("{:x}", hasher.finalize())
}

fn common_key(
    descriptor: &StreamDescriptor,
    rendition: RenditionRef<'_>,
    quality_unknown: bool,
) -> String {
    let mut key = String::new();
    key.push_str(&descriptor.service_id);
    key.push(' ');
    key.push_str(&descriptor.content_id);

    // The rendition id is included even when unknown so that two unknown-id
    // renditions of different formats still get distinct keys via the
    // format field below.
    key.push(' ');
    key.push_str(rendition.id().unwrap_or(UNKNOWN_ID));

    if let Some(format) = rendition.format() {
        key.push(' ');
        key.push_str(format.name());
    }

    // Only when both the format and the quality signal are missing is the
    // content itself used: hashing it in unconditionally would give a
    // refreshed URL a new key and defeat the cache for identical
    // renditions.
    if quality_unknown && rendition.format().is_none() {
        key.push(' ');
        key.push_str(&content_hash(rendition));
    }
    key
}

/// Cache key of a video rendition.
pub fn video_cache_key(descriptor: &StreamDescriptor, rendition: &VideoRendition) -> String {
    let resolution_unknown = rendition.resolution.is_none();
    let mut key = common_key(
        descriptor,
        RenditionRef::Video(rendition),
        resolution_unknown,
    );
    if let Some(resolution) = &rendition.resolution {
        key.push(' ');
        key.push_str(resolution);
    }
    key.push(' ');
    key.push_str(if rendition.video_only { "video-only" } else { "muxed" });
    key
}

/// Cache key of an audio rendition.
pub fn audio_cache_key(descriptor: &StreamDescriptor, rendition: &AudioRendition) -> String {
    let bitrate_unknown = rendition.average_bitrate.is_none();
    let mut key = common_key(descriptor, RenditionRef::Audio(rendition), bitrate_unknown);
    if let Some(bitrate) = rendition.average_bitrate {
        key.push(' ');
        key.push_str(&bitrate.to_string());
    }
    if let Some(track_id) = &rendition.track_id {
        key.push(' ');
        key.push_str(track_id);
    }
    if let Some(locale) = &rendition.track_locale {
        key.push(' ');
        key.push_str(locale);
    }
    key
}

/// Cache key of either rendition role.
pub fn cache_key_of(descriptor: &StreamDescriptor, rendition: RenditionRef<'_>) -> String {
    match rendition {
        RenditionRef::Video(v) => video_cache_key(descriptor, v),
        RenditionRef::Audio(a) => audio_cache_key(descriptor, a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryMethod, MediaFormat, StreamContent, StreamKind};

    fn descriptor() -> StreamDescriptor {
        StreamDescriptor::new("peertube", "abc123", StreamKind::OnDemand)
    }

    fn video(id: Option<&str>, format: Option<MediaFormat>, resolution: Option<&str>, url: &str) -> VideoRendition {
        VideoRendition {
            id: id.map(str::to_string),
            format,
            delivery: DeliveryMethod::ProgressiveHttp,
            content: StreamContent::Url(url.to_string()),
            manifest_url: None,
            resolution: resolution.map(str::to_string),
            video_only: false,
            profile: None,
        }
    }

    #[test]
    fn test_key_survives_url_refresh() {
        let d = descriptor();
        let a = video(Some("22"), Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn1/v");
        let b = video(Some("22"), Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn2/v?expire=later");
        assert_eq!(video_cache_key(&d, &a), video_cache_key(&d, &b));
    }

    #[test]
    fn test_different_ids_differ() {
        let d = descriptor();
        let a = video(Some("22"), Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn/v");
        let b = video(Some("23"), Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn/v");
        assert_ne!(video_cache_key(&d, &a), video_cache_key(&d, &b));
    }

    #[test]
    fn test_unknown_ids_distinguished_by_format() {
        let d = descriptor();
        let a = video(None, Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn/v");
        let b = video(None, Some(MediaFormat::WebM), Some("720p"), "https://cdn/v");
        assert_ne!(video_cache_key(&d, &a), video_cache_key(&d, &b));
    }

    #[test]
    fn test_content_hash_only_as_last_resort() {
        let d = descriptor();
        // Known format, unknown resolution: key stays URL independent.
        let a = video(None, Some(MediaFormat::Mpeg4), None, "https://cdn1/v");
        let b = video(None, Some(MediaFormat::Mpeg4), None, "https://cdn2/v");
        assert_eq!(video_cache_key(&d, &a), video_cache_key(&d, &b));

        // Neither format nor resolution: content is all that distinguishes.
        let a = video(None, None, None, "https://cdn1/v");
        let b = video(None, None, None, "https://cdn2/v");
        assert_ne!(video_cache_key(&d, &a), video_cache_key(&d, &b));
    }

    #[test]
    fn test_video_only_flag_in_key() {
        let d = descriptor();
        let muxed = video(Some("22"), Some(MediaFormat::Mpeg4), Some("720p"), "https://cdn/v");
        let mut separated = muxed.clone();
        separated.video_only = true;
        assert_ne!(video_cache_key(&d, &muxed), video_cache_key(&d, &separated));
    }

    #[test]
    fn test_audio_key_fields() {
        let d = descriptor();
        let base = AudioRendition {
            id: Some("140".to_string()),
            format: Some(MediaFormat::M4a),
            delivery: DeliveryMethod::ProgressiveHttp,
            content: StreamContent::Url("https://cdn/a".to_string()),
            manifest_url: None,
            average_bitrate: Some(128_000),
            track_id: Some("en.0".to_string()),
            track_locale: Some("en".to_string()),
            track_type: None,
            profile: None,
        };
        let mut other_track = base.clone();
        other_track.track_id = Some("de.1".to_string());
        other_track.track_locale = Some("de".to_string());
        assert_ne!(audio_cache_key(&d, &base), audio_cache_key(&d, &other_track));

        let mut refreshed = base.clone();
        refreshed.content = StreamContent::Url("https://cdn2/a".to_string());
        assert_eq!(audio_cache_key(&d, &base), audio_cache_key(&d, &refreshed));
    }
}
