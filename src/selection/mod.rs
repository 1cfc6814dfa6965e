//! Rendition catalog filtering and selection
//!
//! The filter side drops renditions the platform can never play (torrent
//! delivery, HLS-delivered Opus, empty content) plus anything in the user's
//! format exclusion set. The selection side picks exactly one rendition per
//! role from the filtered catalog. Filtering is deterministic and order
//! preserving; an empty result means "no playable rendition", never an
//! error.

use std::collections::BTreeMap;

use crate::config::AudioPreferences;
use crate::models::{
    AudioRendition, DeliveryMethod, MediaFormat, SubtitleRendition, VideoRendition,
};

pub mod audio;
pub mod video;

pub use audio::{
    audio_index, compare_audio_formats, compare_audio_tracks, select_audio_format,
    select_audio_track,
};
pub use video::{
    best_video_index, default_resolution_index, resolution_match_index, select_video,
    sorted_video_renditions,
};

fn content_playable(content: &crate::models::StreamContent) -> bool {
    !content.is_empty()
}

/// Filter a video rendition list down to what the player can actually use.
pub fn playable_video_renditions(
    renditions: &[VideoRendition],
    excluded_formats: &[MediaFormat],
) -> Vec<VideoRendition> {
    renditions
        .iter()
        .filter(|r| r.delivery != DeliveryMethod::Torrent)
        .filter(|r| content_playable(&r.content))
        .filter(|r| r.format.map_or(true, |f| !excluded_formats.contains(&f)))
        .cloned()
        .collect()
}

/// Filter an audio rendition list down to what the player can actually use.
///
/// Opus over HLS is excluded: the playback engine cannot demux it.
pub fn playable_audio_renditions(
    renditions: &[AudioRendition],
    excluded_formats: &[MediaFormat],
) -> Vec<AudioRendition> {
    renditions
        .iter()
        .filter(|r| r.delivery != DeliveryMethod::Torrent)
        .filter(|r| !(r.delivery == DeliveryMethod::Hls && r.format == Some(MediaFormat::Opus)))
        .filter(|r| content_playable(&r.content))
        .filter(|r| r.format.map_or(true, |f| !excluded_formats.contains(&f)))
        .cloned()
        .collect()
}

/// Subtitle renditions the player supports: URL-backed and not torrents.
pub fn url_and_non_torrent_subtitles(
    renditions: &[SubtitleRendition],
) -> Vec<SubtitleRendition> {
    renditions
        .iter()
        .filter(|r| r.content.is_url() && r.delivery != DeliveryMethod::Torrent)
        .filter(|r| content_playable(&r.content))
        .cloned()
        .collect()
}

/// Reduce an audio catalog to one rendition per audio track.
///
/// Renditions are grouped by track id (missing ids form an anonymous group)
/// and the best rendition of each group per the format comparator is kept.
/// The anonymous group is dropped as soon as at least one named track
/// exists. Track order is deterministic: locale code, then track type.
pub fn consolidate_audio_tracks(
    prefs: &AudioPreferences,
    renditions: &[AudioRendition],
) -> Vec<AudioRendition> {
    let playable = playable_audio_renditions(renditions, &prefs.excluded_formats);

    let mut per_track: BTreeMap<String, AudioRendition> = BTreeMap::new();
    for rendition in playable {
        let track_key = rendition.track_id.clone().unwrap_or_default();
        let replace = match per_track.get(&track_key) {
            Some(present) => {
                compare_audio_formats(
                    &rendition,
                    present,
                    prefs.preferred_format,
                    prefs.limit_data_usage,
                ) == std::cmp::Ordering::Greater
            }
            None => true,
        };
        if replace {
            per_track.insert(track_key, rendition);
        }
    }

    if per_track.len() > 1 {
        per_track.remove("");
    }

    let mut tracks: Vec<AudioRendition> = per_track.into_values().collect();
    tracks.sort_by(|a, b| {
        let locale_a = a.track_locale.as_deref().unwrap_or("");
        let locale_b = b.track_locale.as_deref().unwrap_or("");
        locale_a
            .cmp(locale_b)
            .then_with(|| audio::track_type_sort_key(a).cmp(&audio::track_type_sort_key(b)))
    });
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AudioTrackType, StreamContent};

    fn audio(
        id: &str,
        format: MediaFormat,
        delivery: DeliveryMethod,
        bitrate: u32,
        track_id: Option<&str>,
    ) -> AudioRendition {
        AudioRendition {
            id: Some(id.to_string()),
            format: Some(format),
            delivery,
            content: StreamContent::Url(format!("https://cdn.example.com/{id}")),
            manifest_url: None,
            average_bitrate: Some(bitrate),
            track_id: track_id.map(str::to_string),
            track_locale: None,
            track_type: None,
            profile: None,
        }
    }

    fn video(id: &str, format: MediaFormat, resolution: &str) -> VideoRendition {
        VideoRendition {
            id: Some(id.to_string()),
            format: Some(format),
            delivery: DeliveryMethod::ProgressiveHttp,
            content: StreamContent::Url(format!("https://cdn.example.com/{id}")),
            manifest_url: None,
            resolution: Some(resolution.to_string()),
            video_only: false,
            profile: None,
        }
    }

    #[test]
    fn test_torrent_and_empty_content_dropped() {
        let mut torrent = video("t", MediaFormat::Mpeg4, "720p");
        torrent.delivery = DeliveryMethod::Torrent;
        let mut empty = video("e", MediaFormat::Mpeg4, "360p");
        empty.content = StreamContent::Url(String::new());
        let ok = video("ok", MediaFormat::Mpeg4, "480p");

        let filtered =
            playable_video_renditions(&[torrent, empty, ok.clone()], &[]);
        assert_eq!(filtered, vec![ok]);
    }

    #[test]
    fn test_excluded_formats_dropped() {
        let webm = video("w", MediaFormat::WebM, "720p");
        let mp4 = video("m", MediaFormat::Mpeg4, "720p");
        let filtered = playable_video_renditions(
            &[webm, mp4.clone()],
            &[MediaFormat::WebM],
        );
        assert_eq!(filtered, vec![mp4]);
    }

    #[test]
    fn test_hls_opus_dropped() {
        let opus_hls = audio("o", MediaFormat::Opus, DeliveryMethod::Hls, 160_000, None);
        let opus_dash = audio("d", MediaFormat::Opus, DeliveryMethod::Dash, 160_000, None);
        let filtered = playable_audio_renditions(&[opus_hls, opus_dash.clone()], &[]);
        assert_eq!(filtered, vec![opus_dash]);
    }

    #[test]
    fn test_consolidation_keeps_best_per_track() {
        let prefs = AudioPreferences::default();
        let low = audio("en-low", MediaFormat::M4a, DeliveryMethod::Dash, 64_000, Some("en.0"));
        let high = audio("en-high", MediaFormat::M4a, DeliveryMethod::Dash, 128_000, Some("en.0"));
        let mut de = audio("de", MediaFormat::M4a, DeliveryMethod::Dash, 128_000, Some("de.1"));
        de.track_locale = Some("de".to_string());
        de.track_type = Some(AudioTrackType::Dubbed);

        let tracks = consolidate_audio_tracks(&prefs, &[low, high.clone(), de.clone()]);
        assert_eq!(tracks.len(), 2);
        assert!(tracks.contains(&high));
        assert!(tracks.contains(&de));
    }

    #[test]
    fn test_consolidation_drops_anonymous_track_when_named_exist() {
        let prefs = AudioPreferences::default();
        let anonymous = audio("anon", MediaFormat::M4a, DeliveryMethod::Dash, 128_000, None);
        let named = audio("en", MediaFormat::M4a, DeliveryMethod::Dash, 128_000, Some("en.0"));

        let tracks = consolidate_audio_tracks(&prefs, &[anonymous.clone(), named.clone()]);
        assert_eq!(tracks, vec![named]);

        // A lone anonymous track survives.
        let tracks = consolidate_audio_tracks(&prefs, &[anonymous.clone()]);
        assert_eq!(tracks, vec![anonymous]);
    }
}
