//! Audio rendition selection
//!
//! Selection is comparator driven: candidates are ranked and the first
//! maximum wins, so equally-ranked inputs resolve to the earliest list
//! entry rather than depending on iteration internals.

use std::cmp::Ordering;

use crate::config::AudioPreferences;
use crate::models::{AudioRendition, AudioTrackType, MediaFormat};
use crate::utils::index_of_max_by;

/// Audio format ranking by perceived quality, worst to best.
const AUDIO_FORMAT_QUALITY_RANKING: [MediaFormat; 3] =
    [MediaFormat::Mp3, MediaFormat::WebMa, MediaFormat::M4a];

/// Audio format ranking by compression efficiency, worst to best.
const AUDIO_FORMAT_EFFICIENCY_RANKING: [MediaFormat; 3] =
    [MediaFormat::Mp3, MediaFormat::M4a, MediaFormat::WebMa];

/// Track type ranking, least to most preferred.
const TRACK_TYPE_RANKING: [AudioTrackType; 3] = [
    AudioTrackType::Descriptive,
    AudioTrackType::Dubbed,
    AudioTrackType::Original,
];

/// Track type ranking when descriptive audio is preferred.
const TRACK_TYPE_RANKING_DESCRIPTIVE: [AudioTrackType; 3] = [
    AudioTrackType::Original,
    AudioTrackType::Dubbed,
    AudioTrackType::Descriptive,
];

fn ranking_index(ranking: &[MediaFormat], format: Option<MediaFormat>) -> i32 {
    format
        .and_then(|f| ranking.iter().position(|candidate| *candidate == f))
        .map(|idx| idx as i32)
        .unwrap_or(-1)
}

fn track_type_index(ranking: &[AudioTrackType], track_type: Option<AudioTrackType>) -> i32 {
    match track_type {
        // Unknown track types rank below every known one.
        None => -1,
        Some(t) => ranking
            .iter()
            .position(|candidate| *candidate == t)
            .map(|idx| idx as i32)
            .unwrap_or(-1),
    }
}

fn primary_subtag(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_ascii_lowercase()
}

fn locale_matches(locale: Option<&str>, wanted: &str) -> bool {
    locale.map_or(false, |l| primary_subtag(l) == primary_subtag(wanted))
}

pub(crate) fn track_type_sort_key(rendition: &AudioRendition) -> u8 {
    match rendition.track_type {
        Some(AudioTrackType::Original) => 0,
        Some(AudioTrackType::Dubbed) => 1,
        Some(AudioTrackType::Descriptive) => 2,
        None => 3,
    }
}

/// Rank two audio renditions by format and bitrate; `Greater` is better.
///
/// A rendition in the preferred format always outranks one that is not.
/// Within that, the extreme bitrate wins: highest normally, lowest in
/// data-saver mode. Bitrate ties are broken by the fixed format ranking
/// (quality ranking normally, efficiency ranking in data-saver mode), never
/// by list position.
pub fn compare_audio_formats(
    a: &AudioRendition,
    b: &AudioRendition,
    preferred_format: Option<MediaFormat>,
    limit_data_usage: bool,
) -> Ordering {
    if let Some(preferred) = preferred_format {
        let a_pref = a.format == Some(preferred);
        let b_pref = b.format == Some(preferred);
        if a_pref != b_pref {
            return a_pref.cmp(&b_pref);
        }
    }

    let a_bitrate = a.average_bitrate.map(i64::from).unwrap_or(-1);
    let b_bitrate = b.average_bitrate.map(i64::from).unwrap_or(-1);
    let bitrate_ord = if limit_data_usage {
        b_bitrate.cmp(&a_bitrate)
    } else {
        a_bitrate.cmp(&b_bitrate)
    };
    if bitrate_ord != Ordering::Equal {
        return bitrate_ord;
    }

    let ranking: &[MediaFormat] = if limit_data_usage {
        &AUDIO_FORMAT_EFFICIENCY_RANKING
    } else {
        &AUDIO_FORMAT_QUALITY_RANKING
    };
    ranking_index(ranking, a.format).cmp(&ranking_index(ranking, b.format))
}

/// Rank two audio renditions by track identity; `Greater` is better.
///
/// Order of criteria: the original track when `prefer_original_audio` is
/// set, then a locale match against the preferred language, then the track
/// type ranking (descriptive tracks rank highest only when
/// `prefer_descriptive_audio` is set), then an English locale as the final
/// tie-break.
pub fn compare_audio_tracks(
    a: &AudioRendition,
    b: &AudioRendition,
    preferred_locale: Option<&str>,
    prefer_original_audio: bool,
    prefer_descriptive_audio: bool,
) -> Ordering {
    if prefer_original_audio {
        let a_original = a.track_type == Some(AudioTrackType::Original);
        let b_original = b.track_type == Some(AudioTrackType::Original);
        if a_original != b_original {
            return a_original.cmp(&b_original);
        }
    }

    if let Some(wanted) = preferred_locale {
        let a_match = locale_matches(a.track_locale.as_deref(), wanted);
        let b_match = locale_matches(b.track_locale.as_deref(), wanted);
        if a_match != b_match {
            return a_match.cmp(&b_match);
        }
    }

    let ranking: &[AudioTrackType] = if prefer_descriptive_audio {
        &TRACK_TYPE_RANKING_DESCRIPTIVE
    } else {
        &TRACK_TYPE_RANKING
    };
    let type_ord =
        track_type_index(ranking, a.track_type).cmp(&track_type_index(ranking, b.track_type));
    if type_ord != Ordering::Equal {
        return type_ord;
    }

    let a_english = locale_matches(a.track_locale.as_deref(), "en");
    let b_english = locale_matches(b.track_locale.as_deref(), "en");
    a_english.cmp(&b_english)
}

/// Index of the best rendition by format/bitrate, `None` for an empty list.
pub fn select_audio_format(
    renditions: &[AudioRendition],
    preferred_format: Option<MediaFormat>,
    limit_data_usage: bool,
) -> Option<usize> {
    index_of_max_by(renditions, |a, b| {
        compare_audio_formats(a, b, preferred_format, limit_data_usage)
    })
}

/// Index of the best rendition by track identity, `None` for an empty list.
pub fn select_audio_track(
    renditions: &[AudioRendition],
    preferred_locale: Option<&str>,
    prefer_original_audio: bool,
    prefer_descriptive_audio: bool,
) -> Option<usize> {
    index_of_max_by(renditions, |a, b| {
        compare_audio_tracks(
            a,
            b,
            preferred_locale,
            prefer_original_audio,
            prefer_descriptive_audio,
        )
    })
}

/// Index of the rendition to play: an explicit track-id override when it
/// matches, otherwise the combined track-then-format ranking.
pub fn audio_index(
    prefs: &AudioPreferences,
    renditions: &[AudioRendition],
    track_id_override: Option<&str>,
) -> Option<usize> {
    if let Some(track_id) = track_id_override {
        if let Some(idx) = renditions
            .iter()
            .position(|r| r.track_id.as_deref() == Some(track_id))
        {
            return Some(idx);
        }
    }
    index_of_max_by(renditions, |a, b| {
        compare_audio_tracks(
            a,
            b,
            prefs.preferred_locale.as_deref(),
            prefs.prefer_original_audio,
            prefs.prefer_descriptive_audio,
        )
        .then_with(|| {
            compare_audio_formats(a, b, prefs.preferred_format, prefs.limit_data_usage)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeliveryMethod, StreamContent};

    fn rendition(id: &str, format: MediaFormat, bitrate: u32) -> AudioRendition {
        AudioRendition {
            id: Some(id.to_string()),
            format: Some(format),
            delivery: DeliveryMethod::Dash,
            content: StreamContent::Url(format!("https://cdn.example.com/{id}")),
            manifest_url: None,
            average_bitrate: Some(bitrate),
            track_id: None,
            track_locale: None,
            track_type: None,
            profile: None,
        }
    }

    fn track(
        id: &str,
        locale: Option<&str>,
        track_type: Option<AudioTrackType>,
    ) -> AudioRendition {
        AudioRendition {
            id: Some(id.to_string()),
            format: Some(MediaFormat::M4a),
            delivery: DeliveryMethod::Dash,
            content: StreamContent::Url(format!("https://cdn.example.com/{id}")),
            manifest_url: None,
            average_bitrate: Some(128_000),
            track_id: Some(id.to_string()),
            track_locale: locale.map(str::to_string),
            track_type,
            profile: None,
        }
    }

    #[test]
    fn test_preferred_format_wins_over_higher_bitrate() {
        let list = vec![
            rendition("webm-hi", MediaFormat::WebMa, 160_000),
            rendition("m4a-lo", MediaFormat::M4a, 128_000),
        ];
        let idx = select_audio_format(&list, Some(MediaFormat::M4a), false).unwrap();
        assert_eq!(list[idx].id.as_deref(), Some("m4a-lo"));
    }

    #[test]
    fn test_format_fallback_uses_extreme_bitrate() {
        let list = vec![
            rendition("mp3", MediaFormat::Mp3, 128_000),
            rendition("webm", MediaFormat::WebMa, 160_000),
        ];
        // Preferred format absent entirely: highest bitrate wins.
        let idx = select_audio_format(&list, Some(MediaFormat::M4a), false).unwrap();
        assert_eq!(list[idx].id.as_deref(), Some("webm"));
        // Data-saver mode flips to the lowest bitrate.
        let idx = select_audio_format(&list, Some(MediaFormat::M4a), true).unwrap();
        assert_eq!(list[idx].id.as_deref(), Some("mp3"));
    }

    #[test]
    fn test_bitrate_tie_broken_by_format_ranking_not_order() {
        let a = rendition("m4a", MediaFormat::M4a, 128_000);
        let b = rendition("mp3", MediaFormat::Mp3, 128_000);

        let forward = vec![a.clone(), b.clone()];
        let reversed = vec![b, a];
        let picked_forward =
            &forward[select_audio_format(&forward, None, false).unwrap()];
        let picked_reversed =
            &reversed[select_audio_format(&reversed, None, false).unwrap()];
        assert_eq!(picked_forward.id, picked_reversed.id);
        assert_eq!(picked_forward.format, Some(MediaFormat::M4a));
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        assert_eq!(select_audio_format(&[], None, false), None);
        assert_eq!(select_audio_track(&[], Some("en"), false, false), None);
    }

    fn track_fixture() -> Vec<AudioRendition> {
        vec![
            track("en-original", Some("en"), Some(AudioTrackType::Original)),
            track("en-dubbed", Some("en"), Some(AudioTrackType::Dubbed)),
            track(
                "en-descriptive",
                Some("en"),
                Some(AudioTrackType::Descriptive),
            ),
            track("de-dubbed", Some("de"), Some(AudioTrackType::Dubbed)),
            track(
                "de-descriptive",
                Some("de"),
                Some(AudioTrackType::Descriptive),
            ),
            track("unknown", None, None),
        ]
    }

    #[test]
    fn test_track_selection_locale_match() {
        let tracks = track_fixture();
        let idx = select_audio_track(&tracks, Some("de"), false, false).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("de-dubbed"));
    }

    #[test]
    fn test_track_selection_prefer_original_overrides_locale() {
        let tracks = track_fixture();
        let idx = select_audio_track(&tracks, Some("de"), true, false).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("en-original"));
    }

    #[test]
    fn test_track_selection_prefer_descriptive() {
        let tracks = track_fixture();
        let idx = select_audio_track(&tracks, Some("en"), false, true).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("en-descriptive"));
    }

    #[test]
    fn test_track_selection_unmatched_locale_falls_back_to_original() {
        let tracks = track_fixture();
        let idx = select_audio_track(&tracks, Some("ja"), true, false).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("en-original"));
    }

    #[test]
    fn test_track_id_override() {
        let prefs = AudioPreferences::default();
        let tracks = track_fixture();
        let idx = audio_index(&prefs, &tracks, Some("de-descriptive")).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("de-descriptive"));
        // An override that matches nothing falls back to ranked selection.
        let idx = audio_index(&prefs, &tracks, Some("missing-track")).unwrap();
        assert_eq!(tracks[idx].id.as_deref(), Some("en-original"));
    }
}
