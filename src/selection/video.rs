//! Video rendition ordering and selection
//!
//! Resolution labels are ordered numerically with the high-frame-rate
//! variant sorting immediately after its base-rate sibling of equal numeric
//! resolution: 360p < 720p < 720p60 < 1080p < 1080p60. Equal labels are
//! tie-broken by a fixed container quality ranking.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::ResolutionPreference;
use crate::models::{MediaFormat, VideoRendition};
use crate::utils::{compare_resolution_labels, strip_frame_rate};

/// Resolution labels above the platform ceiling, hidden unless the user
/// opted into higher resolutions.
const HIGH_RESOLUTIONS: [&str; 2] = ["1440p", "2160p"];

/// Video container ranking, worst to best.
const VIDEO_FORMAT_QUALITY_RANKING: [MediaFormat; 3] =
    [MediaFormat::V3gpp, MediaFormat::WebM, MediaFormat::Mpeg4];

fn format_quality_rank(format: Option<MediaFormat>) -> i32 {
    format
        .and_then(|f| {
            VIDEO_FORMAT_QUALITY_RANKING
                .iter()
                .position(|candidate| *candidate == f)
        })
        .map(|idx| idx as i32)
        .unwrap_or(-1)
}

/// Quality ordering of two video renditions: resolution first, container
/// ranking second.
pub fn compare_video_renditions(a: &VideoRendition, b: &VideoRendition) -> Ordering {
    compare_resolution_labels(a.resolution_label(), b.resolution_label())
        .then_with(|| format_quality_rank(a.format).cmp(&format_quality_rank(b.format)))
}

fn is_high_resolution(rendition: &VideoRendition) -> bool {
    let base = strip_frame_rate(rendition.resolution_label());
    HIGH_RESOLUTIONS.contains(&base.as_str())
}

/// Merge the muxed and video-only lists into one sorted candidate list.
///
/// The two lists are de-duplicated by resolution label. Within a label the
/// later-inserted rendition wins, so the list named by `prefer_video_only`
/// is inserted last; a rendition in the preferred format always wins its
/// label. Labels above the platform ceiling are removed unless
/// `show_higher_resolutions` is set, before any other logic runs.
pub fn sorted_video_renditions(
    preferred_format: Option<MediaFormat>,
    show_higher_resolutions: bool,
    video_renditions: &[VideoRendition],
    video_only_renditions: &[VideoRendition],
    ascending: bool,
    prefer_video_only: bool,
) -> Vec<VideoRendition> {
    let ordered: [&[VideoRendition]; 2] = if prefer_video_only {
        [video_renditions, video_only_renditions]
    } else {
        [video_only_renditions, video_renditions]
    };

    let all_candidates: Vec<&VideoRendition> = ordered
        .iter()
        .flat_map(|list| list.iter())
        .filter(|r| show_higher_resolutions || !is_high_resolution(r))
        .collect();

    let mut by_label: BTreeMap<String, &VideoRendition> = BTreeMap::new();
    for &rendition in &all_candidates {
        by_label.insert(rendition.resolution_label().to_string(), rendition);
    }
    for &rendition in &all_candidates {
        if rendition.format.is_some() && rendition.format == preferred_format {
            by_label.insert(rendition.resolution_label().to_string(), rendition);
        }
    }

    let mut merged: Vec<VideoRendition> = by_label.into_values().cloned().collect();
    merged.sort_by(|a, b| {
        let ord = compare_video_renditions(a, b);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
    merged
}

/// Index of the best rendition in a descending-sorted list.
///
/// With a preferred format present anywhere in the list this is the
/// highest-resolution rendition of that format; otherwise the highest
/// resolution overall.
pub fn best_video_index(
    sorted_desc: &[VideoRendition],
    preferred_format: Option<MediaFormat>,
) -> Option<usize> {
    if sorted_desc.is_empty() {
        return None;
    }
    if let Some(format) = preferred_format {
        if let Some(idx) = sorted_desc.iter().position(|r| r.format == Some(format)) {
            return Some(idx);
        }
    }
    Some(0)
}

/// Locate the closest match for a requested resolution label.
///
/// Tiers, in order: exact label and format; frame-rate-stripped label and
/// format; exact label, any format; frame-rate-stripped label, any format;
/// nearest resolution strictly below the request. `None` when nothing is at
/// or below the requested resolution — the caller decides whether to fall
/// back to the best rendition. The scan never snaps upward.
pub fn resolution_match_index(
    target_resolution: &str,
    target_format: Option<MediaFormat>,
    renditions: &[VideoRendition],
) -> Option<usize> {
    let mut full_match = None;
    let mut full_match_stripped = None;
    let mut label_match = None;
    let mut label_match_stripped = None;
    let mut lower_match = None;
    let target_stripped = strip_frame_rate(target_resolution);

    for (idx, rendition) in renditions.iter().enumerate() {
        let format_matches =
            target_format.map_or(true, |wanted| rendition.format == Some(wanted));
        let resolution = rendition.resolution_label();
        let resolution_stripped = strip_frame_rate(resolution);

        if format_matches && resolution == target_resolution {
            full_match = Some(idx);
        }
        if format_matches && resolution_stripped == target_stripped {
            full_match_stripped = Some(idx);
        }
        if label_match.is_none() && resolution == target_resolution {
            label_match = Some(idx);
        }
        if label_match_stripped.is_none() && resolution_stripped == target_stripped {
            label_match_stripped = Some(idx);
        }
        if lower_match.is_none()
            && compare_resolution_labels(&resolution_stripped, &target_stripped)
                == Ordering::Less
        {
            lower_match = Some(idx);
        }
    }

    full_match
        .or(full_match_stripped)
        .or(label_match)
        .or(label_match_stripped)
        .or(lower_match)
}

/// Index of the rendition to play from a descending-sorted candidate list.
///
/// The best-resolution sentinel short-circuits to [`best_video_index`]; an
/// exact request goes through [`resolution_match_index`] and falls back to
/// the best rendition when nothing matches at or below the request.
pub fn default_resolution_index(
    sorted_desc: &[VideoRendition],
    preferred_format: Option<MediaFormat>,
    requested: &ResolutionPreference,
) -> Option<usize> {
    if sorted_desc.is_empty() {
        return None;
    }
    match requested {
        ResolutionPreference::Best => best_video_index(sorted_desc, preferred_format),
        ResolutionPreference::Exact(label) => {
            resolution_match_index(label, preferred_format, sorted_desc)
                .or_else(|| best_video_index(sorted_desc, preferred_format))
        }
    }
}

/// One-call video selection: merge, sort and pick.
///
/// Returns the descending-sorted candidate list together with the index of
/// the rendition to play, `None` when the merged catalog is empty.
pub fn select_video(
    video_renditions: &[VideoRendition],
    video_only_renditions: &[VideoRendition],
    prefer_video_only: bool,
    show_higher_resolutions: bool,
    preferred_format: Option<MediaFormat>,
    requested: &ResolutionPreference,
) -> (Vec<VideoRendition>, Option<usize>) {
    let sorted = sorted_video_renditions(
        preferred_format,
        show_higher_resolutions,
        video_renditions,
        video_only_renditions,
        false,
        prefer_video_only,
    );
    let index = default_resolution_index(&sorted, preferred_format, requested);
    (sorted, index)
}
