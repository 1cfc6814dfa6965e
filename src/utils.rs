//! Utility functions shared across the resolver
//!
//! Mostly resolution-label handling: labels are strings such as "720p",
//! "720p60" or "1080p50", where the trailing digits after the "p" denote a
//! high-frame-rate variant of the same numeric resolution.

use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;

fn frame_rate_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"p\d+$").expect("static regex"))
}

fn frame_rate_fold() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"0p\d+$").expect("static regex"))
}

fn non_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\d.]").expect("static regex"))
}

/// Remove the frame-rate suffix from a resolution label: "720p60" -> "720p".
/// Labels without a suffix are returned unchanged.
pub fn strip_frame_rate(resolution: &str) -> String {
    frame_rate_suffix().replace(resolution, "p").into_owned()
}

/// Numeric sort value of a resolution label.
///
/// The "0p<fps>" tail is folded to "1" so a high-frame-rate variant sorts
/// immediately after its base-rate sibling: "720p" -> 720, "720p60" -> 721,
/// "1080p" -> 1080, "1080p60" -> 1081. Returns `None` when no number can be
/// extracted.
pub fn resolution_sort_value(resolution: &str) -> Option<u32> {
    let folded = frame_rate_fold().replace(resolution, "1");
    let digits = non_digits().replace_all(&folded, "");
    digits.parse::<u32>().ok()
}

/// Compare two resolution labels by their numeric sort value.
///
/// When either label fails to parse, the first operand is considered greater:
/// we cannot tell the two renditions apart, so an unknown label must never
/// win a "nearest lower resolution" scan.
pub fn compare_resolution_labels(r1: &str, r2: &str) -> Ordering {
    match (resolution_sort_value(r1), resolution_sort_value(r2)) {
        (Some(v1), Some(v2)) => v1.cmp(&v2),
        _ => Ordering::Greater,
    }
}

/// Index of the maximum element, first occurrence winning on ties.
///
/// `Iterator::max_by` keeps the last of equal maxima, which would make
/// selection depend on input order in exactly the cases where the comparator
/// declares candidates equivalent.
pub fn index_of_max_by<T, F>(items: &[T], mut cmp: F) -> Option<usize>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut best: Option<usize> = None;
    for (idx, item) in items.iter().enumerate() {
        match best {
            None => best = Some(idx),
            Some(b) => {
                if cmp(item, &items[b]) == Ordering::Greater {
                    best = Some(idx);
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_frame_rate() {
        assert_eq!(strip_frame_rate("720p60"), "720p");
        assert_eq!(strip_frame_rate("720p"), "720p");
        assert_eq!(strip_frame_rate("1080p50"), "1080p");
        assert_eq!(strip_frame_rate("2160p"), "2160p");
    }

    #[test]
    fn test_resolution_sort_value() {
        assert_eq!(resolution_sort_value("720p"), Some(720));
        assert_eq!(resolution_sort_value("720p60"), Some(721));
        assert_eq!(resolution_sort_value("1080p"), Some(1080));
        assert_eq!(resolution_sort_value("1080p60"), Some(1081));
        assert_eq!(resolution_sort_value("360p"), Some(360));
        assert_eq!(resolution_sort_value("garbage"), None);
    }

    #[test]
    fn test_compare_resolution_labels() {
        assert_eq!(compare_resolution_labels("720p", "720p60"), Ordering::Less);
        assert_eq!(compare_resolution_labels("720p60", "1080p"), Ordering::Less);
        assert_eq!(
            compare_resolution_labels("1080p", "720p60"),
            Ordering::Greater
        );
        assert_eq!(compare_resolution_labels("720p", "720p"), Ordering::Equal);
        // Unparseable labels sort as greater regardless of operand order.
        assert_eq!(compare_resolution_labels("oops", "720p"), Ordering::Greater);
        assert_eq!(compare_resolution_labels("720p", "oops"), Ordering::Greater);
    }

    #[test]
    fn test_index_of_max_first_wins() {
        let items = [3, 1, 3, 2];
        assert_eq!(index_of_max_by(&items, |a, b| a.cmp(b)), Some(0));
        let empty: [i32; 0] = [];
        assert_eq!(index_of_max_by(&empty, |a, b| a.cmp(b)), None);
    }
}
