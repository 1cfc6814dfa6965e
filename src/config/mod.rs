//! Playback preference configuration
//!
//! The resolver reads these values but does not own them: the host
//! application decides where they come from (settings screen, file, test
//! fixture). A TOML loader is provided for hosts that keep them on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::MediaFormat;

/// Requested video resolution: either the "best available" sentinel or an
/// exact label such as "720p" or "1080p60".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResolutionPreference {
    Best,
    Exact(String),
}

impl ResolutionPreference {
    pub fn is_best(&self) -> bool {
        matches!(self, ResolutionPreference::Best)
    }
}

impl From<String> for ResolutionPreference {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("best") {
            ResolutionPreference::Best
        } else {
            ResolutionPreference::Exact(value)
        }
    }
}

impl From<ResolutionPreference> for String {
    fn from(value: ResolutionPreference) -> Self {
        match value {
            ResolutionPreference::Best => "best".to_string(),
            ResolutionPreference::Exact(label) => label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPreferences {
    pub preferred_format: Option<MediaFormat>,
    pub default_resolution: ResolutionPreference,
    /// Offer resolutions above the platform ceiling (1440p/2160p).
    pub show_higher_resolutions: bool,
    /// Prefer video-only renditions (paired with a separate audio rendition)
    /// over muxed ones when both exist.
    pub prefer_video_only: bool,
    /// Formats the user never wants to play.
    pub excluded_formats: Vec<MediaFormat>,
}

impl Default for VideoPreferences {
    fn default() -> Self {
        Self {
            preferred_format: Some(MediaFormat::Mpeg4),
            default_resolution: ResolutionPreference::Best,
            show_higher_resolutions: false,
            prefer_video_only: true,
            excluded_formats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioPreferences {
    pub preferred_format: Option<MediaFormat>,
    /// Language code the user wants audio tracks in.
    pub preferred_locale: Option<String>,
    pub prefer_original_audio: bool,
    pub prefer_descriptive_audio: bool,
    /// Pick the lowest-bitrate/most-efficient rendition instead of the
    /// highest-quality one (data-saver mode).
    pub limit_data_usage: bool,
    pub excluded_formats: Vec<MediaFormat>,
}

impl Default for AudioPreferences {
    fn default() -> Self {
        Self {
            preferred_format: Some(MediaFormat::M4a),
            preferred_locale: None,
            prefer_original_audio: false,
            prefer_descriptive_audio: false,
            limit_data_usage: false,
            excluded_formats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackPreferences {
    pub video: VideoPreferences,
    pub audio: AudioPreferences,
}

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("Could not read preferences file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse preferences file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PlaybackPreferences {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = PlaybackPreferences::default();
        assert!(prefs.video.default_resolution.is_best());
        assert_eq!(prefs.video.preferred_format, Some(MediaFormat::Mpeg4));
        assert!(!prefs.audio.limit_data_usage);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_src = r#"
            [video]
            preferred_format = "webm"
            default_resolution = "720p60"
            show_higher_resolutions = true

            [audio]
            preferred_locale = "de"
            prefer_original_audio = true
        "#;
        let prefs: PlaybackPreferences = toml::from_str(toml_src).unwrap();
        assert_eq!(prefs.video.preferred_format, Some(MediaFormat::WebM));
        assert_eq!(
            prefs.video.default_resolution,
            ResolutionPreference::Exact("720p60".to_string())
        );
        assert!(prefs.video.show_higher_resolutions);
        assert_eq!(prefs.audio.preferred_locale.as_deref(), Some("de"));
        assert!(prefs.audio.prefer_original_audio);
        // Unset sections fall back to defaults.
        assert!(prefs.video.prefer_video_only);

        let rendered = toml::to_string(&prefs).unwrap();
        let reparsed: PlaybackPreferences = toml::from_str(&rendered).unwrap();
        assert_eq!(
            reparsed.video.default_resolution,
            ResolutionPreference::Exact("720p60".to_string())
        );
    }

    #[test]
    fn test_best_sentinel_parsing() {
        let prefs: PlaybackPreferences =
            toml::from_str("[video]\ndefault_resolution = \"Best\"\n").unwrap();
        assert!(prefs.video.default_resolution.is_best());
    }
}
