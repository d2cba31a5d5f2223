use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// Timing, endpoint and copy configuration for the stage.
/// Every field has a default; a host may override any subset from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Crossfade length; the leaving flag is cleared after this (default: 1200).
    pub scene_fade_ms: u32,
    /// Delay from boot start to the first scene reveal (default: 1800).
    pub boot_show_ms: u32,
    /// Splash fade-out length after the reveal (default: 6000).
    pub boot_fade_ms: u32,
    /// Slack added before the splash is removed (default: 150).
    pub boot_buffer_ms: u32,
    /// Longest wait for the video `canplay` signal (default: 1800).
    pub boot_canplay_ceiling_ms: u32,
    /// Wait used when there is no video element at all (default: 800).
    pub boot_missing_media_ms: u32,
    /// Ambient audio volume, 0.0..=1.0 (default: 0.25).
    pub audio_volume: f32,
    /// Walk scene dwell before the choice scene (default: 900).
    pub walk_to_choice_ms: u32,
    /// Pick animation length before the target scene (default: 1200).
    pub choice_settle_ms: u32,
    /// Per-character stagger of the letter reveal (default: 1000).
    pub letter_base_delay_ms: u32,
    /// Ceiling of the letter stagger (default: 2200).
    pub letter_max_delay_ms: u32,
    /// Shown while the letter is in flight.
    pub letter_placeholder: String,
    /// Shown when the letter could not be fetched.
    pub letter_fallback: String,
    /// Prefix of the date line under the letter.
    pub letter_date_prefix: String,
    /// Nickname field bound (default: 32).
    pub nickname_max_chars: usize,
    /// Bottle message bound (default: 90).
    pub bottle_max_chars: usize,
    /// Backdrop down-sampling factor in CSS pixels (default: 2).
    pub backdrop_pixel: u32,
    /// Backdrop video playback rate (default: 0.7).
    pub backdrop_playback_rate: f32,
    /// Used when the nickname form carries no action.
    pub nickname_endpoint: String,
    pub letter_endpoint: String,
    pub bottles_endpoint: String,
    pub report_endpoint: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            scene_fade_ms: 1200,
            boot_show_ms: 1800,
            boot_fade_ms: 6000,
            boot_buffer_ms: 150,
            boot_canplay_ceiling_ms: 1800,
            boot_missing_media_ms: 800,
            audio_volume: 0.25,
            walk_to_choice_ms: 900,
            choice_settle_ms: 1200,
            letter_base_delay_ms: 1000,
            letter_max_delay_ms: 2200,
            letter_placeholder: "……".to_string(),
            letter_fallback: "波の音に、ことばが消えた。".to_string(),
            letter_date_prefix: "— ".to_string(),
            nickname_max_chars: 32,
            bottle_max_chars: 90,
            backdrop_pixel: 2,
            backdrop_playback_rate: 0.7,
            nickname_endpoint: "/anon".to_string(),
            letter_endpoint: "/today".to_string(),
            bottles_endpoint: "/bottles".to_string(),
            report_endpoint: "/report".to_string(),
        }
    }
}

impl StageConfig {
    /// Parse a config from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.audio_volume) {
            return Err(ConfigError::Volume(self.audio_volume));
        }
        if self.backdrop_pixel == 0 {
            return Err(ConfigError::ZeroPixel);
        }
        Ok(())
    }

    /// When the splash leaves the tree, measured from boot start.
    pub fn splash_removal_ms(&self) -> u32 {
        self.boot_show_ms
            .saturating_add(self.boot_fade_ms)
            .saturating_add(self.boot_buffer_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StageConfig::from_json(r#"{ "scene_fade_ms": 520, "letter_base_delay_ms": 250 }"#).unwrap();
        assert_eq!(config.scene_fade_ms, 520);
        assert_eq!(config.letter_base_delay_ms, 250);
        assert_eq!(config.letter_max_delay_ms, 2200);
        assert_eq!(config.letter_endpoint, "/today");
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(StageConfig::from_json("{}").unwrap(), StageConfig::default());
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let err = StageConfig::from_json(r#"{ "audio_volume": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Volume(v) if v == 1.5));
    }

    #[test]
    fn rejects_zero_pixel() {
        assert!(matches!(
            StageConfig::from_json(r#"{ "backdrop_pixel": 0 }"#),
            Err(ConfigError::ZeroPixel)
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(StageConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn splash_removal_sums_boot_phases() {
        assert_eq!(StageConfig::default().splash_removal_ms(), 1800 + 6000 + 150);
    }
}
