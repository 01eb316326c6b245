//! Tracker configuration.
//!
//! [`TrackerConfig`] is a plain value: build it with [`TrackerConfig::builder`],
//! load it from JSON through serde, or start from [`TrackerConfig::from_env`]
//! to pick up `LIGHT_ANCHOR_*` overrides. It is validated once when a tracker
//! is created and never re-read from the environment afterwards.

use crate::error::ConfigError;
pub use crate::utils::binarization::LowContrastPolicy;
use serde::{Deserialize, Serialize};

/// Association, binarization and lifetime parameters for one tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive missed associations a candidate survives (default: 8).
    pub ttl_frames: u32,
    /// Maximum shape deviation for association, summed over corners (default: 50.0).
    pub thres_dist_shape: f32,
    /// Extra shape tolerance per missed frame (default: 20.0).
    pub thres_dist_shape_ttl: f32,
    /// Maximum center displacement for association (default: 25.0).
    pub thres_dist_center: f32,
    /// Dead band around the brightness midpoint (default: 0).
    pub range_thres: u8,
    /// Minimum brightness range over the history for a bit (default: 5).
    pub min_white_black_diff: u8,
    /// Brightness samples retained per candidate (default: 16).
    pub history_capacity: usize,
    /// Fraction of the quad, measured from the center, used for sampling (default: 0.5).
    pub sample_inset: f32,
    /// Handling of frames without a reliable bit (default: skip).
    pub low_contrast: LowContrastPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ttl_frames: 8,
            thres_dist_shape: 50.0,
            thres_dist_shape_ttl: 20.0,
            thres_dist_center: 25.0,
            range_thres: 0,
            min_white_black_diff: 5,
            history_capacity: 16,
            sample_inset: 0.5,
            low_contrast: LowContrastPolicy::Skip,
        }
    }
}

fn check_distance(name: &'static str, value: f32, allow_zero: bool) -> Result<(), ConfigError> {
    let ok = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidDistance { name, value })
    }
}

impl TrackerConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }

    /// Defaults with `LIGHT_ANCHOR_*` environment overrides applied.
    ///
    /// Unparseable values are ignored. The result is not validated.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            ttl_frames: parse_env("LIGHT_ANCHOR_TTL_FRAMES", d.ttl_frames),
            thres_dist_shape: parse_env("LIGHT_ANCHOR_THRES_DIST_SHAPE", d.thres_dist_shape),
            thres_dist_shape_ttl: parse_env(
                "LIGHT_ANCHOR_THRES_DIST_SHAPE_TTL",
                d.thres_dist_shape_ttl,
            ),
            thres_dist_center: parse_env("LIGHT_ANCHOR_THRES_DIST_CENTER", d.thres_dist_center),
            range_thres: parse_env("LIGHT_ANCHOR_RANGE_THRES", d.range_thres),
            min_white_black_diff: parse_env(
                "LIGHT_ANCHOR_MIN_WHITE_BLACK_DIFF",
                d.min_white_black_diff,
            ),
            history_capacity: parse_env("LIGHT_ANCHOR_HISTORY_CAPACITY", d.history_capacity),
            sample_inset: parse_env("LIGHT_ANCHOR_SAMPLE_INSET", d.sample_inset),
            low_contrast: std::env::var("LIGHT_ANCHOR_LOW_CONTRAST")
                .ok()
                .and_then(|v| parse_policy(v.trim()))
                .unwrap_or(d.low_contrast),
        }
    }

    /// Check every field; the first problem found is returned.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_frames == 0 {
            return Err(ConfigError::ZeroTtl);
        }
        if self.history_capacity < 2 {
            return Err(ConfigError::HistoryTooSmall(self.history_capacity));
        }
        check_distance("thres_dist_shape", self.thres_dist_shape, false)?;
        check_distance("thres_dist_shape_ttl", self.thres_dist_shape_ttl, true)?;
        check_distance("thres_dist_center", self.thres_dist_center, false)?;
        if !(self.sample_inset > 0.0 && self.sample_inset <= 1.0) {
            return Err(ConfigError::InvalidInset(self.sample_inset));
        }
        Ok(())
    }

    /// Shape tolerance for a candidate that has missed `missed_frames` frames.
    pub fn shape_tolerance(&self, missed_frames: u32) -> f32 {
        self.thres_dist_shape + self.thres_dist_shape_ttl * missed_frames as f32
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_policy(value: &str) -> Option<LowContrastPolicy> {
    match value {
        "skip" => Some(LowContrastPolicy::Skip),
        "repeat_last" => Some(LowContrastPolicy::RepeatLast),
        "off" => Some(LowContrastPolicy::Off),
        _ => None,
    }
}

/// Builder for [`TrackerConfig`].
#[derive(Debug, Default)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    /// Set the number of frames a candidate may go undetected.
    #[must_use]
    pub fn ttl_frames(mut self, frames: u32) -> Self {
        self.config.ttl_frames = frames;
        self
    }

    /// Set the base shape tolerance.
    #[must_use]
    pub fn thres_dist_shape(mut self, dist: f32) -> Self {
        self.config.thres_dist_shape = dist;
        self
    }

    /// Set the extra shape tolerance per missed frame.
    #[must_use]
    pub fn thres_dist_shape_ttl(mut self, dist: f32) -> Self {
        self.config.thres_dist_shape_ttl = dist;
        self
    }

    /// Set the center displacement tolerance.
    #[must_use]
    pub fn thres_dist_center(mut self, dist: f32) -> Self {
        self.config.thres_dist_center = dist;
        self
    }

    /// Set the dead band around the brightness midpoint.
    #[must_use]
    pub fn range_thres(mut self, thres: u8) -> Self {
        self.config.range_thres = thres;
        self
    }

    /// Set the minimum history contrast.
    #[must_use]
    pub fn min_white_black_diff(mut self, diff: u8) -> Self {
        self.config.min_white_black_diff = diff;
        self
    }

    /// Set the brightness history length.
    #[must_use]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Set the sampling inset fraction.
    #[must_use]
    pub fn sample_inset(mut self, inset: f32) -> Self {
        self.config.sample_inset = inset;
        self
    }

    /// Set the low-contrast policy.
    #[must_use]
    pub fn low_contrast(mut self, policy: LowContrastPolicy) -> Self {
        self.config.low_contrast = policy;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<TrackerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(TrackerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_builder_rejects_zero_ttl() {
        assert_eq!(
            TrackerConfig::builder().ttl_frames(0).build(),
            Err(ConfigError::ZeroTtl)
        );
    }

    #[test]
    fn test_builder_rejects_small_history() {
        assert_eq!(
            TrackerConfig::builder().history_capacity(1).build(),
            Err(ConfigError::HistoryTooSmall(1))
        );
    }

    #[test]
    fn test_builder_rejects_bad_distance() {
        let err = TrackerConfig::builder()
            .thres_dist_center(f32::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidDistance { name: "thres_dist_center", .. }
        ));
        assert!(TrackerConfig::builder().thres_dist_shape(-1.0).build().is_err());
        assert!(TrackerConfig::builder().thres_dist_shape_ttl(0.0).build().is_ok());
    }

    #[test]
    fn test_builder_rejects_bad_inset() {
        assert_eq!(
            TrackerConfig::builder().sample_inset(0.0).build(),
            Err(ConfigError::InvalidInset(0.0))
        );
    }

    #[test]
    fn test_shape_tolerance_grows_with_misses() {
        let config = TrackerConfig::default();
        assert_eq!(config.shape_tolerance(0), 50.0);
        assert_eq!(config.shape_tolerance(2), 90.0);
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"ttl_frames": 3, "low_contrast": "repeat_last"}"#).unwrap();
        assert_eq!(config.ttl_frames, 3);
        assert_eq!(config.low_contrast, LowContrastPolicy::RepeatLast);
        assert_eq!(config.thres_dist_center, 25.0);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy("off"), Some(LowContrastPolicy::Off));
        assert_eq!(parse_policy("bogus"), None);
    }
}
