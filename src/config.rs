//! Surface configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{HIGHLIGHT_MS, INDICATOR_MS, MARKER_RADIUS_PX, MIN_BOX_SIZE_PX};
use crate::error::ConfigError;

/// Tuning knobs for one rendering surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    /// Global switch gating edit sessions on findings.
    pub editing_enabled: bool,
    /// Initial value of the "show solved marks" toggle.
    pub show_solved: bool,
    /// Minimum resize width/height, in natural pixels.
    pub min_box_px: f64,
    /// Order-marker radius, in display pixels.
    pub marker_radius_px: f64,
    /// Lifetime of saved/error indicators, in milliseconds.
    pub indicator_ms: f64,
    /// Lifetime of the click-to-scroll highlight, in milliseconds.
    pub highlight_ms: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            editing_enabled: true,
            show_solved: false,
            min_box_px: MIN_BOX_SIZE_PX,
            marker_radius_px: MARKER_RADIUS_PX,
            indicator_ms: INDICATOR_MS,
            highlight_ms: HIGHLIGHT_MS,
        }
    }
}

impl SurfaceConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `MARKUP_EDITING_ENABLED`: default `true`
    /// - `MARKUP_SHOW_SOLVED`: default `false`
    /// - `MARKUP_MIN_BOX_PX`: default 10
    /// - `MARKUP_MARKER_RADIUS_PX`: default 10
    /// - `MARKUP_INDICATOR_MS`: default 2000
    /// - `MARKUP_HIGHLIGHT_MS`: default 1500
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a malformed boolean or a non-positive size.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).map_err(|_| ()))
    }

    /// Build config from an arbitrary key lookup. Used by `from_env` and tests.
    ///
    /// # Errors
    ///
    /// Same as [`SurfaceConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, ()>,
    {
        let defaults = Self::default();
        let config = Self {
            editing_enabled: parse_bool(&lookup, "MARKUP_EDITING_ENABLED", defaults.editing_enabled)?,
            show_solved: parse_bool(&lookup, "MARKUP_SHOW_SOLVED", defaults.show_solved)?,
            min_box_px: env_parse(&lookup, "MARKUP_MIN_BOX_PX", defaults.min_box_px),
            marker_radius_px: env_parse(&lookup, "MARKUP_MARKER_RADIUS_PX", defaults.marker_radius_px),
            indicator_ms: env_parse(&lookup, "MARKUP_INDICATOR_MS", defaults.indicator_ms),
            highlight_ms: env_parse(&lookup, "MARKUP_HIGHLIGHT_MS", defaults.highlight_ms),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("MARKUP_MIN_BOX_PX", self.min_box_px),
            ("MARKUP_MARKER_RADIUS_PX", self.marker_radius_px),
            ("MARKUP_INDICATOR_MS", self.indicator_ms),
            ("MARKUP_HIGHLIGHT_MS", self.highlight_ms),
        ];
        for (key, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { key, value });
            }
        }
        Ok(())
    }
}

fn env_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Result<String, ()>,
    T: std::str::FromStr + Copy,
{
    match lookup(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(()) => default,
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Result<String, ()>,
{
    let Ok(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool { key, raw }),
    }
}
