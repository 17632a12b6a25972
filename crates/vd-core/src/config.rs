//! Editor configuration.
//!
//! Loaded from JSON; every field has a default so partial files work.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scale bounds must satisfy 0 < min_scale <= max_scale (got {min} .. {max})")]
    ScaleBounds { min: f64, max: f64 },
    #[error("sense_range must be a non-negative number (got {0})")]
    SenseRange(f64),
    #[error("{name} must be a positive finite number (got {value})")]
    ZoomFactor { name: &'static str, value: f64 },
    #[error("zoom_duration_ms must be a non-negative finite number (got {0})")]
    ZoomDuration(f64),
    #[error("history_depth must be at least 1 when set")]
    HistoryDepth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Hit radius in screen pixels for the vertex-insert edge search.
    pub sense_range: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Length of the animated double-click zoom.
    pub zoom_duration_ms: f64,
    pub dblclick_zoom: f64,
    /// Wheel zoom multiplier is `wheel_zoom_base ^ (delta_y / 100)`.
    pub wheel_zoom_base: f64,
    /// Maximum undo depth; `None` keeps everything.
    pub history_depth: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sense_range: 8.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_duration_ms: 250.0,
            dblclick_zoom: 2.0,
            wheel_zoom_base: 0.95,
            history_depth: None,
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(ConfigError::ScaleBounds {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        if !(self.sense_range >= 0.0) {
            return Err(ConfigError::SenseRange(self.sense_range));
        }
        for (name, value) in [
            ("wheel_zoom_base", self.wheel_zoom_base),
            ("dblclick_zoom", self.dblclick_zoom),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ZoomFactor { name, value });
            }
        }
        if !(self.zoom_duration_ms.is_finite() && self.zoom_duration_ms >= 0.0) {
            return Err(ConfigError::ZoomDuration(self.zoom_duration_ms));
        }
        if self.history_depth == Some(0) {
            return Err(ConfigError::HistoryDepth);
        }
        Ok(())
    }

    pub fn clamp_scale(&self, k: f64) -> f64 {
        k.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let config = AppConfig::from_json(r#"{ "senseRange": 12 }"#).unwrap();
        assert_eq!(config.sense_range, 12.0);
        assert_eq!(config.min_scale, MIN_SCALE);
        assert_eq!(config.zoom_duration_ms, 250.0);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = AppConfig::from_json(r#"{ "minScale": 4, "maxScale": 2 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ScaleBounds { .. }));
    }

    #[test]
    fn rejects_negative_sense_range() {
        let err = AppConfig::from_json(r#"{ "senseRange": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SenseRange(_)));
    }

    #[test]
    fn rejects_non_positive_zoom_factors() {
        let err = AppConfig::from_json(r#"{ "wheelZoomBase": -0.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZoomFactor { name: "wheel_zoom_base", .. }
        ));
        let err = AppConfig::from_json(r#"{ "dblclickZoom": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ZoomFactor { name: "dblclick_zoom", .. }
        ));
        let err = AppConfig::from_json(r#"{ "zoomDurationMs": -1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZoomDuration(_)));
    }

    #[test]
    fn rejects_zero_history_depth() {
        let err = AppConfig::from_json(r#"{ "historyDepth": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::HistoryDepth));
        assert!(AppConfig::from_json(r#"{ "historyDepth": 1 }"#).is_ok());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            AppConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
