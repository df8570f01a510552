use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunable parameters of a draw session. The defaults match the reference
/// behavior of the classroom app: a 3 second roll that decelerates from
/// 40 fps to 4 fps, winner counts 1-4 and point values 1, 2, 3 or 5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawConfig {
    pub roll_duration_ms: u64,
    pub fps_high: f64,
    pub fps_low: f64,
    pub count_menu: Vec<usize>,
    pub point_menu: Vec<i64>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            roll_duration_ms: 3000,
            fps_high: 40.0,
            fps_low: 4.0,
            count_menu: vec![1, 2, 3, 4],
            point_menu: vec![1, 2, 3, 5],
        }
    }
}

impl DrawConfig {
    /// Rejects configurations the session cannot run with. Called at
    /// session construction; menus and timing never change mid-session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roll_duration_ms == 0 {
            return Err(ConfigError::BadRollDuration);
        }
        if !(self.fps_low > 0.0 && self.fps_high >= self.fps_low) {
            return Err(ConfigError::BadFrameRate {
                high: self.fps_high,
                low: self.fps_low,
            });
        }
        if self.count_menu.is_empty() || self.count_menu.iter().any(|&c| c == 0) {
            return Err(ConfigError::BadCountMenu);
        }
        if self.point_menu.is_empty() {
            return Err(ConfigError::BadPointMenu);
        }
        Ok(())
    }

    pub fn roll_duration(&self) -> Duration {
        Duration::from_millis(self.roll_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(DrawConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_zero_roll_duration() {
        let cfg = DrawConfig {
            roll_duration_ms: 0,
            ..DrawConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BadRollDuration));
    }

    #[test]
    fn rejects_inverted_frame_rates() {
        let cfg = DrawConfig {
            fps_high: 4.0,
            fps_low: 40.0,
            ..DrawConfig::default()
        };
        assert_eq!(
            cfg.validate().map_err(|e| e.code()),
            Err("bad_frame_rate")
        );
    }

    #[test]
    fn rejects_zero_in_count_menu() {
        let cfg = DrawConfig {
            count_menu: vec![0, 1],
            ..DrawConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BadCountMenu));
    }

    #[test]
    fn rejects_empty_point_menu() {
        let cfg = DrawConfig {
            point_menu: vec![],
            ..DrawConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::BadPointMenu));
    }

    #[test]
    fn deserializes_partial_overrides_onto_defaults() {
        let cfg: DrawConfig =
            serde_json::from_str(r#"{"rollDurationMs":1500,"pointMenu":[10]}"#).expect("parse");
        assert_eq!(cfg.roll_duration(), Duration::from_millis(1500));
        assert_eq!(cfg.point_menu, vec![10]);
        assert_eq!(cfg.count_menu, vec![1, 2, 3, 4]);
    }
}
