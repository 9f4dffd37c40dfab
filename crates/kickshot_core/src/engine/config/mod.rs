//! # Engine Configuration Module
//!
//! Every tuning constant of the gameplay core lives here and is injected
//! into the controllers; nothing below `engine` hard-codes a gameplay number.
//!
//! ## Presets
//! - `ArcadeConfig::casual()`: easy AI
//! - `ArcadeConfig::standard()`: default
//! - `ArcadeConfig::pro()`: hard AI, narrower perfect window
//!
//! ## Usage
//! ```rust
//! use kickshot_core::engine::config::ArcadeConfig;
//!
//! let config = ArcadeConfig::default();
//! let pro = ArcadeConfig::pro();
//! assert!(pro.validate().is_ok());
//! ```
//!
//! ## Environment Variables
//!
//! - `KICKSHOT_PROFILE`: Select preset (casual, standard, pro)

mod agent_config;
mod ball_config;
mod camera_config;
mod field_config;
mod replay_config;
mod schedule_config;

pub use agent_config::{DifficultyLevel, DifficultyPreset, KeeperConfig, OpponentConfig};
pub use ball_config::{BallConfig, ShotConfig};
pub use camera_config::{CameraConfig, CameraProfile, CameraProfiles};
pub use field_config::{FieldConfig, RulesConfig};
pub use replay_config::ReplayConfig;
pub use schedule_config::{PowerUpConfig, ScheduleConfig};

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const PROFILE_ENV_VAR: &str = "KICKSHOT_PROFILE";

/// Complete injected configuration of the core
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArcadeConfig {
    pub field: FieldConfig,
    pub rules: RulesConfig,
    pub ball: BallConfig,
    pub shot: ShotConfig,
    pub goalkeeper: KeeperConfig,
    pub opponent: OpponentConfig,
    pub difficulty: DifficultyPreset,
    pub replay: ReplayConfig,
    pub camera: CameraConfig,
    pub schedule: ScheduleConfig,
    pub power_ups: PowerUpConfig,
}

impl ArcadeConfig {
    /// Forgiving AI for new players
    pub fn casual() -> Self {
        Self::default().with_difficulty(DifficultyLevel::Easy)
    }

    pub fn standard() -> Self {
        Self::default()
    }

    /// Sharper AI and a tighter perfect window
    pub fn pro() -> Self {
        let mut cfg = Self::default().with_difficulty(DifficultyLevel::Hard);
        cfg.shot.perfect_window_start = 0.82;
        cfg.shot.perfect_window_end = 0.88;
        cfg.shot.pre_possession_auto_tap_window_ms = 120.0;
        cfg
    }

    pub fn for_profile(name: &str) -> Option<Self> {
        match DifficultyLevel::from_name(name)? {
            DifficultyLevel::Easy => Some(Self::casual()),
            DifficultyLevel::Normal => Some(Self::standard()),
            DifficultyLevel::Hard => Some(Self::pro()),
        }
    }

    /// Reads `KICKSHOT_PROFILE`, falling back to the standard preset.
    pub fn from_env_or_default() -> Self {
        match std::env::var(PROFILE_ENV_VAR) {
            Ok(name) => Self::for_profile(&name).unwrap_or_else(|| {
                log::warn!("Unknown {} '{}', using standard preset", PROFILE_ENV_VAR, name);
                Self::standard()
            }),
            Err(_) => Self::standard(),
        }
    }

    pub fn with_difficulty(mut self, level: DifficultyLevel) -> Self {
        self.difficulty = DifficultyPreset::for_level(level);
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads by file extension (`.json`, `.yaml`, `.yml`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let raw = std::fs::read_to_string(path)?;
        let cfg = match extension.as_str() {
            "json" => Self::from_json_str(&raw)?,
            "yaml" | "yml" => Self::from_yaml_str(&raw)?,
            _ => return Err(ConfigError::UnsupportedFormat { extension }),
        };
        log::debug!("Loaded config from {:?}", path);
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Rejects values the controllers cannot work with.
    pub fn validate(&self) -> Result<()> {
        let f = &self.field;
        ensure(f.half_width > 0.0, "field.half_width", "must be positive")?;
        ensure(f.half_length > 0.0, "field.half_length", "must be positive")?;
        ensure(
            f.goal_half_width > 0.0 && f.goal_half_width < f.half_width,
            "field.goal_half_width",
            "must be positive and narrower than the field",
        )?;

        let s = &self.shot;
        ensure(s.max_charge_ms > 0.0, "shot.max_charge_ms", "must be positive")?;
        ensure(
            (0.0..=1.0).contains(&s.perfect_window_start)
                && (0.0..=1.0).contains(&s.perfect_window_end)
                && s.perfect_window_start <= s.perfect_window_end,
            "shot.perfect_window_start",
            "perfect window must be an ordered range inside [0, 1]",
        )?;
        ensure(
            s.min_charge_ratio > 0.0 && s.min_charge_ratio <= 1.0,
            "shot.min_charge_ratio",
            "must be in (0, 1]",
        )?;
        ensure(
            s.min_launch_speed <= s.max_launch_speed,
            "shot.min_launch_speed",
            "must not exceed max_launch_speed",
        )?;
        ensure(s.max_power_multiplier >= 1.0, "shot.max_power_multiplier", "must be >= 1")?;
        ensure(s.max_up_multiplier >= 1.0, "shot.max_up_multiplier", "must be >= 1")?;

        let b = &self.ball;
        ensure(b.touch_radius > 0.0, "ball.touch_radius", "must be positive")?;
        ensure(
            b.follow_distance >= 0.0 && b.follow_distance < b.touch_radius,
            "ball.follow_distance",
            "must be in [0, touch_radius)",
        )?;
        ensure(b.max_ball_speed > 0.0, "ball.max_ball_speed", "must be positive")?;
        ensure(b.speed_boost_factor >= 1.0, "ball.speed_boost_factor", "must be >= 1")?;
        ensure(
            b.out_of_bounds_timeout_ms >= b.out_of_bounds_lock_ms,
            "ball.out_of_bounds_timeout_ms",
            "must not be shorter than out_of_bounds_lock_ms",
        )?;

        let r = &self.replay;
        ensure(r.frame_interval_ms > 0.0, "replay.frame_interval_ms", "must be positive")?;
        ensure(
            r.max_buffer_frames > r.pre_event_frames + r.post_event_frames,
            "replay.max_buffer_frames",
            "must hold pre_event_frames + post_event_frames + 1",
        )?;

        let c = &self.camera;
        ensure(
            c.smoothing_alpha > 0.0 && c.smoothing_alpha <= 1.0,
            "camera.smoothing_alpha",
            "must be in (0, 1]",
        )?;
        ensure(
            c.replay_alpha > 0.0 && c.replay_alpha <= 1.0,
            "camera.replay_alpha",
            "must be in (0, 1]",
        )?;

        let t = &self.schedule;
        ensure(t.ai_interval_ms > 0.0, "schedule.ai_interval_ms", "must be positive")?;
        ensure(t.replay_sample_ms > 0.0, "schedule.replay_sample_ms", "must be positive")?;
        ensure(
            t.power_play_interval_ms > 0.0,
            "schedule.power_play_interval_ms",
            "must be positive",
        )?;

        let d = &self.difficulty;
        ensure(
            d.max_run_speed_multiplier > 0.0 && d.keeper_reach_multiplier > 0.0,
            "difficulty",
            "multipliers must be positive",
        )?;

        if self.power_ups.enabled {
            ensure(
                !self.power_ups.spawn_points.is_empty(),
                "power_ups.spawn_points",
                "enabled power-ups need at least one spawn point",
            )?;
        }
        Ok(())
    }
}

fn ensure(condition: bool, field: &'static str, reason: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, reason))
    }
}

// ========== Tests ==========

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_validate() {
        assert!(ArcadeConfig::casual().validate().is_ok());
        assert!(ArcadeConfig::standard().validate().is_ok());
        assert!(ArcadeConfig::pro().validate().is_ok());
    }

    #[test]
    fn test_pro_is_harder() {
        let standard = ArcadeConfig::standard();
        let pro = ArcadeConfig::pro();
        assert!(
            pro.difficulty.keeper_reach_multiplier > standard.difficulty.keeper_reach_multiplier
        );
        let pro_window = pro.shot.perfect_window_end - pro.shot.perfect_window_start;
        let std_window = standard.shot.perfect_window_end - standard.shot.perfect_window_start;
        assert!(pro_window < std_window);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let cfg = ArcadeConfig::from_yaml_str("shot:\n  max_charge_ms: 900\n").unwrap();
        assert!((cfg.shot.max_charge_ms - 900.0).abs() < 1e-9);
        assert!((cfg.shot.min_charge_ratio - 0.15).abs() < 1e-6);
        assert_eq!(cfg.replay.max_buffer_frames, 180);
    }

    #[test]
    fn test_partial_difficulty_merges_with_standard() {
        let cfg = ArcadeConfig::from_yaml_str("difficulty:\n  reaction_ms: 500\n").unwrap();
        assert!((cfg.difficulty.reaction_ms - 500.0).abs() < 1e-9);
        assert_eq!(cfg.difficulty.chase_range, DifficultyPreset::default().chase_range);

        let raw = r#"{"difficulty": {"keeper_reach_multiplier": 1.3}}"#;
        let cfg = ArcadeConfig::from_json_str(raw).unwrap();
        assert_eq!(cfg.difficulty.keeper_reach_multiplier, 1.3);
        assert!((cfg.difficulty.reaction_ms - 260.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let err = ArcadeConfig::from_json_str(
            r#"{"shot": {"perfect_window_start": 0.95, "perfect_window_end": 0.9}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "shot.perfect_window_start", .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_replay_capacity_must_cover_slice() {
        let mut cfg = ArcadeConfig::default();
        cfg.replay.max_buffer_frames = cfg.replay.pre_event_frames + cfg.replay.post_event_frames;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_load_from_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = ArcadeConfig::pro().to_json_pretty().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let loaded = ArcadeConfig::load(file.path()).unwrap();
        assert_eq!(loaded.difficulty, DifficultyPreset::for_level(DifficultyLevel::Hard));
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = ArcadeConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_profile_names() {
        assert!(ArcadeConfig::for_profile("pro").is_some());
        assert!(ArcadeConfig::for_profile("nightmare").is_none());
    }
}
