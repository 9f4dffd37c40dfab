//! AI goalkeeper / opponent tuning and difficulty presets

use crate::engine::types::Vec3;
use serde::{Deserialize, Serialize};

/// Difficulty tiers exposed to players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl DifficultyLevel {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" | "casual" => Some(DifficultyLevel::Easy),
            "normal" | "standard" => Some(DifficultyLevel::Normal),
            "hard" | "pro" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }
}

/// Per-difficulty multipliers shared by keepers and opponents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyPreset {
    /// AI stays idle this long after each kickoff
    pub reaction_ms: f64,
    /// Ball distance within which opponents engage
    pub chase_range: f32,
    /// Ball distance that counts as pressure (shots, teammate support)
    pub pressure_distance: f32,
    pub max_run_speed_multiplier: f32,
    pub keeper_reach_multiplier: f32,
}

impl DifficultyPreset {
    pub fn for_level(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Easy => Self {
                reaction_ms: 380.0,
                chase_range: 10.0,
                pressure_distance: 4.5,
                max_run_speed_multiplier: 0.8,
                keeper_reach_multiplier: 0.85,
            },
            DifficultyLevel::Normal => Self {
                reaction_ms: 260.0,
                chase_range: 14.0,
                pressure_distance: 6.0,
                max_run_speed_multiplier: 1.0,
                keeper_reach_multiplier: 1.0,
            },
            DifficultyLevel::Hard => Self {
                reaction_ms: 160.0,
                chase_range: 18.0,
                pressure_distance: 7.5,
                max_run_speed_multiplier: 1.15,
                keeper_reach_multiplier: 1.2,
            },
        }
    }
}

impl Default for DifficultyPreset {
    fn default() -> Self {
        Self::for_level(DifficultyLevel::Normal)
    }
}

/// Goalkeeper behaviour parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    /// Goal-line depth inside which the keeper reacts
    pub reaction_distance: f32,
    /// Minimum closing speed toward goal for the reaction zone
    pub approach_speed_threshold: f32,
    /// Track while the ball is within this multiple of the reaction distance
    pub track_range_factor: f32,
    pub save_radius: f32,
    pub save_cooldown_ms: f64,
    pub distribute_ms: f64,
    /// Units/s before the difficulty multiplier
    pub base_run_speed: f32,
    // === Clearance impulse ===
    pub clear_lateral: f32,
    pub clear_up: f32,
    pub clear_forward: f32,
    // === Movement envelope ===
    /// Lateral limit either side of the goal centre
    pub lateral_limit: f32,
    /// Furthest the keeper leaves the goal line
    pub max_advance: f32,
    /// Fraction of the ball's depth offset the keeper follows when intercepting
    pub intercept_depth_damping: f32,
    /// Fraction of the ball's lateral offset the keeper mirrors when tracking
    pub track_lateral_factor: f32,
    /// Keeper stands this far in front of the goal line at home
    pub home_offset: f32,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            reaction_distance: 11.0,
            approach_speed_threshold: 0.15,
            track_range_factor: 1.5,
            save_radius: 2.6,
            save_cooldown_ms: 900.0,
            distribute_ms: 600.0,
            base_run_speed: 17.0,
            clear_lateral: 3.5,
            clear_up: 6.0,
            clear_forward: 16.0,
            lateral_limit: 4.5,
            max_advance: 5.0,
            intercept_depth_damping: 0.35,
            track_lateral_factor: 0.7,
            home_offset: 1.0,
        }
    }
}

/// Outfield opponent behaviour parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Units/s before the difficulty multiplier
    pub base_run_speed: f32,
    /// Fraction of chase range that triggers a direct intercept
    pub intercept_weight: f32,
    /// Distance to the target goal inside which a shot is taken
    pub shoot_distance: f32,
    pub shot_speed: f32,
    pub shot_lift: f32,
    pub recover_ms: f64,
    pub shot_cooldown_ms: f64,
    /// Retreat distance away from the goal direction after shooting
    pub retreat_distance: f32,
    /// Blend toward the ball lead point while intercepting
    pub intercept_ball_bias: f32,
    /// Blend toward the ball while tracking
    pub track_ball_bias: f32,
    /// Seconds of ball velocity added to the intercept lead point
    pub lead_time_s: f32,
    /// One opponent is created per home position
    pub home_positions: Vec<Vec3>,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            base_run_speed: 20.0,
            intercept_weight: 0.55,
            shoot_distance: 14.0,
            shot_speed: 26.0,
            shot_lift: 3.0,
            recover_ms: 900.0,
            shot_cooldown_ms: 2_200.0,
            retreat_distance: 2.4,
            intercept_ball_bias: 0.8,
            track_ball_bias: 0.45,
            lead_time_s: 0.2,
            home_positions: vec![Vec3::new(-10.0, 0.0, -10.0), Vec3::new(10.0, 0.0, -10.0)],
        }
    }
}
