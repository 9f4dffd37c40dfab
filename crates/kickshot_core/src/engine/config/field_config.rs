//! Field, goal and match-rule dimensions

use serde::{Deserialize, Serialize};

/// Pitch geometry. The pitch is centred on the origin; goals sit on the
/// Z axis at `±half_length`. Home defends +Z, away defends -Z.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Half extent along X (touchlines at ±half_width)
    pub half_width: f32,
    /// Half extent along Z (goal lines at ±half_length)
    pub half_length: f32,
    /// Half width of the goal mouth
    pub goal_half_width: f32,
    /// Crossbar height
    pub goal_height: f32,
    /// Net depth behind the goal line
    pub goal_depth: f32,
    /// Out-of-bounds slack beyond the touchlines
    pub out_of_bounds_margin_x: f32,
    /// Out-of-bounds slack beyond the goal lines
    pub out_of_bounds_margin_z: f32,
    /// Ball below this height counts as out of bounds (fell through)
    pub out_of_bounds_min_y: f32,
    /// Ball above this height counts as out of bounds
    pub out_of_bounds_max_y: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            half_width: 20.0,
            half_length: 30.0,
            goal_half_width: 3.66,
            goal_height: 2.44,
            goal_depth: 2.0,
            out_of_bounds_margin_x: 1.5,
            out_of_bounds_margin_z: 3.5,
            out_of_bounds_min_y: -2.0,
            out_of_bounds_max_y: 25.0,
        }
    }
}

/// Match flow timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Length of a match on the simulation clock
    pub match_duration_ms: f64,
    /// Intro camera sweep length
    pub intro_duration_ms: f64,
    /// Pause after a goal when no replay plays
    pub goal_pause_ms: f64,
    /// Height the ball is placed at on the centre spot
    pub kickoff_ball_height: f32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            match_duration_ms: 180_000.0,
            intro_duration_ms: 3_000.0,
            goal_pause_ms: 1_500.0,
            kickoff_ball_height: 0.55,
        }
    }
}
