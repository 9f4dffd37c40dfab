//! Shared value types for the gameplay core
//!
//! Positions and velocities are world-space `Vector3<f32>` (Y up). Only the
//! yaw component of a rotation is meaningful. Timestamps are milliseconds on
//! the host's simulation clock, carried as `f64`.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;

/// Milliseconds on the simulation clock.
pub type TimestampMs = f64;

/// Below this planar length a direction is treated as degenerate.
pub const DIRECTION_EPSILON: f32 = 1e-4;

/// Team the human controls is `Home`; the AI team is `Away`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    /// Lateral bias used for clearances (+X for home, -X for away).
    pub fn lateral_sign(&self) -> f32 {
        match self {
            TeamSide::Home => 1.0,
            TeamSide::Away => -1.0,
        }
    }

    /// Z sign of the goal this side defends (home +Z, away -Z).
    pub fn defended_goal_sign(&self) -> f32 {
        match self {
            TeamSide::Home => 1.0,
            TeamSide::Away => -1.0,
        }
    }

    pub fn team_id(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

/// Throttled physics sample of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub timestamp_ms: TimestampMs,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Who currently controls the ball. Both fields are `None` when loose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionState {
    pub team_id: Option<String>,
    pub player_id: Option<String>,
}

impl PossessionState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn held_by(team_id: &str, player_id: &str) -> Self {
        Self { team_id: Some(team_id.to_string()), player_id: Some(player_id.to_string()) }
    }

    pub fn is_loose(&self) -> bool {
        self.player_id.is_none()
    }
}

/// Controllable player as reported by the host every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub team_id: String,
    pub position: Vec3,
    pub yaw: f32,
    /// Visual scale of the player model; widens the touch radius.
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl PlayerSnapshot {
    pub fn new(id: &str, team_id: &str, position: Vec3, yaw: f32) -> Self {
        Self { id: id.to_string(), team_id: team_id.to_string(), position, yaw, scale: 1.0 }
    }
}

/// Position plus yaw of any mobile entity, as handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPose {
    pub id: String,
    pub position: Vec3,
    pub yaw: f32,
}

pub fn planar(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

pub fn planar_distance(a: &Vec3, b: &Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit planar vector for a yaw angle (yaw 0 faces +Z).
pub fn yaw_to_direction(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, yaw.cos())
}

/// Yaw that faces from `from` toward `to`, or `None` when they coincide.
pub fn yaw_towards(from: &Vec3, to: &Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    if dx * dx + dz * dz < DIRECTION_EPSILON * DIRECTION_EPSILON {
        return None;
    }
    Some(dx.atan2(dz))
}

/// Normalized planar direction, or `None` for degenerate input.
pub fn planar_normalize(v: &Vec3) -> Option<Vec3> {
    let p = planar(v);
    let len = p.norm();
    if len < DIRECTION_EPSILON {
        None
    } else {
        Some(p / len)
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp_vec(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

/// Moves `from` toward `to` by at most `max_step`.
pub fn step_towards(from: &Vec3, to: &Vec3, max_step: f32) -> Vec3 {
    let delta = to - from;
    let dist = delta.norm();
    if dist <= max_step || dist < DIRECTION_EPSILON {
        *to
    } else {
        from + delta * (max_step / dist)
    }
}

/// Validates a raw numeric triple coming from outside the core.
pub fn vec3_from_slice(raw: &[f32]) -> Option<Vec3> {
    if raw.len() < 3 || !raw[..3].iter().all(|v| v.is_finite()) {
        return None;
    }
    Some(Vec3::new(raw[0], raw[1], raw[2]))
}

pub fn is_finite_vec(v: &Vec3) -> bool {
    v.iter().all(|c| c.is_finite())
}
