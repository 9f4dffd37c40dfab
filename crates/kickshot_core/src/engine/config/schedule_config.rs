//! Periodic task cadence and power-play pickups

use crate::engine::types::Vec3;
use serde::{Deserialize, Serialize};

/// Cadence of the coarse periodic subsystems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Goalkeeper + opponent controller tick
    pub ai_interval_ms: f64,
    /// Replay frame sampling
    pub replay_sample_ms: f64,
    /// Power-up spawn attempts
    pub power_play_interval_ms: f64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { ai_interval_ms: 50.0, replay_sample_ms: 34.0, power_play_interval_ms: 9_000.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub enabled: bool,
    /// Spawn points visited in order
    pub spawn_points: Vec<Vec3>,
    pub max_active: usize,
    pub pickup_radius: f32,
    pub effect_duration_ms: f64,
    /// Kick power multiplier granted by a power pickup
    pub power_multiplier: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_points: vec![
                Vec3::new(-10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, -8.0),
                Vec3::new(0.0, 0.0, 10.0),
                Vec3::new(-6.0, 0.0, -14.0),
            ],
            max_active: 2,
            pickup_radius: 1.6,
            effect_duration_ms: 6_000.0,
            power_multiplier: 1.4,
        }
    }
}
