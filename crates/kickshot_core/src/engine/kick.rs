//! Kick launch parameters and post-kick speed decay

use crate::engine::config::ShotConfig;
use crate::engine::shot_charge::KickRequest;
use crate::engine::types::{lerp, yaw_to_direction, TimestampMs, Vec3, DIRECTION_EPSILON};
use serde::{Deserialize, Serialize};

/// Velocity handed to the ball body when a kick is applied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickLaunch {
    pub planar_speed: f32,
    pub up_speed: f32,
    /// Unit planar facing of the kicker
    pub direction: Vec3,
}

impl KickLaunch {
    /// Planar speed = lerp(min, max, effective) × perfect bonus × power
    /// (clamped to [1, max_power]); upward speed uses its own clamp.
    pub fn from_request(
        request: &KickRequest,
        kicker_yaw: f32,
        power_multiplier: f32,
        cfg: &ShotConfig,
    ) -> Self {
        let ratio = request.effective_charge_ratio.clamp(0.0, 1.0);
        let power = if power_multiplier.is_finite() { power_multiplier } else { 1.0 };
        let perfect_bonus = if request.is_perfect { cfg.perfect_bonus } else { 1.0 };

        let planar_speed = lerp(cfg.min_launch_speed, cfg.max_launch_speed, ratio)
            * perfect_bonus
            * power.clamp(1.0, cfg.max_power_multiplier);
        let up_speed = lerp(cfg.min_up_speed, cfg.max_up_speed, ratio)
            * power.clamp(1.0, cfg.max_up_multiplier);

        Self { planar_speed, up_speed, direction: yaw_to_direction(kicker_yaw) }
    }

    pub fn velocity(&self) -> Vec3 {
        Vec3::new(
            self.direction.x * self.planar_speed,
            self.up_speed,
            self.direction.z * self.planar_speed,
        )
    }
}

/// Exponential relaxation of planar speed after a kick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickDecay {
    pub started_ms: TimestampMs,
    pub launch_speed: f32,
}

impl KickDecay {
    pub fn new(started_ms: TimestampMs, launch_speed: f32) -> Self {
        Self { started_ms, launch_speed }
    }

    pub fn is_active(&self, now_ms: TimestampMs, cfg: &ShotConfig) -> bool {
        now_ms >= self.started_ms && now_ms - self.started_ms < cfg.kick_decay_duration_ms
    }

    /// Speed the ball should not exceed at `now_ms`, `None` once finished.
    pub fn target_speed(&self, now_ms: TimestampMs, cfg: &ShotConfig) -> Option<f32> {
        if !self.is_active(now_ms, cfg) || cfg.kick_decay_duration_ms <= 0.0 {
            return None;
        }
        let progress = ((now_ms - self.started_ms) / cfg.kick_decay_duration_ms) as f32;
        let end = cfg.kick_end_speed.min(self.launch_speed);
        Some(end + (self.launch_speed - end) * (-cfg.kick_decay_rate * progress).exp())
    }

    /// Slows the planar component toward the decay curve; never speeds it up.
    pub fn apply(&self, now_ms: TimestampMs, velocity: Vec3, cfg: &ShotConfig) -> Vec3 {
        let Some(target) = self.target_speed(now_ms, cfg) else {
            return velocity;
        };
        let planar_speed = (velocity.x * velocity.x + velocity.z * velocity.z).sqrt();
        if planar_speed <= target || planar_speed < DIRECTION_EPSILON {
            return velocity;
        }
        let scale = target / planar_speed;
        Vec3::new(velocity.x * scale, velocity.y, velocity.z * scale)
    }
}
