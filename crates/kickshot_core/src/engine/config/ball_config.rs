//! Ball control and shot tuning

use serde::{Deserialize, Serialize};

/// Possession arbitration and ball governor parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    // === Possession ===
    /// Base planar reach of a player (widened by `scale * 0.35`)
    pub touch_radius: f32,
    /// Allowed vertical offset between ball and carry height
    pub height_tolerance: f32,
    /// Carry height as a fraction of player scale (floored at 0.55)
    pub follow_height_multiplier: f32,
    /// Distance in front of the possessor where the ball is held; must stay
    /// inside `touch_radius` or the carrier drops the ball on the next tick
    pub follow_distance: f32,
    /// Lock after kicks, passes and kickoffs before anyone may reacquire
    pub reacquire_cooldown_ms: f64,

    // === Governor ===
    /// Total ball speed cap outside kick decay
    pub max_ball_speed: f32,
    /// Cap multiplier while a speed power-up is active
    pub speed_boost_factor: f32,

    // === Out of bounds ===
    /// Re-entrant lock before another out-of-bounds callback may fire
    pub out_of_bounds_lock_ms: f64,
    /// A ball left outside this long reports again
    pub out_of_bounds_timeout_ms: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            touch_radius: 1.1,
            height_tolerance: 1.25,
            follow_height_multiplier: 0.5,
            follow_distance: 0.85,
            reacquire_cooldown_ms: 350.0,
            max_ball_speed: 38.0,
            speed_boost_factor: 1.35,
            out_of_bounds_lock_ms: 400.0,
            out_of_bounds_timeout_ms: 2_000.0,
        }
    }
}

/// Shot meter timings and launch curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotConfig {
    // === Meter ===
    /// Hold time that reaches a full meter
    pub max_charge_ms: f64,
    pub perfect_window_start: f32,
    pub perfect_window_end: f32,
    /// Floor applied to every release so taps still kick
    pub min_charge_ratio: f32,
    /// Lock after a release during which charging cannot restart
    pub recharge_cooldown_ms: f64,
    /// Window in which a press before possession still auto-taps
    pub pre_possession_auto_tap_window_ms: f64,

    // === Launch ===
    pub min_launch_speed: f32,
    pub max_launch_speed: f32,
    pub min_up_speed: f32,
    pub max_up_speed: f32,
    /// Planar speed bonus for a perfect release
    pub perfect_bonus: f32,
    /// Upper clamp of the power multiplier on planar speed
    pub max_power_multiplier: f32,
    /// Upper clamp of the power multiplier on upward speed
    pub max_up_multiplier: f32,

    // === Decay ===
    pub kick_decay_duration_ms: f64,
    pub kick_end_speed: f32,
    /// Exponent rate of the relaxation curve
    pub kick_decay_rate: f32,
}

impl Default for ShotConfig {
    fn default() -> Self {
        Self {
            max_charge_ms: 1_200.0,
            perfect_window_start: 0.78,
            perfect_window_end: 0.90,
            min_charge_ratio: 0.15,
            recharge_cooldown_ms: 250.0,
            pre_possession_auto_tap_window_ms: 180.0,

            min_launch_speed: 14.0,
            max_launch_speed: 34.0,
            min_up_speed: 1.5,
            max_up_speed: 7.5,
            perfect_bonus: 1.1,
            max_power_multiplier: 1.6,
            max_up_multiplier: 1.35,

            kick_decay_duration_ms: 650.0,
            kick_end_speed: 12.0,
            kick_decay_rate: 4.0,
        }
    }
}
