//! Camera FOV / offset / smoothing tables

use crate::camera::CameraMode;
use crate::engine::types::Vec3;
use serde::{Deserialize, Serialize};

/// Desired framing for one camera mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraProfile {
    /// Camera position relative to the focus point
    pub offset: Vec3,
    pub fov: f32,
    /// Weight of the ball in the focus point (rest goes to the player cluster)
    pub ball_weight: f32,
}

impl CameraProfile {
    fn new(offset: [f32; 3], fov: f32, ball_weight: f32) -> Self {
        Self { offset: Vec3::new(offset[0], offset[1], offset[2]), fov, ball_weight }
    }
}

/// One profile per non-intro mode
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProfiles {
    pub broadcast_build_up: CameraProfile,
    pub broadcast_wide: CameraProfile,
    pub attacking_third: CameraProfile,
    pub shot: CameraProfile,
    pub goal: CameraProfile,
    pub save: CameraProfile,
    pub replay: CameraProfile,
    pub free_roam: CameraProfile,
}

impl Default for CameraProfiles {
    fn default() -> Self {
        Self {
            broadcast_build_up: CameraProfile::new([0.0, 14.0, 20.0], 52.0, 0.6),
            broadcast_wide: CameraProfile::new([0.0, 20.0, 28.0], 60.0, 0.4),
            attacking_third: CameraProfile::new([0.0, 11.0, 15.0], 48.0, 0.7),
            shot: CameraProfile::new([0.0, 6.0, 10.0], 42.0, 0.9),
            goal: CameraProfile::new([6.0, 5.0, 9.0], 38.0, 1.0),
            save: CameraProfile::new([-5.0, 5.0, 8.0], 40.0, 0.8),
            replay: CameraProfile::new([8.0, 7.0, 10.0], 45.0, 1.0),
            free_roam: CameraProfile::new([0.0, 18.0, 24.0], 58.0, 0.5),
        }
    }
}

impl CameraProfiles {
    /// Intro has no profile of its own and falls back to the wide view.
    pub fn get(&self, mode: CameraMode) -> &CameraProfile {
        match mode {
            CameraMode::BroadcastBuildUp => &self.broadcast_build_up,
            CameraMode::BroadcastWide | CameraMode::Intro => &self.broadcast_wide,
            CameraMode::AttackingThird => &self.attacking_third,
            CameraMode::Shot => &self.shot,
            CameraMode::Goal => &self.goal,
            CameraMode::Save => &self.save,
            CameraMode::Replay => &self.replay,
            CameraMode::FreeRoam => &self.free_roam,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Per-tick lerp factor toward the desired pose
    pub smoothing_alpha: f32,
    /// Lerp factor while in replay mode
    pub replay_alpha: f32,
    /// Minimum simulated time between camera-state emissions
    pub emit_interval_ms: f64,
    pub intro_start: Vec3,
    pub intro_end: Vec3,
    pub intro_target: Vec3,
    pub intro_fov: f32,
    // === Event holds ===
    pub shot_hold_ms: f64,
    pub save_hold_ms: f64,
    pub goal_hold_ms: f64,
    /// |z| beyond this fraction of the half length counts as an attacking third
    pub attacking_third_fraction: f32,
    pub profiles: CameraProfiles,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.08,
            replay_alpha: 0.18,
            emit_interval_ms: 100.0,
            intro_start: Vec3::new(0.0, 38.0, 70.0),
            intro_end: Vec3::new(0.0, 14.0, 20.0),
            intro_target: Vec3::zeros(),
            intro_fov: 60.0,
            shot_hold_ms: 1_200.0,
            save_hold_ms: 1_400.0,
            goal_hold_ms: 2_500.0,
            attacking_third_fraction: 1.0 / 3.0,
            profiles: CameraProfiles::default(),
        }
    }
}
