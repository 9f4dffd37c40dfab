//! Match camera
//!
//! Mode selection, exponential smoothing and throttled state publication.
//! The published [`CameraState`] also feeds camera-relative movement.

pub mod director;

pub use director::{CameraDirector, CameraInputs};

use crate::engine::types::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Intro,
    BroadcastBuildUp,
    BroadcastWide,
    AttackingThird,
    Shot,
    Goal,
    Save,
    Replay,
    FreeRoam,
}

/// Camera pose handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    pub target: Vec3,
    pub fov: f32,
    pub mode: CameraMode,
}
