//! Arrow-key → world-space movement direction
//!
//! Directions are planar (y = 0) and either unit length or exactly zero.
//! Broadcast-style cameras move the player relative to the view, every
//! other camera uses the fixed world basis.

use crate::camera::{CameraMode, CameraState};
use crate::engine::types::{Vec3, DIRECTION_EPSILON};
use serde::{Deserialize, Serialize};

/// World basis forward (toward the away goal)
pub const WORLD_FORWARD: Vec3 = Vec3::new(0.0, 0.0, -1.0);
pub const WORLD_RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Which basis arrow keys are interpreted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    Camera,
    World,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl ArrowKeys {
    /// Builds key state from DOM key codes; unknown codes are ignored.
    pub fn from_pressed(codes: &[&str]) -> Self {
        let mut keys = Self::default();
        for code in codes {
            match MovementKey::from_code(code) {
                Some(MovementKey::Up) => keys.up = true,
                Some(MovementKey::Down) => keys.down = true,
                Some(MovementKey::Left) => keys.left = true,
                Some(MovementKey::Right) => keys.right = true,
                None => {}
            }
        }
        keys
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKey {
    Up,
    Down,
    Left,
    Right,
}

impl MovementKey {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" => Some(MovementKey::Up),
            "ArrowDown" => Some(MovementKey::Down),
            "ArrowLeft" => Some(MovementKey::Left),
            "ArrowRight" => Some(MovementKey::Right),
            _ => None,
        }
    }
}

/// Inputs that decide the basis
#[derive(Debug, Clone, Copy)]
pub struct MovementContext<'a> {
    pub override_mode: Option<MovementMode>,
    pub camera_mode: CameraMode,
    pub camera_state: Option<&'a CameraState>,
}

impl<'a> MovementContext<'a> {
    pub fn world() -> Self {
        Self {
            override_mode: Some(MovementMode::World),
            camera_mode: CameraMode::FreeRoam,
            camera_state: None,
        }
    }
}

/// Explicit override wins; otherwise broadcast-style cameras map to camera space.
pub fn resolve_mode(override_mode: Option<MovementMode>, camera_mode: CameraMode) -> MovementMode {
    if let Some(mode) = override_mode {
        return mode;
    }
    match camera_mode {
        CameraMode::FreeRoam => MovementMode::World,
        CameraMode::BroadcastBuildUp | CameraMode::BroadcastWide | CameraMode::AttackingThird => {
            MovementMode::Camera
        }
        _ => MovementMode::World,
    }
}

/// Planar (forward, right) basis for the context.
pub fn basis(ctx: &MovementContext) -> (Vec3, Vec3) {
    if resolve_mode(ctx.override_mode, ctx.camera_mode) == MovementMode::World {
        return (WORLD_FORWARD, WORLD_RIGHT);
    }
    let Some(camera) = ctx.camera_state else {
        return (WORLD_FORWARD, WORLD_RIGHT);
    };
    let view = camera.target - camera.position;
    let flat = Vec3::new(view.x, 0.0, view.z);
    let len = flat.norm();
    if !len.is_finite() || len < DIRECTION_EPSILON {
        // looking straight down
        return (WORLD_FORWARD, WORLD_RIGHT);
    }
    let forward = flat / len;
    let right = Vec3::new(-forward.z, 0.0, forward.x);
    (forward, right)
}

/// Sum of the held keys' basis vectors, renormalized.
pub fn map_direction(keys: ArrowKeys, ctx: &MovementContext) -> Vec3 {
    if !keys.any() {
        return Vec3::zeros();
    }
    let (forward, right) = basis(ctx);
    let mut sum = Vec3::zeros();
    if keys.up {
        sum += forward;
    }
    if keys.down {
        sum -= forward;
    }
    if keys.left {
        sum -= right;
    }
    if keys.right {
        sum += right;
    }
    let len = sum.norm();
    if len < DIRECTION_EPSILON {
        Vec3::zeros()
    } else {
        sum / len
    }
}

/// Single-key force for simple hosts; zero for non-movement keys.
pub fn map_single_key_to_force(key: &str, magnitude: f32, ctx: &MovementContext) -> Vec3 {
    if !magnitude.is_finite() || magnitude <= 0.0 {
        return Vec3::zeros();
    }
    let Some(key) = MovementKey::from_code(key) else {
        return Vec3::zeros();
    };
    let keys = match key {
        MovementKey::Up => ArrowKeys { up: true, ..Default::default() },
        MovementKey::Down => ArrowKeys { down: true, ..Default::default() },
        MovementKey::Left => ArrowKeys { left: true, ..Default::default() },
        MovementKey::Right => ArrowKeys { right: true, ..Default::default() },
    };
    map_direction(keys, ctx) * magnitude
}
