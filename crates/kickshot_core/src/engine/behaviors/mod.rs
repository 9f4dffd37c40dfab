//! AI agent behaviors
//!
//! Goalkeepers and outfield opponents are pure reducers: they take the
//! previous agent state plus the latest ball snapshot and return the next
//! state with any requested ball command. They never touch a physics body;
//! the session applies their outputs.
//!
//! Both run on the scheduler's AI cadence and receive the real elapsed
//! seconds since their last run through [`TickContext`].

pub mod goalkeeper;
pub mod opponent;

pub use goalkeeper::{GoalkeeperAi, KeeperMode, KeeperOutput, KeeperState};
pub use opponent::{OpponentAi, OpponentMode, OpponentOutput, OpponentState, OpponentWorld};

use crate::engine::config::{DifficultyPreset, FieldConfig};
use crate::engine::types::{step_towards, yaw_towards, TimestampMs, Vec3};

/// Longest step an agent may integrate after a stalled timer
const MAX_DELTA_S: f32 = 0.25;

/// Per-run inputs shared by every agent
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub now_ms: TimestampMs,
    pub delta_s: f32,
    pub difficulty: &'a DifficultyPreset,
    pub field: &'a FieldConfig,
}

impl<'a> TickContext<'a> {
    pub fn new(
        now_ms: TimestampMs,
        delta_s: f32,
        difficulty: &'a DifficultyPreset,
        field: &'a FieldConfig,
    ) -> Self {
        Self { now_ms, delta_s: sanitize_delta(delta_s), difficulty, field }
    }
}

/// Non-finite or negative deltas become zero; long stalls are capped.
pub fn sanitize_delta(delta_s: f32) -> f32 {
    if !delta_s.is_finite() || delta_s <= 0.0 {
        0.0
    } else {
        delta_s.min(MAX_DELTA_S)
    }
}

/// Planar move toward `target` at `speed` u/s. Height is left unchanged.
pub(crate) fn advance(position: &Vec3, target: &Vec3, speed: f32, delta_s: f32) -> Vec3 {
    let flat_target = Vec3::new(target.x, position.y, target.z);
    step_towards(position, &flat_target, (speed * delta_s).max(0.0))
}

pub(crate) fn clamp_to_field(position: Vec3, field: &FieldConfig) -> Vec3 {
    Vec3::new(
        position.x.clamp(-field.half_width, field.half_width),
        position.y,
        position.z.clamp(-field.half_length, field.half_length),
    )
}

/// Yaw toward `to`, keeping `previous` when degenerate.
pub(crate) fn face(from: &Vec3, to: &Vec3, previous: f32) -> f32 {
    let fallback = if previous.is_finite() { previous } else { 0.0 };
    match yaw_towards(from, to) {
        Some(yaw) if yaw.is_finite() => yaw,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_delta() {
        assert_eq!(sanitize_delta(f32::NAN), 0.0);
        assert_eq!(sanitize_delta(-0.1), 0.0);
        assert_eq!(sanitize_delta(0.05), 0.05);
        assert_eq!(sanitize_delta(3.0), MAX_DELTA_S);
    }

    #[test]
    fn test_face_keeps_previous_when_degenerate() {
        let p = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(face(&p, &p, 0.7), 0.7);
        assert_eq!(face(&p, &p, f32::NAN), 0.0);
    }

    #[test]
    fn test_advance_is_planar() {
        let next = advance(&Vec3::new(0.0, 0.0, 0.0), &Vec3::new(10.0, 5.0, 0.0), 20.0, 0.1);
        assert!((next.x - 2.0).abs() < 1e-5);
        assert_eq!(next.y, 0.0);
    }
}
