//! Boundary to the host physics engine
//!
//! The core never integrates rigid bodies itself. It reads and overrides
//! bodies through [`PhysicsBody`]; [`KinematicBody`] is a minimal stand-in
//! used by headless runs and tests.

use crate::engine::types::Vec3;
use serde::{Deserialize, Serialize};

/// Identity reported by collision / trigger callbacks
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BodyIdentity {
    Ball,
    Player(String),
    Keeper(String),
    Opponent(String),
    GoalTrigger(String),
    Wall,
}

/// Per-entity contract with the physics backend
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;

    // Hard overrides, not integrated
    fn set_position(&mut self, position: Vec3);
    fn set_velocity(&mut self, velocity: Vec3);
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);

    // Integrated by the backend on its next step
    fn apply_impulse(&mut self, impulse: Vec3, at_point: Vec3);
    fn apply_force(&mut self, force: Vec3, at_point: Vec3);

    /// Collision / trigger callback. Default ignores contacts.
    fn on_collide(&mut self, _other: &BodyIdentity) {}
}

/// Explicit-Euler point mass with gravity and a flat ground
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub gravity: f32,
    /// Resting height of the body's centre above the ground
    pub ground_height: f32,
    /// Planar velocity retained per second while rolling
    pub rolling_retention: f32,
    pending_force: Vec3,
    pub contacts: Vec<BodyIdentity>,
}

impl KinematicBody {
    pub fn ball(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            mass: 0.43,
            gravity: 9.81,
            ground_height: 0.55,
            rolling_retention: 0.55,
            pending_force: Vec3::zeros(),
            contacts: Vec::new(),
        }
    }

    /// Advances the body by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 || !dt.is_finite() {
            return;
        }
        let accel = self.pending_force / self.mass - Vec3::new(0.0, self.gravity, 0.0);
        self.pending_force = Vec3::zeros();
        self.velocity += accel * dt;
        self.position += self.velocity * dt;

        if self.position.y <= self.ground_height {
            self.position.y = self.ground_height;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            let retain = self.rolling_retention.powf(dt);
            self.velocity.x *= retain;
            self.velocity.z *= retain;
        }
    }
}

impl PhysicsBody for KinematicBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
    }

    fn apply_impulse(&mut self, impulse: Vec3, _at_point: Vec3) {
        self.velocity += impulse / self.mass;
    }

    fn apply_force(&mut self, force: Vec3, _at_point: Vec3) {
        self.pending_force += force;
    }

    fn on_collide(&mut self, other: &BodyIdentity) {
        self.contacts.push(other.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_rests_on_ground() {
        let mut body = KinematicBody::ball(Vec3::new(0.0, 3.0, 0.0));
        for _ in 0..120 {
            body.step(1.0 / 60.0);
        }
        assert!((body.position.y - body.ground_height).abs() < 1e-5);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_impulse_scales_by_mass() {
        let mut body = KinematicBody::ball(Vec3::zeros());
        body.apply_impulse(Vec3::new(0.43, 0.0, 0.0), Vec3::zeros());
        assert!((body.velocity.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_collisions_are_recorded() {
        let mut body = KinematicBody::ball(Vec3::zeros());
        body.on_collide(&BodyIdentity::Keeper("away-gk".into()));
        assert_eq!(body.contacts, vec![BodyIdentity::Keeper("away-gk".into())]);
    }
}
