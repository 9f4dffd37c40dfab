//! Goalkeeper state machine
//!
//! `idle / track / intercept / save / distribute`. `Save` never survives a
//! step: it raises `save_requested` and hands straight over to `Distribute`
//! together with a clearance impulse for the ball.

use super::{advance, face, TickContext};
use crate::engine::config::{FieldConfig, KeeperConfig};
use crate::engine::types::{planar_distance, BallSnapshot, TeamSide, TimestampMs, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeeperMode {
    Idle,
    Track,
    Intercept,
    /// Transient, see module docs
    Save,
    Distribute,
}

impl KeeperMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeeperMode::Idle => "idle",
            KeeperMode::Track => "track",
            KeeperMode::Intercept => "intercept",
            KeeperMode::Save => "save",
            KeeperMode::Distribute => "distribute",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeeperState {
    pub id: String,
    /// Side whose goal this keeper defends
    pub side: TeamSide,
    pub mode: KeeperMode,
    pub position: Vec3,
    pub rotation: f32,
    pub target_position: Vec3,
    pub home_position: Vec3,
    pub save_cooldown_until_ms: TimestampMs,
    pub distribute_until_ms: TimestampMs,
}

impl KeeperState {
    /// Keeper standing at home, just in front of its goal line.
    pub fn new(id: &str, side: TeamSide, field: &FieldConfig, cfg: &KeeperConfig) -> Self {
        let sign = side.defended_goal_sign();
        let home = Vec3::new(0.0, 0.0, sign * (field.half_length - cfg.home_offset));
        Self {
            id: id.to_string(),
            side,
            mode: KeeperMode::Idle,
            position: home,
            // face up the pitch
            rotation: if sign > 0.0 { std::f32::consts::PI } else { 0.0 },
            target_position: home,
            home_position: home,
            save_cooldown_until_ms: f64::NEG_INFINITY,
            distribute_until_ms: f64::NEG_INFINITY,
        }
    }

    pub fn goal_line_z(&self, field: &FieldConfig) -> f32 {
        self.side.defended_goal_sign() * field.half_length
    }

    /// Back at home, idle, timers cleared.
    pub fn reset(&mut self) {
        self.mode = KeeperMode::Idle;
        self.position = self.home_position;
        self.target_position = self.home_position;
        self.save_cooldown_until_ms = f64::NEG_INFINITY;
        self.distribute_until_ms = f64::NEG_INFINITY;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeeperOutput {
    pub state: KeeperState,
    pub save_requested: bool,
    /// Set only on the step where a save hands over to distribute
    pub distribute_impulse: Option<Vec3>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalkeeperAi {
    cfg: KeeperConfig,
}

impl GoalkeeperAi {
    pub fn new(cfg: KeeperConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.cfg
    }

    /// Ball close to the goal line and closing on it.
    pub fn in_reaction_zone(
        &self,
        state: &KeeperState,
        ball: &BallSnapshot,
        field: &FieldConfig,
    ) -> bool {
        let sign = state.side.defended_goal_sign();
        let depth = (state.goal_line_z(field) - ball.position.z).abs();
        let closing_speed = ball.velocity.z * sign;
        depth <= self.cfg.reaction_distance && closing_speed > self.cfg.approach_speed_threshold
    }

    pub fn step(
        &self,
        state: &KeeperState,
        ball: Option<&BallSnapshot>,
        ctx: &TickContext,
    ) -> KeeperOutput {
        let mut next = state.clone();
        let mut save_requested = false;
        let mut distribute_impulse = None;

        let Some(ball) = ball else {
            next.mode = KeeperMode::Idle;
            next.target_position = next.home_position;
            self.move_towards_target(&mut next, None, ctx);
            return KeeperOutput { state: next, save_requested, distribute_impulse };
        };

        let now = ctx.now_ms;
        let field = ctx.field;
        let reach = self.cfg.save_radius * ctx.difficulty.keeper_reach_multiplier;
        let in_zone = self.in_reaction_zone(state, ball, field);
        let depth = (state.goal_line_z(field) - ball.position.z).abs();

        let mode = if state.mode == KeeperMode::Distribute && now < state.distribute_until_ms {
            KeeperMode::Distribute
        } else if in_zone
            && planar_distance(&state.position, &ball.position) <= reach
            && now >= state.save_cooldown_until_ms
        {
            KeeperMode::Save
        } else if in_zone {
            KeeperMode::Intercept
        } else if depth <= self.cfg.reaction_distance * self.cfg.track_range_factor {
            KeeperMode::Track
        } else {
            KeeperMode::Idle
        };

        next.mode = match mode {
            KeeperMode::Save => {
                save_requested = true;
                next.save_cooldown_until_ms = now + self.cfg.save_cooldown_ms;
                next.distribute_until_ms = now + self.cfg.distribute_ms;
                distribute_impulse = Some(self.clearance(state.side));
                log::info!(
                    "Keeper {} saves at ({:.1}, {:.1})",
                    state.id,
                    ball.position.x,
                    ball.position.z
                );
                KeeperMode::Distribute
            }
            other => other,
        };
        if next.mode != state.mode {
            log::debug!("Keeper {}: {} -> {}", state.id, state.mode.as_str(), next.mode.as_str());
        }

        next.target_position = self.target_for(&next, ball);
        self.move_towards_target(&mut next, Some(ball), ctx);
        KeeperOutput { state: next, save_requested, distribute_impulse }
    }

    /// Clearance away from goal, biased toward the keeper's lateral side.
    fn clearance(&self, side: TeamSide) -> Vec3 {
        Vec3::new(
            side.lateral_sign() * self.cfg.clear_lateral,
            self.cfg.clear_up,
            -side.defended_goal_sign() * self.cfg.clear_forward,
        )
    }

    fn target_for(&self, state: &KeeperState, ball: &BallSnapshot) -> Vec3 {
        let home = state.home_position;
        let limit = self.cfg.lateral_limit;
        match state.mode {
            KeeperMode::Intercept => {
                let sign = state.side.defended_goal_sign();
                let depth_offset = ((home.z - ball.position.z).abs()
                    * self.cfg.intercept_depth_damping)
                    .min(self.cfg.max_advance);
                Vec3::new(
                    ball.position.x.clamp(-limit, limit),
                    home.y,
                    home.z - sign * depth_offset,
                )
            }
            KeeperMode::Track => Vec3::new(
                (ball.position.x * self.cfg.track_lateral_factor).clamp(-limit, limit),
                home.y,
                home.z,
            ),
            KeeperMode::Idle | KeeperMode::Save | KeeperMode::Distribute => home,
        }
    }

    fn move_towards_target(
        &self,
        state: &mut KeeperState,
        ball: Option<&BallSnapshot>,
        ctx: &TickContext,
    ) {
        let speed = self.cfg.base_run_speed * ctx.difficulty.max_run_speed_multiplier;
        let moved = advance(&state.position, &state.target_position, speed, ctx.delta_s);

        let home_z = state.home_position.z;
        let advance_z = home_z - state.side.defended_goal_sign() * self.cfg.max_advance;
        let (z_min, z_max) = (home_z.min(advance_z), home_z.max(advance_z));
        let limit = self.cfg.lateral_limit;
        state.position =
            Vec3::new(moved.x.clamp(-limit, limit), moved.y, moved.z.clamp(z_min, z_max));

        if let Some(ball) = ball {
            state.rotation = face(&state.position, &ball.position, state.rotation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::DifficultyPreset;

    fn ball(position: Vec3, velocity: Vec3) -> BallSnapshot {
        BallSnapshot { timestamp_ms: 0.0, position, velocity }
    }

    fn away_keeper() -> (GoalkeeperAi, KeeperState, FieldConfig) {
        let field = FieldConfig::default();
        let ai = GoalkeeperAi::default();
        let state = KeeperState::new("away-gk", TeamSide::Away, &field, ai.config());
        (ai, state, field)
    }

    #[test]
    fn test_save_then_distribute_with_impulse() {
        let (ai, state, field) = away_keeper();
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(1_000.0, 0.05, &difficulty, &field);
        let shot = ball(Vec3::new(0.5, 0.55, -27.0), Vec3::new(0.0, 0.0, -10.0));

        let out = ai.step(&state, Some(&shot), &ctx);
        assert!(out.save_requested);
        assert_eq!(out.state.mode, KeeperMode::Distribute);
        let impulse = out.distribute_impulse.unwrap();
        // cleared up the pitch, away from the -Z goal
        assert!(impulse.z > 0.0);
        assert!(impulse.y > 0.0);

        // still distributing next step, no second impulse
        let ctx = TickContext::new(1_050.0, 0.05, &difficulty, &field);
        let out = ai.step(&out.state, Some(&shot), &ctx);
        assert_eq!(out.state.mode, KeeperMode::Distribute);
        assert!(!out.save_requested);
        assert!(out.distribute_impulse.is_none());
    }

    #[test]
    fn test_save_cooldown_falls_back_to_intercept() {
        let (ai, mut state, field) = away_keeper();
        state.save_cooldown_until_ms = 2_000.0;
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(1_000.0, 0.05, &difficulty, &field);
        let shot = ball(Vec3::new(0.5, 0.55, -27.0), Vec3::new(0.0, 0.0, -10.0));
        let out = ai.step(&state, Some(&shot), &ctx);
        assert!(!out.save_requested);
        assert_eq!(out.state.mode, KeeperMode::Intercept);
    }

    #[test]
    fn test_ball_moving_away_is_not_in_zone() {
        let (ai, state, field) = away_keeper();
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(0.0, 0.05, &difficulty, &field);
        let clearing = ball(Vec3::new(0.0, 0.55, -27.0), Vec3::new(0.0, 0.0, 5.0));
        let out = ai.step(&state, Some(&clearing), &ctx);
        assert_eq!(out.state.mode, KeeperMode::Track);
    }

    #[test]
    fn test_track_mirrors_ball_laterally_within_limits() {
        let (ai, state, field) = away_keeper();
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(0.0, 0.05, &difficulty, &field);
        let wide = ball(Vec3::new(15.0, 0.55, -16.0), Vec3::zeros());
        let out = ai.step(&state, Some(&wide), &ctx);
        assert_eq!(out.state.mode, KeeperMode::Track);
        assert_eq!(out.state.target_position.x, ai.config().lateral_limit);
        assert_eq!(out.state.target_position.z, state.home_position.z);
        // 17 u/s for 50ms
        assert!((out.state.position.x - 0.85).abs() < 1e-4);
    }

    #[test]
    fn test_missing_ball_goes_idle_at_home() {
        let (ai, mut state, field) = away_keeper();
        state.mode = KeeperMode::Intercept;
        state.position = Vec3::new(2.0, 0.0, -27.0);
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(0.0, 0.05, &difficulty, &field);
        let out = ai.step(&state, None, &ctx);
        assert_eq!(out.state.mode, KeeperMode::Idle);
        assert_eq!(out.state.target_position, state.home_position);
    }

    #[test]
    fn test_keeper_stays_in_envelope() {
        let (ai, state, field) = away_keeper();
        let difficulty = DifficultyPreset::default();
        let mut current = state.clone();
        let chase = ball(Vec3::new(-3.0, 0.55, -21.0), Vec3::new(0.0, 0.0, -2.0));
        for i in 0..40 {
            let ctx = TickContext::new(i as f64 * 50.0, 0.05, &difficulty, &field);
            current = ai.step(&current, Some(&chase), &ctx).state;
            assert!(current.position.x.abs() <= ai.config().lateral_limit + 1e-5);
            assert!(current.position.z >= state.home_position.z - 1e-5);
            assert!(current.position.z <= state.home_position.z + ai.config().max_advance + 1e-5);
        }
    }

    #[test]
    fn test_home_keeper_faces_ball() {
        let field = FieldConfig::default();
        let ai = GoalkeeperAi::default();
        let state = KeeperState::new("home-gk", TeamSide::Home, &field, ai.config());
        assert!(state.home_position.z > 0.0);
        let difficulty = DifficultyPreset::default();
        let ctx = TickContext::new(0.0, 0.05, &difficulty, &field);
        let out = ai.step(&state, Some(&ball(Vec3::new(0.0, 0.55, 0.0), Vec3::zeros())), &ctx);
        // ball is straight up the pitch (-Z)
        assert!((out.state.rotation.abs() - std::f32::consts::PI).abs() < 1e-4);
    }
}
