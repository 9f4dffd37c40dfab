//! Outfield opponent state machine
//!
//! `idle / track / intercept / shoot / recover`. Every opponent owns its own
//! [`OpponentState`]; nothing is shared between instances except the ball
//! snapshot they all read.

use super::{advance, clamp_to_field, face, TickContext};
use crate::engine::config::OpponentConfig;
use crate::engine::types::{
    lerp_vec, planar_distance, planar_normalize, vec3_from_slice, BallSnapshot, TimestampMs, Vec3,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentMode {
    Idle,
    Track,
    Intercept,
    /// Transient; a shot always hands over to `Recover`
    Shoot,
    Recover,
}

impl OpponentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpponentMode::Idle => "idle",
            OpponentMode::Track => "track",
            OpponentMode::Intercept => "intercept",
            OpponentMode::Shoot => "shoot",
            OpponentMode::Recover => "recover",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentState {
    pub id: String,
    pub mode: OpponentMode,
    pub position: Vec3,
    pub rotation: f32,
    pub target_position: Vec3,
    pub home_position: Vec3,
    pub recover_until_ms: TimestampMs,
    pub shot_cooldown_until_ms: TimestampMs,
    /// Retreat point chosen when the last shot was taken
    pub recover_anchor: Vec3,
}

impl OpponentState {
    pub fn new(id: &str, home_position: Vec3) -> Self {
        Self {
            id: id.to_string(),
            mode: OpponentMode::Idle,
            position: home_position,
            rotation: 0.0,
            target_position: home_position,
            home_position,
            recover_until_ms: f64::NEG_INFINITY,
            shot_cooldown_until_ms: f64::NEG_INFINITY,
            recover_anchor: home_position,
        }
    }

    pub fn reset(&mut self) {
        *self = Self { rotation: self.rotation, ..Self::new(&self.id, self.home_position) };
    }
}

/// What an opponent can see besides the ball
#[derive(Debug, Clone, Copy, Default)]
pub struct OpponentWorld<'a> {
    /// Goal being attacked; `None` disables shooting
    pub target_goal: Option<Vec3>,
    /// Team-mate positions, used for pressure support
    pub teammates: &'a [Vec3],
}

impl<'a> OpponentWorld<'a> {
    /// Accepts a raw target goal; anything but three finite numbers is
    /// treated as absent.
    pub fn from_raw(target_goal: &[f32], teammates: &'a [Vec3]) -> Self {
        let parsed = vec3_from_slice(target_goal);
        if parsed.is_none() {
            log::warn!("Ignoring malformed target goal {:?}", target_goal);
        }
        Self { target_goal: parsed, teammates }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpponentOutput {
    pub state: OpponentState,
    pub shoot_requested: bool,
    /// Ball velocity to apply; set only on the step that shoots
    pub shot_vector: Option<Vec3>,
}

#[derive(Debug, Clone, Default)]
pub struct OpponentAi {
    cfg: OpponentConfig,
}

impl OpponentAi {
    pub fn new(cfg: OpponentConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &OpponentConfig {
        &self.cfg
    }

    pub fn step(
        &self,
        state: &OpponentState,
        ball: Option<&BallSnapshot>,
        world: &OpponentWorld,
        ctx: &TickContext,
    ) -> OpponentOutput {
        let mut next = state.clone();
        if !next.rotation.is_finite() {
            next.rotation = 0.0;
        }
        let now = ctx.now_ms;

        if state.mode == OpponentMode::Recover && now < state.recover_until_ms {
            next.target_position = state.recover_anchor;
            self.move_towards_target(&mut next, ctx);
            return OpponentOutput { state: next, shoot_requested: false, shot_vector: None };
        }

        let Some(ball) = ball else {
            next.mode = OpponentMode::Idle;
            next.target_position = next.home_position;
            self.move_towards_target(&mut next, ctx);
            return OpponentOutput { state: next, shoot_requested: false, shot_vector: None };
        };

        let difficulty = ctx.difficulty;
        let ball_distance = planar_distance(&state.position, &ball.position);

        if let Some(shot) = self.try_shoot(state, ball, world, ball_distance, ctx) {
            let direction = shot.direction;
            next.mode = OpponentMode::Recover;
            next.recover_until_ms = now + self.cfg.recover_ms;
            next.shot_cooldown_until_ms = now + self.cfg.shot_cooldown_ms;
            next.recover_anchor =
                clamp_to_field(state.position - direction * self.cfg.retreat_distance, ctx.field);
            next.target_position = next.recover_anchor;
            log::info!(
                "Opponent {} shoots from ({:.1}, {:.1})",
                state.id,
                state.position.x,
                state.position.z
            );
            self.move_towards_target(&mut next, ctx);
            return OpponentOutput {
                state: next,
                shoot_requested: true,
                shot_vector: Some(shot.velocity),
            };
        }

        let supported = world
            .teammates
            .iter()
            .map(|mate| planar_distance(mate, &ball.position))
            .fold(f32::INFINITY, f32::min)
            <= difficulty.pressure_distance;

        next.mode = if ball_distance <= difficulty.chase_range * self.cfg.intercept_weight {
            OpponentMode::Intercept
        } else if ball_distance <= difficulty.chase_range || supported {
            OpponentMode::Track
        } else {
            OpponentMode::Idle
        };

        let home = state.home_position;
        next.target_position = match next.mode {
            OpponentMode::Intercept => {
                let lead = ball.position + ball.velocity * self.cfg.lead_time_s;
                lerp_vec(&home, &lead, self.cfg.intercept_ball_bias)
            }
            OpponentMode::Track => lerp_vec(&home, &ball.position, self.cfg.track_ball_bias),
            _ => home,
        };
        next.target_position.y = home.y;

        if next.mode != state.mode {
            log::debug!("Opponent {}: {} -> {}", state.id, state.mode.as_str(), next.mode.as_str());
        }
        self.move_towards_target(&mut next, ctx);
        OpponentOutput { state: next, shoot_requested: false, shot_vector: None }
    }

    fn try_shoot(
        &self,
        state: &OpponentState,
        ball: &BallSnapshot,
        world: &OpponentWorld,
        ball_distance: f32,
        ctx: &TickContext,
    ) -> Option<Shot> {
        let goal = world.target_goal?;
        let in_range = planar_distance(&state.position, &goal) <= self.cfg.shoot_distance;
        let under_pressure = ball_distance <= ctx.difficulty.pressure_distance;
        if !in_range || !under_pressure || ctx.now_ms < state.shot_cooldown_until_ms {
            return None;
        }
        let direction = planar_normalize(&(goal - ball.position))?;
        let velocity = Vec3::new(
            direction.x * self.cfg.shot_speed,
            self.cfg.shot_lift,
            direction.z * self.cfg.shot_speed,
        );
        Some(Shot { direction, velocity })
    }

    fn move_towards_target(&self, state: &mut OpponentState, ctx: &TickContext) {
        let speed = self.cfg.base_run_speed * ctx.difficulty.max_run_speed_multiplier;
        let moved = advance(&state.position, &state.target_position, speed, ctx.delta_s);
        state.position = clamp_to_field(moved, ctx.field);
        state.rotation = face(&state.position, &state.target_position, state.rotation);
    }
}

struct Shot {
    direction: Vec3,
    velocity: Vec3,
}
