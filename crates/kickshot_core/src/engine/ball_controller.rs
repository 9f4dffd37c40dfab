//! Ball controller
//!
//! Single authoritative writer of possession, shot charge and ball velocity
//! overrides. Runs once per simulation tick after the physics step and
//! before the renderer reads transforms, so a physically integrated but
//! uncorrected ball pose is never shown.
//!
//! Per tick:
//! 1. refresh the charge meter
//! 2. apply a new pass command (at most once per id)
//! 3. launch a pending kick
//! 4. arbitrate possession (unless locked)
//! 5. pin a carried ball in front of its possessor
//! 6. kick decay / speed governor on a loose ball
//! 7. out-of-bounds detection

use crate::engine::config::{BallConfig, FieldConfig, ShotConfig};
use crate::engine::events::GameEvent;
use crate::engine::kick::{KickDecay, KickLaunch};
use crate::engine::physics::PhysicsBody;
use crate::engine::possession::{arbitrate, follow_position};
use crate::engine::shot_charge::{ChargeUpdate, KickRequest, ShotCharge, ShotChargeState};
use crate::engine::types::{PlayerSnapshot, PossessionState, TimestampMs, Vec3};
use serde::{Deserialize, Serialize};

/// Externally issued pass, identified by a unique id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassCommand {
    pub id: String,
    pub velocity: Vec3,
}

/// Everything the controller reads besides the ball body
#[derive(Debug, Clone, Copy)]
pub struct BallTickInput<'a> {
    pub now_ms: TimestampMs,
    /// Controllable players; arbitration is skipped while absent
    pub roster: Option<&'a [PlayerSnapshot]>,
    pub pass: Option<&'a PassCommand>,
    pub speed_boost_active: bool,
    pub power_multiplier: f32,
}

impl<'a> BallTickInput<'a> {
    pub fn new(now_ms: TimestampMs, roster: &'a [PlayerSnapshot]) -> Self {
        Self {
            now_ms,
            roster: Some(roster),
            pass: None,
            speed_boost_active: false,
            power_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BallController {
    ball_cfg: BallConfig,
    shot_cfg: ShotConfig,
    field: FieldConfig,
    possession: PossessionState,
    possession_lock_until_ms: TimestampMs,
    charge: ShotCharge,
    pending_kick: Option<KickRequest>,
    kick_decay: Option<KickDecay>,
    last_pass_id: Option<String>,
    out_of_bounds_since_ms: Option<TimestampMs>,
}

impl BallController {
    pub fn new(ball_cfg: BallConfig, shot_cfg: ShotConfig, field: FieldConfig) -> Self {
        Self {
            charge: ShotCharge::new(shot_cfg.clone()),
            ball_cfg,
            shot_cfg,
            field,
            possession: PossessionState::none(),
            possession_lock_until_ms: f64::NEG_INFINITY,
            pending_kick: None,
            kick_decay: None,
            last_pass_id: None,
            out_of_bounds_since_ms: None,
        }
    }

    pub fn possession(&self) -> &PossessionState {
        &self.possession
    }

    pub fn charge_state(&self) -> ShotChargeState {
        self.charge.state()
    }

    pub fn has_pending_kick(&self) -> bool {
        self.pending_kick.is_some()
    }

    pub fn is_locked(&self, now_ms: TimestampMs) -> bool {
        now_ms < self.possession_lock_until_ms
    }

    pub fn is_kick_decay_active(&self, now_ms: TimestampMs) -> bool {
        self.kick_decay.map(|d| d.is_active(now_ms, &self.shot_cfg)).unwrap_or(false)
    }

    /// Shoot key down.
    pub fn press_shoot(&mut self, now_ms: TimestampMs) -> Vec<GameEvent> {
        let update = self.charge.press(now_ms, !self.possession.is_loose());
        let mut events = Vec::new();
        self.absorb_charge(update, &mut events);
        events
    }

    /// Shoot key up. A kick is queued for the next tick.
    pub fn release_shoot(&mut self, now_ms: TimestampMs) -> Vec<GameEvent> {
        let update = self.charge.release(now_ms);
        let mut events = Vec::new();
        self.absorb_charge(update, &mut events);
        events
    }

    /// Blocks reacquisition for the reacquire cooldown.
    pub fn lock_possession(&mut self, now_ms: TimestampMs) {
        self.possession_lock_until_ms = now_ms + self.ball_cfg.reacquire_cooldown_ms;
    }

    /// Drops possession without touching the ball.
    pub fn release_possession(&mut self, now_ms: TimestampMs) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.set_possession(None, now_ms, &mut events);
        events
    }

    /// Centre-spot reset used on kickoff.
    pub fn kickoff_reset(
        &mut self,
        body: &mut dyn PhysicsBody,
        spot: Vec3,
        now_ms: TimestampMs,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.possession.is_loose() {
            self.possession = PossessionState::none();
            events.push(GameEvent::PossessionChanged { possession: self.possession.clone() });
        }
        self.charge.reset();
        self.pending_kick = None;
        self.kick_decay = None;
        self.out_of_bounds_since_ms = None;
        self.lock_possession(now_ms);
        body.set_position(spot);
        body.set_velocity(Vec3::zeros());
        body.set_angular_velocity(Vec3::zeros());
        events
    }

    pub fn tick(&mut self, body: &mut dyn PhysicsBody, input: &BallTickInput) -> Vec<GameEvent> {
        let now = input.now_ms;
        let update = self.charge.tick(now);
        let mut events = Vec::new();
        self.absorb_charge(update, &mut events);

        self.apply_pass(body, input, &mut events);
        self.launch_pending_kick(body, input, &mut events);

        if let Some(roster) = input.roster {
            if !self.is_locked(now) {
                let ball = body.position();
                let incumbent = self.possession.player_id.as_deref();
                let winner = arbitrate(&ball, roster, incumbent, &self.ball_cfg).cloned();
                self.set_possession(winner.as_ref(), now, &mut events);
            }

            if self.pending_kick.is_none() {
                if let Some(possessor) = self.possessor(roster) {
                    body.set_position(follow_position(possessor, &self.ball_cfg));
                    body.set_velocity(Vec3::zeros());
                    body.set_angular_velocity(Vec3::zeros());
                    self.kick_decay = None;
                }
            }
        }

        if self.possession.is_loose() {
            self.govern_speed(body, input);
        }
        self.check_out_of_bounds(body.position(), now, &mut events);
        events
    }

    fn possessor<'a>(&self, roster: &'a [PlayerSnapshot]) -> Option<&'a PlayerSnapshot> {
        let id = self.possession.player_id.as_deref()?;
        roster.iter().find(|p| p.id == id)
    }

    fn set_possession(
        &mut self,
        player: Option<&PlayerSnapshot>,
        now: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        let next = match player {
            Some(p) => PossessionState::held_by(&p.team_id, &p.id),
            None => PossessionState::none(),
        };
        if next == self.possession {
            return;
        }
        let gained = !next.is_loose();
        log::debug!("Possession {:?} -> {:?}", self.possession.player_id, next.player_id);
        self.possession = next;
        events.push(GameEvent::PossessionChanged { possession: self.possession.clone() });

        let update = if gained {
            self.charge.on_possession_gained(now)
        } else {
            self.charge.on_possession_lost()
        };
        self.absorb_charge(update, events);
    }

    /// Turns a charge update into events; kicks are queued for the next tick.
    fn absorb_charge(&mut self, update: ChargeUpdate, events: &mut Vec<GameEvent>) {
        if let Some(state) = update.state {
            events.push(GameEvent::ShotChargeChanged { state });
        }
        if let Some(kick) = update.kick {
            if !self.possession.is_loose() {
                self.pending_kick = Some(kick);
            }
        }
    }

    fn apply_pass(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &BallTickInput,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(pass) = input.pass else {
            return;
        };
        if self.last_pass_id.as_deref() == Some(pass.id.as_str()) {
            return;
        }
        self.last_pass_id = Some(pass.id.clone());
        self.pending_kick = None;
        self.kick_decay = None;
        self.set_possession(None, input.now_ms, events);
        self.lock_possession(input.now_ms);
        body.set_velocity(pass.velocity);
        events.push(GameEvent::PassApplied { pass_id: pass.id.clone(), velocity: pass.velocity });
    }

    fn launch_pending_kick(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &BallTickInput,
        events: &mut Vec<GameEvent>,
    ) {
        let Some(request) = self.pending_kick.take() else {
            return;
        };
        let kicker = input.roster.and_then(|roster| self.possessor(roster)).cloned();
        let Some(kicker) = kicker else {
            log::debug!("Dropping kick: possessor not in roster");
            return;
        };

        let launch =
            KickLaunch::from_request(&request, kicker.yaw, input.power_multiplier, &self.shot_cfg);
        body.set_velocity(launch.velocity());
        body.set_angular_velocity(Vec3::zeros());
        self.kick_decay = Some(KickDecay::new(input.now_ms, launch.planar_speed));

        self.set_possession(None, input.now_ms, events);
        self.lock_possession(input.now_ms);
        log::info!(
            "Shot by {} at {:.1} u/s (perfect: {})",
            kicker.id,
            launch.planar_speed,
            request.is_perfect
        );
        events.push(GameEvent::ShotFired {
            player_id: kicker.id.clone(),
            team_id: kicker.team_id.clone(),
            request,
            launch,
        });
    }

    fn govern_speed(&mut self, body: &mut dyn PhysicsBody, input: &BallTickInput) {
        let velocity = body.velocity();
        if let Some(decay) = self.kick_decay {
            if decay.is_active(input.now_ms, &self.shot_cfg) {
                let relaxed = decay.apply(input.now_ms, velocity, &self.shot_cfg);
                if relaxed != velocity {
                    body.set_velocity(relaxed);
                }
                return;
            }
            self.kick_decay = None;
        }

        let mut cap = self.ball_cfg.max_ball_speed;
        if input.speed_boost_active {
            cap *= self.ball_cfg.speed_boost_factor;
        }
        let speed = velocity.norm();
        if speed.is_finite() && speed > cap {
            body.set_velocity(velocity * (cap / speed));
        } else if !speed.is_finite() {
            body.set_velocity(Vec3::zeros());
        }
    }

    pub fn is_out_of_bounds(&self, position: &Vec3) -> bool {
        let f = &self.field;
        position.x.abs() > f.half_width + f.out_of_bounds_margin_x
            || position.z.abs() > f.half_length + f.out_of_bounds_margin_z
            || position.y < f.out_of_bounds_min_y
            || position.y > f.out_of_bounds_max_y
    }

    fn check_out_of_bounds(
        &mut self,
        position: Vec3,
        now: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        let outside = self.is_out_of_bounds(&position);
        match self.out_of_bounds_since_ms {
            None if outside => {
                self.out_of_bounds_since_ms = Some(now);
                log::info!(
                    "Ball out of bounds at ({:.1}, {:.1}, {:.1})",
                    position.x,
                    position.y,
                    position.z
                );
                events.push(GameEvent::OutOfBounds { position });
            }
            Some(since) if !outside && now - since >= self.ball_cfg.out_of_bounds_lock_ms => {
                self.out_of_bounds_since_ms = None;
            }
            Some(since) if outside && now - since >= self.ball_cfg.out_of_bounds_timeout_ms => {
                self.out_of_bounds_since_ms = Some(now);
                log::info!("Ball still out of bounds after {:.0}ms", now - since);
                events.push(GameEvent::OutOfBounds { position });
            }
            _ => {}
        }
    }
}
