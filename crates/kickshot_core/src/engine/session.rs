//! Match session
//!
//! Owns every controller and runs them in a fixed order once per host
//! frame:
//!
//! 1. shoot input, then the ball controller (possession, kicks, governor)
//! 2. goal detection
//! 3. due scheduler tasks (AI, replay sampling, power-up spawns), then a
//!    goal replay is armed so it anchors on the frame just sampled
//! 4. power-up pickups and expiry
//! 5. replay update
//! 6. camera update
//!
//! Phases run `Intro → Kickoff → Playing → GoalScored → Replay → Kickoff …`
//! until the match clock reaches the configured duration (`FullTime`).
//! The host is expected to step its physics world before calling
//! [`MatchSession::tick`] and to render after it.

use crate::camera::{CameraDirector, CameraInputs, CameraMode, CameraState};
use crate::engine::ball_controller::{BallController, BallTickInput, PassCommand};
use crate::engine::behaviors::{
    GoalkeeperAi, KeeperState, OpponentAi, OpponentState, OpponentWorld, TickContext,
};
use crate::engine::config::ArcadeConfig;
use crate::engine::events::GameEvent;
use crate::engine::goal::Goals;
use crate::engine::movement::{map_direction, ArrowKeys, MovementContext, MovementMode};
use crate::engine::physics::PhysicsBody;
use crate::engine::powerups::PowerUpManager;
use crate::engine::scheduler::{Scheduler, TaskKind};
use crate::engine::shot_charge::ShotChargeState;
use crate::engine::types::{
    is_finite_vec, AgentPose, BallSnapshot, PlayerSnapshot, PossessionState, TeamSide, TimestampMs,
    Vec3,
};
use crate::replay::{
    BallPose, ReplayDirector, ReplayEventKind, ReplayFrame, ReplayMode, ReplayPublicState,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Intro,
    /// Ball on the centre spot; AI waits out its reaction time
    Kickoff,
    Playing,
    /// Goal given, waiting for the replay to start
    GoalScored,
    Replay,
    FullTime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn record(&mut self, side: TeamSide) {
        match side {
            TeamSide::Home => self.home += 1,
            TeamSide::Away => self.away += 1,
        }
    }
}

/// Host input for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub keys: ArrowKeys,
    pub shoot_pressed: bool,
    pub shoot_released: bool,
    /// Controllable (home) players
    pub roster: Vec<PlayerSnapshot>,
    pub pass: Option<PassCommand>,
    pub skip_replay: bool,
}

pub struct MatchSession {
    cfg: ArcadeConfig,
    phase: MatchPhase,
    phase_started_ms: TimestampMs,
    started: bool,
    enabled: bool,
    last_tick_ms: Option<TimestampMs>,
    /// Time spent in kickoff / open play
    match_clock_ms: f64,
    score: Score,
    goals: Goals,
    ball: BallController,
    keeper_ai: GoalkeeperAi,
    keepers: Vec<KeeperState>,
    opponent_ai: OpponentAi,
    opponents: Vec<OpponentState>,
    camera: CameraDirector,
    published_camera: Option<CameraState>,
    movement_override: Option<MovementMode>,
    replay: ReplayDirector,
    /// Phase to resume once the running replay finishes
    after_replay: MatchPhase,
    /// Goal replay armed after this tick's replay sample
    pending_goal_replay: Option<String>,
    scheduler: Scheduler,
    power_ups: PowerUpManager,
    kickoff_side: TeamSide,
    event_counter: u32,
}

impl MatchSession {
    pub fn new(cfg: ArcadeConfig) -> Self {
        let keeper_ai = GoalkeeperAi::new(cfg.goalkeeper.clone());
        let keepers = vec![
            KeeperState::new("home-gk", TeamSide::Home, &cfg.field, keeper_ai.config()),
            KeeperState::new("away-gk", TeamSide::Away, &cfg.field, keeper_ai.config()),
        ];
        let opponents = cfg
            .opponent
            .home_positions
            .iter()
            .enumerate()
            .map(|(i, home)| OpponentState::new(&format!("away-{}", i + 1), *home))
            .collect();

        Self {
            phase: MatchPhase::Intro,
            phase_started_ms: 0.0,
            started: false,
            enabled: true,
            last_tick_ms: None,
            match_clock_ms: 0.0,
            score: Score::default(),
            goals: Goals::new(&cfg.field),
            ball: BallController::new(cfg.ball.clone(), cfg.shot.clone(), cfg.field.clone()),
            keeper_ai,
            keepers,
            opponent_ai: OpponentAi::new(cfg.opponent.clone()),
            opponents,
            camera: CameraDirector::new(cfg.camera.clone(), cfg.field.half_length),
            published_camera: None,
            movement_override: None,
            replay: ReplayDirector::new(cfg.replay.clone()),
            after_replay: MatchPhase::Playing,
            pending_goal_replay: None,
            scheduler: Scheduler::new(),
            power_ups: PowerUpManager::new(cfg.power_ups.clone()),
            kickoff_side: TeamSide::Home,
            event_counter: 0,
            cfg,
        }
    }

    // === Read-only projections ===

    pub fn config(&self) -> &ArcadeConfig {
        &self.cfg
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn match_clock_ms(&self) -> f64 {
        self.match_clock_ms
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn possession(&self) -> &PossessionState {
        self.ball.possession()
    }

    pub fn charge_state(&self) -> ShotChargeState {
        self.ball.charge_state()
    }

    pub fn camera_state(&self) -> &CameraState {
        self.camera.state()
    }

    pub fn replay_state(&self) -> ReplayPublicState {
        self.replay.public_state()
    }

    pub fn replay_frame(&self) -> Option<&ReplayFrame> {
        self.replay.current_frame()
    }

    pub fn keepers(&self) -> &[KeeperState] {
        &self.keepers
    }

    pub fn opponents(&self) -> &[OpponentState] {
        &self.opponents
    }

    pub fn power_ups(&self) -> &PowerUpManager {
        &self.power_ups
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // === Host controls ===

    pub fn set_movement_mode(&mut self, mode: Option<MovementMode>) {
        self.movement_override = mode;
    }

    pub fn set_camera_mode(&mut self, mode: Option<CameraMode>) {
        self.camera.set_mode(mode);
    }

    /// World-space move direction for the held keys, using the last
    /// published camera pose.
    pub fn movement_direction(&self, keys: ArrowKeys) -> Vec3 {
        let ctx = MovementContext {
            override_mode: self.movement_override,
            camera_mode: self.camera.mode(),
            camera_state: self.published_camera.as_ref(),
        };
        map_direction(keys, &ctx)
    }

    /// Cancels every scheduled task; later ticks do nothing.
    pub fn disable(&mut self) {
        self.scheduler.clear();
        self.enabled = false;
        log::info!("Match session disabled at {:.0}ms of play", self.match_clock_ms);
    }

    /// Places the ball, schedules periodic tasks and enters the intro.
    pub fn start(&mut self, body: &mut dyn PhysicsBody, now_ms: TimestampMs) -> Vec<GameEvent> {
        self.started = true;
        self.phase = MatchPhase::Intro;
        self.phase_started_ms = now_ms;
        self.last_tick_ms = Some(now_ms);
        self.scheduler = Scheduler::from_config(&self.cfg.schedule, now_ms);
        let events = self.ball.kickoff_reset(body, self.centre_spot(), now_ms);
        log::info!("Match started ({:.0}s)", self.cfg.rules.match_duration_ms / 1000.0);
        events
    }

    pub fn tick(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &FrameInput,
        now_ms: TimestampMs,
    ) -> Vec<GameEvent> {
        if !self.enabled || !now_ms.is_finite() {
            return Vec::new();
        }
        let mut events = Vec::new();
        if !self.started {
            events.extend(self.start(body, now_ms));
        }
        let elapsed = self.last_tick_ms.map(|last| (now_ms - last).max(0.0)).unwrap_or(0.0);
        self.last_tick_ms = Some(now_ms);

        match self.phase {
            MatchPhase::Intro => {
                if now_ms - self.phase_started_ms >= self.cfg.rules.intro_duration_ms {
                    let side = self.kickoff_side;
                    self.enter_kickoff(body, side, now_ms, &mut events);
                }
            }
            MatchPhase::Kickoff => {
                if now_ms - self.phase_started_ms >= self.cfg.difficulty.reaction_ms {
                    self.set_phase(MatchPhase::Playing, now_ms, &mut events);
                }
            }
            _ => {}
        }

        let live = matches!(self.phase, MatchPhase::Kickoff | MatchPhase::Playing);
        if live {
            self.run_ball(body, input, now_ms, &mut events);
        }

        for task in self.scheduler.poll(now_ms) {
            match task.kind {
                TaskKind::Ai if self.phase == MatchPhase::Playing => {
                    self.run_ai(body, task.delta_s, now_ms, &mut events)
                }
                TaskKind::ReplaySample if self.phase != MatchPhase::Replay => {
                    self.sample_replay(body, &input.roster, now_ms)
                }
                TaskKind::PowerPlay if self.phase == MatchPhase::Playing => {
                    events.extend(self.power_ups.spawn())
                }
                _ => {}
            }
        }
        if let Some(event_id) = self.pending_goal_replay.take() {
            self.replay.arm_replay(ReplayEventKind::Goal, &event_id, now_ms);
        }

        if live {
            events.extend(self.power_ups.collect(&input.roster, now_ms));
            events.extend(self.power_ups.expire(now_ms));
        }

        self.run_replay(body, input, now_ms, &mut events);

        if live {
            self.match_clock_ms += elapsed;
            if self.match_clock_ms >= self.cfg.rules.match_duration_ms {
                log::info!("Full time: {} - {}", self.score.home, self.score.away);
                self.scheduler.clear();
                self.set_phase(MatchPhase::FullTime, now_ms, &mut events);
            }
        }

        self.run_camera(body, input, now_ms, &mut events);
        events
    }

    fn run_ball(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &FrameInput,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        if input.shoot_pressed {
            events.extend(self.ball.press_shoot(now_ms));
        }
        if input.shoot_released {
            events.extend(self.ball.release_shoot(now_ms));
        }
        let tick_input = BallTickInput {
            now_ms,
            roster: Some(&input.roster),
            pass: input.pass.as_ref(),
            speed_boost_active: self.power_ups.speed_boost_active(now_ms),
            power_multiplier: self.power_ups.power_multiplier(now_ms),
        };
        let ball_events = self.ball.tick(body, &tick_input);
        let went_out = ball_events.iter().any(|e| matches!(e, GameEvent::OutOfBounds { .. }));
        for event in &ball_events {
            if let GameEvent::ShotFired { .. } = event {
                self.arm_highlight(ReplayEventKind::Shot, now_ms);
            }
        }
        events.extend(ball_events);

        if let Some(scorer) = self.goals.check_goal(&body.position()) {
            self.on_goal(scorer, now_ms, events);
        } else if went_out {
            log::info!("Restarting from the centre spot after the ball went out");
            let side = self.kickoff_side;
            self.enter_kickoff(body, side, now_ms, events);
        }
    }

    fn on_goal(&mut self, scorer: TeamSide, now_ms: TimestampMs, events: &mut Vec<GameEvent>) {
        self.score.record(scorer);
        self.event_counter += 1;
        let event_id = format!("goal-{}", self.event_counter);
        log::info!("Goal for {:?}! {} - {}", scorer, self.score.home, self.score.away);
        events.extend(self.ball.release_possession(now_ms));
        events.push(GameEvent::Goal { scoring_side: scorer, score: self.score });
        // a highlight replay in progress gives way to the goal
        self.replay.interrupt();
        self.pending_goal_replay = Some(event_id);
        self.after_replay = MatchPhase::Kickoff;
        self.kickoff_side = scorer.opponent();
        self.set_phase(MatchPhase::GoalScored, now_ms, events);
    }

    fn ball_snapshot(body: &dyn PhysicsBody, now_ms: TimestampMs) -> Option<BallSnapshot> {
        let (position, velocity) = (body.position(), body.velocity());
        (is_finite_vec(&position) && is_finite_vec(&velocity)).then_some(BallSnapshot {
            timestamp_ms: now_ms,
            position,
            velocity,
        })
    }

    fn run_ai(
        &mut self,
        body: &mut dyn PhysicsBody,
        delta_s: f32,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        let snapshot = Self::ball_snapshot(body, now_ms);
        let ctx = TickContext::new(now_ms, delta_s, &self.cfg.difficulty, &self.cfg.field);

        // First requested ball command wins; keepers are asked first
        let mut command: Option<(Vec3, GameEvent, ReplayEventKind)> = None;
        for keeper in self.keepers.iter_mut() {
            let out = self.keeper_ai.step(keeper, snapshot.as_ref(), &ctx);
            *keeper = out.state;
            let Some(impulse) = out.distribute_impulse.filter(|_| out.save_requested) else {
                continue;
            };
            if command.is_none() {
                let event = GameEvent::KeeperSave {
                    keeper_id: keeper.id.clone(),
                    side: keeper.side,
                    impulse,
                };
                command = Some((impulse, event, ReplayEventKind::Save));
            }
        }

        let target_goal = Some(self.goals.attacking_goal(TeamSide::Away).center());
        let positions: Vec<Vec3> = self.opponents.iter().map(|o| o.position).collect();
        for (i, opponent) in self.opponents.iter_mut().enumerate() {
            let teammates: Vec<Vec3> =
                positions.iter().enumerate().filter(|(j, _)| *j != i).map(|(_, p)| *p).collect();
            let world = OpponentWorld { target_goal, teammates: &teammates };
            let out = self.opponent_ai.step(opponent, snapshot.as_ref(), &world, &ctx);
            *opponent = out.state;
            let Some(shot_vector) = out.shot_vector.filter(|_| out.shoot_requested) else {
                continue;
            };
            if command.is_none() {
                let event =
                    GameEvent::OpponentShot { opponent_id: opponent.id.clone(), shot_vector };
                command = Some((shot_vector, event, ReplayEventKind::Shot));
            }
        }

        let Some((velocity, event, kind)) = command else {
            return;
        };
        // AI commands only move a ball nobody is carrying
        if !self.ball.possession().is_loose() {
            log::debug!("Ignoring {} while the ball is carried", event.kind());
            return;
        }
        body.set_velocity(velocity);
        body.set_angular_velocity(Vec3::zeros());
        self.ball.lock_possession(now_ms);
        events.push(event);
        self.arm_highlight(kind, now_ms);
    }

    fn arm_highlight(&mut self, kind: ReplayEventKind, now_ms: TimestampMs) {
        if !self.cfg.replay.replay_highlights {
            return;
        }
        self.event_counter += 1;
        let event_id = match kind {
            ReplayEventKind::Goal => format!("goal-{}", self.event_counter),
            ReplayEventKind::Save => format!("save-{}", self.event_counter),
            ReplayEventKind::Shot => format!("shot-{}", self.event_counter),
        };
        if self.replay.arm_replay(kind, &event_id, now_ms) {
            self.after_replay = MatchPhase::Playing;
        }
    }

    fn sample_replay(
        &mut self,
        body: &dyn PhysicsBody,
        roster: &[PlayerSnapshot],
        now_ms: TimestampMs,
    ) {
        let ball = Self::ball_snapshot(body, now_ms)
            .map(|s| BallPose { position: s.position, velocity: s.velocity });
        let frame = ReplayFrame {
            timestamp_ms: now_ms,
            ball,
            players: roster
                .iter()
                .map(|p| AgentPose { id: p.id.clone(), position: p.position, yaw: p.yaw })
                .collect(),
            keepers: self
                .keepers
                .iter()
                .map(|k| AgentPose { id: k.id.clone(), position: k.position, yaw: k.rotation })
                .collect(),
            opponents: self
                .opponents
                .iter()
                .map(|o| AgentPose { id: o.id.clone(), position: o.position, yaw: o.rotation })
                .collect(),
            camera: Some(*self.camera.state()),
        };
        self.replay.push_frame(&frame);
    }

    fn run_replay(
        &mut self,
        body: &mut dyn PhysicsBody,
        input: &FrameInput,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        let skipped = if input.skip_replay { self.replay.skip(now_ms) } else { None };
        match skipped.or_else(|| self.replay.update(now_ms)) {
            Some(GameEvent::ReplayFinished) => {
                events.push(GameEvent::ReplayFinished);
                self.finish_replay(body, now_ms, events);
            }
            Some(event) => {
                events.push(event);
                if self.phase != MatchPhase::FullTime {
                    self.set_phase(MatchPhase::Replay, now_ms, events);
                }
            }
            None => {}
        }

        // goal without a playable replay
        if self.phase == MatchPhase::GoalScored
            && self.replay.mode() == ReplayMode::Idle
            && now_ms - self.phase_started_ms >= self.cfg.rules.goal_pause_ms
        {
            let side = self.kickoff_side;
            self.enter_kickoff(body, side, now_ms, events);
        }
    }

    fn finish_replay(
        &mut self,
        body: &mut dyn PhysicsBody,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase != MatchPhase::Replay {
            return;
        }
        match self.after_replay {
            MatchPhase::Kickoff => {
                let side = self.kickoff_side;
                self.enter_kickoff(body, side, now_ms, events);
            }
            other => self.set_phase(other, now_ms, events),
        }
    }

    fn run_camera(
        &mut self,
        body: &dyn PhysicsBody,
        input: &FrameInput,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        for event in events.iter() {
            self.camera.on_event(event, now_ms);
        }

        let players: Vec<Vec3> = input.roster.iter().map(|p| p.position).collect();
        let keepers: Vec<Vec3> = self.keepers.iter().map(|k| k.position).collect();
        let replay_ball = self.replay.current_frame().and_then(|f| f.ball).map(|b| b.position);
        let ball = match self.phase {
            MatchPhase::Replay => replay_ball,
            _ => Self::ball_snapshot(body, now_ms).map(|s| s.position),
        };
        let intro_progress = (self.phase == MatchPhase::Intro).then(|| {
            let duration = self.cfg.rules.intro_duration_ms.max(1.0);
            ((now_ms - self.phase_started_ms) / duration) as f32
        });

        let inputs =
            CameraInputs { now_ms, ball, players: &players, keepers: &keepers, intro_progress };
        if let Some(event) = self.camera.update(&inputs) {
            if let GameEvent::CameraUpdated { state } = &event {
                self.published_camera = Some(*state);
            }
            events.push(event);
        }
    }

    fn centre_spot(&self) -> Vec3 {
        Vec3::new(0.0, self.cfg.rules.kickoff_ball_height, 0.0)
    }

    fn enter_kickoff(
        &mut self,
        body: &mut dyn PhysicsBody,
        side: TeamSide,
        now_ms: TimestampMs,
        events: &mut Vec<GameEvent>,
    ) {
        let spot = self.centre_spot();
        events.extend(self.ball.kickoff_reset(body, spot, now_ms));
        for keeper in self.keepers.iter_mut() {
            keeper.reset();
        }
        for opponent in self.opponents.iter_mut() {
            opponent.reset();
        }
        log::info!("Kickoff: {:?}", side);
        events.push(GameEvent::Kickoff { side });
        self.set_phase(MatchPhase::Kickoff, now_ms, events);
    }

    fn set_phase(&mut self, to: MatchPhase, now_ms: TimestampMs, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        self.phase = to;
        self.phase_started_ms = now_ms;
        if from != to {
            log::debug!("Phase {:?} -> {:?}", from, to);
            events.push(GameEvent::PhaseChanged { from, to });
        }
    }
}
