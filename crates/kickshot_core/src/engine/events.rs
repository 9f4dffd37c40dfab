//! Typed gameplay events and their dispatcher
//!
//! Controllers never call back into the host. Each tick returns the events
//! it produced; the host hands them to an [`EventBus`] (or drains them any
//! other way it likes).

use crate::camera::CameraState;
use crate::engine::kick::KickLaunch;
use crate::engine::powerups::PowerUpKind;
use crate::engine::session::{MatchPhase, Score};
use crate::engine::shot_charge::{KickRequest, ShotChargeState};
use crate::engine::types::{PossessionState, TeamSide, Vec3};
use crate::replay::ReplayEventKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PossessionChanged { possession: PossessionState },
    ShotChargeChanged { state: ShotChargeState },
    ShotFired { player_id: String, team_id: String, request: KickRequest, launch: KickLaunch },
    PassApplied { pass_id: String, velocity: Vec3 },
    OutOfBounds { position: Vec3 },
    KeeperSave { keeper_id: String, side: TeamSide, impulse: Vec3 },
    OpponentShot { opponent_id: String, shot_vector: Vec3 },
    Goal { scoring_side: TeamSide, score: Score },
    Kickoff { side: TeamSide },
    PowerUpSpawned { id: u32, kind: PowerUpKind, position: Vec3 },
    PowerUpCollected { id: u32, kind: PowerUpKind, player_id: String },
    PowerUpExpired { kind: PowerUpKind },
    ReplayStarted { event_type: ReplayEventKind, event_id: String },
    ReplayFinished,
    CameraUpdated { state: CameraState },
    PhaseChanged { from: MatchPhase, to: MatchPhase },
}

impl GameEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::PossessionChanged { .. } => "possession_changed",
            GameEvent::ShotChargeChanged { .. } => "shot_charge_changed",
            GameEvent::ShotFired { .. } => "shot_fired",
            GameEvent::PassApplied { .. } => "pass_applied",
            GameEvent::OutOfBounds { .. } => "out_of_bounds",
            GameEvent::KeeperSave { .. } => "keeper_save",
            GameEvent::OpponentShot { .. } => "opponent_shot",
            GameEvent::Goal { .. } => "goal",
            GameEvent::Kickoff { .. } => "kickoff",
            GameEvent::PowerUpSpawned { .. } => "power_up_spawned",
            GameEvent::PowerUpCollected { .. } => "power_up_collected",
            GameEvent::PowerUpExpired { .. } => "power_up_expired",
            GameEvent::ReplayStarted { .. } => "replay_started",
            GameEvent::ReplayFinished => "replay_finished",
            GameEvent::CameraUpdated { .. } => "camera_updated",
            GameEvent::PhaseChanged { .. } => "phase_changed",
        }
    }
}

pub type EventHandler = Box<dyn FnMut(&GameEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out of tick events to registered handlers, in subscription order
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriptionId, EventHandler)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers every event to every handler; returns deliveries made.
    pub fn dispatch(&mut self, events: &[GameEvent]) -> usize {
        let mut delivered = 0;
        for event in events {
            for (_, handler) in self.handlers.iter_mut() {
                handler(event);
                delivered += 1;
            }
        }
        delivered
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}
