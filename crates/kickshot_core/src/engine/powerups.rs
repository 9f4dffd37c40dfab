//! Power-play pickups
//!
//! Spawned by the power-play task, collected by controllable players.
//! `Speed` raises the ball speed cap, `Power` raises kick power. Effects
//! are timed; collecting the same kind again refreshes the timer.

use crate::engine::config::PowerUpConfig;
use crate::engine::events::GameEvent;
use crate::engine::types::{planar_distance, PlayerSnapshot, TimestampMs, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Speed,
    Power,
}

impl PowerUpKind {
    fn next(&self) -> Self {
        match self {
            PowerUpKind::Speed => PowerUpKind::Power,
            PowerUpKind::Power => PowerUpKind::Speed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct PowerUpManager {
    cfg: PowerUpConfig,
    active: Vec<PowerUp>,
    next_id: u32,
    spawn_cursor: usize,
    next_kind: PowerUpKind,
    speed_until_ms: Option<TimestampMs>,
    power_until_ms: Option<TimestampMs>,
}

impl PowerUpManager {
    pub fn new(cfg: PowerUpConfig) -> Self {
        Self {
            cfg,
            active: Vec::new(),
            next_id: 1,
            spawn_cursor: 0,
            next_kind: PowerUpKind::Speed,
            speed_until_ms: None,
            power_until_ms: None,
        }
    }

    pub fn active(&self) -> &[PowerUp] {
        &self.active
    }

    pub fn speed_boost_active(&self, now_ms: TimestampMs) -> bool {
        self.speed_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Kick power multiplier currently granted, 1.0 without a power effect.
    pub fn power_multiplier(&self, now_ms: TimestampMs) -> f32 {
        match self.power_until_ms {
            Some(until) if now_ms < until => self.cfg.power_multiplier,
            _ => 1.0,
        }
    }

    /// One spawn attempt; runs on the power-play cadence.
    pub fn spawn(&mut self) -> Option<GameEvent> {
        if !self.cfg.enabled
            || self.cfg.spawn_points.is_empty()
            || self.active.len() >= self.cfg.max_active
        {
            return None;
        }
        let position = self.cfg.spawn_points[self.spawn_cursor % self.cfg.spawn_points.len()];
        self.spawn_cursor = self.spawn_cursor.wrapping_add(1);
        let pickup = PowerUp { id: self.next_id, kind: self.next_kind, position };
        self.next_id = self.next_id.wrapping_add(1);
        self.next_kind = self.next_kind.next();

        log::debug!(
            "Spawned {:?} power-up #{} at ({:.1}, {:.1})",
            pickup.kind,
            pickup.id,
            position.x,
            position.z
        );
        let event = GameEvent::PowerUpSpawned { id: pickup.id, kind: pickup.kind, position };
        self.active.push(pickup);
        Some(event)
    }

    /// Pickups touched by any rostered player this tick.
    pub fn collect(&mut self, roster: &[PlayerSnapshot], now_ms: TimestampMs) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let radius = self.cfg.pickup_radius;
        let mut remaining = Vec::with_capacity(self.active.len());
        for pickup in std::mem::take(&mut self.active) {
            let collector =
                roster.iter().find(|p| planar_distance(&p.position, &pickup.position) <= radius);
            match collector {
                Some(player) => {
                    let until = Some(now_ms + self.cfg.effect_duration_ms);
                    match pickup.kind {
                        PowerUpKind::Speed => self.speed_until_ms = until,
                        PowerUpKind::Power => self.power_until_ms = until,
                    }
                    log::info!("{} collected {:?} power-up", player.id, pickup.kind);
                    events.push(GameEvent::PowerUpCollected {
                        id: pickup.id,
                        kind: pickup.kind,
                        player_id: player.id.clone(),
                    });
                }
                None => remaining.push(pickup),
            }
        }
        self.active = remaining;
        events
    }

    /// Ends timed effects, one event per expiry.
    pub fn expire(&mut self, now_ms: TimestampMs) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for (kind, slot) in [
            (PowerUpKind::Speed, &mut self.speed_until_ms),
            (PowerUpKind::Power, &mut self.power_until_ms),
        ] {
            if slot.is_some_and(|until| now_ms >= until) {
                *slot = None;
                events.push(GameEvent::PowerUpExpired { kind });
            }
        }
        events
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.cfg.clone());
    }
}
