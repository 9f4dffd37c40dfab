//! Shot charge state machine
//!
//! `idle → charging → idle`. Releasing a charge yields a one-shot
//! [`KickRequest`] that the ball controller consumes on its next tick.
//! Meter updates are quantized to 1% steps and only emitted when they
//! change, so a 60 fps host does not flood the UI.
//!
//! A press made before the player owns the ball opens a short auto-tap
//! window: gaining possession while the key is still held inside that
//! window fires a minimum-charge kick exactly once.

use crate::engine::config::ShotConfig;
use crate::engine::types::TimestampMs;
use serde::{Deserialize, Serialize};

const RATIO_CHANGE_EPSILON: f32 = 1e-4;

/// Meter state as shown to the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotChargeState {
    pub is_charging: bool,
    pub charge_ratio: f32,
    pub is_perfect: bool,
    pub can_shoot: bool,
}

impl ShotChargeState {
    pub fn idle() -> Self {
        Self { is_charging: false, charge_ratio: 0.0, is_perfect: false, can_shoot: false }
    }

    fn charging(charge_ratio: f32, is_perfect: bool) -> Self {
        Self { is_charging: true, charge_ratio, is_perfect, can_shoot: true }
    }

    fn differs_from(&self, other: &ShotChargeState) -> bool {
        self.is_charging != other.is_charging
            || self.is_perfect != other.is_perfect
            || self.can_shoot != other.can_shoot
            || (self.charge_ratio - other.charge_ratio).abs() > RATIO_CHANGE_EPSILON
    }
}

/// One-shot kick produced by a release (or an auto-tap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickRequest {
    pub ui_charge_ratio: f32,
    pub effective_charge_ratio: f32,
    pub is_perfect: bool,
}

/// Output of every charge operation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChargeUpdate {
    /// New meter state, present only when it changed
    pub state: Option<ShotChargeState>,
    pub kick: Option<KickRequest>,
}

/// Floors a raw ratio to the 1% grid after clamping into [0, 1].
pub fn quantize_ratio(raw: f64) -> f32 {
    let clamped = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
    ((clamped * 100.0).floor() / 100.0) as f32
}

pub fn is_perfect_ratio(ratio: f32, cfg: &ShotConfig) -> bool {
    ratio >= cfg.perfect_window_start && ratio <= cfg.perfect_window_end
}

#[derive(Debug, Clone)]
pub struct ShotCharge {
    cfg: ShotConfig,
    charging_since_ms: Option<TimestampMs>,
    current: ShotChargeState,
    last_emitted: Option<ShotChargeState>,
    cooldown_until_ms: TimestampMs,
    key_held: bool,
    /// Press time of a press made without possession
    auto_tap_pressed_ms: Option<TimestampMs>,
}

impl ShotCharge {
    pub fn new(cfg: ShotConfig) -> Self {
        Self {
            cfg,
            charging_since_ms: None,
            current: ShotChargeState::idle(),
            last_emitted: None,
            cooldown_until_ms: f64::NEG_INFINITY,
            key_held: false,
            auto_tap_pressed_ms: None,
        }
    }

    pub fn state(&self) -> ShotChargeState {
        self.current
    }

    pub fn is_charging(&self) -> bool {
        self.charging_since_ms.is_some()
    }

    pub fn is_key_held(&self) -> bool {
        self.key_held
    }

    pub fn in_cooldown(&self, now_ms: TimestampMs) -> bool {
        now_ms < self.cooldown_until_ms
    }

    pub fn has_pending_auto_tap(&self) -> bool {
        self.auto_tap_pressed_ms.is_some()
    }

    /// Shoot key went down.
    pub fn press(&mut self, now_ms: TimestampMs, has_possession: bool) -> ChargeUpdate {
        self.key_held = true;
        if has_possession {
            self.auto_tap_pressed_ms = None;
            return self.start_charge(now_ms);
        }
        self.auto_tap_pressed_ms = Some(now_ms);
        log::debug!("Shot pressed without possession, auto-tap window opened at {}", now_ms);
        ChargeUpdate::default()
    }

    /// Begins a charge from zero unless already charging or cooling down.
    pub fn start_charge(&mut self, now_ms: TimestampMs) -> ChargeUpdate {
        if self.is_charging() || self.in_cooldown(now_ms) {
            return ChargeUpdate::default();
        }
        self.charging_since_ms = Some(now_ms);
        self.current = ShotChargeState::charging(0.0, false);
        ChargeUpdate { state: self.emit(), kick: None }
    }

    /// Per-frame meter refresh.
    pub fn tick(&mut self, now_ms: TimestampMs) -> ChargeUpdate {
        if let Some(pressed) = self.auto_tap_pressed_ms {
            if now_ms - pressed > self.cfg.pre_possession_auto_tap_window_ms {
                self.auto_tap_pressed_ms = None;
            }
        }
        let Some(since) = self.charging_since_ms else {
            return ChargeUpdate::default();
        };
        let ratio = quantize_ratio((now_ms - since) / self.cfg.max_charge_ms);
        self.current = ShotChargeState::charging(ratio, is_perfect_ratio(ratio, &self.cfg));
        ChargeUpdate { state: self.emit(), kick: None }
    }

    /// Shoot key went up. A running charge becomes a kick.
    pub fn release(&mut self, now_ms: TimestampMs) -> ChargeUpdate {
        self.key_held = false;
        self.auto_tap_pressed_ms = None;
        let Some(since) = self.charging_since_ms.take() else {
            return ChargeUpdate::default();
        };

        let ui = quantize_ratio((now_ms - since) / self.cfg.max_charge_ms);
        let kick = KickRequest {
            ui_charge_ratio: ui,
            effective_charge_ratio: ui.max(self.cfg.min_charge_ratio),
            is_perfect: is_perfect_ratio(ui, &self.cfg),
        };
        self.cooldown_until_ms = now_ms + self.cfg.recharge_cooldown_ms;
        self.current = ShotChargeState::idle();
        log::debug!(
            "Shot released: ui={:.2} effective={:.2} perfect={}",
            kick.ui_charge_ratio,
            kick.effective_charge_ratio,
            kick.is_perfect
        );
        ChargeUpdate { state: self.emit(), kick: Some(kick) }
    }

    /// The controlled player just gained the ball.
    pub fn on_possession_gained(&mut self, now_ms: TimestampMs) -> ChargeUpdate {
        let Some(pressed) = self.auto_tap_pressed_ms.take() else {
            return ChargeUpdate::default();
        };
        let within_window = now_ms - pressed <= self.cfg.pre_possession_auto_tap_window_ms;
        if !self.key_held || !within_window || self.in_cooldown(now_ms) {
            return ChargeUpdate::default();
        }
        self.cooldown_until_ms = now_ms + self.cfg.recharge_cooldown_ms;
        log::debug!("Auto-tap fired {:.0}ms after press", now_ms - pressed);
        ChargeUpdate {
            state: None,
            kick: Some(KickRequest {
                ui_charge_ratio: 0.0,
                effective_charge_ratio: self.cfg.min_charge_ratio,
                is_perfect: false,
            }),
        }
    }

    /// The controlled player lost the ball; a running charge is dropped.
    pub fn on_possession_lost(&mut self) -> ChargeUpdate {
        if self.charging_since_ms.take().is_none() {
            return ChargeUpdate::default();
        }
        self.current = ShotChargeState::idle();
        ChargeUpdate { state: self.emit(), kick: None }
    }

    /// Clears everything, used on kickoff.
    pub fn reset(&mut self) {
        let cfg = self.cfg.clone();
        *self = Self::new(cfg);
    }

    fn emit(&mut self) -> Option<ShotChargeState> {
        let changed = match &self.last_emitted {
            Some(last) => self.current.differs_from(last),
            None => true,
        };
        if changed {
            self.last_emitted = Some(self.current);
            Some(self.current)
        } else {
            None
        }
    }
}
