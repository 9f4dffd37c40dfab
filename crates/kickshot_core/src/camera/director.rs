//! Camera director
//!
//! Called once per render tick. Picks a mode, derives the desired pose from
//! the ball and the player cluster, then eases the live pose toward it. The
//! intro sweep is the only pose that is set directly.

use super::{CameraMode, CameraState};
use crate::engine::config::{CameraConfig, CameraProfile};
use crate::engine::events::GameEvent;
use crate::engine::types::{is_finite_vec, lerp, lerp_vec, TimestampMs, Vec3};

/// Per-tick scene summary the director frames
#[derive(Debug, Clone, Copy, Default)]
pub struct CameraInputs<'a> {
    pub now_ms: TimestampMs,
    /// Ball (or any focus point); `None` frames the cluster only
    pub ball: Option<Vec3>,
    pub players: &'a [Vec3],
    pub keepers: &'a [Vec3],
    /// Present only while the intro plays, in [0, 1]
    pub intro_progress: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct CameraDirector {
    cfg: CameraConfig,
    field_half_length: f32,
    state: CameraState,
    /// Mode forced by the host, bypassing automatic selection
    pinned: Option<CameraMode>,
    held: Option<(CameraMode, TimestampMs)>,
    in_replay: bool,
    last_emit_ms: Option<TimestampMs>,
}

impl CameraDirector {
    pub fn new(cfg: CameraConfig, field_half_length: f32) -> Self {
        let state = CameraState {
            position: cfg.intro_start,
            target: cfg.intro_target,
            fov: cfg.intro_fov,
            mode: CameraMode::Intro,
        };
        Self {
            cfg,
            field_half_length,
            state,
            pinned: None,
            held: None,
            in_replay: false,
            last_emit_ms: None,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    /// Forces a mode (`Some`) or returns to automatic selection (`None`).
    pub fn set_mode(&mut self, mode: Option<CameraMode>) {
        if self.pinned != mode {
            log::debug!("Camera mode pinned: {:?}", mode);
        }
        self.pinned = mode;
    }

    /// Reacts to gameplay events with short mode holds.
    pub fn on_event(&mut self, event: &GameEvent, now_ms: TimestampMs) {
        match event {
            GameEvent::ShotFired { .. } | GameEvent::OpponentShot { .. } => {
                self.hold(CameraMode::Shot, now_ms + self.cfg.shot_hold_ms)
            }
            GameEvent::KeeperSave { .. } => {
                self.hold(CameraMode::Save, now_ms + self.cfg.save_hold_ms)
            }
            GameEvent::Goal { .. } => self.hold(CameraMode::Goal, now_ms + self.cfg.goal_hold_ms),
            GameEvent::ReplayStarted { .. } => self.in_replay = true,
            GameEvent::ReplayFinished => {
                self.in_replay = false;
                self.held = None;
            }
            GameEvent::Kickoff { .. } => self.held = None,
            _ => {}
        }
    }

    fn hold(&mut self, mode: CameraMode, until_ms: TimestampMs) {
        // a goal outranks the shot that caused it
        if let Some((CameraMode::Goal, until)) = self.held {
            if mode != CameraMode::Goal && until_ms < until {
                return;
            }
        }
        self.held = Some((mode, until_ms));
    }

    pub fn select_mode(&self, inputs: &CameraInputs) -> CameraMode {
        if let Some(mode) = self.pinned {
            return mode;
        }
        if inputs.intro_progress.is_some() {
            return CameraMode::Intro;
        }
        if self.in_replay {
            return CameraMode::Replay;
        }
        if let Some((mode, until)) = self.held {
            if inputs.now_ms < until {
                return mode;
            }
        }
        let third_line = self.field_half_length * self.cfg.attacking_third_fraction;
        match inputs.ball.filter(is_finite_vec) {
            Some(ball) if ball.z.abs() > third_line => CameraMode::AttackingThird,
            Some(_) => CameraMode::BroadcastBuildUp,
            None => CameraMode::BroadcastWide,
        }
    }

    /// Advances one render tick; returns a `CameraUpdated` event when the
    /// emit interval has passed.
    pub fn update(&mut self, inputs: &CameraInputs) -> Option<GameEvent> {
        let mode = self.select_mode(inputs);
        if mode != self.state.mode {
            log::debug!("Camera {:?} -> {:?}", self.state.mode, mode);
        }
        self.state.mode = mode;

        if mode == CameraMode::Intro {
            let progress = inputs.intro_progress.unwrap_or(1.0);
            let t = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
            self.state.position = lerp_vec(&self.cfg.intro_start, &self.cfg.intro_end, t);
            self.state.target = self.cfg.intro_target;
            self.state.fov = self.cfg.intro_fov;
        } else if let Some((position, target)) =
            self.desired_pose(self.cfg.profiles.get(mode), inputs)
        {
            let alpha = if mode == CameraMode::Replay {
                self.cfg.replay_alpha
            } else {
                self.cfg.smoothing_alpha
            };
            let fov = self.cfg.profiles.get(mode).fov;
            self.state.position = lerp_vec(&self.state.position, &position, alpha);
            self.state.target = lerp_vec(&self.state.target, &target, alpha);
            self.state.fov = lerp(self.state.fov, fov, alpha);
        }

        self.maybe_emit(inputs.now_ms)
    }

    /// Desired (position, target); `None` when there is nothing to frame.
    fn desired_pose(&self, profile: &CameraProfile, inputs: &CameraInputs) -> Option<(Vec3, Vec3)> {
        let cluster = centroid(inputs.players.iter().chain(inputs.keepers.iter()));
        let ball = inputs.ball.filter(is_finite_vec);
        let target = match (ball, cluster) {
            (Some(ball), Some(cluster)) => {
                lerp_vec(&cluster, &ball, profile.ball_weight.clamp(0.0, 1.0))
            }
            (Some(ball), None) => ball,
            (None, Some(cluster)) => cluster,
            (None, None) => return None,
        };
        Some((target + profile.offset, target))
    }

    fn maybe_emit(&mut self, now_ms: TimestampMs) -> Option<GameEvent> {
        let due = match self.last_emit_ms {
            Some(last) => now_ms - last >= self.cfg.emit_interval_ms,
            None => true,
        };
        if !due {
            return None;
        }
        self.last_emit_ms = Some(now_ms);
        Some(GameEvent::CameraUpdated { state: self.state })
    }
}

fn centroid<'a>(points: impl Iterator<Item = &'a Vec3>) -> Option<Vec3> {
    let (sum, count) = points
        .filter(|p| is_finite_vec(p))
        .fold((Vec3::zeros(), 0usize), |(sum, n), p| (sum + p, n + 1));
    (count > 0).then(|| sum / count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::TeamSide;
    use crate::replay::ReplayEventKind;

    fn director() -> CameraDirector {
        CameraDirector::new(CameraConfig::default(), 30.0)
    }

    fn at(now_ms: f64, ball: Vec3) -> CameraInputs<'static> {
        CameraInputs { now_ms, ball: Some(ball), ..Default::default() }
    }

    #[test]
    fn test_emission_throttled_by_sim_time() {
        let mut cam = director();
        let ball = Vec3::new(0.0, 0.5, 0.0);
        assert!(cam.update(&at(0.0, ball)).is_some());
        for i in 1..10 {
            assert!(cam.update(&at(i as f64 * 10.0, ball)).is_none());
        }
        assert!(cam.update(&at(100.0, ball)).is_some());
        // many calls at the same instant still emit nothing
        for _ in 0..5 {
            assert!(cam.update(&at(150.0, ball)).is_none());
        }
    }

    #[test]
    fn test_smoothing_moves_by_alpha() {
        let mut cam = director();
        let before = *cam.state();
        cam.update(&at(0.0, Vec3::new(0.0, 0.5, 0.0)));
        let profile = CameraConfig::default().profiles.broadcast_build_up;
        let desired_target = Vec3::new(0.0, 0.5, 0.0);
        let expected = before.target + (desired_target - before.target) * 0.08;
        assert!((cam.state().target - expected).norm() < 1e-5);
        let desired_position = desired_target + profile.offset;
        let moved = (cam.state().position - before.position).norm();
        assert!(moved < (desired_position - before.position).norm());
        assert!(moved > 0.0);
    }

    #[test]
    fn test_replay_uses_faster_alpha() {
        let mut cam = director();
        cam.on_event(
            &GameEvent::ReplayStarted { event_type: ReplayEventKind::Goal, event_id: "g1".into() },
            0.0,
        );
        let before = *cam.state();
        let ball = Vec3::new(4.0, 0.5, -2.0);
        cam.update(&at(0.0, ball));
        assert_eq!(cam.mode(), CameraMode::Replay);
        let expected = before.target + (ball - before.target) * 0.18;
        assert!((cam.state().target - expected).norm() < 1e-5);

        cam.on_event(&GameEvent::ReplayFinished, 10.0);
        cam.update(&at(10.0, ball));
        assert_eq!(cam.mode(), CameraMode::BroadcastBuildUp);
    }

    #[test]
    fn test_intro_interpolates_linearly() {
        let mut cam = director();
        let cfg = CameraConfig::default();
        let inputs = CameraInputs { intro_progress: Some(0.5), ..Default::default() };
        cam.update(&inputs);
        let mid = (cfg.intro_start + cfg.intro_end) * 0.5;
        assert!((cam.state().position - mid).norm() < 1e-5);
        assert_eq!(cam.mode(), CameraMode::Intro);

        let inputs = CameraInputs { intro_progress: Some(4.0), ..Default::default() };
        cam.update(&inputs);
        assert!((cam.state().position - cfg.intro_end).norm() < 1e-5);
    }

    #[test]
    fn test_mode_follows_ball_thirds_and_holds() {
        let mut cam = director();
        cam.update(&at(0.0, Vec3::new(0.0, 0.5, -25.0)));
        assert_eq!(cam.mode(), CameraMode::AttackingThird);
        cam.update(&at(10.0, Vec3::new(0.0, 0.5, 2.0)));
        assert_eq!(cam.mode(), CameraMode::BroadcastBuildUp);

        cam.on_event(
            &GameEvent::Goal { scoring_side: TeamSide::Home, score: Default::default() },
            20.0,
        );
        cam.update(&at(30.0, Vec3::new(0.0, 0.5, 2.0)));
        assert_eq!(cam.mode(), CameraMode::Goal);
        cam.update(&at(2_600.0, Vec3::new(0.0, 0.5, 2.0)));
        assert_eq!(cam.mode(), CameraMode::BroadcastBuildUp);
    }

    #[test]
    fn test_pinned_mode_wins() {
        let mut cam = director();
        cam.set_mode(Some(CameraMode::FreeRoam));
        cam.update(&at(0.0, Vec3::new(0.0, 0.5, -25.0)));
        assert_eq!(cam.mode(), CameraMode::FreeRoam);
        cam.set_mode(None);
        cam.update(&at(10.0, Vec3::new(0.0, 0.5, -25.0)));
        assert_eq!(cam.mode(), CameraMode::AttackingThird);
    }

    #[test]
    fn test_nothing_to_frame_keeps_pose() {
        let mut cam = director();
        cam.update(&at(0.0, Vec3::new(1.0, 0.5, 1.0)));
        let before = *cam.state();
        cam.update(&CameraInputs { now_ms: 16.0, ..Default::default() });
        assert_eq!(cam.state().position, before.position);
        assert_eq!(cam.mode(), CameraMode::BroadcastWide);
    }
}
