//! Replay director: ring buffer capture and playback state machine

use super::types::*;
use crate::engine::config::ReplayConfig;
use crate::engine::events::GameEvent;
use crate::engine::types::TimestampMs;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ReplayDirector {
    cfg: ReplayConfig,
    buffer: VecDeque<ReplayFrame>,
    last_capture_ms: Option<TimestampMs>,
    /// Buffer index of the arming instant, -1 when unset
    anchor: i64,
    mode: ReplayMode,
    event: Option<(ReplayEventKind, String)>,
    armed_at_ms: TimestampMs,
    playback: Vec<ReplayFrame>,
    playback_index: usize,
    playback_started_ms: TimestampMs,
    cooldown_until_ms: TimestampMs,
}

impl ReplayDirector {
    pub fn new(cfg: ReplayConfig) -> Self {
        Self {
            buffer: VecDeque::with_capacity(cfg.max_buffer_frames + 1),
            cfg,
            last_capture_ms: None,
            anchor: -1,
            mode: ReplayMode::Idle,
            event: None,
            armed_at_ms: 0.0,
            playback: Vec::new(),
            playback_index: 0,
            playback_started_ms: 0.0,
            cooldown_until_ms: f64::NEG_INFINITY,
        }
    }

    pub fn mode(&self) -> ReplayMode {
        self.mode
    }

    pub fn buffered_frames(&self) -> usize {
        self.buffer.len()
    }

    pub fn anchor(&self) -> i64 {
        self.anchor
    }

    /// Captures a copy of `frame` when at least one frame interval has
    /// passed since the last capture. Returns whether it was kept.
    pub fn push_frame(&mut self, frame: &ReplayFrame) -> bool {
        if !frame.timestamp_ms.is_finite() {
            return false;
        }
        if let Some(last) = self.last_capture_ms {
            if frame.timestamp_ms - last < self.cfg.frame_interval_ms {
                return false;
            }
        }
        self.last_capture_ms = Some(frame.timestamp_ms);
        self.buffer.push_back(frame.clone());

        let mut trimmed = 0i64;
        while self.buffer.len() > self.cfg.max_buffer_frames {
            self.buffer.pop_front();
            trimmed += 1;
        }
        if trimmed > 0 && self.anchor >= 0 {
            self.anchor = (self.anchor - trimmed).max(-1);
        }
        true
    }

    /// Marks the buffer tail as the replay anchor. Refused while a replay is
    /// armed or playing, or during an unexpired cooldown.
    pub fn arm_replay(
        &mut self,
        kind: ReplayEventKind,
        event_id: &str,
        now_ms: TimestampMs,
    ) -> bool {
        match self.mode {
            ReplayMode::Armed | ReplayMode::Playing => return false,
            ReplayMode::Cooldown if now_ms < self.cooldown_until_ms => return false,
            _ => {}
        }
        self.event = Some((kind, event_id.to_string()));
        self.anchor = self.buffer.len() as i64 - 1;
        self.playback.clear();
        self.playback_index = 0;
        self.armed_at_ms = now_ms;
        self.mode = ReplayMode::Armed;
        log::info!(
            "Replay armed for {:?} '{}' at frame {} ({:?}ms)",
            kind,
            event_id,
            self.anchor,
            self.anchor_frame().map(|f| f.timestamp_ms)
        );
        true
    }

    /// Advances the state machine; returns a start/finish event on
    /// transitions into playback or out of it.
    pub fn update(&mut self, now_ms: TimestampMs) -> Option<GameEvent> {
        match self.mode {
            ReplayMode::Idle => None,
            ReplayMode::Armed => self.update_armed(now_ms),
            ReplayMode::Playing => {
                let elapsed = (now_ms - self.playback_started_ms).max(0.0);
                let index = (elapsed / self.cfg.frame_interval_ms).floor() as usize;
                if index >= self.playback.len() {
                    return Some(self.enter_cooldown(now_ms));
                }
                self.playback_index = index;
                None
            }
            ReplayMode::Cooldown => {
                if now_ms >= self.cooldown_until_ms {
                    self.to_idle();
                }
                None
            }
        }
    }

    fn update_armed(&mut self, now_ms: TimestampMs) -> Option<GameEvent> {
        let tail = self.buffer.len() as i64 - 1;
        let captured_after = tail - self.anchor;
        let timed_out = now_ms - self.armed_at_ms >= self.cfg.arm_timeout_ms;
        if captured_after < self.cfg.post_event_frames as i64 && !timed_out {
            return None;
        }

        let start = (self.anchor - self.cfg.pre_event_frames as i64).max(0);
        let end = (self.anchor + self.cfg.post_event_frames as i64).min(tail);
        if self.anchor < 0 || start > end {
            log::warn!(
                "Replay slice empty (anchor {}, buffered {}), aborting",
                self.anchor,
                self.buffer.len()
            );
            self.to_idle();
            return None;
        }

        self.playback = self.buffer.range(start as usize..=end as usize).cloned().collect();
        self.playback_index = 0;
        self.playback_started_ms = now_ms;
        self.mode = ReplayMode::Playing;
        let (kind, id) = self.event.clone()?;
        log::info!("Replay playing {} frames", self.playback.len());
        Some(GameEvent::ReplayStarted { event_type: kind, event_id: id })
    }

    /// Ends playback early. Only valid while playing.
    pub fn skip(&mut self, now_ms: TimestampMs) -> Option<GameEvent> {
        if self.mode != ReplayMode::Playing {
            return None;
        }
        log::debug!("Replay skipped at index {}", self.playback_index);
        Some(self.enter_cooldown(now_ms))
    }

    fn enter_cooldown(&mut self, now_ms: TimestampMs) -> GameEvent {
        self.mode = ReplayMode::Cooldown;
        self.cooldown_until_ms = now_ms + self.cfg.cooldown_ms;
        GameEvent::ReplayFinished
    }

    fn to_idle(&mut self) {
        self.mode = ReplayMode::Idle;
        self.event = None;
        self.anchor = -1;
        self.playback.clear();
        self.playback_index = 0;
    }

    /// Abandons an armed or playing replay and any cooldown. Captured
    /// frames stay so a new replay can be armed at once.
    pub fn interrupt(&mut self) {
        if self.mode != ReplayMode::Idle {
            log::debug!("Replay {:?} interrupted", self.event.as_ref().map(|(_, id)| id.as_str()));
        }
        self.to_idle();
        self.cooldown_until_ms = f64::NEG_INFINITY;
    }

    /// Buffered frame the armed replay is centred on
    pub fn anchor_frame(&self) -> Option<&ReplayFrame> {
        usize::try_from(self.anchor).ok().and_then(|i| self.buffer.get(i))
    }

    pub fn current_frame(&self) -> Option<&ReplayFrame> {
        if self.mode != ReplayMode::Playing {
            return None;
        }
        self.playback.get(self.playback_index)
    }

    pub fn public_state(&self) -> ReplayPublicState {
        let playing = self.mode == ReplayMode::Playing;
        ReplayPublicState {
            mode: self.mode,
            is_playing: playing,
            can_skip: playing,
            event_type: self.event.as_ref().map(|(kind, _)| *kind),
            event_id: self.event.as_ref().map(|(_, id)| id.clone()),
            current_playback_index: self.playback_index,
            total_playback_frames: self.playback.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn director() -> ReplayDirector {
        ReplayDirector::new(ReplayConfig::default())
    }

    fn push_many(director: &mut ReplayDirector, from: usize, count: usize) {
        for i in from..from + count {
            director.push_frame(&ReplayFrame::empty(i as f64 * 34.0));
        }
    }

    #[test]
    fn test_arm_play_skip_cooldown() {
        let mut rd = director();
        push_many(&mut rd, 0, 20);
        assert!(rd.arm_replay(ReplayEventKind::Goal, "goal-1", 680.0));
        assert_eq!(rd.mode(), ReplayMode::Armed);
        push_many(&mut rd, 20, 12);

        let started = rd.update(1_100.0);
        assert!(matches!(started, Some(GameEvent::ReplayStarted { .. })));
        assert_eq!(rd.mode(), ReplayMode::Playing);
        assert!(rd.current_frame().is_some());

        assert!(rd.skip(1_150.0).is_some());
        assert_eq!(rd.mode(), ReplayMode::Cooldown);
        assert!(rd.current_frame().is_none());

        rd.update(1_150.0 + 1_199.0);
        assert_eq!(rd.mode(), ReplayMode::Cooldown);
        rd.update(1_150.0 + 1_200.0);
        assert_eq!(rd.mode(), ReplayMode::Idle);
        assert_eq!(rd.public_state().event_id, None);
    }

    #[test]
    fn test_capture_is_throttled() {
        let mut rd = director();
        assert!(rd.push_frame(&ReplayFrame::empty(0.0)));
        assert!(!rd.push_frame(&ReplayFrame::empty(20.0)));
        assert!(rd.push_frame(&ReplayFrame::empty(34.0)));
        assert!(!rd.push_frame(&ReplayFrame::empty(f64::NAN)));
        assert_eq!(rd.buffered_frames(), 2);
    }

    #[test]
    fn test_arm_refused_while_busy() {
        let mut rd = director();
        push_many(&mut rd, 0, 5);
        assert!(rd.arm_replay(ReplayEventKind::Save, "s1", 170.0));
        assert!(!rd.arm_replay(ReplayEventKind::Goal, "g1", 171.0));

        push_many(&mut rd, 5, 12);
        rd.update(600.0);
        assert_eq!(rd.mode(), ReplayMode::Playing);
        assert!(!rd.arm_replay(ReplayEventKind::Goal, "g1", 601.0));

        rd.skip(610.0);
        assert!(!rd.arm_replay(ReplayEventKind::Goal, "g1", 700.0));
        assert!(rd.arm_replay(ReplayEventKind::Goal, "g1", 1_810.0));
    }

    #[test]
    fn test_timeout_starts_short_replay() {
        let mut rd = director();
        push_many(&mut rd, 0, 3);
        rd.arm_replay(ReplayEventKind::Shot, "shot-1", 100.0);
        assert!(rd.update(500.0).is_none());
        assert_eq!(rd.mode(), ReplayMode::Armed);
        assert!(rd.update(1_050.0).is_some());
        assert_eq!(rd.public_state().total_playback_frames, 3);
    }

    #[test]
    fn test_empty_buffer_aborts_to_idle() {
        let mut rd = director();
        assert!(rd.arm_replay(ReplayEventKind::Goal, "g", 0.0));
        assert_eq!(rd.anchor(), -1);
        assert!(rd.update(1_000.0).is_none());
        assert_eq!(rd.mode(), ReplayMode::Idle);
    }

    #[test]
    fn test_playback_runs_to_cooldown() {
        let mut rd = director();
        push_many(&mut rd, 0, 30);
        rd.arm_replay(ReplayEventKind::Goal, "g", 1_000.0);
        push_many(&mut rd, 30, 12);
        rd.update(1_500.0);
        let total = rd.public_state().total_playback_frames;
        assert_eq!(total, 30 + 12);

        rd.update(1_500.0 + 34.0 * 5.0);
        assert_eq!(rd.public_state().current_playback_index, 5);
        let done = rd.update(1_500.0 + 34.0 * total as f64);
        assert_eq!(done, Some(GameEvent::ReplayFinished));
        assert_eq!(rd.mode(), ReplayMode::Cooldown);
    }

    #[test]
    fn test_last_slice_frame_is_shown() {
        let mut rd = director();
        push_many(&mut rd, 0, 5);
        rd.arm_replay(ReplayEventKind::Shot, "shot-1", 170.0);
        rd.update(1_200.0);
        let total = rd.public_state().total_playback_frames;
        assert_eq!(total, 5);

        assert!(rd.update(1_200.0 + 34.0 * 4.0).is_none());
        let last = rd.current_frame().map(|f| f.timestamp_ms);
        assert_eq!(last, Some(4.0 * 34.0));
        assert_eq!(rd.update(1_200.0 + 34.0 * 5.0), Some(GameEvent::ReplayFinished));
    }

    #[test]
    fn test_interrupt_keeps_buffer() {
        let mut rd = director();
        push_many(&mut rd, 0, 20);
        rd.arm_replay(ReplayEventKind::Save, "save-1", 680.0);
        push_many(&mut rd, 20, 12);
        rd.update(1_100.0);
        assert_eq!(rd.mode(), ReplayMode::Playing);

        rd.interrupt();
        assert_eq!(rd.mode(), ReplayMode::Idle);
        assert_eq!(rd.buffered_frames(), 32);
        assert!(rd.arm_replay(ReplayEventKind::Goal, "goal-2", 1_110.0));
        assert_eq!(rd.anchor(), 31);
        assert_eq!(rd.anchor_frame().map(|f| f.timestamp_ms), Some(31.0 * 34.0));

        // cooldown is cleared as well
        rd.interrupt();
        assert!(rd.arm_replay(ReplayEventKind::Goal, "goal-3", 1_120.0));
        push_many(&mut rd, 32, 12);
        rd.update(1_600.0);
        assert_eq!(rd.mode(), ReplayMode::Playing);
        rd.skip(1_650.0);
        assert_eq!(rd.mode(), ReplayMode::Cooldown);
        rd.interrupt();
        assert!(rd.arm_replay(ReplayEventKind::Goal, "goal-4", 1_660.0));
    }

    #[test]
    fn test_anchor_rebased_on_trim() {
        let mut rd = director();
        push_many(&mut rd, 0, 180);
        rd.arm_replay(ReplayEventKind::Goal, "g", 6_200.0);
        assert_eq!(rd.anchor(), 179);
        push_many(&mut rd, 180, 5);
        assert_eq!(rd.buffered_frames(), 180);
        assert_eq!(rd.anchor(), 174);
    }

    #[test]
    fn test_public_state_snapshot() {
        let mut rd = director();
        push_many(&mut rd, 0, 1);
        rd.arm_replay(ReplayEventKind::Save, "save-7", 10.0);
        insta::assert_json_snapshot!(rd.public_state(), @r###"
        {
          "mode": "armed",
          "is_playing": false,
          "can_skip": false,
          "event_type": "save",
          "event_id": "save-7",
          "current_playback_index": 0,
          "total_playback_frames": 0
        }
        "###);
    }

    proptest! {
        #[test]
        fn prop_buffer_never_exceeds_capacity(count in 0usize..600, step in 1.0f64..80.0) {
            let mut rd = director();
            for i in 0..count {
                rd.push_frame(&ReplayFrame::empty(i as f64 * step));
                prop_assert!(rd.buffered_frames() <= 180);
            }
        }
    }
}
