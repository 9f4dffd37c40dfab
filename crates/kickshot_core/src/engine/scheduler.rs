//! Cooperative fixed-rate task scheduler
//!
//! Replaces wall-clock intervals with tasks the host loop polls. Each due
//! task reports its own delta since its previous run, so coarse subsystems
//! stay correct when the host stalls or jitters. A stalled task fires once
//! on resume rather than bursting to catch up.

use crate::engine::config::ScheduleConfig;
use crate::engine::types::TimestampMs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Goalkeeper and opponent controllers
    Ai,
    ReplaySample,
    /// Power-up spawning
    PowerPlay,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DueTask {
    pub kind: TaskKind,
    pub now_ms: TimestampMs,
    /// Seconds since this task last ran
    pub delta_s: f32,
}

#[derive(Debug, Clone)]
struct Task {
    kind: TaskKind,
    interval_ms: f64,
    next_due_ms: TimestampMs,
    last_run_ms: Option<TimestampMs>,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All match tasks, first due one interval after `start_ms`.
    pub fn from_config(cfg: &ScheduleConfig, start_ms: TimestampMs) -> Self {
        let mut scheduler = Self::new();
        scheduler.schedule(TaskKind::Ai, cfg.ai_interval_ms, start_ms);
        scheduler.schedule(TaskKind::ReplaySample, cfg.replay_sample_ms, start_ms);
        scheduler.schedule(TaskKind::PowerPlay, cfg.power_play_interval_ms, start_ms);
        scheduler
    }

    /// Adds `kind`, replacing any existing task of the same kind.
    pub fn schedule(&mut self, kind: TaskKind, interval_ms: f64, start_ms: TimestampMs) {
        self.tasks.retain(|t| t.kind != kind);
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            log::warn!("Refusing to schedule {:?} with interval {}", kind, interval_ms);
            return;
        }
        log::debug!("Scheduled {:?} every {}ms", kind, interval_ms);
        self.tasks.push(Task {
            kind,
            interval_ms,
            next_due_ms: start_ms + interval_ms,
            last_run_ms: None,
        });
    }

    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.kind != kind);
        before != self.tasks.len()
    }

    pub fn clear(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("Cancelled {} scheduled tasks", self.tasks.len());
        }
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks due at `now_ms`, in scheduling order.
    pub fn poll(&mut self, now_ms: TimestampMs) -> Vec<DueTask> {
        let mut due = Vec::new();
        if !now_ms.is_finite() {
            return due;
        }
        for task in self.tasks.iter_mut() {
            if now_ms < task.next_due_ms {
                continue;
            }
            let elapsed = task.last_run_ms.map(|last| now_ms - last).unwrap_or(task.interval_ms);
            task.last_run_ms = Some(now_ms);
            task.next_due_ms = now_ms + task.interval_ms;
            due.push(DueTask { kind: task.kind, now_ms, delta_s: (elapsed / 1000.0) as f32 });
        }
        due
    }
}
