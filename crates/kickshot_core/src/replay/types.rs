use crate::camera::CameraState;
use crate::engine::types::{AgentPose, TimestampMs, Vec3};
use serde::{Deserialize, Serialize};

/// What triggered a replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEventKind {
    Goal,
    Save,
    Shot,
}

/// `idle → armed → playing → cooldown → idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayMode {
    #[default]
    Idle,
    Armed,
    Playing,
    Cooldown,
}

impl ReplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplayMode::Idle => "idle",
            ReplayMode::Armed => "armed",
            ReplayMode::Playing => "playing",
            ReplayMode::Cooldown => "cooldown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallPose {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// One captured instant of the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub timestamp_ms: TimestampMs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball: Option<BallPose>,
    #[serde(default)]
    pub players: Vec<AgentPose>,
    #[serde(default)]
    pub keepers: Vec<AgentPose>,
    #[serde(default)]
    pub opponents: Vec<AgentPose>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraState>,
}

impl ReplayFrame {
    /// Frame with nothing but a timestamp
    pub fn empty(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms,
            ball: None,
            players: Vec::new(),
            keepers: Vec::new(),
            opponents: Vec::new(),
            camera: None,
        }
    }
}

/// Read-only view of the director for UI consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayPublicState {
    pub mode: ReplayMode,
    pub is_playing: bool,
    pub can_skip: bool,
    pub event_type: Option<ReplayEventKind>,
    pub event_id: Option<String>,
    pub current_playback_index: usize,
    pub total_playback_frames: usize,
}
