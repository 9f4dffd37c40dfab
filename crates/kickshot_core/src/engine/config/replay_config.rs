//! Instant-replay buffer sizing

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Minimum clock advance between two captured frames
    pub frame_interval_ms: f64,
    /// Ring buffer capacity
    pub max_buffer_frames: usize,
    /// Frames kept before the anchor
    pub pre_event_frames: usize,
    /// Frames captured after the anchor before playback starts
    pub post_event_frames: usize,
    /// Armed replays start playing after this long even if short on frames
    pub arm_timeout_ms: f64,
    pub cooldown_ms: f64,
    /// Also arm replays for saves and shots; goals always arm one
    pub replay_highlights: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 34.0,
            max_buffer_frames: 180,
            pre_event_frames: 60,
            post_event_frames: 12,
            arm_timeout_ms: 950.0,
            cooldown_ms: 1_200.0,
            replay_highlights: false,
        }
    }
}
