//! Instant replay
//!
//! Frames are sampled into a ring buffer during play. A goal or save arms a
//! replay around the buffer tail; once enough follow-up frames exist the
//! surrounding slice plays back, then a cooldown blocks re-arming.

pub mod director;
pub mod types;

pub use director::*;
pub use types::*;
