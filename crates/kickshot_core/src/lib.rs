//! # kickshot_core - Deterministic Gameplay Core for Arcade Soccer
//!
//! Frame-by-frame gameplay rules for a small-sided arcade soccer match.
//! Rendering, audio and rigid-body integration belong to the host; the core
//! reads and overrides physics bodies through [`engine::PhysicsBody`] and
//! reports everything it decides as typed [`engine::GameEvent`]s.
//!
//! ## Features
//! - Camera-relative movement mapping
//! - Charged shots with a perfect-release window
//! - Possession arbitration with anti-jitter locks
//! - Goalkeeper and opponent state machines
//! - Broadcast camera director and instant replays
//! - Same inputs and timestamps, same outputs (no wall clock, no RNG)

// Agent step functions take the full world context
#![allow(clippy::too_many_arguments)]

pub mod camera;
pub mod engine;
pub mod error;
pub mod replay;

pub use camera::{CameraDirector, CameraMode, CameraState};
pub use engine::config::ArcadeConfig;
pub use engine::{FrameInput, GameEvent, MatchPhase, MatchSession, Score};
pub use error::{ConfigError, Result};
pub use replay::{ReplayDirector, ReplayFrame, ReplayPublicState};

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
