pub mod ball_controller; // Possession, kicks and the speed governor per tick
pub mod behaviors; // Goalkeeper and opponent controllers
pub mod config;
pub mod events;
pub mod goal; // Goal contract: which side owns which line
pub mod kick;
pub mod movement; // Arrow keys to world-space direction
pub mod physics; // Host physics boundary
pub mod possession;
pub mod powerups;
pub mod scheduler; // Cooperative fixed-rate tasks
pub mod session;
pub mod shot_charge;
pub mod types;

pub use ball_controller::{BallController, BallTickInput, PassCommand};
pub use events::{EventBus, GameEvent};
pub use physics::{KinematicBody, PhysicsBody};
pub use session::{FrameInput, MatchPhase, MatchSession, Score};
pub use types::{PlayerSnapshot, PossessionState, TeamSide, TimestampMs, Vec3};
