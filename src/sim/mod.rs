//! Deterministic simulation module
//!
//! The brick-breaker mini-game and the particle background live here. This
//! module must stay free of rendering and platform dependencies:
//! - Time only enters through explicit elapsed-milliseconds arguments
//! - Seeded RNG only
//! - Presentation is reached through collaborator traits

pub mod particles;
pub mod physics;
pub mod registry;
pub mod session;
pub mod state;

pub use particles::{Connection, Particle, ParticleField};
pub use physics::{PaddleResponse, StepResult, Wall, frame_scale, step, substeps};
pub use registry::{BreakableRegistry, PresentationTarget, TargetError, TransientStyle};
pub use session::{GameSession, NoOverlay, SessionOverlay};
pub use state::{Ball, BallState, Field, GameEvent, Outcome, Paddle, SessionPhase};
