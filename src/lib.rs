//! Shadow Tag - a top-down pursuit game simulation core
//!
//! Core modules:
//! - `math`: 2D vector helpers in the left-handed screen frame
//! - `sim`: Deterministic simulation (geometry, collision, occlusion, game state)
//!
//! Rendering, input capture, and learned policies are external collaborators:
//! the simulation consumes an [`sim::Action`] per agent per tick and emits a
//! [`sim::RenderSnapshot`] of committed post-step state.

pub mod math;
pub mod sim;

pub use sim::{GameConfig, GameState, RenderSnapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (60 Hz, the original display clock)
    pub const FRAMERATE: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f64 = 1.0 / FRAMERATE as f64;

    /// Arena dimensions (arena units)
    pub const ARENA_WIDTH: f64 = 50.0;
    pub const ARENA_HEIGHT: f64 = 50.0;

    /// Agent defaults
    pub const AGENT_RADIUS: f64 = 3.0;
    /// Normal forward speed, arena units per second
    pub const AGENT_FORWARD_SPEED: f64 = 75.0;
    /// Backward speed while looking back
    pub const AGENT_BACKWARD_SPEED: f64 = 30.0;
    /// Pursuit speed while holding the "it" role (faster than forward)
    pub const AGENT_IT_SPEED: f64 = 100.0;
    /// Angular speed, radians per second
    pub const AGENT_ANGULAR_SPEED: f64 = 5.0;
    /// Half-angle of the agent view cone, radians
    pub const VIEW_HALF_ANGLE: f64 = std::f64::consts::PI / 3.0;

    /// Ticks during which no second tag can register after a tag
    pub const TAG_COOLDOWN_TICKS: u32 = 120;

    /// Treasure defaults
    pub const TREASURE_RADIUS: f64 = 1.0;
    pub const TREASURE_COUNT: usize = 2;
    /// Rejection-sampling cap for collision-free treasure placement
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1000;
}
