//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! The renderer and input collaborators touch the simulation through two
//! seams: a [`TickInput`] snapshot going in, a [`RenderSnapshot`] coming out.

pub mod agent;
pub mod geom;
pub mod occlusion;
pub mod policy;
pub mod query;
pub mod state;
pub mod tick;

pub use agent::{Action, Agent, Frame, PendingMotion, Role};
pub use geom::{AARect, Circle, GeometryError, Polygon, Segment};
pub use occlusion::{
    line_rect_edge_intersection, occlusion_polygon, view_occlusion_polygon, witness_vertices,
};
pub use policy::{ActionSlot, Observation, Policy, TagPolicy};
pub use query::{CollisionQuery, QUERY_TOL, point_poly_query, point_segment_query};
pub use state::{
    AgentSnapshot, EnemyController, GameConfig, GameState, Obstacle, ObstacleSnapshot,
    PlacementError, RectSpec, RenderSnapshot, SetupError, Treasure, TreasureSnapshot,
};
pub use tick::{TickInput, step};
