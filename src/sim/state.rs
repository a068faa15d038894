//! Game state and configuration
//!
//! [`GameState`] is the only mutable aggregate: it owns the two agents, the
//! obstacle and treasure lists, the tag state machine counters, and the
//! seeded RNG. Same seed + same inputs = identical runs.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::agent::{Action, Agent, Role};
use super::geom::{AARect, Circle, GeometryError};
use super::occlusion::occlusion_polygon;
use super::policy::{ActionSlot, TagPolicy};
use super::query::point_poly_query;
use crate::consts::{MAX_PLACEMENT_ATTEMPTS, TAG_COOLDOWN_TICKS, TREASURE_COUNT, TREASURE_RADIUS};

/// Rejection sampling failed to find a collision-free position
///
/// Raised when the arena is so cluttered that no valid placement exists
/// within the attempt cap; callers may retry with relaxed constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no collision-free position found in {attempts} attempts")]
pub struct PlacementError {
    pub attempts: u32,
}

/// Failure to construct a game from a configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Obstacle bounds as plain data, built into an [`AARect`] at game start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectSpec {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectSpec {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn build(&self) -> Result<AARect, GeometryError> {
        AARect::new(self.x, self.y, self.w, self.h)
    }
}

/// Static game setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    pub obstacles: Vec<RectSpec>,
    pub treasure_count: usize,
    pub treasure_radius: f64,
    pub tag_cooldown_ticks: u32,
    pub player_start: DVec2,
    pub enemy_start: DVec2,
}

impl Default for GameConfig {
    /// The original tag arena: 50x50 with a center block and four corner
    /// blocks, enemy starting as "it" across from the player.
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            obstacles: vec![
                RectSpec::new(20.0, 20.0, 10.0, 10.0),
                RectSpec::new(8.0, 8.0, 5.0, 5.0),
                RectSpec::new(8.0, 37.0, 5.0, 5.0),
                RectSpec::new(37.0, 37.0, 5.0, 5.0),
                RectSpec::new(37.0, 8.0, 5.0, 5.0),
            ],
            treasure_count: TREASURE_COUNT,
            treasure_radius: TREASURE_RADIUS,
            tag_cooldown_ticks: TAG_COOLDOWN_TICKS,
            player_start: DVec2::new(10.0, 25.0),
            enemy_start: DVec2::new(40.0, 25.0),
        }
    }
}

/// An arena obstacle; immutable after construction
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub rect: AARect,
}

/// Collectible target; repositioned whenever collected
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Treasure {
    pub circle: Circle,
}

/// Where the enemy agent's actions come from
#[derive(Debug)]
pub enum EnemyController {
    /// Built-in steering policy, evaluated every tick
    Builtin(TagPolicy),
    /// Externally-posted actions; holds the last command between posts
    External(ActionSlot),
}

impl Default for EnemyController {
    fn default() -> Self {
        Self::Builtin(TagPolicy::default())
    }
}

/// Complete game state (deterministic)
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Arena dimensions
    pub shape: DVec2,
    /// Arena bounds as a rectangle, for occlusion clipping
    pub screen_rect: AARect,
    pub obstacles: Vec<Obstacle>,
    /// Index 0 is the player role, index 1 the enemy
    pub agents: [Agent; 2],
    pub treasures: Vec<Treasure>,
    /// Which agent currently holds the "it" role
    pub it_index: usize,
    /// Ticks remaining before another tag can register
    pub tag_cooldown_ticks: u32,
    /// Cooldown applied on each tag
    pub tag_cooldown_reset: u32,
    pub score: i64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub controller: EnemyController,
}

impl GameState {
    /// Create a game with the default arena and the given seed.
    pub fn new(seed: u64) -> Result<Self, SetupError> {
        Self::from_config(&GameConfig::default(), seed)
    }

    pub fn from_config(config: &GameConfig, seed: u64) -> Result<Self, SetupError> {
        let screen_rect = AARect::new(0.0, 0.0, config.width, config.height)?;
        let obstacles = config
            .obstacles
            .iter()
            .map(|spec| spec.build().map(|rect| Obstacle { rect }))
            .collect::<Result<Vec<_>, _>>()?;

        let shape = DVec2::new(config.width, config.height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut treasures = Vec::with_capacity(config.treasure_count);
        for _ in 0..config.treasure_count {
            let center =
                sample_free_position(&mut rng, config.treasure_radius, shape, &obstacles)?;
            treasures.push(Treasure {
                circle: Circle::new(center, config.treasure_radius),
            });
        }

        let player = Agent::new(config.player_start, Role::Player, false);
        let enemy = Agent::new(config.enemy_start, Role::Enemy, true);

        log::info!(
            "new game: {}x{} arena, {} obstacles, {} treasures, seed {}",
            config.width,
            config.height,
            obstacles.len(),
            treasures.len(),
            seed
        );

        Ok(Self {
            seed,
            rng,
            shape,
            screen_rect,
            obstacles,
            agents: [player, enemy],
            treasures,
            it_index: 1,
            tag_cooldown_ticks: 0,
            tag_cooldown_reset: config.tag_cooldown_ticks,
            score: 0,
            time_ticks: 0,
            controller: EnemyController::default(),
        })
    }

    #[inline]
    pub fn player(&self) -> &Agent {
        &self.agents[0]
    }

    #[inline]
    pub fn enemy(&self) -> &Agent {
        &self.agents[1]
    }

    /// Post an externally-decided enemy action.
    ///
    /// Switches the enemy to external control on first use; afterwards the
    /// simulation holds the last posted action between posts.
    pub fn post_enemy_action(&mut self, action: Action) {
        match &mut self.controller {
            EnemyController::External(slot) => slot.post(action),
            controller @ EnemyController::Builtin(_) => {
                let mut slot = ActionSlot::default();
                slot.post(action);
                *controller = EnemyController::External(slot);
            }
        }
    }

    /// The enemy action for this tick, from whichever source is wired.
    pub(crate) fn resolve_enemy_action(&mut self) -> Action {
        let treasure_positions: Vec<DVec2> =
            self.treasures.iter().map(|t| t.circle.center).collect();
        match &mut self.controller {
            EnemyController::Builtin(policy) => policy.compute(
                &self.agents[1],
                &self.agents[0],
                self.shape,
                &treasure_positions,
            ),
            EnemyController::External(slot) => slot.latest(),
        }
    }

    /// Sample a position at least `radius` clear of every obstacle, inset
    /// from the arena bounds.
    pub(crate) fn sample_free_position(&mut self, radius: f64) -> Result<DVec2, PlacementError> {
        sample_free_position(&mut self.rng, radius, self.shape, &self.obstacles)
    }

    /// Committed post-step state for the external renderer, with occlusion
    /// polygons computed from the viewer agent's position.
    pub fn render_snapshot(&self, viewer: usize) -> Result<RenderSnapshot, GeometryError> {
        let viewpoint = self.agents[viewer].position;

        let obstacles = self
            .obstacles
            .iter()
            .map(|o| {
                occlusion_polygon(&o.rect, viewpoint, &self.screen_rect).map(|occlusion| {
                    ObstacleSnapshot {
                        x: o.rect.x,
                        y: o.rect.y,
                        w: o.rect.w,
                        h: o.rect.h,
                        occlusion,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RenderSnapshot {
            agents: self
                .agents
                .iter()
                .map(|a| AgentSnapshot {
                    position: a.position,
                    heading: a.heading,
                    radius: a.radius,
                    role: a.role,
                    is_it: a.is_it,
                })
                .collect(),
            obstacles,
            treasures: self
                .treasures
                .iter()
                .map(|t| TreasureSnapshot {
                    center: t.circle.center,
                    radius: t.circle.radius,
                })
                .collect(),
            score: self.score,
            time_ticks: self.time_ticks,
        })
    }
}

fn sample_free_position(
    rng: &mut Pcg32,
    radius: f64,
    shape: DVec2,
    obstacles: &[Obstacle],
) -> Result<DVec2, PlacementError> {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let p = DVec2::new(
            rng.random_range(radius..shape.x - radius),
            rng.random_range(radius..shape.y - radius),
        );
        let clear = obstacles
            .iter()
            .all(|o| point_poly_query(p, o.rect.as_polygon()).distance >= radius);
        if clear {
            return Ok(p);
        }
    }
    log::warn!(
        "placement failed after {} attempts (radius {})",
        MAX_PLACEMENT_ATTEMPTS,
        radius
    );
    Err(PlacementError {
        attempts: MAX_PLACEMENT_ATTEMPTS,
    })
}

/// Agent pose for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub position: DVec2,
    pub heading: f64,
    pub radius: f64,
    pub role: Role,
    pub is_it: bool,
}

/// Obstacle bounds plus its occlusion polygon from the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSnapshot {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub occlusion: Vec<DVec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreasureSnapshot {
    pub center: DVec2,
    pub radius: f64,
}

/// Everything the external renderer consumes after a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub agents: Vec<AgentSnapshot>,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub treasures: Vec<TreasureSnapshot>,
    pub score: i64,
    pub time_ticks: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_layout() {
        let state = GameState::new(7).unwrap();
        assert_eq!(state.agents.len(), 2);
        assert_eq!(state.player().role, Role::Player);
        assert_eq!(state.enemy().role, Role::Enemy);
        assert!(state.enemy().is_it);
        assert!(!state.player().is_it);
        assert_eq!(state.it_index, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.obstacles.len(), 5);
        assert_eq!(state.treasures.len(), TREASURE_COUNT);
    }

    #[test]
    fn test_treasures_placed_clear_of_obstacles() {
        let state = GameState::new(1234).unwrap();
        for t in &state.treasures {
            for o in &state.obstacles {
                let q = point_poly_query(t.circle.center, o.rect.as_polygon());
                assert!(q.distance >= t.circle.radius);
            }
        }
    }

    #[test]
    fn test_treasures_inset_from_bounds_with_no_obstacles() {
        let config = GameConfig {
            obstacles: vec![],
            ..Default::default()
        };
        // no obstacles: every sample is accepted on the first attempt
        let state = GameState::from_config(&config, 99).unwrap();
        for t in &state.treasures {
            let c = t.circle.center;
            let r = t.circle.radius;
            assert!(c.x >= r && c.x <= config.width - r);
            assert!(c.y >= r && c.y <= config.height - r);
        }
    }

    #[test]
    fn test_placement_exhaustion_errors() {
        // one obstacle covering the whole arena: no free spot exists
        let config = GameConfig {
            obstacles: vec![RectSpec::new(-10.0, -10.0, 70.0, 70.0)],
            ..Default::default()
        };
        match GameState::from_config(&config, 5) {
            Err(SetupError::Placement(e)) => {
                assert_eq!(e.attempts, MAX_PLACEMENT_ATTEMPTS)
            }
            other => panic!("expected placement failure, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_obstacle_spec_errors() {
        let config = GameConfig {
            obstacles: vec![RectSpec::new(10.0, 10.0, -5.0, 5.0)],
            ..Default::default()
        };
        assert!(matches!(
            GameState::from_config(&config, 5),
            Err(SetupError::Geometry(GeometryError::EmptyRect { .. }))
        ));
    }

    #[test]
    fn test_same_seed_same_treasures() {
        let a = GameState::new(42).unwrap();
        let b = GameState::new(42).unwrap();
        for (ta, tb) in a.treasures.iter().zip(&b.treasures) {
            assert_eq!(ta.circle.center, tb.circle.center);
        }
    }

    #[test]
    fn test_render_snapshot_shape() {
        let state = GameState::new(3).unwrap();
        let snap = state.render_snapshot(0).unwrap();
        assert_eq!(snap.agents.len(), 2);
        assert_eq!(snap.obstacles.len(), state.obstacles.len());
        assert_eq!(snap.treasures.len(), state.treasures.len());
        assert_eq!(snap.score, 0);
        // every obstacle casts a shadow polygon with at least the two
        // witnesses and two extensions
        for o in &snap.obstacles {
            assert!(o.occlusion.len() >= 4);
        }
    }

    #[test]
    fn test_render_snapshot_round_trips_through_json() {
        let state = GameState::new(3).unwrap();
        let snap = state.render_snapshot(0).unwrap();
        let json = serde_json::to_string(&snap).unwrap();
        let back: RenderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn test_post_enemy_action_switches_to_external() {
        let mut state = GameState::new(11).unwrap();
        assert!(matches!(state.controller, EnemyController::Builtin(_)));

        state.post_enemy_action(Action::forward(1.0));
        assert!(matches!(state.controller, EnemyController::External(_)));
        assert_eq!(state.resolve_enemy_action(), Action::forward(1.0));
        // no new post: the last command holds
        assert_eq!(state.resolve_enemy_action(), Action::forward(1.0));
    }
}
