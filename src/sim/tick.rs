//! Fixed timestep simulation step
//!
//! Advances the game deterministically: intent -> command -> boundary
//! clamp -> obstacle sliding -> treasure pickup -> tag detection ->
//! cooldown freeze -> integrate.

use glam::DVec2;

use super::agent::{Action, Agent, PendingMotion, Role};
use super::query::point_poly_query;
use super::state::{GameState, Obstacle, PlacementError};
use crate::math::orth;

/// Input snapshot for a single tick
///
/// The host captures input state and passes it in; the core never
/// registers for ambient event sources. A missing player action means the
/// player stands still this tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub player: Option<Action>,
}

/// Advance the game state by one timestep.
///
/// Fails only when a collected treasure cannot be repositioned within the
/// placement attempt cap.
pub fn step(state: &mut GameState, input: &TickInput, dt: f64) -> Result<(), PlacementError> {
    state.tag_cooldown_ticks = state.tag_cooldown_ticks.saturating_sub(1);

    // resolve this tick's intents into motions
    let player_action = input.player.unwrap_or_default();
    let enemy_action = state.resolve_enemy_action();
    let mut motions = [
        state.agents[0].command(&player_action),
        state.agents[1].command(&enemy_action),
    ];

    // agents cannot walk off the arena or into obstacles
    for (agent, motion) in state.agents.iter().zip(motions.iter_mut()) {
        clamp_to_arena(agent, motion, state.shape);
        if motion.velocity.length_squared() > 0.0 {
            slide_along_obstacles(agent, motion, &state.obstacles);
        }
    }

    // non-pursuing agents collect treasures
    for i in 0..state.agents.len() {
        if state.agents[i].is_it {
            continue;
        }
        let pos = state.agents[i].position;
        let radius = state.agents[i].radius;
        let role = state.agents[i].role;
        for t in 0..state.treasures.len() {
            let circle = state.treasures[t].circle;
            if (pos - circle.center).length() <= radius + circle.radius {
                state.score += match role {
                    Role::Player => 1,
                    Role::Enemy => -1,
                };
                let center = state.sample_free_position(circle.radius)?;
                state.treasures[t].circle.center = center;
                log::debug!(
                    "treasure collected by {:?}, score {}, respawned at ({:.1}, {:.1})",
                    role,
                    state.score,
                    center.x,
                    center.y
                );
            }
        }
    }

    // tag detection, only outside the cooldown window
    if state.tag_cooldown_ticks == 0 {
        let contact = state.agents[0].radius + state.agents[1].radius;
        if (state.agents[0].position - state.agents[1].position).length() < contact {
            state.it_index = 1 - state.it_index;
            for agent in &mut state.agents {
                agent.is_it = !agent.is_it;
            }
            state.tag_cooldown_ticks = state.tag_cooldown_reset;
            log::info!("tag: {:?} is now it", state.agents[state.it_index].role);
        }
    }

    // the freshly tagged agent cannot move until the cooldown expires
    if state.tag_cooldown_ticks > 0 {
        motions[state.it_index].velocity = DVec2::ZERO;
    }

    for (agent, motion) in state.agents.iter_mut().zip(motions) {
        agent.integrate(motion, dt);
    }
    state.time_ticks += 1;
    Ok(())
}

/// Zero the velocity component that would drive the agent past the arena
/// bounds (inelastic, no bounce).
fn clamp_to_arena(agent: &Agent, motion: &mut PendingMotion, shape: DVec2) {
    let v = &mut motion.velocity;
    if agent.position.x >= shape.x - agent.radius {
        v.x = v.x.min(0.0);
    } else if agent.position.x <= agent.radius {
        v.x = v.x.max(0.0);
    }
    if agent.position.y >= shape.y - agent.radius {
        v.y = v.y.min(0.0);
    } else if agent.position.y <= agent.radius {
        v.y = v.y.max(0.0);
    }
}

/// Project velocity onto the obstacle tangent when the agent is in contact
/// and moving inward.
///
/// Obstacles are applied in list order against the running velocity, so
/// overlapping responses compose: opposing corner normals cancel the
/// velocity instead of leaking a stale tangential component.
fn slide_along_obstacles(agent: &Agent, motion: &mut PendingMotion, obstacles: &[Obstacle]) {
    for obstacle in obstacles {
        let q = point_poly_query(agent.position, obstacle.rect.as_polygon());
        if q.distance < agent.radius {
            if let Some(normal) = q.normal {
                if normal.dot(motion.velocity) < 0.0 {
                    let tangent = orth(normal);
                    motion.velocity = tangent.dot(motion.velocity) * tangent;
                }
            }
        }
    }
}
