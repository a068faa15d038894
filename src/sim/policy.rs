//! Steering policies for the non-player agent
//!
//! The built-in [`TagPolicy`] is a pure function of the current state,
//! re-derived every tick. Either of its branches can be replaced by an
//! external [`Policy`] (a learned model, a script); decisions arrive
//! through an [`ActionSlot`] when the source is asynchronous.

use std::fmt;

use glam::DVec2;

use super::agent::{Action, Agent};
use crate::math::{angle_to, orth};

/// What a policy sees when deciding
///
/// Treasure positions are zeroed when the observed agent holds the "it"
/// role: the pursuer has no collection incentive.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub self_position: DVec2,
    pub self_heading: f64,
    pub other_position: DVec2,
    pub target_positions: Vec<DVec2>,
}

/// External decision source for the non-player agent
///
/// The returned scalar is the angular command (only its sign steers) with a
/// fixed forward linear direction of 1 - a narrower action space than the
/// player's.
pub trait Policy {
    fn decide(&mut self, obs: &Observation) -> f64;
}

/// Single-slot mailbox for asynchronously-arriving actions
///
/// The host posts whenever a decision arrives; the simulation reads
/// whatever is current at tick time and never blocks. Before the first
/// post the held action is the zero action.
#[derive(Debug, Clone, Default)]
pub struct ActionSlot {
    incoming: Option<Action>,
    held: Action,
}

impl ActionSlot {
    /// Replace the pending action; the newest post wins.
    pub fn post(&mut self, action: Action) {
        self.incoming = Some(action);
    }

    /// The newest posted action, or the last returned one when nothing new
    /// has arrived.
    pub fn latest(&mut self) -> Action {
        if let Some(action) = self.incoming.take() {
            self.held = action;
        }
        self.held
    }
}

/// Built-in tag policy with optional learned overrides per role branch
#[derive(Default)]
pub struct TagPolicy {
    pub it_model: Option<Box<dyn Policy>>,
    pub not_it_model: Option<Box<dyn Policy>>,
}

impl fmt::Debug for TagPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagPolicy")
            .field("it_model", &self.it_model.is_some())
            .field("not_it_model", &self.not_it_model.is_some())
            .finish()
    }
}

impl TagPolicy {
    /// Evaluate the policy for `agent` against `player` at the current
    /// state.
    pub fn compute(
        &mut self,
        agent: &Agent,
        player: &Agent,
        arena_shape: DVec2,
        treasures: &[DVec2],
    ) -> Action {
        if agent.is_it {
            match self.it_model.as_mut() {
                Some(model) => {
                    // the pursuer ignores treasures entirely
                    let obs = observe(agent, player, &vec![DVec2::ZERO; treasures.len()]);
                    Action::forward(model.decide(&obs))
                }
                None => default_it_policy(agent, player),
            }
        } else {
            match self.not_it_model.as_mut() {
                Some(model) => {
                    let obs = observe(agent, player, treasures);
                    Action::forward(model.decide(&obs))
                }
                None => default_not_it_policy(agent, player, arena_shape),
            }
        }
    }
}

fn observe(agent: &Agent, player: &Agent, treasures: &[DVec2]) -> Observation {
    Observation {
        self_position: agent.position,
        self_heading: agent.heading,
        other_position: player.position,
        target_positions: treasures.to_vec(),
    }
}

/// Steer toward the player.
fn default_it_policy(agent: &Agent, player: &Agent) -> Action {
    use std::f64::consts::PI;

    let r = player.position - agent.position;
    let a = angle_to(r, agent.heading);
    let angular = if a < PI {
        1.0
    } else if a > PI {
        -1.0
    } else {
        0.0
    };
    Action::forward(angular)
}

/// Steer away from the player.
///
/// When already facing away, turning straight "away" oscillates; instead
/// steer along the orthogonal around the arena center that increases the
/// escape distance.
fn default_not_it_policy(agent: &Agent, player: &Agent, arena_shape: DVec2) -> Action {
    use std::f64::consts::PI;

    let r = player.position - agent.position;
    let d = agent.direction();

    let angular = if d.dot(r) < 0.0 {
        let p = agent.position - 0.5 * arena_shape;
        let mut v = orth(p);
        if v.dot(r) > 0.0 {
            v = -v;
        }
        let a = angle_to(v, agent.heading);
        if a < PI {
            1.0
        } else if a > PI {
            -1.0
        } else {
            0.0
        }
    } else {
        let a = angle_to(r, agent.heading);
        if a < PI {
            -1.0
        } else if a > PI {
            1.0
        } else {
            0.0
        }
    };
    Action::forward(angular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::agent::Role;

    const SHAPE: DVec2 = DVec2::new(50.0, 50.0);

    #[test]
    fn test_action_slot_holds_last() {
        let mut slot = ActionSlot::default();
        assert_eq!(slot.latest(), Action::default());

        let turn = Action::forward(1.0);
        slot.post(turn);
        assert_eq!(slot.latest(), turn);
        // nothing new posted: the held action persists
        assert_eq!(slot.latest(), turn);
    }

    #[test]
    fn test_action_slot_newest_wins() {
        let mut slot = ActionSlot::default();
        slot.post(Action::forward(1.0));
        slot.post(Action::forward(-1.0));
        assert_eq!(slot.latest(), Action::forward(-1.0));
    }

    #[test]
    fn test_it_policy_turns_toward_player() {
        let mut policy = TagPolicy::default();
        let enemy = Agent::new(DVec2::new(25.0, 25.0), Role::Enemy, true);
        // player up-right of the enemy: a left turn in the screen frame
        let player = Agent::new(DVec2::new(35.0, 15.0), Role::Player, false);

        let action = policy.compute(&enemy, &player, SHAPE, &[]);
        assert_eq!(action.angular_dir, 1.0);
        assert_eq!(action.linear_dir, DVec2::X);
    }

    #[test]
    fn test_not_it_policy_turns_away_from_player() {
        let mut policy = TagPolicy::default();
        let enemy = Agent::new(DVec2::new(25.0, 25.0), Role::Enemy, false);
        let player = Agent::new(DVec2::new(35.0, 15.0), Role::Player, false);

        // facing the player: mirrored sign of the pursuit turn
        let action = policy.compute(&enemy, &player, SHAPE, &[]);
        assert_eq!(action.angular_dir, -1.0);
    }

    #[test]
    fn test_not_it_policy_orbits_when_facing_away() {
        let mut policy = TagPolicy::default();
        let mut enemy = Agent::new(DVec2::new(10.0, 25.0), Role::Enemy, false);
        enemy.heading = std::f64::consts::PI; // facing -x, player behind
        let player = Agent::new(DVec2::new(40.0, 25.0), Role::Player, false);

        let action = policy.compute(&enemy, &player, SHAPE, &[]);
        // already fleeing: keep moving, steer around the center
        assert_eq!(action.linear_dir, DVec2::X);
        assert!(action.angular_dir == 1.0 || action.angular_dir == -1.0);
    }

    #[test]
    fn test_external_it_model_sees_zeroed_treasures() {
        struct Probe;
        impl Policy for Probe {
            fn decide(&mut self, obs: &Observation) -> f64 {
                assert!(obs.target_positions.iter().all(|t| *t == DVec2::ZERO));
                0.5
            }
        }

        let mut policy = TagPolicy {
            it_model: Some(Box::new(Probe)),
            not_it_model: None,
        };
        let enemy = Agent::new(DVec2::new(25.0, 25.0), Role::Enemy, true);
        let player = Agent::new(DVec2::new(35.0, 15.0), Role::Player, false);
        let treasures = [DVec2::new(5.0, 5.0), DVec2::new(45.0, 45.0)];

        let action = policy.compute(&enemy, &player, SHAPE, &treasures);
        assert_eq!(action.angular_dir, 0.5);
    }
}
