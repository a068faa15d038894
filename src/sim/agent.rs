//! Agent kinematics
//!
//! An agent is a circle with a heading. Each tick its commanded [`Action`]
//! resolves into a [`PendingMotion`] which the simulation step clamps
//! against the arena and obstacles before integrating. Motion never
//! persists across ticks: it is produced by [`Agent::command`] and consumed
//! by [`Agent::integrate`].

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    AGENT_ANGULAR_SPEED, AGENT_BACKWARD_SPEED, AGENT_FORWARD_SPEED, AGENT_IT_SPEED,
    AGENT_RADIUS,
};
use crate::math::{rotate, unit, wrap_to_pi};

/// Reference frame of an action's linear direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frame {
    /// World axes
    World,
    /// The agent's forward frame (rotated by its heading)
    #[default]
    Local,
}

/// Which of the two fixed slots an agent occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Human-controlled agent; scores +1 on treasure pickup
    Player,
    /// Policy-controlled agent; scores -1 on treasure pickup
    Enemy,
}

/// Per-tick intent for one agent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    /// Direction of travel, components in {-1, 0, 1}
    pub linear_dir: DVec2,
    /// Turn command; only the sign matters
    pub angular_dir: f64,
    /// Move backward slowly while watching behind
    pub look_back: bool,
    pub frame: Frame,
}

impl Action {
    /// Full speed ahead in the local frame with the given turn command,
    /// the shape every steering policy emits.
    pub fn forward(angular_dir: f64) -> Self {
        Self {
            linear_dir: DVec2::X,
            angular_dir,
            look_back: false,
            frame: Frame::Local,
        }
    }
}

/// Velocity derived from a single tick's action
///
/// Exists only between command resolution and integration within one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PendingMotion {
    pub velocity: DVec2,
    pub angular_velocity: f64,
}

/// A mobile agent in the arena
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub position: DVec2,
    /// Radians, wrapped to [-pi, pi]
    pub heading: f64,
    pub role: Role,
    pub radius: f64,
    /// Currently holds the pursuit role
    pub is_it: bool,
    /// Set by the last commanded action; flips the view cone
    pub look_back: bool,
}

impl Agent {
    pub fn new(position: DVec2, role: Role, is_it: bool) -> Self {
        Self {
            position,
            heading: 0.0,
            role,
            radius: AGENT_RADIUS,
            is_it,
            look_back: false,
        }
    }

    /// Unit vector in the direction the agent is facing
    #[inline]
    pub fn direction(&self) -> DVec2 {
        DVec2::new(self.heading.cos(), -self.heading.sin())
    }

    /// Resolve an action into this tick's motion.
    ///
    /// Forward speed depends on role: the "it" agent moves at the faster
    /// pursuit speed; looking back selects the slow backward speed.
    pub fn command(&mut self, action: &Action) -> PendingMotion {
        self.look_back = action.look_back;

        let speed = if self.is_it {
            AGENT_IT_SPEED
        } else if action.look_back {
            AGENT_BACKWARD_SPEED
        } else {
            AGENT_FORWARD_SPEED
        };

        let mut velocity = speed * unit(action.linear_dir);
        if action.frame == Frame::Local {
            velocity = rotate(velocity, self.heading);
        }

        let turn = if action.angular_dir == 0.0 {
            0.0
        } else {
            action.angular_dir.signum()
        };

        PendingMotion {
            velocity,
            angular_velocity: AGENT_ANGULAR_SPEED * turn,
        }
    }

    /// Advance pose by the (clamped) motion for this tick.
    pub fn integrate(&mut self, motion: PendingMotion, dt: f64) {
        self.position += dt * motion.velocity;
        self.heading = wrap_to_pi(self.heading + dt * motion.angular_velocity);
    }
}
