//! Simulation state definitions
//!
//! Contains the agent, projectiles, their identifiers and the read-only
//! snapshot handed to hosts.

use serde::{Deserialize, Serialize};

use crate::game::constants::agent;
use crate::util::vec3::Vec3;

/// Stable handle to a live projectile.
///
/// `index` is the arena slot; `generation` changes every time the slot is
/// reused so a stale id never resolves to a different projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId {
    pub index: u32,
    pub generation: u32,
}

/// Key used with the render collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Agent,
    Projectile(ProjectileId),
}

/// The controllable agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Position on the ground plane (y stays 0)
    pub position: Vec3,
    /// Horizontal velocity (y unused)
    pub velocity: Vec3,
    /// Collision radius (not used by the integrator)
    pub radius: f64,
    /// Facing angle in radians, measured from +z toward +x
    pub facing: f64,
}

impl Agent {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius: agent::RADIUS,
            facing: 0.0,
        }
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.horizontal_length()
    }

    /// Unit vector the agent is facing
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::from_yaw(self.facing)
    }
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// A travelling projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Spawn point
    pub origin: Vec3,
    /// Current position
    pub position: Vec3,
    /// Position before the latest advance (kept for swept collision)
    pub previous_position: Vec3,
    /// Unit travel direction
    pub direction: Vec3,
    /// Units per second
    pub speed: f64,
    pub distance_travelled: f64,
    pub max_distance: f64,
}

impl Projectile {
    /// `direction` must already be unit length.
    pub fn new(origin: Vec3, direction: Vec3, speed: f64, max_distance: f64) -> Self {
        Self {
            origin,
            position: origin,
            previous_position: origin,
            direction,
            speed,
            distance_travelled: 0.0,
            max_distance,
        }
    }

    /// Move along the travel direction, returning the distance covered
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.previous_position = self.position;

        let step = self.speed * dt;
        self.position += self.direction * step;
        self.distance_travelled += step;
        step
    }

    pub fn is_expired(&self) -> bool {
        self.distance_travelled >= self.max_distance
    }

    /// Fraction of range used, 0.0 to 1.0
    pub fn range_progress(&self) -> f64 {
        (self.distance_travelled / self.max_distance).clamp(0.0, 1.0)
    }
}

/// Most recent ground-plane aim point (`None` until a pointer ray first resolves)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AimState {
    pub point: Option<Vec3>,
}

/// Read-only view of one tick's result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub frame: u64,
    pub agent: Agent,
    pub aim_point: Option<Vec3>,
    pub projectiles: Vec<ProjectileSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: ProjectileId,
    pub position: Vec3,
    pub direction: Vec3,
    pub distance_travelled: f64,
}
