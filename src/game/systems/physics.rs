use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game::constants::movement::{ACCEL, DRAG, MAX_SPEED};
use crate::game::state::Agent;
use crate::game::systems::arena::ArenaBounds;
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Movement parameters (tweak freely, none of them are structural)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementTuning {
    /// How quickly the agent gets up to speed
    pub accel: f64,
    /// Hard cap on horizontal speed
    pub max_speed: f64,
    /// Exponential drag rate
    pub drag: f64,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            accel: ACCEL,
            max_speed: MAX_SPEED,
            drag: DRAG,
        }
    }
}

/// Advance the agent by one fixed step.
///
/// `intent.x` maps to world x and `intent.y` to world z. The intent is
/// normalized, so diagonal input is no faster than straight input.
/// CRITICAL: drag is `velocity *= exp(-drag * dt)`, never a linear
/// subtraction, so it cannot overshoot zero at any step size.
///
/// Returns `false` when the step would have produced a non-finite state and
/// was discarded.
pub fn step(
    agent: &mut Agent,
    intent: Vec2,
    dt: f64,
    bounds: &ArenaBounds,
    tuning: &MovementTuning,
) -> bool {
    let dir = if intent.is_finite() {
        intent.normalize()
    } else {
        Vec2::ZERO
    };

    let mut velocity = agent.velocity;

    // Accelerate
    velocity.x += dir.x * tuning.accel * dt;
    velocity.z += dir.y * tuning.accel * dt;

    // Drag
    let drag_factor = (-tuning.drag * dt).exp();
    velocity.x *= drag_factor;
    velocity.z *= drag_factor;

    // Clamp speed
    let speed_sq = velocity.horizontal_length_sq();
    if speed_sq > tuning.max_speed * tuning.max_speed {
        let s = tuning.max_speed / speed_sq.sqrt();
        velocity.x *= s;
        velocity.z *= s;
    }
    velocity.y = 0.0;

    // Integrate
    let mut position = agent.position;
    position.x += velocity.x * dt;
    position.z += velocity.z * dt;

    if !velocity.is_finite() || !position.is_finite() {
        warn!(
            "Discarded non-finite movement step (dt={}, velocity={:?})",
            dt, velocity
        );
        return false;
    }

    agent.velocity = velocity;
    agent.position = bounds.clamp(position);
    true
}

/// Drag multiplier applied over `t` seconds
pub fn drag_decay(drag: f64, t: f64) -> f64 {
    (-drag * t).exp()
}

/// Horizontal speed the agent settles at under sustained full input
///
/// Reached when the per-step gain `accel * dt` equals the per-step drag loss.
pub fn terminal_speed(tuning: &MovementTuning, dt: f64) -> f64 {
    let f = (-tuning.drag * dt).exp();
    let v = tuning.accel * dt * f / (1.0 - f);
    v.min(tuning.max_speed)
}
