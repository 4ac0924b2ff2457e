//! Aim resolution
//!
//! Turns the pointer position into a ground-plane aim point and points the
//! agent at it. Runs once per rendered frame, not per fixed step, so facing
//! stays smooth regardless of the simulation rate.

use crate::game::camera::Camera;
use crate::game::constants::aim::FACING_EPSILON_SQ;
use crate::game::error::{SimError, SimResult};
use crate::game::state::{Agent, AimState};
use crate::util::ray::Plane;
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Cast the pointer through `camera` onto the ground plane
pub fn ground_point<C: Camera + ?Sized>(camera: &C, pointer_ndc: Vec2) -> SimResult<Vec3> {
    camera
        .ray_from_ndc(pointer_ndc)
        .intersect_plane(&Plane::GROUND)
        .filter(Vec3::is_finite)
        .ok_or(SimError::DegenerateAimRay)
}

/// Facing angle from `from` toward `to`, or `None` when they are too close
/// on the ground plane for the angle to be meaningful
pub fn facing_toward(from: Vec3, to: Vec3) -> Option<f64> {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    (dx * dx + dz * dz > FACING_EPSILON_SQ).then(|| dx.atan2(dz))
}

/// Refresh the aim point and the agent's facing.
///
/// On a miss the previous aim point and facing are kept and
/// `DegenerateAimRay` is returned; nothing is written.
pub fn resolve<C: Camera + ?Sized>(
    aim: &mut AimState,
    agent: &mut Agent,
    pointer_ndc: Vec2,
    camera: &C,
) -> SimResult<Vec3> {
    let point = ground_point(camera, pointer_ndc)?;
    aim.point = Some(point);

    if let Some(facing) = facing_toward(agent.position, point) {
        agent.facing = facing;
    }

    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::camera::PerspectiveCamera;
    use crate::util::ray::Ray;
    use std::f64::consts::{FRAC_PI_2, PI};

    /// Camera whose every ray lands on a fixed ground point
    struct FixedCamera(Vec3);

    impl Camera for FixedCamera {
        fn ray_from_ndc(&self, _ndc: Vec2) -> Ray {
            let origin = self.0 + Vec3::new(0.0, 10.0, 0.0);
            Ray::new(origin, Vec3::new(0.0, -1.0, 0.0))
        }
    }

    /// Camera looking along the horizon, never reaching the ground
    struct HorizonCamera;

    impl Camera for HorizonCamera {
        fn ray_from_ndc(&self, _ndc: Vec2) -> Ray {
            Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, -1.0))
        }
    }

    #[test]
    fn test_facing_toward_positive_x() {
        let mut aim = AimState::default();
        let mut agent = Agent::default();
        let camera = FixedCamera(Vec3::new(10.0, 0.0, 0.0));

        let point = resolve(&mut aim, &mut agent, Vec2::ZERO, &camera).unwrap();

        assert!(point.approx_eq(Vec3::new(10.0, 0.0, 0.0), 1e-9));
        assert!((agent.facing - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(aim.point, Some(point));
    }

    #[test]
    fn test_facing_quadrants() {
        let origin = Vec3::ZERO;
        assert!((facing_toward(origin, Vec3::new(0.0, 0.0, 5.0)).unwrap()).abs() < 1e-12);
        assert!((facing_toward(origin, Vec3::new(0.0, 0.0, -5.0)).unwrap() - PI).abs() < 1e-12);
        assert!((facing_toward(origin, Vec3::new(-5.0, 0.0, 0.0)).unwrap() + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_facing_ignores_height() {
        let facing = facing_toward(Vec3::new(0.0, 3.0, 0.0), Vec3::new(1.0, -2.0, 0.0)).unwrap();
        assert!((facing - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_aim_on_agent_keeps_facing() {
        let mut aim = AimState::default();
        let mut agent = Agent::new(Vec3::new(2.0, 0.0, 3.0));
        agent.facing = 1.0;
        let camera = FixedCamera(Vec3::new(2.0, 0.0, 3.0 + 1e-4));

        resolve(&mut aim, &mut agent, Vec2::ZERO, &camera).unwrap();

        assert_eq!(agent.facing, 1.0);
        assert!(aim.point.is_some());
    }

    #[test]
    fn test_miss_keeps_previous_state() {
        let mut aim = AimState {
            point: Some(Vec3::new(4.0, 0.0, 4.0)),
        };
        let mut agent = Agent::default();
        agent.facing = 0.25;

        let result = resolve(&mut aim, &mut agent, Vec2::ZERO, &HorizonCamera);

        assert_eq!(result, Err(SimError::DegenerateAimRay));
        assert_eq!(aim.point, Some(Vec3::new(4.0, 0.0, 4.0)));
        assert_eq!(agent.facing, 0.25);
    }

    #[test]
    fn test_resolve_does_not_move_agent() {
        let mut aim = AimState::default();
        let mut agent = Agent::new(Vec3::new(1.0, 0.0, 1.0));
        agent.velocity = Vec3::new(3.0, 0.0, 0.0);

        resolve(&mut aim, &mut agent, Vec2::new(0.4, -0.2), &PerspectiveCamera::default()).unwrap();

        assert_eq!(agent.position, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(agent.velocity, Vec3::new(3.0, 0.0, 0.0));
    }
}
