//! Camera collaborator
//!
//! The core only needs one thing from a camera: a world-space ray through a
//! point given in normalized device coordinates.

use serde::{Deserialize, Serialize};

use crate::game::constants::camera::{ASPECT, FOV_Y_DEGREES, POSITION};
use crate::util::ray::Ray;
use crate::util::vec2::Vec2;
use crate::util::vec3::Vec3;

/// Anything that can cast a picking ray from normalized device coordinates
pub trait Camera {
    /// `ndc` is in [-1, 1] on both axes, +y up
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray;
}

/// Pinhole camera looking at a target point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f64,
    /// Viewport width / height
    pub aspect: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::looking_at(
            Vec3::new(POSITION[0], POSITION[1], POSITION[2]),
            Vec3::ZERO,
            FOV_Y_DEGREES.to_radians(),
            ASPECT,
        )
    }
}

impl PerspectiveCamera {
    pub fn looking_at(position: Vec3, target: Vec3, fov_y: f64, aspect: f64) -> Self {
        Self {
            position,
            target,
            up: Vec3::UP,
            fov_y,
            aspect,
        }
    }

    /// Orthonormal (right, up, forward) basis
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        (right, up, forward)
    }

    pub fn set_aspect(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }
}

impl Camera for PerspectiveCamera {
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let (right, up, forward) = self.basis();
        let tan_half = (self.fov_y * 0.5).tan();

        let direction = forward
            + right * (ndc.x * tan_half * self.aspect)
            + up * (ndc.y * tan_half);
        Ray::new(self.position, direction)
    }
}

impl<C: Camera + ?Sized> Camera for &C {
    fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        (**self).ray_from_ndc(ndc)
    }
}
