//! Rays and planes for pointer picking

use serde::{Deserialize, Serialize};

use super::vec3::Vec3;

/// Half-line starting at `origin`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Point where the ray crosses `plane`.
    ///
    /// Returns `None` when the ray runs parallel to the plane (unless it lies
    /// in it), when the crossing is behind the origin, or when the result is
    /// not finite.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denom = plane.normal.dot(self.direction);
        if denom == 0.0 {
            return (plane.distance_to_point(self.origin) == 0.0).then_some(self.origin);
        }

        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        if !t.is_finite() || t < 0.0 {
            return None;
        }

        let point = self.at(t);
        point.is_finite().then_some(point)
    }
}

/// Plane in Hessian normal form: `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f64,
}

impl Plane {
    /// The y = 0 ground plane the arena lives on
    pub const GROUND: Plane = Plane {
        normal: Vec3::UP,
        constant: 0.0,
    };

    pub fn new(normal: Vec3, constant: f64) -> Self {
        Self {
            normal: normal.normalize(),
            constant,
        }
    }

    #[inline]
    pub fn distance_to_point(&self, point: Vec3) -> f64 {
        self.normal.dot(point) + self.constant
    }
}
