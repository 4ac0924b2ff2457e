//! Arena bounds
//!
//! The playable area is an axis-aligned rectangle on the ground plane,
//! centred on the origin. Agents are kept a wall padding away from its edges.

use serde::{Deserialize, Serialize};

use crate::game::constants::arena::{HEIGHT, WALL_PAD, WIDTH};
use crate::util::vec3::Vec3;

/// Rectangle the agent is confined to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Half the arena extent along x
    pub half_width: f64,
    /// Half the arena extent along z
    pub half_height: f64,
    /// Distance kept from each wall
    pub wall_pad: f64,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self::from_size(WIDTH, HEIGHT, WALL_PAD)
    }
}

impl ArenaBounds {
    /// Bounds for a full `width` × `height` arena
    pub fn from_size(width: f64, height: f64, wall_pad: f64) -> Self {
        Self {
            half_width: width / 2.0,
            half_height: height / 2.0,
            wall_pad,
        }
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        -self.half_width + self.wall_pad
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.half_width - self.wall_pad
    }

    #[inline]
    pub fn min_z(&self) -> f64 {
        -self.half_height + self.wall_pad
    }

    #[inline]
    pub fn max_z(&self) -> f64 {
        self.half_height - self.wall_pad
    }

    /// Clamp the horizontal components of `position` into the padded rectangle
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3 {
            x: position.x.clamp(self.min_x(), self.max_x()),
            y: position.y,
            z: position.z.clamp(self.min_z(), self.max_z()),
        }
    }

    /// Whether `position` already lies inside the padded rectangle
    pub fn contains(&self, position: Vec3) -> bool {
        (self.min_x()..=self.max_x()).contains(&position.x)
            && (self.min_z()..=self.max_z()).contains(&position.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let bounds = ArenaBounds::default();
        assert_eq!(bounds.half_width, 12.0);
        assert_eq!(bounds.half_height, 7.0);
        assert!((bounds.max_x() - 11.2).abs() < 1e-12);
        assert!((bounds.min_z() + 6.2).abs() < 1e-12);
    }

    #[test]
    fn test_clamp_outside() {
        let bounds = ArenaBounds::default();
        let clamped = bounds.clamp(Vec3::new(100.0, 3.0, -100.0));
        assert_eq!(clamped.x, bounds.max_x());
        assert_eq!(clamped.y, 3.0);
        assert_eq!(clamped.z, bounds.min_z());
        assert!(bounds.contains(clamped));
    }

    #[test]
    fn test_clamp_inside_is_identity() {
        let bounds = ArenaBounds::default();
        let p = Vec3::new(1.0, 0.0, -2.0);
        assert_eq!(bounds.clamp(p), p);
        assert!(bounds.contains(p));
    }

    #[test]
    fn test_contains_rejects_padding_band() {
        let bounds = ArenaBounds::default();
        assert!(!bounds.contains(Vec3::new(11.5, 0.0, 0.0)));
        assert!(!bounds.contains(Vec3::new(0.0, 0.0, -6.5)));
    }
}
