/// Timing constants for the fixed-step loop
pub mod timing {
    /// Fixed simulation rate in Hz
    pub const FIXED_HZ: u32 = 120;
    /// Fixed step duration in seconds
    pub const FIXED_DT: f64 = 1.0 / FIXED_HZ as f64;
    /// Longest real frame interval fed into the simulation (avoids spiral of death after a stall)
    pub const MAX_FRAME: f64 = 1.0 / 15.0;
}

/// Agent movement tuning
pub mod movement {
    /// How quickly the agent gets up to speed (units/s²)
    pub const ACCEL: f64 = 68.0;
    /// Maximum horizontal speed (units/s)
    pub const MAX_SPEED: f64 = 35.0;
    /// Exponential drag rate, applied as `velocity *= exp(-DRAG * dt)`
    pub const DRAG: f64 = 10.0;
}

/// Agent body
pub mod agent {
    /// Collision radius (reserved for collision, unused by the integrator)
    pub const RADIUS: f64 = 0.5;
    /// Height of the body visual
    pub const BODY_HEIGHT: f64 = 1.2;
}

/// Arena dimensions
pub mod arena {
    /// Full arena width along x
    pub const WIDTH: f64 = 24.0;
    /// Full arena depth along z
    pub const HEIGHT: f64 = 14.0;
    /// Distance kept between the agent and the walls
    pub const WALL_PAD: f64 = 0.8;
}

/// Aim resolution
pub mod aim {
    /// Minimum squared horizontal distance between aim point and agent before facing updates
    pub const FACING_EPSILON_SQ: f64 = 1e-6;
}

/// Projectile (bullet) constants
pub mod projectile {
    /// Muzzle speed in units/s
    pub const SPEED: f64 = 40.0;
    /// Distance travelled before despawn
    pub const MAX_DISTANCE: f64 = 80.0;
    /// Height above the ground the muzzle fires from
    pub const MUZZLE_HEIGHT: f64 = 1.0;
    /// Visual radius
    pub const RADIUS: f64 = 0.03;
    /// Visual length
    pub const LENGTH: f64 = 0.5;
    /// Upper bound on simultaneously live projectiles
    pub const MAX_ACTIVE: usize = 512;
}

/// Default camera framing (2.5D tilt)
pub mod camera {
    pub const POSITION: [f64; 3] = [0.0, 10.0, 18.0];
    /// Vertical field of view in degrees
    pub const FOV_Y_DEGREES: f64 = 60.0;
    pub const ASPECT: f64 = 16.0 / 9.0;
}
