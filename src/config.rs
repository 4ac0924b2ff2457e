use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::constants::{arena, projectile, timing};
use crate::game::systems::arena::ArenaBounds;
use crate::game::systems::physics::MovementTuning;

/// Which clock drives projectile movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileTiming {
    /// Once per frame on the capped real elapsed time
    #[default]
    FrameTime,
    /// Inside the fixed-step loop, alongside the agent
    FixedStep,
}

impl FromStr for ProjectileTiming {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "frame" => Ok(Self::FrameTime),
            "fixed" => Ok(Self::FixedStep),
            _ => Err(()),
        }
    }
}

/// When aim resolution reads the agent position within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AimTiming {
    /// Before movement integration (position from the end of the previous tick)
    #[default]
    BeforeMovement,
    /// After this tick's movement integration
    AfterMovement,
}

impl FromStr for AimTiming {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Self::BeforeMovement),
            "after" => Ok(Self::AfterMovement),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fixed_hz must be at least 1")]
    ZeroRate,
    #[error("max_frame must be finite and at least one fixed step ({fixed_dt}s), got {max_frame}")]
    FrameCapTooSmall { max_frame: f64, fixed_dt: f64 },
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("drag must be finite and non-negative, got {0}")]
    NegativeDrag(f64),
    #[error("wall padding {pad} leaves no room in a {width}x{height} arena")]
    ArenaTooSmall { width: f64, height: f64, pad: f64 },
    #[error("max_projectiles must be at least 1")]
    NoProjectiles,
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Fixed step rate in Hz
    pub fixed_hz: u32,
    /// Longest frame interval fed into the simulation (seconds)
    pub max_frame: f64,
    /// Agent acceleration, speed cap and drag
    pub movement: MovementTuning,
    /// Full arena width along x
    pub arena_width: f64,
    /// Full arena depth along z
    pub arena_height: f64,
    pub wall_pad: f64,
    pub projectile_speed: f64,
    pub projectile_range: f64,
    pub max_projectiles: usize,
    pub projectile_timing: ProjectileTiming,
    pub aim_timing: AimTiming,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_hz: timing::FIXED_HZ,
            max_frame: timing::MAX_FRAME,
            movement: MovementTuning::default(),
            arena_width: arena::WIDTH,
            arena_height: arena::HEIGHT,
            wall_pad: arena::WALL_PAD,
            projectile_speed: projectile::SPEED,
            projectile_range: projectile::MAX_DISTANCE,
            max_projectiles: projectile::MAX_ACTIVE,
            projectile_timing: ProjectileTiming::default(),
            aim_timing: AimTiming::default(),
        }
    }
}

/// Read `name` from the environment, keeping `None` (and warning) when the
/// value does not parse or fails `valid`
fn env_value<T: FromStr>(name: &str, valid: impl Fn(&T) -> bool) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(parsed) if valid(&parsed) => Some(parsed),
        Ok(_) => {
            tracing::warn!("{} value '{}' out of range, using default", name, raw);
            None
        }
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", name, raw);
            None
        }
    }
}

fn positive(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

impl SimConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(hz) = env_value::<u32>("SIM_FIXED_HZ", |hz| (1..=10_000).contains(hz)) {
            config.fixed_hz = hz;
        }
        if let Some(v) = env_value("SIM_MAX_FRAME", positive) {
            config.max_frame = v;
        }
        if let Some(v) = env_value("SIM_ACCEL", positive) {
            config.movement.accel = v;
        }
        if let Some(v) = env_value("SIM_MAX_SPEED", positive) {
            config.movement.max_speed = v;
        }
        if let Some(v) = env_value::<f64>("SIM_DRAG", |d| d.is_finite() && *d >= 0.0) {
            config.movement.drag = v;
        }
        if let Some(v) = env_value("SIM_ARENA_WIDTH", positive) {
            config.arena_width = v;
        }
        if let Some(v) = env_value("SIM_ARENA_HEIGHT", positive) {
            config.arena_height = v;
        }
        if let Some(v) = env_value::<f64>("SIM_WALL_PAD", |p| p.is_finite() && *p >= 0.0) {
            config.wall_pad = v;
        }
        if let Some(v) = env_value("SIM_PROJECTILE_SPEED", positive) {
            config.projectile_speed = v;
        }
        if let Some(v) = env_value("SIM_PROJECTILE_RANGE", positive) {
            config.projectile_range = v;
        }
        if let Some(v) = env_value::<usize>("SIM_MAX_PROJECTILES", |n| *n > 0) {
            config.max_projectiles = v;
        }
        if let Some(v) = env_value("SIM_PROJECTILE_TIMING", |_: &ProjectileTiming| true) {
            config.projectile_timing = v;
        }
        if let Some(v) = env_value("SIM_AIM_TIMING", |_: &AimTiming| true) {
            config.aim_timing = v;
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fixed_hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        let fixed_dt = self.fixed_dt();
        if !self.max_frame.is_finite() || self.max_frame < fixed_dt {
            return Err(ConfigError::FrameCapTooSmall {
                max_frame: self.max_frame,
                fixed_dt,
            });
        }
        for (field, value) in [
            ("accel", self.movement.accel),
            ("max_speed", self.movement.max_speed),
            ("projectile_speed", self.projectile_speed),
            ("projectile_range", self.projectile_range),
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
        ] {
            if !positive(&value) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.movement.drag.is_finite() || self.movement.drag < 0.0 {
            return Err(ConfigError::NegativeDrag(self.movement.drag));
        }
        if !self.wall_pad.is_finite()
            || self.wall_pad < 0.0
            || self.arena_width / 2.0 <= self.wall_pad
            || self.arena_height / 2.0 <= self.wall_pad
        {
            return Err(ConfigError::ArenaTooSmall {
                width: self.arena_width,
                height: self.arena_height,
                pad: self.wall_pad,
            });
        }
        if self.max_projectiles == 0 {
            return Err(ConfigError::NoProjectiles);
        }
        Ok(())
    }

    #[inline]
    pub fn fixed_dt(&self) -> f64 {
        1.0 / self.fixed_hz.max(1) as f64
    }

    pub fn bounds(&self) -> ArenaBounds {
        ArenaBounds::from_size(self.arena_width, self.arena_height, self.wall_pad)
    }
}

/// Settings for the headless demo host
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Host frame rate in Hz
    pub frame_hz: u32,
    /// Stop after this many seconds (`None` runs until Ctrl+C)
    pub duration_secs: Option<f64>,
    /// Seconds between scripted fire events
    pub fire_interval_secs: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frame_hz: 60,
            duration_secs: Some(10.0),
            fire_interval_secs: 0.5,
        }
    }
}

impl DemoConfig {
    /// Load demo settings from environment or use defaults.
    ///
    /// `SIM_DEMO_SECONDS=0` runs until interrupted.
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Some(hz) = env_value::<u32>("SIM_DEMO_HZ", |hz| (1..=1000).contains(hz)) {
            config.frame_hz = hz;
        }
        if let Some(secs) = env_value::<f64>("SIM_DEMO_SECONDS", |s| s.is_finite() && *s >= 0.0) {
            config.duration_secs = (secs > 0.0).then_some(secs);
        }
        if let Some(secs) = env_value("SIM_DEMO_FIRE_INTERVAL", positive) {
            config.fire_interval_secs = secs;
        }

        config
    }
}
