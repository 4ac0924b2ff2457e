//! Arena Simulation Core
//!
//! Deterministic fixed-step simulation of a single agent in a walled arena,
//! with pointer aiming on the ground plane and straight-line projectiles.
//! Rendering and camera projection are collaborators supplied by the host.
//!
//! # Features
//!
//! - `metrics_extended` - Frame-time percentiles in the metrics registry (enabled by default)

pub mod config;
pub mod util;
pub mod game;
pub mod metrics;
