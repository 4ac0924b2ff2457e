pub mod aim;
pub mod arena;
pub mod physics;
pub mod projectile;
