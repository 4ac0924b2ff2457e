//! Render collaborator interface
//!
//! The core never draws anything. It tells a [`RenderSink`] when an entity
//! appears or disappears and where live entities are after each tick; what a
//! "visual" is belongs to the host.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::game::state::EntityId;
use crate::util::vec3::Vec3;

/// What kind of visual an entity wants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// Upright body with a nose pointing along facing
    Agent { radius: f64, height: f64 },
    /// Thin cylinder aligned with the travel direction
    Projectile { radius: f64, length: f64 },
}

/// World transform handed to the renderer (read-only copy of simulation state)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Unit vector the visual's +z axis should point along
    pub forward: Vec3,
}

/// Receiver for visual lifecycle and per-tick transforms
pub trait RenderSink {
    fn attach(&mut self, id: EntityId, visual: &Visual);
    fn detach(&mut self, id: EntityId);
    fn sync(&mut self, id: EntityId, transform: Transform);
}

/// Sink that drops everything (headless runs, benchmarks)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn attach(&mut self, _id: EntityId, _visual: &Visual) {}
    fn detach(&mut self, _id: EntityId) {}
    fn sync(&mut self, _id: EntityId, _transform: Transform) {}
}

/// Sink that keeps the current scene in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub visuals: HashMap<EntityId, (Visual, Option<Transform>)>,
    pub attached_total: u64,
    pub detached_total: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.visuals.contains_key(&id)
    }

    pub fn transform(&self, id: EntityId) -> Option<Transform> {
        self.visuals.get(&id).and_then(|(_, t)| *t)
    }
}

impl RenderSink for RecordingRenderer {
    fn attach(&mut self, id: EntityId, visual: &Visual) {
        self.attached_total += 1;
        self.visuals.insert(id, (*visual, None));
    }

    fn detach(&mut self, id: EntityId) {
        if self.visuals.remove(&id).is_some() {
            self.detached_total += 1;
        }
    }

    fn sync(&mut self, id: EntityId, transform: Transform) {
        if let Some((_, t)) = self.visuals.get_mut(&id) {
            *t = Some(transform);
        }
    }
}
