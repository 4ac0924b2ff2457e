//! Projectile lifecycle
//!
//! Projectiles live in a slot arena: a vector of slots plus a free-list.
//! Ids carry a generation so a stale id never resolves to a newer projectile
//! that reused the slot. A projectile is Active until the advance in which
//! its travelled distance first reaches its range, then it is detached from
//! the renderer and its slot freed.

use smallvec::SmallVec;
use tracing::debug;

use crate::game::constants::projectile::{LENGTH, MAX_ACTIVE, RADIUS};
use crate::game::error::{SimError, SimResult};
use crate::game::render::{RenderSink, Transform, Visual};
use crate::game::state::{EntityId, Projectile, ProjectileId, ProjectileSnapshot};
use crate::util::vec3::Vec3;

/// Projectile events for the host's event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectileEvent {
    Spawned { id: ProjectileId, origin: Vec3, direction: Vec3 },
    Expired { id: ProjectileId, position: Vec3 },
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    projectile: Option<Projectile>,
}

/// Owns every active projectile
#[derive(Debug, Clone)]
pub struct ProjectileManager {
    slots: Vec<Slot>,
    free: Vec<u32>,
    active: usize,
    max_active: usize,
}

impl Default for ProjectileManager {
    fn default() -> Self {
        Self::new(MAX_ACTIVE)
    }
}

impl ProjectileManager {
    pub fn new(max_active: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            active: 0,
            max_active,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    #[inline]
    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.projectile.as_ref()
    }

    pub fn contains(&self, id: ProjectileId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate active projectiles in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ProjectileId, &Projectile)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.projectile.as_ref().map(|p| {
                (
                    ProjectileId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    p,
                )
            })
        })
    }

    /// Create a projectile at `origin` heading for `target`.
    ///
    /// Rejected without side effects when origin and target coincide (no
    /// defined direction), when speed or range is not a positive finite
    /// number, or when the arena is full.
    pub fn spawn<R: RenderSink + ?Sized>(
        &mut self,
        origin: Vec3,
        target: Vec3,
        speed: f64,
        max_distance: f64,
        render: &mut R,
    ) -> SimResult<ProjectileId> {
        if !(speed.is_finite() && speed > 0.0 && max_distance.is_finite() && max_distance > 0.0) {
            return Err(SimError::InvalidProjectile { speed, max_distance });
        }
        if !origin.is_finite() {
            return Err(SimError::DegenerateDirection);
        }
        let direction = (target - origin)
            .try_normalize()
            .ok_or(SimError::DegenerateDirection)?;
        if self.active >= self.max_active {
            return Err(SimError::CapacityExceeded {
                limit: self.max_active,
            });
        }

        let projectile = Projectile::new(origin, direction, speed, max_distance);
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.projectile = Some(projectile);
                ProjectileId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    projectile: Some(projectile),
                });
                ProjectileId {
                    index,
                    generation: 0,
                }
            }
        };
        self.active += 1;

        render.attach(
            EntityId::Projectile(id),
            &Visual::Projectile {
                radius: RADIUS,
                length: LENGTH,
            },
        );
        render.sync(
            EntityId::Projectile(id),
            Transform {
                position: origin,
                forward: direction,
            },
        );

        Ok(id)
    }

    /// Move every active projectile by `dt` seconds, then expire the ones
    /// that reached their range.
    ///
    /// Movement happens in one full pass before any removal so no entry is
    /// skipped or processed twice. Returns the expired projectiles.
    pub fn advance<R: RenderSink + ?Sized>(
        &mut self,
        dt: f64,
        render: &mut R,
    ) -> SmallVec<[ProjectileEvent; 8]> {
        let mut events = SmallVec::new();
        if self.active == 0 {
            return events;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for p in self.slots.iter_mut().filter_map(|s| s.projectile.as_mut()) {
            p.advance(dt);
        }

        for index in 0..self.slots.len() {
            let expired = self.slots[index]
                .projectile
                .as_ref()
                .is_some_and(Projectile::is_expired);
            if !expired {
                continue;
            }

            let id = ProjectileId {
                index: index as u32,
                generation: self.slots[index].generation,
            };
            if let Some(p) = self.release(id) {
                render.detach(EntityId::Projectile(id));
                events.push(ProjectileEvent::Expired {
                    id,
                    position: p.position,
                });
            }
        }

        if !events.is_empty() {
            debug!("Expired {} projectile(s), {} active", events.len(), self.active);
        }
        events
    }

    /// Push current transforms of every active projectile to the renderer
    pub fn sync<R: RenderSink + ?Sized>(&self, render: &mut R) {
        for (id, p) in self.iter() {
            render.sync(
                EntityId::Projectile(id),
                Transform {
                    position: p.position,
                    forward: p.direction,
                },
            );
        }
    }

    /// Remove a projectile before it reaches its range
    pub fn despawn<R: RenderSink + ?Sized>(
        &mut self,
        id: ProjectileId,
        render: &mut R,
    ) -> Option<Projectile> {
        let p = self.release(id)?;
        render.detach(EntityId::Projectile(id));
        Some(p)
    }

    /// Remove every projectile
    pub fn clear<R: RenderSink + ?Sized>(&mut self, render: &mut R) {
        let ids: Vec<ProjectileId> = self.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.despawn(id, render);
        }
    }

    pub fn snapshot(&self) -> Vec<ProjectileSnapshot> {
        self.iter()
            .map(|(id, p)| ProjectileSnapshot {
                id,
                position: p.position,
                direction: p.direction,
                distance_travelled: p.distance_travelled,
            })
            .collect()
    }

    /// Free a slot; bumps its generation so old ids stop resolving
    fn release(&mut self, id: ProjectileId) -> Option<Projectile> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let p = slot.projectile.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.active -= 1;
        Some(p)
    }
}
