//! Registry of live game objects in creation order.
//!
//! Physics, trigger and script passes iterate game objects in the order kept
//! here so that results do not depend on ECS archetype layout. Destruction
//! requests are queued and applied at the next cleanup point.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;

#[derive(Resource, Debug, Default)]
pub struct SceneObjects {
    order: Vec<Entity>,
    members: FxHashSet<Entity>,
    pending_destroy: Vec<Entity>,
    pending_set: FxHashSet<Entity>,
}

impl SceneObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: Entity) {
        if self.members.insert(entity) {
            self.order.push(entity);
        }
    }

    pub fn unregister(&mut self, entity: Entity) {
        if self.members.remove(&entity) {
            self.order.retain(|e| *e != entity);
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.order.iter().copied()
    }

    /// Copy of the current order, for passes that mutate the world while
    /// iterating.
    pub fn snapshot(&self) -> Vec<Entity> {
        self.order.clone()
    }

    /// Queue an object for destruction. Repeated requests are ignored.
    pub fn request_destroy(&mut self, entity: Entity) {
        if self.pending_set.insert(entity) {
            self.pending_destroy.push(entity);
        }
    }

    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.pending_set.contains(&entity)
    }

    pub fn has_pending_destroy(&self) -> bool {
        !self.pending_destroy.is_empty()
    }

    /// Drain the destruction queue in request order.
    pub fn take_pending_destroy(&mut self) -> Vec<Entity> {
        self.pending_set.clear();
        std::mem::take(&mut self.pending_destroy)
    }
}
