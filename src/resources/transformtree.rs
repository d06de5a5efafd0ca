//! Hierarchical transform storage.
//!
//! Every game object owns one node in the [`TransformTree`] arena. A node
//! stores its local position, rotation (degrees, counter-clockwise, normalised
//! to `(-180, 180]`) and scale, an optional parent and an ordered list of
//! children. World-space values are derived from the chain of ancestors:
//!
//! ```text
//! World = ParentWorld ∘ Translate(local) ∘ Rotate(local) ∘ Scale(local)
//! ```
//!
//! # Caching
//!
//! World transforms are computed lazily and cached per node. The tree keeps a
//! monotonically increasing `generation` counter; every mutation bumps it and
//! stamps the mutated node with `changed_at`. A cached world transform
//! computed at generation `g` is valid as long as no node on the path from
//! the root down to the queried node has `changed_at > g`. Queries therefore
//! only touch the ancestors of the queried node, never the whole subtree of
//! the node that changed.

use bevy_ecs::prelude::{Entity, Resource};
use glam::Vec2;
use log::error;
use smallvec::SmallVec;
use thiserror::Error;

use crate::geometry::matrix::TransformationMatrix;

/// Scales whose axes differ by less than this are treated as uniform.
pub const UNIFORM_SCALE_TOLERANCE: f32 = 0.001;

/// Generational handle to a node in the [`TransformTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId {
    index: u32,
    version: u32,
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum TransformError {
    #[error("transform {0:?} does not exist")]
    Missing(TransformId),
    #[error("scale components must be non-zero and finite, got ({x}, {y})")]
    InvalidScale { x: f32, y: f32 },
    #[error("parenting {child:?} under {parent:?} would create a cycle")]
    Cycle {
        child: TransformId,
        parent: TransformId,
    },
}

/// Normalise an angle in degrees to `(-180, 180]`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let mut d = degrees % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

fn validate_scale(scale: Vec2) -> Result<Vec2, TransformError> {
    if scale.x == 0.0 || scale.y == 0.0 || !scale.is_finite() {
        return Err(TransformError::InvalidScale {
            x: scale.x,
            y: scale.y,
        });
    }
    Ok(scale)
}

fn invert_or_degenerate(matrix: &TransformationMatrix) -> TransformationMatrix {
    matrix.try_inverse().unwrap_or_else(|e| {
        error!("Cannot invert local-to-world matrix: {}", e);
        TransformationMatrix::DEGENERATE
    })
}

/// Local-space values of a transform node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}

impl LocalTransform {
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// Resolved world-space view of a transform node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldTransform {
    pub local_to_world: TransformationMatrix,
    pub world_to_local: TransformationMatrix,
    pub position: Vec2,
    /// World rotation in degrees, normalised to `(-180, 180]`.
    pub rotation: f32,
    pub scale: Vec2,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::from_parts(Vec2::ZERO, 0.0, Vec2::ONE)
    }
}

impl WorldTransform {
    /// World transform of a root node with the given values.
    pub fn from_parts(position: Vec2, rotation: f32, scale: Vec2) -> Self {
        let rotation = normalize_degrees(rotation);
        let local_to_world =
            TransformationMatrix::from_translation_rotation_scale(position, rotation, scale);
        Self {
            world_to_local: invert_or_degenerate(&local_to_world),
            local_to_world,
            position,
            rotation,
            scale,
        }
    }

    fn compose(parent: Option<&WorldTransform>, local: &LocalTransform) -> Self {
        let Some(parent) = parent else {
            return Self::from_parts(local.position, local.rotation, local.scale);
        };
        let local_matrix = TransformationMatrix::from_translation_rotation_scale(
            local.position,
            local.rotation,
            local.scale,
        );
        let local_to_world = parent.local_to_world * local_matrix;
        Self {
            world_to_local: invert_or_degenerate(&local_to_world),
            local_to_world,
            position: local_to_world.translation(),
            rotation: normalize_degrees(parent.rotation + local.rotation),
            scale: parent.scale * local.scale,
        }
    }

    pub fn is_scale_uniform(&self) -> bool {
        (self.scale.x - self.scale.y).abs() < UNIFORM_SCALE_TOLERANCE
    }
}

#[derive(Clone, Copy, Debug)]
struct CachedWorld {
    world: WorldTransform,
    computed_at: u64,
}

#[derive(Clone, Debug)]
struct TransformNode {
    owner: Option<Entity>,
    local: LocalTransform,
    parent: Option<TransformId>,
    children: SmallVec<[TransformId; 4]>,
    changed_at: u64,
    cache: Option<CachedWorld>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    version: u32,
    node: Option<TransformNode>,
}

/// Arena of transform nodes forming a forest.
#[derive(Resource, Debug, Default)]
pub struct TransformTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    generation: u64,
    len: usize,
}

impl TransformTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current value of the mutation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn node(&self, id: TransformId) -> Result<&TransformNode, TransformError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.version == id.version)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TransformError::Missing(id))
    }

    fn node_mut(&mut self, id: TransformId) -> Result<&mut TransformNode, TransformError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.version == id.version)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TransformError::Missing(id))
    }

    pub fn contains(&self, id: TransformId) -> bool {
        self.node(id).is_ok()
    }

    /// Create a node, optionally as the last child of `parent`.
    pub fn insert(
        &mut self,
        parent: Option<TransformId>,
        local: LocalTransform,
    ) -> Result<TransformId, TransformError> {
        validate_scale(local.scale)?;
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let changed_at = self.bump();
        let node = TransformNode {
            owner: None,
            local: LocalTransform {
                rotation: normalize_degrees(local.rotation),
                ..local
            },
            parent,
            children: SmallVec::new(),
            changed_at,
            cache: None,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                TransformId {
                    index,
                    version: slot.version,
                }
            }
            None => {
                self.slots.push(Slot {
                    version: 0,
                    node: Some(node),
                });
                TransformId {
                    index: (self.slots.len() - 1) as u32,
                    version: 0,
                }
            }
        };
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
        }
        self.len += 1;
        Ok(id)
    }

    pub fn set_owner(&mut self, id: TransformId, owner: Entity) -> Result<(), TransformError> {
        self.node_mut(id)?.owner = Some(owner);
        Ok(())
    }

    pub fn owner(&self, id: TransformId) -> Option<Entity> {
        self.node(id).ok().and_then(|n| n.owner)
    }

    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.node(id).ok().and_then(|n| n.parent)
    }

    pub fn children(&self, id: TransformId) -> &[TransformId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Topmost ancestor of `id` (itself when it has no parent).
    pub fn root(&self, id: TransformId) -> Option<TransformId> {
        let mut current = id;
        self.node(current).ok()?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// `id` and all of its descendants, depth first, parents before children.
    pub fn descendants(&self, id: TransformId) -> Vec<TransformId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Ok(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    pub fn local(&self, id: TransformId) -> Option<LocalTransform> {
        self.node(id).ok().map(|n| n.local)
    }

    pub fn local_position(&self, id: TransformId) -> Option<Vec2> {
        self.local(id).map(|l| l.position)
    }

    pub fn local_rotation(&self, id: TransformId) -> Option<f32> {
        self.local(id).map(|l| l.rotation)
    }

    pub fn local_scale(&self, id: TransformId) -> Option<Vec2> {
        self.local(id).map(|l| l.scale)
    }

    fn modify(
        &mut self,
        id: TransformId,
        f: impl FnOnce(&mut LocalTransform),
    ) -> Result<(), TransformError> {
        self.node(id)?;
        let stamp = self.bump();
        let node = self.node_mut(id)?;
        f(&mut node.local);
        node.changed_at = stamp;
        Ok(())
    }

    pub fn set_local_position(&mut self, id: TransformId, position: Vec2) -> Result<(), TransformError> {
        self.modify(id, |local| local.position = position)
    }

    pub fn set_local_rotation(&mut self, id: TransformId, degrees: f32) -> Result<(), TransformError> {
        self.modify(id, |local| local.rotation = normalize_degrees(degrees))
    }

    pub fn set_local_scale(&mut self, id: TransformId, scale: Vec2) -> Result<(), TransformError> {
        let scale = validate_scale(scale)?;
        self.modify(id, |local| local.scale = scale)
    }

    fn parent_world(&mut self, id: TransformId) -> Result<Option<WorldTransform>, TransformError> {
        match self.node(id)?.parent {
            Some(parent) => Ok(self.world(parent)),
            None => Ok(None),
        }
    }

    /// Move the node so that its world position becomes `position`.
    pub fn set_world_position(&mut self, id: TransformId, position: Vec2) -> Result<(), TransformError> {
        let local = match self.parent_world(id)? {
            Some(parent) => parent.world_to_local.convert_point(position),
            None => position,
        };
        self.set_local_position(id, local)
    }

    pub fn set_world_rotation(&mut self, id: TransformId, degrees: f32) -> Result<(), TransformError> {
        let local = match self.parent_world(id)? {
            Some(parent) => degrees - parent.rotation,
            None => degrees,
        };
        self.set_local_rotation(id, local)
    }

    pub fn set_world_scale(&mut self, id: TransformId, scale: Vec2) -> Result<(), TransformError> {
        let scale = validate_scale(scale)?;
        let local = match self.parent_world(id)? {
            Some(parent) => scale / parent.scale,
            None => scale,
        };
        self.set_local_scale(id, local)
    }

    /// Offset the world position of the node by `delta`.
    pub fn translate_world(&mut self, id: TransformId, delta: Vec2) -> Result<(), TransformError> {
        let current = self.world(id).ok_or(TransformError::Missing(id))?.position;
        self.set_world_position(id, current + delta)
    }

    /// Re-parent `id`. With `keep_world` the node keeps its world position,
    /// rotation and scale; otherwise its local values are kept.
    pub fn set_parent(
        &mut self,
        id: TransformId,
        parent: Option<TransformId>,
        keep_world: bool,
    ) -> Result<(), TransformError> {
        self.node(id)?;
        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            let mut cursor = Some(new_parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(TransformError::Cycle {
                        child: id,
                        parent: new_parent,
                    });
                }
                cursor = self.parent(current);
            }
        }
        let world = if keep_world { self.world(id) } else { None };

        if let Some(old_parent) = self.node(id)?.parent {
            self.node_mut(old_parent)?.children.retain(|c| *c != id);
        }
        if let Some(new_parent) = parent {
            self.node_mut(new_parent)?.children.push(id);
        }
        let stamp = self.bump();
        let node = self.node_mut(id)?;
        node.parent = parent;
        node.changed_at = stamp;

        if let Some(world) = world {
            self.set_world_scale(id, world.scale)?;
            self.set_world_rotation(id, world.rotation)?;
            self.set_world_position(id, world.position)?;
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns the owners of the removed
    /// nodes so the caller can despawn them.
    pub fn remove(&mut self, id: TransformId) -> Result<Vec<Entity>, TransformError> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        let mut owners = Vec::new();
        for removed in self.descendants(id) {
            let slot = &mut self.slots[removed.index as usize];
            if let Some(node) = slot.node.take() {
                owners.extend(node.owner);
            }
            slot.version = slot.version.wrapping_add(1);
            self.free.push(removed.index);
            self.len -= 1;
        }
        self.bump();
        Ok(owners)
    }

    /// Whether the cached world transform of `id` is still valid without
    /// recomputation.
    pub fn is_cache_valid(&self, id: TransformId) -> bool {
        let Ok(node) = self.node(id) else {
            return false;
        };
        let Some(cache) = node.cache else {
            return false;
        };
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Ok(n) = self.node(current) else {
                return false;
            };
            if n.changed_at > cache.computed_at {
                return false;
            }
            cursor = n.parent;
        }
        true
    }

    /// Resolve the world transform of `id`, recomputing stale caches along the
    /// path from the root.
    pub fn world(&mut self, id: TransformId) -> Option<WorldTransform> {
        let mut path: SmallVec<[TransformId; 16]> = SmallVec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.node(current).ok()?.parent;
        }

        let generation = self.generation;
        let mut newest_change = 0u64;
        let mut parent_world: Option<WorldTransform> = None;
        for &current in path.iter().rev() {
            let node = self.node_mut(current).ok()?;
            newest_change = newest_change.max(node.changed_at);
            let cached = node.cache;
            let world = match cached {
                Some(cache) if cache.computed_at >= newest_change => cache.world,
                _ => {
                    let world = WorldTransform::compose(parent_world.as_ref(), &node.local);
                    node.cache = Some(CachedWorld {
                        world,
                        computed_at: generation,
                    });
                    world
                }
            };
            parent_world = Some(world);
        }
        parent_world
    }

    pub fn world_position(&mut self, id: TransformId) -> Option<Vec2> {
        self.world(id).map(|w| w.position)
    }

    pub fn world_rotation(&mut self, id: TransformId) -> Option<f32> {
        self.world(id).map(|w| w.rotation)
    }

    pub fn world_scale(&mut self, id: TransformId) -> Option<Vec2> {
        self.world(id).map(|w| w.scale)
    }

    pub fn local_to_world_matrix(&mut self, id: TransformId) -> Option<TransformationMatrix> {
        self.world(id).map(|w| w.local_to_world)
    }

    pub fn world_to_local_matrix(&mut self, id: TransformId) -> Option<TransformationMatrix> {
        self.world(id).map(|w| w.world_to_local)
    }
}
