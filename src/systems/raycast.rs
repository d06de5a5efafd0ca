//! Scene raycast query.

use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::components::collider::Collider;
use crate::components::gameobject::{GameObject, TransformHandle};
use crate::resources::physicssettings::{IGNORE_RAYCAST_LAYER, PhysicsSettings};
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::TransformTree;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub entity: Entity,
    pub point: Vec2,
    pub normal: Vec2,
    /// Distance from the origin to `point`.
    pub distance: f32,
}

/// Nearest hit along `origin..origin + direction` among active colliders.
/// Objects on the `ignore_raycast` layer are skipped. Ties keep the object
/// registered first.
pub fn raycast(world: &mut World, origin: Vec2, direction: Vec2) -> Option<RaycastHit> {
    if direction == Vec2::ZERO {
        return None;
    }
    let order = world.get_resource::<SceneObjects>()?.snapshot();
    if !world.contains_resource::<TransformTree>() {
        return None;
    }
    let ignored = |world: &World, layer: &str| match world.get_resource::<PhysicsSettings>() {
        Some(settings) => settings.ignores_raycast(layer),
        None => layer == IGNORE_RAYCAST_LAYER,
    };

    world.resource_scope(|world, mut tree: Mut<TransformTree>| {
        let mut best: Option<RaycastHit> = None;
        for entity in order {
            let (Some(object), Some(collider), Some(handle)) = (
                world.get::<GameObject>(entity),
                world.get::<Collider>(entity),
                world.get::<TransformHandle>(entity),
            ) else {
                continue;
            };
            if !object.active || !collider.active || ignored(world, &object.layer) {
                continue;
            }
            let Some(transform) = tree.world(handle.0) else {
                continue;
            };
            let Some(hit) = collider.raycast(&transform, origin, direction) else {
                continue;
            };
            let distance = hit.point.distance(origin);
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(RaycastHit {
                    entity,
                    point: hit.point,
                    normal: hit.normal,
                    distance,
                });
            }
        }
        best
    })
}
