//! Solid contact resolution.
//!
//! Once per fixed step every active solid collider with a rigid body is
//! tested against every other one, in scene insertion order. Each unordered
//! pair is considered once per step. Overlapping pairs that approach each
//! other exchange an impulse and are pushed apart by a fraction of their
//! penetration.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{trace, warn};
use rustc_hash::FxHashSet;

use crate::components::collider::Collider;
use crate::components::gameobject::{GameObject, TransformHandle};
use crate::components::rigidbody::RigidBody;
use crate::geometry::contact::{Contact, compute_contact};
use crate::geometry::intersect::{PlacedCollider, colliders_overlap};
use crate::resources::physicssettings::PhysicsSettings;
use crate::resources::physicsstats::PhysicsStats;
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{TransformId, TransformTree};
use crate::resources::triggertracker::EntityPair;

/// Velocity and position changes for one resolved pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub velocity_a: Vec2,
    pub velocity_b: Vec2,
    /// World translation applied to A.
    pub correction_a: Vec2,
    /// World translation applied to B.
    pub correction_b: Vec2,
}

/// Impulse response for two overlapping bodies, or `None` when both are
/// immovable or they are already separating along the contact normal.
pub fn resolve_pair(
    a: &RigidBody,
    b: &RigidBody,
    contact: Contact,
    correction_fraction: f32,
    penetration_slop: f32,
) -> Option<Resolution> {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return None;
    }
    let n = contact.normal;
    let vn = (b.velocity - a.velocity).dot(n);
    if vn >= 0.0 {
        return None;
    }

    let restitution = a.bounciness().min(b.bounciness());
    let j = -(1.0 + restitution) * vn / inv_sum;
    let correction =
        n * ((contact.penetration - penetration_slop).max(0.0) / inv_sum * correction_fraction);
    Some(Resolution {
        velocity_a: a.velocity - n * (inv_a * j),
        velocity_b: b.velocity + n * (inv_b * j),
        correction_a: -correction * inv_a,
        correction_b: correction * inv_b,
    })
}

struct Body {
    entity: Entity,
    node: TransformId,
    layer: String,
}

fn solid_bodies(world: &World, order: &[Entity]) -> Vec<Body> {
    order
        .iter()
        .filter_map(|&entity| {
            let object = world.get::<GameObject>(entity)?;
            let collider = world.get::<Collider>(entity)?;
            let handle = world.get::<TransformHandle>(entity)?;
            world.get::<RigidBody>(entity)?;
            (object.active && collider.active && collider.is_solid()).then(|| Body {
                entity,
                node: handle.0,
                layer: object.layer.clone(),
            })
        })
        .collect()
}

/// Resolve contacts among the game objects in `order`. Returns the
/// overlapping pairs found, in the order they were detected.
pub fn resolve_collisions_in_order(world: &mut World, order: &[Entity]) -> Vec<EntityPair> {
    let settings = world
        .get_resource::<PhysicsSettings>()
        .cloned()
        .unwrap_or_default();
    let bodies = solid_bodies(world, order);
    let mut checked: FxHashSet<EntityPair> = FxHashSet::default();
    let mut overlapping = Vec::new();
    let mut tests = 0u32;

    world.init_resource::<TransformTree>();
    world.resource_scope(|world, mut tree: Mut<TransformTree>| {
        for a in &bodies {
            for b in &bodies {
                if a.entity == b.entity || !checked.insert(EntityPair::new(a.entity, b.entity)) {
                    continue;
                }
                if !settings.layers_interact(&a.layer, &b.layer) {
                    continue;
                }
                let (Some(world_a), Some(world_b)) = (tree.world(a.node), tree.world(b.node))
                else {
                    continue;
                };
                let (Some(collider_a), Some(collider_b)) =
                    (world.get::<Collider>(a.entity), world.get::<Collider>(b.entity))
                else {
                    continue;
                };
                tests += 1;
                let placed_a = PlacedCollider::new(collider_a, &world_a);
                let placed_b = PlacedCollider::new(collider_b, &world_b);
                if !colliders_overlap(placed_a, placed_b) {
                    continue;
                }
                let contact = compute_contact(placed_a, placed_b);
                overlapping.push(EntityPair::new(a.entity, b.entity));

                let (Some(rb_a), Some(rb_b)) =
                    (world.get::<RigidBody>(a.entity), world.get::<RigidBody>(b.entity))
                else {
                    continue;
                };
                let Some(resolution) = resolve_pair(
                    rb_a,
                    rb_b,
                    contact,
                    settings.correction_fraction,
                    settings.penetration_slop,
                ) else {
                    continue;
                };
                trace!(
                    "resolved {:?} / {:?}: normal {:?}, depth {}",
                    a.entity, b.entity, contact.normal, contact.penetration
                );
                if let Some(mut rb) = world.get_mut::<RigidBody>(a.entity) {
                    rb.velocity = resolution.velocity_a;
                }
                if let Some(mut rb) = world.get_mut::<RigidBody>(b.entity) {
                    rb.velocity = resolution.velocity_b;
                }
                for (node, correction) in [
                    (a.node, resolution.correction_a),
                    (b.node, resolution.correction_b),
                ] {
                    if correction != Vec2::ZERO
                        && let Err(e) = tree.translate_world(node, correction)
                    {
                        warn!("positional correction failed: {}", e);
                    }
                }
            }
        }
    });

    if let Some(mut stats) = world.get_resource_mut::<PhysicsStats>() {
        stats.record_step(tests, overlapping.len() as u32);
    }
    overlapping
}

/// Fixed-step system resolving every solid pair in scene order.
pub fn resolve_collisions(world: &mut World) {
    let order = world
        .get_resource::<SceneObjects>()
        .map(SceneObjects::snapshot)
        .unwrap_or_default();
    resolve_collisions_in_order(world, &order);
}
