use bevy_ecs::prelude::*;
use log::warn;

use crate::components::gameobject::{GameObject, TransformHandle};
use crate::components::rigidbody::RigidBody;
use crate::resources::transformtree::TransformTree;
use crate::resources::worldtime::WorldTime;

/// Integrate rigid bodies over one fixed step: enabled accelerations change
/// the velocity, then the velocity moves the object in world space.
pub fn integrate_bodies(
    mut query: Query<(&GameObject, &TransformHandle, &mut RigidBody)>,
    mut tree: ResMut<TransformTree>,
    time: Res<WorldTime>,
) {
    let dt = time.fixed_delta;
    for (object, handle, mut rigidbody) in query.iter_mut() {
        if !object.active || rigidbody.frozen {
            continue;
        }
        let acceleration = rigidbody.total_acceleration();
        if acceleration != glam::Vec2::ZERO {
            rigidbody.velocity += acceleration * dt;
        }
        let delta = rigidbody.velocity * dt;
        if delta == glam::Vec2::ZERO {
            continue;
        }
        if let Err(e) = tree.translate_world(handle.0, delta) {
            warn!("cannot move '{}': {}", object.name, e);
        }
    }
}
