//! Cursor hover and click detection against colliders.
//!
//! The cursor position is converted to world space through the [`Camera`]
//! and tested against every active collider. Hover starts and ends, plus a
//! button press edge while hovering, become [`MouseEvent`] messages that
//! [`dispatch_mouse`] forwards to the object's scripts.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;

use crate::components::collider::Collider;
use crate::components::gameobject::{GameObject, TransformHandle};
use crate::events::mouse::{MouseEvent, MouseInteraction};
use crate::resources::camera::Camera;
use crate::resources::cursor::{Cursor, MouseHover};
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::TransformTree;
use crate::systems::scripts::{ScriptCall, run_scripts};

pub fn detect_mouse(
    query: Query<(&GameObject, &TransformHandle, &Collider)>,
    objects: Res<SceneObjects>,
    cursor: Option<Res<Cursor>>,
    camera: Option<ResMut<Camera>>,
    mut tree: ResMut<TransformTree>,
    mut hover: ResMut<MouseHover>,
    mut writer: MessageWriter<MouseEvent>,
) {
    let point = match (cursor.as_deref(), camera) {
        (Some(cursor), Some(mut camera)) if cursor.visible => {
            Some(camera.screen_to_world(cursor.screen_position))
        }
        _ => None,
    };

    let mut eligible = Vec::new();
    let mut eligible_set = FxHashSet::default();
    for entity in objects.iter() {
        let Ok((object, handle, collider)) = query.get(entity) else {
            continue;
        };
        if !object.active || !collider.active || objects.is_pending_destroy(entity) {
            continue;
        }
        eligible.push(entity);
        eligible_set.insert(entity);
        let inside = match (point, tree.world(handle.0)) {
            (Some(p), Some(world)) => collider.is_point_inside(&world, p),
            _ => false,
        };
        if hover.set_hovered(entity, inside) {
            let interaction = if inside {
                MouseInteraction::Enter
            } else {
                MouseInteraction::Exit
            };
            writer.write(MouseEvent {
                entity,
                interaction,
            });
        }
    }

    for entity in hover.retain(|e| eligible_set.contains(&e)) {
        writer.write(MouseEvent {
            entity,
            interaction: MouseInteraction::Exit,
        });
    }

    let pressed = cursor.as_deref().is_some_and(|c| c.pressed);
    if hover.update_press(pressed) {
        for entity in eligible.iter().copied().filter(|e| hover.is_hovered(*e)) {
            writer.write(MouseEvent {
                entity,
                interaction: MouseInteraction::Click,
            });
        }
    }
}

pub fn dispatch_mouse(world: &mut World) {
    let events: Vec<MouseEvent> = match world.get_resource_mut::<Messages<MouseEvent>>() {
        Some(mut messages) => messages.drain().collect(),
        None => return,
    };
    for event in events {
        let call = match event.interaction {
            MouseInteraction::Enter => ScriptCall::MouseEnter,
            MouseInteraction::Exit => ScriptCall::MouseExit,
            MouseInteraction::Click => ScriptCall::MouseClick,
        };
        run_scripts(world, event.entity, call);
    }
}
