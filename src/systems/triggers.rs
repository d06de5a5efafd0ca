//! Trigger pair detection and dispatch.
//!
//! [`detect_triggers`] overlap-tests every unordered pair of active colliders
//! where at least one side is a trigger, diffs the result against the
//! [`TriggerTracker`] and writes a [`TriggerEvent`] per transition.
//! [`dispatch_triggers`] then drains those messages and calls the scripts of
//! both participants.

use bevy_ecs::prelude::*;
use log::debug;

use crate::components::collider::Collider;
use crate::components::gameobject::{GameObject, TransformHandle};
use crate::events::trigger::{TriggerEvent, TriggerPhase};
use crate::geometry::intersect::{PlacedCollider, colliders_overlap};
use crate::resources::physicssettings::PhysicsSettings;
use crate::resources::physicsstats::PhysicsStats;
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{TransformTree, WorldTransform};
use crate::resources::triggertracker::{EntityPair, TriggerTracker};
use crate::systems::scripts::{ScriptCall, run_scripts};

pub fn detect_triggers(
    query: Query<(&GameObject, &TransformHandle, &Collider)>,
    objects: Res<SceneObjects>,
    settings: Option<Res<PhysicsSettings>>,
    mut tree: ResMut<TransformTree>,
    mut tracker: ResMut<TriggerTracker>,
    mut stats: Option<ResMut<PhysicsStats>>,
    mut writer: MessageWriter<TriggerEvent>,
) {
    let candidates: Vec<(Entity, &GameObject, &Collider, WorldTransform)> = objects
        .iter()
        .filter(|e| !objects.is_pending_destroy(*e))
        .filter_map(|e| {
            let (object, handle, collider) = query.get(e).ok()?;
            if !object.active || !collider.active {
                return None;
            }
            Some((e, object, collider, tree.world(handle.0)?))
        })
        .collect();

    let mut current = Vec::new();
    for (i, (ea, oa, ca, wa)) in candidates.iter().enumerate() {
        for (eb, ob, cb, wb) in &candidates[i + 1..] {
            if !ca.is_trigger() && !cb.is_trigger() {
                continue;
            }
            let interact = settings
                .as_ref()
                .is_none_or(|s| s.layers_interact(&oa.layer, &ob.layer));
            if interact
                && colliders_overlap(PlacedCollider::new(ca, wa), PlacedCollider::new(cb, wb))
            {
                current.push(EntityPair::new(*ea, *eb));
            }
        }
    }

    let events = tracker.update(current);
    if let Some(stats) = stats.as_mut() {
        stats.total_trigger_events += events.len() as u64;
    }
    for event in events {
        if event.phase != TriggerPhase::Stay {
            debug!("trigger {:?}: {:?} / {:?}", event.phase, event.a, event.b);
        }
        writer.write(event);
    }
}

/// Drain pending trigger messages and call both participants' scripts.
pub fn dispatch_triggers(world: &mut World) {
    let events: Vec<TriggerEvent> = match world.get_resource_mut::<Messages<TriggerEvent>>() {
        Some(mut messages) => messages.drain().collect(),
        None => return,
    };
    for event in events {
        for (me, other) in [(event.a, event.b), (event.b, event.a)] {
            let call = match event.phase {
                TriggerPhase::Enter => ScriptCall::TriggerEnter(other),
                TriggerPhase::Stay => ScriptCall::TriggerStay(other),
                TriggerPhase::Exit => ScriptCall::TriggerExit(other),
            };
            run_scripts(world, me, call);
        }
    }
}
