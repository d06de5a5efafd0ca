//! Script lifecycle dispatch.
//!
//! All script systems are exclusive: the [`Scripts`] component is taken out of
//! the entity while its callbacks run so each callback can borrow the whole
//! [`World`] through a [`ScriptContext`]. After the callbacks the component is
//! put back, merged with any scripts attached to the entity in the meantime.
//!
//! Callback errors are logged and never interrupt other scripts.

use bevy_ecs::prelude::*;
use log::error;

use crate::components::gameobject::GameObject;
use crate::components::script::{ScriptContext, ScriptResult, ScriptSlot, Scripts};
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::worldtime::WorldTime;

/// One callback invocation for every script on an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptCall {
    Awake,
    Start,
    Update(f32),
    FixedUpdate(f32),
    TriggerEnter(Entity),
    TriggerStay(Entity),
    TriggerExit(Entity),
    MouseEnter,
    MouseExit,
    MouseClick,
}

impl ScriptCall {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptCall::Awake => "awake",
            ScriptCall::Start => "start",
            ScriptCall::Update(_) => "update",
            ScriptCall::FixedUpdate(_) => "fixed_update",
            ScriptCall::TriggerEnter(_) => "on_trigger_enter",
            ScriptCall::TriggerStay(_) => "on_trigger_stay",
            ScriptCall::TriggerExit(_) => "on_trigger_exit",
            ScriptCall::MouseEnter => "on_mouse_enter",
            ScriptCall::MouseExit => "on_mouse_exit",
            ScriptCall::MouseClick => "on_mouse_click",
        }
    }

    /// `awake` runs for every object; exit notifications still reach objects
    /// deactivated since the interaction began.
    fn reaches_inactive(&self) -> bool {
        matches!(
            self,
            ScriptCall::Awake | ScriptCall::TriggerExit(_) | ScriptCall::MouseExit
        )
    }

    fn invoke(&self, slot: &mut ScriptSlot, ctx: &mut ScriptContext) -> Option<ScriptResult> {
        let script = &mut slot.script;
        match *self {
            ScriptCall::Awake => {
                if slot.has_run_awake {
                    return None;
                }
                slot.has_run_awake = true;
                Some(script.awake(ctx))
            }
            ScriptCall::Start => {
                if !slot.enabled || !slot.has_run_awake || slot.has_run_start {
                    return None;
                }
                slot.has_run_start = true;
                Some(script.start(ctx))
            }
            _ if !slot.enabled || !slot.has_run_start => None,
            ScriptCall::Update(dt) => Some(script.update(ctx, dt)),
            ScriptCall::FixedUpdate(dt) => Some(script.fixed_update(ctx, dt)),
            ScriptCall::TriggerEnter(other) => Some(script.on_trigger_enter(ctx, other)),
            ScriptCall::TriggerStay(other) => Some(script.on_trigger_stay(ctx, other)),
            ScriptCall::TriggerExit(other) => Some(script.on_trigger_exit(ctx, other)),
            ScriptCall::MouseEnter => Some(script.on_mouse_enter(ctx)),
            ScriptCall::MouseExit => Some(script.on_mouse_exit(ctx)),
            ScriptCall::MouseClick => Some(script.on_mouse_click(ctx)),
        }
    }
}

/// Run `call` on every script of `entity`. Returns the number of callbacks
/// that failed.
pub fn run_scripts(world: &mut World, entity: Entity, call: ScriptCall) -> usize {
    let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
        return 0;
    };
    let active = entity_mut.get::<GameObject>().is_some_and(|o| o.active);
    if !active && !call.reaches_inactive() {
        return 0;
    }
    let Some(mut scripts) = entity_mut.take::<Scripts>() else {
        return 0;
    };

    let mut failures = 0;
    for slot in scripts.slots.iter_mut() {
        let mut ctx = ScriptContext::new(world, entity);
        if let Some(Err(e)) = call.invoke(slot, &mut ctx) {
            failures += 1;
            error!(
                "script '{}' on {:?} failed in {}: {}",
                slot.script.name(),
                entity,
                call.name(),
                e
            );
        }
    }

    // The entity may have been despawned by one of its own scripts.
    if let Ok(mut entity_mut) = world.get_entity_mut(entity) {
        if let Some(added) = entity_mut.take::<Scripts>() {
            scripts.absorb(added);
        }
        entity_mut.insert(scripts);
    }
    failures
}

fn scripted_objects(world: &World) -> Vec<Entity> {
    let Some(objects) = world.get_resource::<SceneObjects>() else {
        return Vec::new();
    };
    objects
        .iter()
        .filter(|e| world.get::<Scripts>(*e).is_some())
        .collect()
}

/// Call `awake` on scripts attached since the previous frame.
pub fn awake_scripts(world: &mut World) {
    for entity in scripted_objects(world) {
        if world.get::<Scripts>(entity).is_some_and(Scripts::needs_awake) {
            run_scripts(world, entity, ScriptCall::Awake);
        }
    }
}

/// Call `start` on scripts that are awake but not started.
pub fn start_scripts(world: &mut World) {
    for entity in scripted_objects(world) {
        if world.get::<Scripts>(entity).is_some_and(Scripts::needs_start) {
            run_scripts(world, entity, ScriptCall::Start);
        }
    }
}

pub fn update_scripts(world: &mut World) {
    let dt = world.get_resource::<WorldTime>().map_or(0.0, |t| t.delta);
    for entity in scripted_objects(world) {
        run_scripts(world, entity, ScriptCall::Update(dt));
    }
}

pub fn fixed_update_scripts(world: &mut World) {
    let dt = world
        .get_resource::<WorldTime>()
        .map_or(0.0, |t| t.fixed_delta);
    for entity in scripted_objects(world) {
        run_scripts(world, entity, ScriptCall::FixedUpdate(dt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gameobject::GameObjectBuilder;
    use crate::components::script::{Script, ScriptError};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        tag: &'static str,
        log: Log,
    }

    impl Recorder {
        fn push(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", self.tag, what));
        }
    }

    impl Script for Recorder {
        fn awake(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
            self.push("awake");
            Ok(())
        }
        fn start(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
            self.push("start");
            Ok(())
        }
        fn update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
            self.push("update");
            Ok(())
        }
        fn on_trigger_exit(&mut self, _ctx: &mut ScriptContext, _other: Entity) -> ScriptResult {
            self.push("exit");
            Ok(())
        }
    }

    struct Failing;
    impl Script for Failing {
        fn update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
            Err(ScriptError::msg("boom"))
        }
    }

    struct SelfDestruct;
    impl Script for SelfDestruct {
        fn update(&mut self, ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
            let entity = ctx.entity;
            ctx.world.despawn(entity);
            Ok(())
        }
    }

    fn spawn_with(world: &mut World, scripts: Vec<Box<dyn Script>>) -> Entity {
        let mut builder = GameObjectBuilder::new("scripted");
        for s in scripts {
            builder = builder.with_boxed_script(s);
        }
        builder.spawn(world).unwrap()
    }

    #[test]
    fn lifecycle_runs_in_order_once() {
        let log = Log::default();
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        spawn_with(
            &mut world,
            vec![Box::new(Recorder {
                tag: "a",
                log: log.clone(),
            })],
        );
        for _ in 0..2 {
            awake_scripts(&mut world);
            start_scripts(&mut world);
            update_scripts(&mut world);
        }
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:awake", "a:start", "a:update", "a:update"]
        );
    }

    #[test]
    fn failure_does_not_stop_later_scripts() {
        let log = Log::default();
        let mut world = World::new();
        let e = spawn_with(
            &mut world,
            vec![
                Box::new(Failing),
                Box::new(Recorder {
                    tag: "b",
                    log: log.clone(),
                }),
            ],
        );
        run_scripts(&mut world, e, ScriptCall::Awake);
        run_scripts(&mut world, e, ScriptCall::Start);
        assert_eq!(run_scripts(&mut world, e, ScriptCall::Update(0.1)), 1);
        assert!(log.lock().unwrap().contains(&"b:update".to_string()));
        assert_eq!(world.get::<Scripts>(e).unwrap().len(), 2);
    }

    #[test]
    fn inactive_objects_only_receive_exits() {
        let log = Log::default();
        let mut world = World::new();
        let e = spawn_with(
            &mut world,
            vec![Box::new(Recorder {
                tag: "c",
                log: log.clone(),
            })],
        );
        run_scripts(&mut world, e, ScriptCall::Awake);
        run_scripts(&mut world, e, ScriptCall::Start);
        world.get_mut::<GameObject>(e).unwrap().active = false;
        run_scripts(&mut world, e, ScriptCall::Update(0.1));
        run_scripts(&mut world, e, ScriptCall::TriggerExit(e));
        assert_eq!(*log.lock().unwrap(), vec!["c:awake", "c:start", "c:exit"]);
    }

    #[test]
    fn despawned_owner_is_not_recreated() {
        let mut world = World::new();
        let e = spawn_with(&mut world, vec![Box::new(SelfDestruct)]);
        run_scripts(&mut world, e, ScriptCall::Awake);
        run_scripts(&mut world, e, ScriptCall::Start);
        run_scripts(&mut world, e, ScriptCall::Update(0.1));
        assert!(world.get_entity(e).is_err());
    }

    #[test]
    fn awake_reaches_inactive_objects_but_start_waits() {
        let log = Log::default();
        let mut world = World::new();
        let e = spawn_with(
            &mut world,
            vec![Box::new(Recorder {
                tag: "d",
                log: log.clone(),
            })],
        );
        world.get_mut::<GameObject>(e).unwrap().active = false;
        awake_scripts(&mut world);
        start_scripts(&mut world);
        assert_eq!(*log.lock().unwrap(), vec!["d:awake"]);
        world.get_mut::<GameObject>(e).unwrap().active = true;
        awake_scripts(&mut world);
        start_scripts(&mut world);
        assert_eq!(*log.lock().unwrap(), vec!["d:awake", "d:start"]);
    }

    #[test]
    fn disabled_scripts_only_awake() {
        let log = Log::default();
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let e = spawn_with(
            &mut world,
            vec![
                Box::new(Recorder {
                    tag: "on",
                    log: log.clone(),
                }),
                Box::new(Recorder {
                    tag: "off",
                    log: log.clone(),
                }),
            ],
        );
        world.get_mut::<Scripts>(e).unwrap().set_enabled(1, false);
        awake_scripts(&mut world);
        start_scripts(&mut world);
        update_scripts(&mut world);
        run_scripts(&mut world, e, ScriptCall::TriggerExit(e));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["on:awake", "off:awake", "on:start", "on:update", "on:exit"]
        );

        world.get_mut::<Scripts>(e).unwrap().set_enabled(1, true);
        start_scripts(&mut world);
        assert_eq!(log.lock().unwrap().last().unwrap(), "off:start");
    }
}
