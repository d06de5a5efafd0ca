//! Frame driver.
//!
//! [`Game`] owns the ECS [`World`] with every engine resource and three
//! schedules:
//!
//! - `frame_start` – script `awake` then `start`
//! - `fixed_step` – script `fixed_update`, rigid body integration, contact
//!   resolution, trigger detection and dispatch, mouse detection and dispatch
//! - `frame_end` – script `update`, then deferred destruction
//!
//! [`Game::run_frame`] runs `frame_start`, as many `fixed_step`s as the
//! [`FixedTimestep`] accumulator allows, then `frame_end`.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info, warn};
use thiserror::Error;

use crate::components::gameobject::GameObjectBuilder;
use crate::events::mouse::MouseEvent;
use crate::events::trigger::TriggerEvent;
use crate::resources::camera::{Camera, CameraError};
use crate::resources::cursor::{Cursor, MouseHover};
use crate::resources::fixedtimestep::FixedTimestep;
use crate::resources::gameconfig::GameConfig;
use crate::resources::physicssettings::{LayerError, PhysicsSettings};
use crate::resources::physicsstats::PhysicsStats;
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{TransformError, TransformTree};
use crate::resources::triggertracker::TriggerTracker;
use crate::resources::worldtime::WorldTime;
use crate::scene::{SceneDescription, SceneError};
use crate::systems::cleanup::{apply_pending_destroy, destroy_game_object};
use crate::systems::collision::resolve_collisions;
use crate::systems::mouse::{detect_mouse, dispatch_mouse};
use crate::systems::movement::integrate_bodies;
use crate::systems::raycast::{RaycastHit, raycast};
use crate::systems::scripts::{awake_scripts, fixed_update_scripts, start_scripts, update_scripts};
use crate::systems::time::update_world_time;
use crate::systems::triggers::{detect_triggers, dispatch_triggers};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error(transparent)]
    Camera(#[from] CameraError),
}

pub struct Game {
    world: World,
    frame_start: Schedule,
    fixed_step: Schedule,
    frame_end: Schedule,
}

impl Game {
    /// Build a world from `config`: physics settings and layers, camera,
    /// cursor, clocks and message queues.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let settings = config.physics_settings()?;
        let camera = config.camera()?;

        let mut world = World::new();
        world.insert_resource(FixedTimestep::new(settings.fixed_step));
        world.insert_resource(WorldTime {
            fixed_delta: settings.fixed_step as f32,
            ..WorldTime::default()
        });
        world.insert_resource(settings);
        world.insert_resource(camera);
        world.insert_resource(Cursor::new());
        world.insert_resource(config);
        world.init_resource::<TransformTree>();
        world.init_resource::<SceneObjects>();
        world.init_resource::<TriggerTracker>();
        world.init_resource::<MouseHover>();
        world.init_resource::<PhysicsStats>();
        world.init_resource::<Messages<TriggerEvent>>();
        world.init_resource::<Messages<MouseEvent>>();

        let mut frame_start = Schedule::default();
        frame_start.add_systems((awake_scripts, start_scripts).chain());

        let mut fixed_step = Schedule::default();
        fixed_step.add_systems(
            (
                fixed_update_scripts,
                integrate_bodies,
                resolve_collisions,
                detect_triggers,
                dispatch_triggers,
                detect_mouse,
                dispatch_mouse,
            )
                .chain(),
        );

        let mut frame_end = Schedule::default();
        frame_end.add_systems((update_scripts, apply_pending_destroy).chain());

        Ok(Self {
            world,
            frame_start,
            fixed_step,
            frame_end,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn spawn(&mut self, builder: GameObjectBuilder) -> Result<Entity, SceneError> {
        builder.spawn(&mut self.world)
    }

    pub fn load_scene(&mut self, scene: &SceneDescription) -> Result<Vec<Entity>, SceneError> {
        let entities = scene.spawn(&mut self.world)?;
        info!("spawned {} game objects", entities.len());
        Ok(entities)
    }

    /// Queue `entity` for destruction at the end of the current frame.
    pub fn destroy(&mut self, entity: Entity) {
        self.world
            .resource_mut::<SceneObjects>()
            .request_destroy(entity);
    }

    /// Destroy `entity` and its transform subtree immediately.
    pub fn destroy_now(&mut self, entity: Entity) -> Result<Vec<Entity>, TransformError> {
        destroy_game_object(&mut self.world, entity)
    }

    pub fn raycast(&mut self, origin: Vec2, direction: Vec2) -> Option<RaycastHit> {
        raycast(&mut self.world, origin, direction)
    }

    pub fn cursor_mut(&mut self) -> Mut<'_, Cursor> {
        self.world.resource_mut::<Cursor>()
    }

    pub fn camera_mut(&mut self) -> Mut<'_, Camera> {
        self.world.resource_mut::<Camera>()
    }

    pub fn stats(&self) -> PhysicsStats {
        *self.world.resource::<PhysicsStats>()
    }

    pub fn elapsed(&self) -> f32 {
        self.world.resource::<WorldTime>().elapsed
    }

    pub fn object_count(&self) -> usize {
        self.world.resource::<SceneObjects>().len()
    }

    /// Advance one frame of `dt` unscaled seconds. Returns the number of
    /// fixed steps that ran.
    pub fn run_frame(&mut self, dt: f32) -> u32 {
        let scaled = update_world_time(&mut self.world, dt);
        self.frame_start.run(&mut self.world);

        self.world
            .resource_mut::<FixedTimestep>()
            .accumulate(f64::from(scaled));
        let step = self.world.resource::<FixedTimestep>().step_f32();
        self.world.resource_mut::<WorldTime>().fixed_delta = step;

        let mut steps = 0u32;
        while self.world.resource_mut::<FixedTimestep>().consume_step() {
            self.fixed_step.run(&mut self.world);
            steps += 1;
        }
        let max_steps = self.world.resource::<PhysicsSettings>().max_steps_warning;
        if steps > max_steps {
            warn!(
                "frame of {:.4}s needed {} fixed steps (warning threshold {})",
                dt, steps, max_steps
            );
        }

        self.frame_end.run(&mut self.world);
        self.world.clear_trackers();

        let mut stats = self.world.resource_mut::<PhysicsStats>();
        stats.frames += 1;
        stats.max_steps_in_frame = stats.max_steps_in_frame.max(steps);
        debug!("frame {} ran {} fixed steps", stats.frames, steps);
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_steps_follow_accumulated_time() {
        let mut game = Game::new(GameConfig::new()).unwrap();
        let steps: u32 = [0.05, 0.03, 0.04].iter().map(|dt| game.run_frame(*dt)).sum();
        assert_eq!(steps, 6);
        assert_eq!(game.stats().fixed_steps, 6);
        assert_eq!(game.stats().frames, 3);
    }

    #[test]
    fn time_scale_slows_the_simulation() {
        let mut game = Game::new(GameConfig::new()).unwrap();
        game.world_mut().resource_mut::<WorldTime>().time_scale = 0.5;
        assert_eq!(game.run_frame(0.04), 1);
    }

    #[test]
    fn unknown_ignored_layer_fails_construction() {
        let mut config = GameConfig::new();
        config.ignored_layer_pairs = vec![("nope".into(), "default".into())];
        assert!(matches!(Game::new(config), Err(GameError::Layer(_))));
    }
}
