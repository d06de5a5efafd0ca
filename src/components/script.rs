//! Behaviour scripts attached to game objects.
//!
//! A [`Script`] is a trait object with lifecycle callbacks. An entity carries
//! its scripts in a [`Scripts`] component; the script systems take the
//! component out of the entity while callbacks run, which lets a callback
//! borrow the whole [`World`] through its [`ScriptContext`].
//!
//! # Lifecycle
//!
//! - `awake` – once, in the first frame after the script is attached, even
//!   when the object or the script is inactive
//! - `start` – once, after `awake`, in the first frame the object is active
//!   and the script enabled
//! - `fixed_update(dt)` – every fixed physics step
//! - `update(dt)` – once per frame after the fixed steps
//! - `on_trigger_enter/stay/exit(other)` – trigger pair transitions
//! - `on_mouse_enter/exit/click` – cursor interaction with the collider
//!
//! Apart from `awake`, callbacks only reach enabled scripts
//! ([`Scripts::set_enabled`]). Every callback returns [`ScriptResult`].
//! Errors are logged and do not stop other scripts or the frame.

use bevy_ecs::prelude::*;
use glam::Vec2;
use thiserror::Error;

use crate::components::collider::Collider;
use crate::components::gameobject::{GameObject, TransformHandle};
use crate::components::rigidbody::RigidBody;
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{TransformError, TransformTree};
use crate::resources::worldtime::WorldTime;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("entity {0:?} has no transform")]
    NoTransform(Entity),
}

impl ScriptError {
    pub fn msg(message: impl Into<String>) -> Self {
        ScriptError::Message(message.into())
    }
}

pub type ScriptResult = Result<(), ScriptError>;

/// World access handed to script callbacks.
pub struct ScriptContext<'w> {
    pub world: &'w mut World,
    /// The entity owning the running script.
    pub entity: Entity,
}

impl<'w> ScriptContext<'w> {
    pub fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    pub fn game_object(&self) -> Option<&GameObject> {
        self.world.get::<GameObject>(self.entity)
    }

    pub fn rigid_body(&mut self) -> Option<Mut<'_, RigidBody>> {
        self.world.get_mut::<RigidBody>(self.entity)
    }

    pub fn collider(&mut self) -> Option<Mut<'_, Collider>> {
        self.world.get_mut::<Collider>(self.entity)
    }

    /// Scaled frame delta.
    pub fn delta(&self) -> f32 {
        self.world
            .get_resource::<WorldTime>()
            .map_or(0.0, |t| t.delta)
    }

    fn handle(&self, entity: Entity) -> Result<TransformHandle, ScriptError> {
        self.world
            .get::<TransformHandle>(entity)
            .copied()
            .ok_or(ScriptError::NoTransform(entity))
    }

    pub fn world_position(&mut self) -> Result<Vec2, ScriptError> {
        self.world_position_of(self.entity)
    }

    pub fn world_position_of(&mut self, entity: Entity) -> Result<Vec2, ScriptError> {
        let handle = self.handle(entity)?;
        self.world
            .resource_mut::<TransformTree>()
            .world_position(handle.0)
            .ok_or(ScriptError::Transform(TransformError::Missing(handle.0)))
    }

    pub fn set_world_position(&mut self, position: Vec2) -> ScriptResult {
        let handle = self.handle(self.entity)?;
        self.world
            .resource_mut::<TransformTree>()
            .set_world_position(handle.0, position)?;
        Ok(())
    }

    pub fn translate(&mut self, delta: Vec2) -> ScriptResult {
        let handle = self.handle(self.entity)?;
        self.world
            .resource_mut::<TransformTree>()
            .translate_world(handle.0, delta)?;
        Ok(())
    }

    pub fn set_local_rotation(&mut self, degrees: f32) -> ScriptResult {
        let handle = self.handle(self.entity)?;
        self.world
            .resource_mut::<TransformTree>()
            .set_local_rotation(handle.0, degrees)?;
        Ok(())
    }

    pub fn set_active(&mut self, active: bool) {
        if let Some(mut object) = self.world.get_mut::<GameObject>(self.entity) {
            object.active = active;
        }
    }

    /// Queue `entity` (and its transform subtree) for destruction at the next
    /// cleanup point.
    pub fn destroy(&mut self, entity: Entity) {
        self.world
            .resource_mut::<SceneObjects>()
            .request_destroy(entity);
    }

    pub fn destroy_self(&mut self) {
        self.destroy(self.entity);
    }
}

/// Behaviour attached to a game object. Every callback defaults to a no-op.
pub trait Script: Send + Sync + 'static {
    /// Name used in log messages.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn awake(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        Ok(())
    }

    fn start(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
        Ok(())
    }

    fn fixed_update(&mut self, _ctx: &mut ScriptContext, _dt: f32) -> ScriptResult {
        Ok(())
    }

    fn on_trigger_enter(&mut self, _ctx: &mut ScriptContext, _other: Entity) -> ScriptResult {
        Ok(())
    }

    fn on_trigger_stay(&mut self, _ctx: &mut ScriptContext, _other: Entity) -> ScriptResult {
        Ok(())
    }

    fn on_trigger_exit(&mut self, _ctx: &mut ScriptContext, _other: Entity) -> ScriptResult {
        Ok(())
    }

    fn on_mouse_enter(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        Ok(())
    }

    fn on_mouse_exit(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        Ok(())
    }

    fn on_mouse_click(&mut self, _ctx: &mut ScriptContext) -> ScriptResult {
        Ok(())
    }
}

pub(crate) struct ScriptSlot {
    pub(crate) script: Box<dyn Script>,
    pub(crate) has_run_awake: bool,
    pub(crate) has_run_start: bool,
    pub(crate) enabled: bool,
}

/// Ordered list of scripts on one entity.
#[derive(Component, Default)]
pub struct Scripts {
    pub(crate) slots: Vec<ScriptSlot>,
}

impl Scripts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, script: impl Script) -> Self {
        self.push(script);
        self
    }

    pub fn push(&mut self, script: impl Script) {
        self.push_boxed(Box::new(script));
    }

    pub fn push_boxed(&mut self, script: Box<dyn Script>) {
        self.slots.push(ScriptSlot {
            script,
            has_run_awake: false,
            has_run_start: false,
            enabled: true,
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.script.name())
    }

    pub fn needs_awake(&self) -> bool {
        self.slots.iter().any(|s| !s.has_run_awake)
    }

    pub fn needs_start(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.enabled && s.has_run_awake && !s.has_run_start)
    }

    /// Enable or disable the script at `index`. Returns false when there is
    /// no such script.
    ///
    /// While a callback of an entity runs, its own `Scripts` component is
    /// detached, so this only affects other entities from inside a script.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, index: usize) -> Option<bool> {
        self.slots.get(index).map(|s| s.enabled)
    }

    /// Append the scripts of `other`, keeping their lifecycle flags.
    pub(crate) fn absorb(&mut self, other: Scripts) {
        self.slots.extend(other.slots);
    }
}

impl std::fmt::Debug for Scripts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
