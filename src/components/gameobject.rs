//! Game object identity and construction.
//!
//! Every game object is an entity carrying a [`GameObject`] and a
//! [`TransformHandle`] pointing at its node in the
//! [`TransformTree`](crate::resources::transformtree::TransformTree).
//! [`GameObjectBuilder`] creates both at once and registers the entity in
//! [`SceneObjects`].

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::debug;

use crate::components::collider::Collider;
use crate::components::rigidbody::RigidBody;
use crate::components::script::{Script, Scripts};
use crate::resources::physicssettings::{DEFAULT_LAYER, PhysicsSettings};
use crate::resources::sceneobjects::SceneObjects;
use crate::resources::transformtree::{LocalTransform, TransformId, TransformTree};
use crate::scene::SceneError;

#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct GameObject {
    pub name: String,
    pub tag: String,
    /// Physics layer name; must be registered in
    /// [`PhysicsSettings`](crate::resources::physicssettings::PhysicsSettings).
    pub layer: String,
    /// Inactive objects are skipped by physics and triggers. Their scripts
    /// only receive `awake` and exit notifications.
    pub active: bool,
}

impl GameObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            layer: DEFAULT_LAYER.to_string(),
            active: true,
        }
    }
}

/// Link from an entity to its transform node.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransformHandle(pub TransformId);

/// Fluent construction of a game object.
///
/// # Example
/// ```ignore
/// let ball = GameObjectBuilder::new("ball")
///     .with_tag("ball")
///     .at(Vec2::new(0.0, 100.0))
///     .with_collider(Collider::new(CircleCollider::new(8.0)))
///     .with_rigid_body(RigidBody::with_mass(1.0).with_bounciness(0.9))
///     .spawn(&mut world)?;
/// ```
pub struct GameObjectBuilder {
    object: GameObject,
    local: LocalTransform,
    world_space: bool,
    parent: Option<Entity>,
    collider: Option<Collider>,
    rigid_body: Option<RigidBody>,
    scripts: Scripts,
}

impl GameObjectBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            object: GameObject::new(name),
            local: LocalTransform::default(),
            world_space: false,
            parent: None,
            collider: None,
            rigid_body: None,
            scripts: Scripts::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.object.tag = tag.into();
        self
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.object.layer = layer.into();
        self
    }

    pub fn with_parent(mut self, parent: Entity) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Position, relative to the parent unless [`Self::in_world_space`] is set.
    pub fn at(mut self, position: Vec2) -> Self {
        self.local.position = position;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.local.rotation = degrees;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.local.scale = scale;
        self
    }

    /// Interpret position, rotation and scale as world values.
    pub fn in_world_space(mut self) -> Self {
        self.world_space = true;
        self
    }

    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    pub fn with_rigid_body(mut self, rigid_body: RigidBody) -> Self {
        self.rigid_body = Some(rigid_body);
        self
    }

    pub fn with_script(mut self, script: impl Script) -> Self {
        self.scripts.push(script);
        self
    }

    pub fn with_boxed_script(mut self, script: Box<dyn Script>) -> Self {
        self.scripts.push_boxed(script);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.object.active = false;
        self
    }

    /// Create the transform node and the entity.
    ///
    /// Fails when the layer is unknown to [`PhysicsSettings`] (if present), the
    /// parent is not a game object, or the scale has a zero component.
    pub fn spawn(self, world: &mut World) -> Result<Entity, SceneError> {
        world.init_resource::<TransformTree>();
        world.init_resource::<SceneObjects>();

        if let Some(settings) = world.get_resource::<PhysicsSettings>() {
            settings.layer_index(&self.object.layer)?;
        }
        let parent_node = match self.parent {
            Some(parent) => Some(
                world
                    .get::<TransformHandle>(parent)
                    .ok_or(SceneError::ParentNotFound(parent))?
                    .0,
            ),
            None => None,
        };

        let node = {
            let mut tree = world.resource_mut::<TransformTree>();
            if self.world_space && parent_node.is_some() {
                let node = tree.insert(parent_node, LocalTransform::default())?;
                let placed = tree
                    .set_world_scale(node, self.local.scale)
                    .and_then(|_| tree.set_world_rotation(node, self.local.rotation))
                    .and_then(|_| tree.set_world_position(node, self.local.position));
                if let Err(e) = placed {
                    tree.remove(node)?;
                    return Err(e.into());
                }
                node
            } else {
                tree.insert(parent_node, self.local)?
            }
        };

        let name = self.object.name.clone();
        let mut entity = world.spawn((self.object, TransformHandle(node)));
        if let Some(collider) = self.collider {
            entity.insert(collider);
        }
        if let Some(rigid_body) = self.rigid_body {
            entity.insert(rigid_body);
        }
        if !self.scripts.is_empty() {
            entity.insert(self.scripts);
        }
        let id = entity.id();

        world.resource_mut::<TransformTree>().set_owner(node, id)?;
        world.resource_mut::<SceneObjects>().register(id);
        debug!("spawned game object '{}' as {:?}", name, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::physicssettings::LayerError;
    use crate::resources::transformtree::TransformError;

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn spawn_registers_object_and_transform() {
        let mut world = World::new();
        let e = GameObjectBuilder::new("box")
            .with_tag("crate")
            .at(Vec2::new(3.0, 4.0))
            .spawn(&mut world)
            .unwrap();
        let handle = *world.get::<TransformHandle>(e).unwrap();
        assert_eq!(world.get::<GameObject>(e).unwrap().tag, "crate");
        {
            let mut tree = world.resource_mut::<TransformTree>();
            assert_eq!(tree.owner(handle.0), Some(e));
            assert_eq!(tree.world_position(handle.0), Some(Vec2::new(3.0, 4.0)));
        }
        assert!(world.resource::<SceneObjects>().contains(e));
    }

    #[test]
    fn world_space_child_keeps_requested_position() {
        let mut world = World::new();
        let parent = GameObjectBuilder::new("parent")
            .at(Vec2::new(100.0, 100.0))
            .with_rotation(90.0)
            .with_scale(Vec2::splat(2.0))
            .spawn(&mut world)
            .unwrap();
        let child = GameObjectBuilder::new("child")
            .with_parent(parent)
            .at(Vec2::new(10.0, 10.0))
            .in_world_space()
            .spawn(&mut world)
            .unwrap();
        let handle = world.get::<TransformHandle>(child).unwrap().0;
        let mut tree = world.resource_mut::<TransformTree>();
        assert!(vec_approx_eq(tree.world_position(handle).unwrap(), Vec2::new(10.0, 10.0)));
        assert!(vec_approx_eq(tree.world_scale(handle).unwrap(), Vec2::ONE));
        assert!(tree.world_rotation(handle).unwrap().abs() < 1e-3);
    }

    #[test]
    fn unknown_layer_is_rejected() {
        let mut world = World::new();
        world.insert_resource(PhysicsSettings::default());
        let err = GameObjectBuilder::new("x")
            .with_layer("nowhere")
            .spawn(&mut world)
            .unwrap_err();
        assert!(matches!(err, SceneError::Layer(LayerError::Unknown(_))));
        assert!(world.resource::<SceneObjects>().is_empty());
    }

    #[test]
    fn zero_scale_is_rejected() {
        let mut world = World::new();
        let err = GameObjectBuilder::new("flat")
            .with_scale(Vec2::new(0.0, 1.0))
            .spawn(&mut world)
            .unwrap_err();
        assert!(matches!(
            err,
            SceneError::Transform(TransformError::InvalidScale { .. })
        ));
        assert!(world.resource::<TransformTree>().is_empty());
    }

    #[test]
    fn parent_must_be_a_game_object() {
        let mut world = World::new();
        let stray = world.spawn_empty().id();
        let err = GameObjectBuilder::new("orphan")
            .with_parent(stray)
            .spawn(&mut world)
            .unwrap_err();
        assert!(matches!(err, SceneError::ParentNotFound(e) if e == stray));
    }
}
