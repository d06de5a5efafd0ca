//! JSON scene descriptions.
//!
//! A [`SceneDescription`] lists game objects with their transform, collider
//! and rigid body. Objects may name an earlier object as their parent.
//!
//! ```json
//! {
//!   "objects": [
//!     { "name": "floor", "position": [0, -100],
//!       "collider": { "type": "box", "width": 400, "height": 20 },
//!       "rigid_body": { "immovable": true } },
//!     { "name": "ball", "position": [0, 50],
//!       "collider": { "type": "circle", "radius": 8 },
//!       "rigid_body": { "velocity": [0, -60], "bounciness": 0.8 } }
//!   ]
//! }
//! ```

use std::path::Path;

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::collider::{
    BoxCollider, CircleCollider, Collider, ColliderState, PixelCollider, PixelMask,
    PolygonCollider,
};
use crate::components::gameobject::GameObjectBuilder;
use crate::components::rigidbody::RigidBody;
use crate::resources::physicssettings::{DEFAULT_LAYER, LayerError, PhysicsSettings};
use crate::resources::transformtree::TransformError;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid scene description: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error("parent entity {0:?} is not a game object")]
    ParentNotFound(Entity),
    #[error("object '{object}' references unknown parent '{parent}'")]
    UnknownParent { object: String, parent: String },
    #[error("duplicate object name '{0}'")]
    DuplicateName(String),
}

fn default_layer() -> String {
    DEFAULT_LAYER.to_string()
}

fn default_scale() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDescription {
    Box {
        width: f32,
        height: f32,
    },
    Circle {
        radius: f32,
    },
    Polygon {
        points: Vec<[f32; 2]>,
    },
    /// Rows of `#` (opaque) and `.` (transparent) cells.
    Pixel {
        rows: Vec<String>,
        #[serde(default)]
        flip_x: bool,
        #[serde(default)]
        flip_y: bool,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColliderDescription {
    #[serde(flatten)]
    pub shape: ShapeDescription,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub trigger: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ForceDescription {
    pub name: String,
    pub value: [f32; 2],
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RigidBodyDescription {
    /// Defaults to `1.0`; ignored when `immovable` is set.
    #[serde(default)]
    pub mass: Option<f32>,
    #[serde(default)]
    pub immovable: bool,
    #[serde(default)]
    pub velocity: [f32; 2],
    #[serde(default)]
    pub bounciness: f32,
    #[serde(default)]
    pub forces: Vec<ForceDescription>,
    #[serde(default)]
    pub frozen: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ObjectDescription {
    pub name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default = "default_layer")]
    pub layer: String,
    #[serde(default)]
    pub position: [f32; 2],
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: [f32; 2],
    /// Name of an object listed earlier.
    #[serde(default)]
    pub parent: Option<String>,
    /// Treat position/rotation/scale as world values.
    #[serde(default)]
    pub world_space: bool,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub collider: Option<ColliderDescription>,
    #[serde(default)]
    pub rigid_body: Option<RigidBodyDescription>,
}

impl ObjectDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: String::new(),
            layer: default_layer(),
            position: [0.0, 0.0],
            rotation: 0.0,
            scale: default_scale(),
            parent: None,
            world_space: false,
            active: true,
            collider: None,
            rigid_body: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SceneDescription {
    /// Layers registered before spawning, in addition to configured ones.
    #[serde(default)]
    pub layers: Vec<String>,
    pub objects: Vec<ObjectDescription>,
}

impl ColliderDescription {
    pub fn new(shape: ShapeDescription) -> Self {
        Self {
            shape,
            offset: [0.0, 0.0],
            trigger: false,
            active: true,
        }
    }

    pub fn to_collider(&self) -> Collider {
        let collider = match &self.shape {
            ShapeDescription::Box { width, height } => Collider::new(BoxCollider::new(*width, *height)),
            ShapeDescription::Circle { radius } => Collider::new(CircleCollider::new(*radius)),
            ShapeDescription::Polygon { points } => Collider::new(PolygonCollider::new(
                points.iter().map(|p| Vec2::from_array(*p)).collect(),
            )),
            ShapeDescription::Pixel {
                rows,
                flip_x,
                flip_y,
            } => Collider::new(
                PixelCollider::new(PixelMask::from_rows(rows)).with_flip(*flip_x, *flip_y),
            ),
        };
        let state = if self.trigger {
            ColliderState::Trigger
        } else {
            ColliderState::Solid
        };
        collider
            .with_offset(Vec2::from_array(self.offset))
            .with_state(state)
            .with_active(self.active)
    }
}

impl RigidBodyDescription {
    pub fn to_rigid_body(&self) -> RigidBody {
        let mut rb = if self.immovable {
            RigidBody::immovable()
        } else {
            RigidBody::with_mass(self.mass.unwrap_or(1.0))
        };
        rb.velocity = Vec2::from_array(self.velocity);
        rb.set_bounciness(self.bounciness);
        rb.frozen = self.frozen;
        for force in &self.forces {
            rb.add_force_with_state(&force.name, Vec2::from_array(force.value), force.enabled);
        }
        rb
    }
}

impl SceneDescription {
    pub fn from_json(text: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let scene = Self::from_json(&text)?;
        info!(
            "Loaded scene {:?} with {} objects",
            path.as_ref(),
            scene.objects.len()
        );
        Ok(scene)
    }

    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Spawn every object in order. Returns the created entities in the same
    /// order as `objects`.
    pub fn spawn(&self, world: &mut World) -> Result<Vec<Entity>, SceneError> {
        if !self.layers.is_empty() {
            world.init_resource::<PhysicsSettings>();
            world
                .resource_mut::<PhysicsSettings>()
                .ensure_layers(self.layers.iter().map(String::as_str))?;
        }
        let mut by_name: FxHashMap<&str, Entity> = FxHashMap::default();
        let mut spawned = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            if by_name.contains_key(object.name.as_str()) {
                return Err(SceneError::DuplicateName(object.name.clone()));
            }
            let mut builder = GameObjectBuilder::new(object.name.clone())
                .with_tag(object.tag.clone())
                .with_layer(object.layer.clone())
                .at(Vec2::from_array(object.position))
                .with_rotation(object.rotation)
                .with_scale(Vec2::from_array(object.scale));
            if let Some(parent) = &object.parent {
                let parent_entity =
                    by_name
                        .get(parent.as_str())
                        .copied()
                        .ok_or_else(|| SceneError::UnknownParent {
                            object: object.name.clone(),
                            parent: parent.clone(),
                        })?;
                builder = builder.with_parent(parent_entity);
            }
            if object.world_space {
                builder = builder.in_world_space();
            }
            if !object.active {
                builder = builder.inactive();
            }
            if let Some(collider) = &object.collider {
                builder = builder.with_collider(collider.to_collider());
            }
            if let Some(rb) = &object.rigid_body {
                builder = builder.with_rigid_body(rb.to_rigid_body());
            }
            let entity = builder.spawn(world)?;
            by_name.insert(object.name.as_str(), entity);
            spawned.push(entity);
        }
        Ok(spawned)
    }

    /// Box arena with a trigger zone in the middle and `count` randomly
    /// placed bouncing bodies. The same seed always yields the same scene.
    pub fn demo(seed: u64, count: usize) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut objects = Vec::with_capacity(count + 5);

        let wall = |name: &str, position: [f32; 2], width: f32, height: f32| {
            let mut o = ObjectDescription::new(name);
            o.tag = "wall".into();
            o.position = position;
            o.collider = Some(ColliderDescription::new(ShapeDescription::Box { width, height }));
            o.rigid_body = Some(RigidBodyDescription {
                immovable: true,
                ..Default::default()
            });
            o
        };
        objects.push(wall("floor", [0.0, -160.0], 340.0, 20.0));
        objects.push(wall("ceiling", [0.0, 160.0], 340.0, 20.0));
        objects.push(wall("left_wall", [-160.0, 0.0], 20.0, 340.0));
        objects.push(wall("right_wall", [160.0, 0.0], 20.0, 340.0));

        let mut zone = ObjectDescription::new("zone");
        zone.tag = "zone".into();
        let mut zone_collider = ColliderDescription::new(ShapeDescription::Circle { radius: 30.0 });
        zone_collider.trigger = true;
        zone.collider = Some(zone_collider);
        objects.push(zone);

        for i in 0..count {
            let mut body = ObjectDescription::new(format!("body{i}"));
            body.tag = "body".into();
            body.position = [rng.f32() * 240.0 - 120.0, rng.f32() * 240.0 - 120.0];
            body.rotation = rng.f32() * 360.0 - 180.0;
            let shape = match rng.u8(0..3) {
                0 => ShapeDescription::Circle {
                    radius: 4.0 + rng.f32() * 8.0,
                },
                1 => ShapeDescription::Box {
                    width: 6.0 + rng.f32() * 12.0,
                    height: 6.0 + rng.f32() * 12.0,
                },
                _ => ShapeDescription::Polygon {
                    points: vec![[-6.0, -5.0], [6.0, -5.0], [0.0, 7.0]],
                },
            };
            body.collider = Some(ColliderDescription::new(shape));
            body.rigid_body = Some(RigidBodyDescription {
                mass: Some(0.5 + rng.f32() * 2.0),
                velocity: [rng.f32() * 200.0 - 100.0, rng.f32() * 200.0 - 100.0],
                bounciness: 0.5 + rng.f32() * 0.5,
                forces: vec![ForceDescription {
                    name: "gravity".into(),
                    value: [0.0, -98.0],
                    enabled: true,
                }],
                ..Default::default()
            });
            objects.push(body);
        }
        Self {
            layers: Vec::new(),
            objects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gameobject::{GameObject, TransformHandle};
    use crate::resources::transformtree::TransformTree;

    #[test]
    fn parses_minimal_object_with_defaults() {
        let scene = SceneDescription::from_json(
            r#"{ "objects": [ { "name": "a", "collider": { "type": "circle", "radius": 2 } } ] }"#,
        )
        .unwrap();
        let object = &scene.objects[0];
        assert_eq!(object.layer, DEFAULT_LAYER);
        assert_eq!(object.scale, [1.0, 1.0]);
        assert!(object.active);
        let collider = object.collider.as_ref().unwrap();
        assert_eq!(collider.shape, ShapeDescription::Circle { radius: 2.0 });
        assert!(collider.active);
        assert!(!collider.trigger);
    }

    #[test]
    fn spawn_resolves_parents_by_name() {
        let scene = SceneDescription::from_json(
            r#"{ "objects": [
                { "name": "root", "position": [10, 0] },
                { "name": "child", "parent": "root", "position": [5, 0] }
            ] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let entities = scene.spawn(&mut world).unwrap();
        let child = world.get::<TransformHandle>(entities[1]).unwrap().0;
        let mut tree = world.resource_mut::<TransformTree>();
        assert_eq!(tree.world_position(child), Some(Vec2::new(15.0, 0.0)));
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let mut scene = SceneDescription::default();
        let mut orphan = ObjectDescription::new("orphan");
        orphan.parent = Some("missing".into());
        scene.objects.push(orphan);
        let err = scene.spawn(&mut World::new()).unwrap_err();
        assert!(matches!(err, SceneError::UnknownParent { .. }));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut scene = SceneDescription::default();
        scene.objects.push(ObjectDescription::new("twin"));
        scene.objects.push(ObjectDescription::new("twin"));
        let err = scene.spawn(&mut World::new()).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateName(name) if name == "twin"));
    }

    #[test]
    fn scene_layers_are_registered() {
        let scene = SceneDescription::from_json(
            r#"{ "layers": ["ghost"], "objects": [ { "name": "g", "layer": "ghost" } ] }"#,
        )
        .unwrap();
        let mut world = World::new();
        let entities = scene.spawn(&mut world).unwrap();
        assert_eq!(world.get::<GameObject>(entities[0]).unwrap().layer, "ghost");
        assert!(world.resource::<PhysicsSettings>().layer_index("ghost").is_ok());
    }

    #[test]
    fn demo_is_deterministic_and_spawnable() {
        let a = SceneDescription::demo(7, 12);
        assert_eq!(a, SceneDescription::demo(7, 12));
        assert_eq!(a.objects.len(), 17);
        let text = a.to_json().unwrap();
        assert_eq!(SceneDescription::from_json(&text).unwrap(), a);
        let mut world = World::new();
        assert_eq!(a.spawn(&mut world).unwrap().len(), 17);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            SceneDescription::from_json("{ \"objects\": 3 }"),
            Err(SceneError::Json(_))
        ));
    }
}
