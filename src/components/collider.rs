//! Collider component.
//!
//! A [`Collider`] attaches one shape to an entity's transform. The shape is
//! described in the owner's local space and follows the owner's world
//! transform. Solid colliders take part in collision resolution; triggers only
//! report enter/stay/exit overlaps.
//!
//! Shapes:
//! - [`BoxCollider`] – rectangle given by half extents
//! - [`CircleCollider`] – circle given by a radius in local units
//! - [`PolygonCollider`] – convex vertex list
//! - [`PixelCollider`] – opacity mask with optional flips

use bevy_ecs::prelude::Component;
use glam::Vec2;

pub use crate::components::boxcollider::BoxCollider;
pub use crate::components::circlecollider::CircleCollider;
pub use crate::components::pixelcollider::{PixelCollider, PixelMask};
pub use crate::components::polygoncollider::PolygonCollider;
use crate::geometry::segment::segment_polygon_hit;
use crate::resources::transformtree::WorldTransform;

/// Number of outline points used when a circle is approximated by a polygon.
pub const CIRCLE_POLYGON_POINTS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColliderState {
    #[default]
    Solid,
    Trigger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Box(BoxCollider),
    Circle(CircleCollider),
    Polygon(PolygonCollider),
    Pixel(PixelCollider),
}

impl ColliderShape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColliderShape::Box(_) => "box",
            ColliderShape::Circle(_) => "circle",
            ColliderShape::Polygon(_) => "polygon",
            ColliderShape::Pixel(_) => "pixel",
        }
    }
}

impl From<BoxCollider> for ColliderShape {
    fn from(value: BoxCollider) -> Self {
        ColliderShape::Box(value)
    }
}

impl From<CircleCollider> for ColliderShape {
    fn from(value: CircleCollider) -> Self {
        ColliderShape::Circle(value)
    }
}

impl From<PolygonCollider> for ColliderShape {
    fn from(value: PolygonCollider) -> Self {
        ColliderShape::Polygon(value)
    }
}

impl From<PixelCollider> for ColliderShape {
    fn from(value: PixelCollider) -> Self {
        ColliderShape::Pixel(value)
    }
}

/// Result of a successful raycast against a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderHit {
    /// World-space point where the segment first touches the shape.
    pub point: Vec2,
    /// World-space surface normal at `point`. May be zero for pixel masks
    /// with too few opaque neighbours around the hit.
    pub normal: Vec2,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
    /// Local-space displacement of the shape from the owner's pivot.
    pub offset: Vec2,
    pub state: ColliderState,
    /// Inactive colliders are ignored by every physics query.
    pub active: bool,
}

impl Collider {
    pub fn new(shape: impl Into<ColliderShape>) -> Self {
        Self {
            shape: shape.into(),
            offset: Vec2::ZERO,
            state: ColliderState::Solid,
            active: true,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_state(mut self, state: ColliderState) -> Self {
        self.state = state;
        self
    }

    pub fn trigger(self) -> Self {
        self.with_state(ColliderState::Trigger)
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_trigger(&self) -> bool {
        self.state == ColliderState::Trigger
    }

    pub fn is_solid(&self) -> bool {
        self.state == ColliderState::Solid
    }

    /// World-space centre of the shape.
    pub fn center(&self, world: &WorldTransform) -> Vec2 {
        let local = match &self.shape {
            ColliderShape::Polygon(p) => p.local_centroid(self.offset),
            _ => self.offset,
        };
        world.local_to_world.convert_point(local)
    }

    /// Outline in world space. Circles are approximated with
    /// [`CIRCLE_POLYGON_POINTS`] points; pixel masks report their corner cells.
    pub fn world_outline(&self, world: &WorldTransform) -> Vec<Vec2> {
        match &self.shape {
            ColliderShape::Box(b) => b.world_corners(self.offset, world).to_vec(),
            ColliderShape::Circle(c) => c.world_points(self.offset, world, CIRCLE_POLYGON_POINTS),
            ColliderShape::Polygon(p) => p.world_points(self.offset, world),
            ColliderShape::Pixel(p) => p.world_corners(self.offset, world).to_vec(),
        }
    }

    /// `(center, radius)` of a world-space circle enclosing the shape.
    pub fn bounding_circle(&self, world: &WorldTransform) -> (Vec2, f32) {
        let radius = match &self.shape {
            ColliderShape::Box(b) => b.bounding_radius(self.offset, world),
            ColliderShape::Circle(c) => c.bounding_radius(world),
            ColliderShape::Polygon(p) => p.bounding_radius(self.offset, world),
            ColliderShape::Pixel(p) => p.bounding_radius(self.offset, world),
        };
        (self.center(world), radius)
    }

    /// True if the world-space point lies inside the shape (edges included).
    pub fn is_point_inside(&self, world: &WorldTransform, point: Vec2) -> bool {
        let local = world.world_to_local.convert_point(point);
        match &self.shape {
            ColliderShape::Box(b) => b.contains_local_point(self.offset, local),
            ColliderShape::Circle(c) => c.contains_local_point(self.offset, local),
            ColliderShape::Polygon(p) => p.contains_local_point(self.offset, local),
            ColliderShape::Pixel(p) => p.contains_local_point(self.offset, local),
        }
    }

    /// Cast the world segment `origin..origin + direction` against the shape.
    /// Segments starting inside the shape report no hit.
    pub fn raycast(&self, world: &WorldTransform, origin: Vec2, direction: Vec2) -> Option<ColliderHit> {
        let (point, normal) = match &self.shape {
            ColliderShape::Circle(c) => c.raycast(self.offset, world, origin, direction)?,
            ColliderShape::Pixel(p) => p.raycast(self.offset, world, origin, direction)?,
            ColliderShape::Box(_) | ColliderShape::Polygon(_) => {
                if self.is_point_inside(world, origin) {
                    return None;
                }
                let outline = self.world_outline(world);
                let (t, normal) = segment_polygon_hit(origin, direction, &outline)?;
                (origin + direction * t, normal)
            }
        };
        Some(ColliderHit { point, normal })
    }
}
