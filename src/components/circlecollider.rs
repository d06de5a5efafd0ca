use std::f32::consts::TAU;

use glam::Vec2;

use crate::geometry::segment::segment_circle_entry;
use crate::resources::transformtree::WorldTransform;

/// Circle centred on the collider offset. The radius is expressed in local
/// units, so a non-uniform world scale turns it into an ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCollider {
    pub radius: f32,
}

impl CircleCollider {
    pub fn new(radius: f32) -> Self {
        Self {
            radius: radius.abs(),
        }
    }

    pub fn center(&self, offset: Vec2, world: &WorldTransform) -> Vec2 {
        world.local_to_world.convert_point(offset)
    }

    /// Radius in world units. Only defined when the world scale is uniform.
    pub fn world_radius(&self, world: &WorldTransform) -> Option<f32> {
        world
            .is_scale_uniform()
            .then(|| self.radius * world.scale.x.abs())
    }

    /// Radius of a circle that contains the shape whatever the scale.
    pub fn bounding_radius(&self, world: &WorldTransform) -> f32 {
        self.radius * world.scale.x.abs().max(world.scale.y.abs())
    }

    pub fn contains_local_point(&self, offset: Vec2, point: Vec2) -> bool {
        point.distance_squared(offset) <= self.radius * self.radius
    }

    /// `count` points evenly spread over the outline, in world space.
    pub fn world_points(&self, offset: Vec2, world: &WorldTransform, count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|i| {
                let angle = TAU * i as f32 / count as f32;
                let local = offset + Vec2::from_angle(angle) * self.radius;
                world.local_to_world.convert_point(local)
            })
            .collect()
    }

    /// First entry point of the world segment `origin..origin + direction`
    /// and the outward surface normal there.
    pub fn raycast(
        &self,
        offset: Vec2,
        world: &WorldTransform,
        origin: Vec2,
        direction: Vec2,
    ) -> Option<(Vec2, Vec2)> {
        let local_origin = world.world_to_local.convert_point(origin);
        let local_direction = world.world_to_local.convert_vector(direction);
        let t = segment_circle_entry(local_origin, local_direction, offset, self.radius)?;
        let local_normal = local_origin + local_direction * t - offset;
        // normals transform with the inverse transpose
        let normal = world.world_to_local.as_affine().matrix2.transpose() * local_normal;
        Some((origin + direction * t, normal.normalize_or_zero()))
    }
}
