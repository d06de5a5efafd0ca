use glam::Vec2;

use crate::resources::transformtree::WorldTransform;

/// Rectangle centred on the collider offset, described by its half extents
/// in the owner's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider {
    pub half_extents: Vec2,
}

impl BoxCollider {
    /// Create a BoxCollider with given size.
    /// Negative sizes are normalised to their absolute value.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            half_extents: Vec2::new(width, height).abs() * 0.5,
        }
    }

    pub fn from_half_extents(half_extents: Vec2) -> Self {
        Self {
            half_extents: half_extents.abs(),
        }
    }

    /// Full width and height.
    pub fn size(&self) -> Vec2 {
        self.half_extents * 2.0
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.half_extents = size.abs() * 0.5;
    }

    pub fn bottom_left_local(&self, offset: Vec2) -> Vec2 {
        offset - self.half_extents
    }

    pub fn top_right_local(&self, offset: Vec2) -> Vec2 {
        offset + self.half_extents
    }

    /// Corners in local space: bottom-left, top-left, top-right, bottom-right.
    pub fn local_corners(&self, offset: Vec2) -> [Vec2; 4] {
        let bl = self.bottom_left_local(offset);
        let tr = self.top_right_local(offset);
        [bl, Vec2::new(bl.x, tr.y), tr, Vec2::new(tr.x, bl.y)]
    }

    pub fn world_corners(&self, offset: Vec2, world: &WorldTransform) -> [Vec2; 4] {
        self.local_corners(offset)
            .map(|corner| world.local_to_world.convert_point(corner))
    }

    /// Point containment in local space, edges included.
    pub fn contains_local_point(&self, offset: Vec2, point: Vec2) -> bool {
        let d = (point - offset).abs();
        d.x <= self.half_extents.x && d.y <= self.half_extents.y
    }

    pub fn bounding_radius(&self, offset: Vec2, world: &WorldTransform) -> f32 {
        let center = world.local_to_world.convert_point(offset);
        self.world_corners(offset, world)
            .iter()
            .map(|c| c.distance(center))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn new_normalizes_negative_size() {
        let b = BoxCollider::new(-4.0, 2.0);
        assert_eq!(b.half_extents, Vec2::new(2.0, 1.0));
        assert_eq!(b.size(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn corners_follow_offset() {
        let b = BoxCollider::new(2.0, 2.0);
        let corners = b.local_corners(Vec2::new(10.0, 0.0));
        assert_eq!(corners[0], Vec2::new(9.0, -1.0));
        assert_eq!(corners[2], Vec2::new(11.0, 1.0));
    }

    #[test]
    fn world_corners_apply_rotation_and_scale() {
        let b = BoxCollider::new(2.0, 2.0);
        let world = WorldTransform::from_parts(Vec2::new(5.0, 5.0), 90.0, Vec2::new(2.0, 1.0));
        let corners = b.world_corners(Vec2::ZERO, &world);
        // bottom-left (-1,-1) scaled (-2,-1) rotated ccw (1,-2) translated (6,3)
        assert!(vec_approx_eq(corners[0], Vec2::new(6.0, 3.0)));
    }

    #[test]
    fn contains_point_includes_edges() {
        let b = BoxCollider::new(2.0, 2.0);
        assert!(b.contains_local_point(Vec2::ZERO, Vec2::new(1.0, 1.0)));
        assert!(!b.contains_local_point(Vec2::ZERO, Vec2::new(1.01, 0.0)));
    }
}
