use glam::Vec2;

use crate::resources::transformtree::WorldTransform;

/// Convex polygon given as an ordered list of local-space vertices. The
/// collider offset is added to every vertex.
///
/// Concave outlines are accepted but the overlap tests treat them as their
/// convex hull would behave under the separating axis test, which is not
/// exact.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonCollider {
    pub points: Vec<Vec2>,
}

impl PolygonCollider {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    pub fn set_points(&mut self, points: Vec<Vec2>) {
        self.points = points;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn local_points(&self, offset: Vec2) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(move |p| *p + offset)
    }

    pub fn world_points(&self, offset: Vec2, world: &WorldTransform) -> Vec<Vec2> {
        self.local_points(offset)
            .map(|p| world.local_to_world.convert_point(p))
            .collect()
    }

    /// Vertex average in local space. Falls back to the offset when empty.
    pub fn local_centroid(&self, offset: Vec2) -> Vec2 {
        if self.points.is_empty() {
            return offset;
        }
        let sum: Vec2 = self.points.iter().copied().sum();
        offset + sum / self.points.len() as f32
    }

    /// Point containment in local space, edges included. Works for either
    /// winding; polygons with fewer than three vertices contain nothing.
    pub fn contains_local_point(&self, offset: Vec2, point: Vec2) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut positive = false;
        let mut negative = false;
        let n = self.points.len();
        for i in 0..n {
            let a = self.points[i] + offset;
            let b = self.points[(i + 1) % n] + offset;
            let cross = (b - a).perp_dot(point - a);
            positive |= cross > 0.0;
            negative |= cross < 0.0;
            if positive && negative {
                return false;
            }
        }
        true
    }

    pub fn bounding_radius(&self, offset: Vec2, world: &WorldTransform) -> f32 {
        let center = world
            .local_to_world
            .convert_point(self.local_centroid(offset));
        self.world_points(offset, world)
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> PolygonCollider {
        PolygonCollider::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 4.0),
        ])
    }

    #[test]
    fn contains_point_for_both_windings() {
        let ccw = triangle();
        let mut cw = triangle();
        cw.points.reverse();
        for poly in [ccw, cw] {
            assert!(poly.contains_local_point(Vec2::ZERO, Vec2::new(1.0, 1.0)));
            assert!(!poly.contains_local_point(Vec2::ZERO, Vec2::new(3.0, 3.0)));
        }
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let line = PolygonCollider::new(vec![Vec2::ZERO, Vec2::X]);
        assert!(!line.contains_local_point(Vec2::ZERO, Vec2::ZERO));
    }

    #[test]
    fn centroid_includes_offset() {
        let poly = triangle();
        let c = poly.local_centroid(Vec2::new(1.0, 1.0));
        assert!((c - Vec2::new(1.0 + 4.0 / 3.0, 1.0 + 4.0 / 3.0)).length() < 1e-5);
    }
}
