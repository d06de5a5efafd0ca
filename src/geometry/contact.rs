//! Contact normal and penetration depth for overlapping colliders.
//!
//! The normal always points from A towards B. Pixel masks and degenerate
//! shapes fall back to the direction between the two centres with zero
//! penetration, which still lets the resolver exchange impulses.

use glam::Vec2;

use crate::components::collider::{CIRCLE_POLYGON_POINTS, CircleCollider, ColliderShape};
use crate::geometry::intersect::{PlacedCollider, edge_normals, project};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit vector from A towards B.
    pub normal: Vec2,
    /// Overlap depth along `normal`, never negative.
    pub penetration: f32,
}

impl Contact {
    fn oriented(normal: Vec2, penetration: f32, a_center: Vec2, b_center: Vec2) -> Self {
        let normal = if normal.dot(b_center - a_center) < 0.0 {
            -normal
        } else {
            normal
        };
        Self {
            normal,
            penetration: penetration.max(0.0),
        }
    }

    fn fallback(a_center: Vec2, b_center: Vec2) -> Self {
        Self {
            normal: (b_center - a_center).try_normalize().unwrap_or(Vec2::X),
            penetration: 0.0,
        }
    }
}

/// Contact for a pair already known to overlap.
pub fn compute_contact(a: PlacedCollider, b: PlacedCollider) -> Contact {
    use ColliderShape as S;
    let (ca, cb) = (a.center(), b.center());
    let found = match (&a.collider.shape, &b.collider.shape) {
        (S::Pixel(_), _) | (_, S::Pixel(_)) => None,
        (S::Circle(sa), S::Circle(sb)) => {
            match (sa.world_radius(a.world), sb.world_radius(b.world)) {
                (Some(ra), Some(rb)) => circle_circle(ca, ra, cb, rb),
                _ => polygons_mtv(&outline(a), &outline(b)),
            }
        }
        (S::Circle(c), S::Box(_) | S::Polygon(_)) => match c.world_radius(a.world) {
            Some(r) => circle_polygon_mtv(ca, r, &b.outline()),
            None => polygons_mtv(&outline(a), &b.outline()),
        },
        (S::Box(_) | S::Polygon(_), S::Circle(c)) => match c.world_radius(b.world) {
            Some(r) => circle_polygon_mtv(cb, r, &a.outline()),
            None => polygons_mtv(&a.outline(), &outline(b)),
        },
        (S::Box(_) | S::Polygon(_), S::Box(_) | S::Polygon(_)) => {
            polygons_mtv(&a.outline(), &b.outline())
        }
    };
    match found {
        Some((normal, depth)) => Contact::oriented(normal, depth, ca, cb),
        None => Contact::fallback(ca, cb),
    }
}

/// Outline of a placed collider, with circles approximated by a polygon.
fn outline(placed: PlacedCollider) -> Vec<Vec2> {
    match &placed.collider.shape {
        ColliderShape::Circle(c) => circle_outline(c, placed),
        _ => placed.outline(),
    }
}

fn circle_outline(c: &CircleCollider, placed: PlacedCollider) -> Vec<Vec2> {
    c.world_points(placed.offset(), placed.world, CIRCLE_POLYGON_POINTS)
}

fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<(Vec2, f32)> {
    let delta = cb - ca;
    let distance = delta.length();
    let normal = delta.try_normalize().unwrap_or(Vec2::X);
    Some((normal, ra + rb - distance))
}

/// Minimum translation axis between two convex outlines.
fn polygons_mtv(a: &[Vec2], b: &[Vec2]) -> Option<(Vec2, f32)> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    min_overlap_axis(edge_normals(a).chain(edge_normals(b)), |axis| {
        (project(a, axis), project(b, axis))
    })
}

/// Minimum translation axis between a circle and a convex outline. Besides
/// the edge normals, the axis towards the closest vertex is tested.
fn circle_polygon_mtv(center: Vec2, radius: f32, polygon: &[Vec2]) -> Option<(Vec2, f32)> {
    if polygon.len() < 2 {
        return None;
    }
    let closest = polygon
        .iter()
        .copied()
        .min_by(|p, q| p.distance_squared(center).total_cmp(&q.distance_squared(center)))?;
    let axes = edge_normals(polygon).chain(std::iter::once(closest - center));
    min_overlap_axis(axes, |axis| {
        let c = center.dot(axis);
        ((c - radius, c + radius), project(polygon, axis))
    })
}

fn min_overlap_axis(
    axes: impl Iterator<Item = Vec2>,
    projections: impl Fn(Vec2) -> ((f32, f32), (f32, f32)),
) -> Option<(Vec2, f32)> {
    let mut best: Option<(Vec2, f32)> = None;
    for axis in axes.filter_map(|a| a.try_normalize()) {
        let ((min_a, max_a), (min_b, max_b)) = projections(axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if best.is_none_or(|(_, depth)| overlap < depth) {
            best = Some((axis, overlap));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::collider::{BoxCollider, Collider, PixelCollider, PixelMask};
    use crate::resources::transformtree::WorldTransform;

    fn at(x: f32, y: f32) -> WorldTransform {
        WorldTransform::from_parts(Vec2::new(x, y), 0.0, Vec2::ONE)
    }

    fn contact(ca: &Collider, wa: &WorldTransform, cb: &Collider, wb: &WorldTransform) -> Contact {
        compute_contact(PlacedCollider::new(ca, wa), PlacedCollider::new(cb, wb))
    }

    #[test]
    fn circles_push_along_centre_line() {
        let c = Collider::new(CircleCollider::new(1.0));
        let hit = contact(&c, &at(0.0, 0.0), &c, &at(1.5, 0.0));
        assert!((hit.normal - Vec2::X).length() < 1e-5);
        assert!((hit.penetration - 0.5).abs() < 1e-5);
    }

    #[test]
    fn boxes_pick_shallowest_axis() {
        let b = Collider::new(BoxCollider::new(2.0, 2.0));
        let hit = contact(&b, &at(0.0, 0.0), &b, &at(0.0, -1.8));
        assert!((hit.normal - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!((hit.penetration - 0.2).abs() < 1e-4);
    }

    #[test]
    fn normal_points_from_a_to_b_in_both_orders() {
        let b = Collider::new(BoxCollider::new(2.0, 2.0));
        let c = Collider::new(CircleCollider::new(1.0));
        let forward = contact(&b, &at(0.0, 0.0), &c, &at(1.5, 0.0));
        let backward = contact(&c, &at(1.5, 0.0), &b, &at(0.0, 0.0));
        assert!((forward.normal - Vec2::X).length() < 1e-5);
        assert!((backward.normal + Vec2::X).length() < 1e-5);
        assert!((forward.penetration - 0.5).abs() < 1e-4);
    }

    #[test]
    fn pixel_contact_uses_centre_direction() {
        let p = Collider::new(PixelCollider::new(PixelMask::from_rows(&["#"])));
        let hit = contact(&p, &at(0.0, 0.0), &p, &at(0.0, 2.0));
        assert_eq!(hit.normal, Vec2::Y);
        assert_eq!(hit.penetration, 0.0);
    }

    #[test]
    fn coincident_centres_get_a_fallback_normal() {
        let p = Collider::new(PixelCollider::new(PixelMask::from_rows(&["#"])));
        let hit = contact(&p, &at(0.0, 0.0), &p, &at(0.0, 0.0));
        assert_eq!(hit.normal.length(), 1.0);
    }
}
