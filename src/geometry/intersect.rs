//! Collider overlap tests.
//!
//! [`colliders_overlap`] dispatches on the pair of shapes. Every unordered
//! pair of shape kinds has one handler; reversed pairs swap their arguments,
//! so `overlap(a, b) == overlap(b, a)`.
//!
//! | pair              | test                                                   |
//! |-------------------|--------------------------------------------------------|
//! | box / box         | local-frame AABB when rotations match, SAT otherwise   |
//! | circle / circle   | distance when scale is uniform, polygonised otherwise  |
//! | circle / box,poly | centre containment then edge vs circle in circle space |
//! | box,poly / poly   | SAT over edge normals                                  |
//! | pixel / pixel     | opaque cells of the smaller mask against the other,    |
//! |                   | both ways when the masks have the same area            |
//! | pixel / analytic  | never overlaps                                         |

use std::cmp::Ordering;

use glam::{IVec2, Vec2};

use crate::components::collider::{
    BoxCollider, CIRCLE_POLYGON_POINTS, CircleCollider, Collider, ColliderShape, PixelCollider,
};
use crate::geometry::segment::segment_intersects_circle;
use crate::resources::transformtree::WorldTransform;

/// Rotations closer than this (degrees) are treated as equal.
const ROTATION_TOLERANCE: f32 = 1e-4;

/// A collider together with its owner's resolved world transform.
#[derive(Debug, Clone, Copy)]
pub struct PlacedCollider<'a> {
    pub collider: &'a Collider,
    pub world: &'a WorldTransform,
}

impl<'a> PlacedCollider<'a> {
    pub fn new(collider: &'a Collider, world: &'a WorldTransform) -> Self {
        Self { collider, world }
    }

    pub fn center(&self) -> Vec2 {
        self.collider.center(self.world)
    }

    pub fn offset(&self) -> Vec2 {
        self.collider.offset
    }

    pub fn is_point_inside(&self, point: Vec2) -> bool {
        self.collider.is_point_inside(self.world, point)
    }

    pub fn outline(&self) -> Vec<Vec2> {
        self.collider.world_outline(self.world)
    }
}

pub fn colliders_overlap(a: PlacedCollider, b: PlacedCollider) -> bool {
    use ColliderShape as S;
    match (&a.collider.shape, &b.collider.shape) {
        (S::Box(ba), S::Box(bb)) => box_box_overlap(a, ba, b, bb),
        (S::Circle(ca), S::Circle(cb)) => circle_circle_overlap(a, ca, b, cb),
        (S::Circle(c), S::Box(_) | S::Polygon(_)) => circle_polygon_overlap(a, c, b, &b.outline()),
        (S::Box(_) | S::Polygon(_), S::Circle(_)) => colliders_overlap(b, a),
        (S::Box(_) | S::Polygon(_), S::Box(_) | S::Polygon(_)) => {
            convex_polygons_overlap(&a.outline(), &b.outline())
        }
        (S::Pixel(pa), S::Pixel(pb)) => pixel_pixel_overlap(a, pa, b, pb),
        (S::Pixel(_), _) | (_, S::Pixel(_)) => false,
    }
}

fn box_box_overlap(a: PlacedCollider, ba: &BoxCollider, b: PlacedCollider, bb: &BoxCollider) -> bool {
    if (a.world.rotation - b.world.rotation).abs() > ROTATION_TOLERANCE {
        return convex_polygons_overlap(
            &ba.world_corners(a.offset(), a.world),
            &bb.world_corners(b.offset(), b.world),
        );
    }
    // Same orientation: both boxes are axis aligned in A's local frame.
    let b_to_a = a.world.world_to_local * b.world.local_to_world;
    let p0 = b_to_a.convert_point(bb.bottom_left_local(b.offset()));
    let p1 = b_to_a.convert_point(bb.top_right_local(b.offset()));
    let (min_b, max_b) = (p0.min(p1), p0.max(p1));
    let min_a = ba.bottom_left_local(a.offset());
    let max_a = ba.top_right_local(a.offset());
    min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
}

fn circle_circle_overlap(
    a: PlacedCollider,
    ca: &CircleCollider,
    b: PlacedCollider,
    cb: &CircleCollider,
) -> bool {
    if let (Some(ra), Some(rb)) = (ca.world_radius(a.world), cb.world_radius(b.world)) {
        let reach = ra + rb;
        return a.center().distance_squared(b.center()) <= reach * reach;
    }
    let reach = ca.bounding_radius(a.world) + cb.bounding_radius(b.world);
    if a.center().distance_squared(b.center()) > reach * reach {
        return false;
    }
    // Each side is polygonised against the other's exact ellipse; either
    // finding a contact counts so the answer is the same in both orders.
    let outline_b = cb.world_points(b.offset(), b.world, CIRCLE_POLYGON_POINTS);
    if circle_polygon_overlap(a, ca, b, &outline_b) {
        return true;
    }
    let outline_a = ca.world_points(a.offset(), a.world, CIRCLE_POLYGON_POINTS);
    circle_polygon_overlap(b, cb, a, &outline_a)
}

/// Circle against any outline: centre containment either way, then each edge
/// against the circle in the circle's local space.
fn circle_polygon_overlap(
    circle: PlacedCollider,
    shape: &CircleCollider,
    other: PlacedCollider,
    outline: &[Vec2],
) -> bool {
    if circle.is_point_inside(other.center()) || other.is_point_inside(circle.center()) {
        return true;
    }
    let to_local = circle.world.world_to_local;
    edges(outline).any(|(from, to)| {
        let start = to_local.convert_point(from);
        let end = to_local.convert_point(to);
        segment_intersects_circle(start, end - start, circle.offset(), shape.radius)
    })
}

/// Separating axis test over the edge normals of both outlines. Touching
/// outlines overlap. Outlines with fewer than two points never overlap.
pub fn convex_polygons_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.len() < 2 || b.len() < 2 {
        return false;
    }
    edge_normals(a).chain(edge_normals(b)).all(|axis| {
        let (min_a, max_a) = project(a, axis);
        let (min_b, max_b) = project(b, axis);
        !(max_a < min_b || max_b < min_a)
    })
}

fn pixel_pixel_overlap(
    a: PlacedCollider,
    pa: &PixelCollider,
    b: PlacedCollider,
    pb: &PixelCollider,
) -> bool {
    match pa.mask.area().cmp(&pb.mask.area()) {
        Ordering::Less => mask_hits(a, pa, b),
        Ordering::Greater => mask_hits(b, pb, a),
        Ordering::Equal => mask_hits(a, pa, b) || mask_hits(b, pb, a),
    }
}

/// True if any opaque cell of `walker` lands inside `target`.
fn mask_hits(walker: PlacedCollider, mask: &PixelCollider, target: PlacedCollider) -> bool {
    mask.mask.opaque_pixels().any(|pixel: IVec2| {
        let local = mask.pixel_to_local(walker.offset(), pixel);
        target.is_point_inside(walker.world.local_to_world.convert_point(local))
    })
}

/// Consecutive vertex pairs, closing the outline from last to first.
pub(crate) fn edges(points: &[Vec2]) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
    points
        .iter()
        .copied()
        .zip(points.iter().copied().cycle().skip(1))
}

pub(crate) fn edge_normals(points: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    edges(points).map(|(from, to)| (to - from).perp())
}

/// `(min, max)` of the points projected on `axis`.
pub(crate) fn project(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points
        .iter()
        .map(|p| p.dot(axis))
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)))
}
