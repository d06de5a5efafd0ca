//! Segment helpers.
//!
//! A segment is expressed as `origin + t * direction` with `t` in `[0, 1]`,
//! the same convention used by collider raycasts.

use glam::Vec2;

/// Roots `(t0, t1)` (with `t0 <= t1`) of `|origin + t*direction - center| = radius`,
/// or `None` when the infinite line misses the circle or the segment is a point.
fn line_circle_roots(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<(f32, f32)> {
    let a = direction.length_squared();
    if a == 0.0 {
        return None;
    }
    let m = origin - center;
    let b = 2.0 * m.dot(direction);
    let c = m.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    Some(((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)))
}

/// True if any part of the segment lies within the closed disk.
pub fn segment_intersects_circle(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> bool {
    if direction.length_squared() == 0.0 {
        return origin.distance_squared(center) <= radius * radius;
    }
    match line_circle_roots(origin, direction, center, radius) {
        Some((t0, t1)) => t0 <= 1.0 && t1 >= 0.0,
        None => false,
    }
}

/// Parameter of the first point where the segment enters the circle from
/// outside. Segments starting inside the circle report no hit.
pub fn segment_circle_entry(origin: Vec2, direction: Vec2, center: Vec2, radius: f32) -> Option<f32> {
    let (t0, _) = line_circle_roots(origin, direction, center, radius)?;
    (0.0..=1.0).contains(&t0).then_some(t0)
}

/// Parameter along `origin + t*direction` where it crosses the segment `a..b`.
/// Parallel segments report no hit.
pub fn segment_segment_hit(origin: Vec2, direction: Vec2, a: Vec2, b: Vec2) -> Option<f32> {
    let edge = b - a;
    let denom = direction.perp_dot(edge);
    if denom.abs() <= f32::EPSILON {
        return None;
    }
    let diff = a - origin;
    let t = diff.perp_dot(edge) / denom;
    let u = diff.perp_dot(direction) / denom;
    ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Closest crossing of the segment with the closed outline through `points`,
/// as `(t, normal)`. The normal is the edge normal facing the segment origin.
pub fn segment_polygon_hit(origin: Vec2, direction: Vec2, points: &[Vec2]) -> Option<(f32, Vec2)> {
    let mut best: Option<(f32, Vec2)> = None;
    for (i, &a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        let Some(t) = segment_segment_hit(origin, direction, a, b) else {
            continue;
        };
        if best.is_some_and(|(best_t, _)| best_t <= t) {
            continue;
        }
        let mut normal = (b - a).perp().normalize_or_zero();
        if normal.dot(direction) > 0.0 {
            normal = -normal;
        }
        best = Some((t, normal));
    }
    best
}

/// Parameter range `(t0, t1)` of the segment inside the closed rectangle
/// `min..max`, or `None` when the segment misses it.
pub fn segment_rect_clip(origin: Vec2, direction: Vec2, min: Vec2, max: Vec2) -> Option<(f32, f32)> {
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for axis in 0..2 {
        let (o, d, lo, hi) = (origin[axis], direction[axis], min[axis], max[axis]);
        if d == 0.0 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (mut near, mut far) = ((lo - o) / d, (hi - o) / d);
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }
        t0 = t0.max(near);
        t1 = t1.min(far);
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}
