//! Pixel-perfect collider.
//!
//! A [`PixelMask`] is a grid of opaque/transparent cells with `(0, 0)` at the
//! top-left and `y` growing downwards. Cells map to local space with unit
//! size, the y axis flipped to point up and the image centred on the collider
//! offset:
//!
//! ```text
//! col   = flip_x ? W-1-x : x
//! row   = flip_y ? H-1-y : y
//! local = (col - W/2 + ex, -(row - H/2 + ey)) + offset
//! ```
//!
//! where `ex`/`ey` are `1` for even dimensions and `0` for odd ones. The
//! inverse rounds to the nearest cell.

use glam::{IVec2, Vec2};

use crate::geometry::segment::segment_rect_clip;
use crate::resources::transformtree::WorldTransform;

/// Half-width of the window scanned around a hit pixel to estimate a normal.
pub const NORMAL_SAMPLE_RADIUS: i32 = 4;
/// Minimum number of opaque neighbours for a normal to be reported.
pub const NORMAL_MIN_NEIGHBOURS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelMask {
    width: usize,
    height: usize,
    opaque: Vec<bool>,
}

impl PixelMask {
    /// Fully transparent mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            opaque: vec![false; width * height],
        }
    }

    /// Build a mask from text rows where `#` or `X` marks an opaque cell.
    /// Short rows are padded with transparent cells.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Self {
        let width = rows
            .iter()
            .map(|r| r.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let mut mask = Self::new(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.as_ref().chars().enumerate() {
                mask.opaque[y * width + x] = matches!(c, '#' | 'X');
            }
        }
        mask
    }

    /// Build a mask from an alpha channel laid out row by row. Cells with
    /// alpha at or above `threshold` are opaque; missing samples are
    /// transparent.
    pub fn from_alpha(width: usize, height: usize, alpha: &[u8], threshold: u8) -> Self {
        let mut mask = Self::new(width, height);
        for (cell, a) in mask.opaque.iter_mut().zip(alpha) {
            *cell = *a >= threshold;
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    pub fn opaque_count(&self) -> usize {
        self.opaque.iter().filter(|o| **o).count()
    }

    /// Out-of-range coordinates are transparent.
    pub fn is_opaque(&self, pixel: IVec2) -> bool {
        self.index(pixel).is_some_and(|i| self.opaque[i])
    }

    pub fn set_opaque(&mut self, pixel: IVec2, opaque: bool) {
        if let Some(i) = self.index(pixel) {
            self.opaque[i] = opaque;
        }
    }

    pub fn opaque_pixels(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.opaque.iter().enumerate().filter_map(|(i, o)| {
            o.then(|| IVec2::new((i % self.width) as i32, (i / self.width) as i32))
        })
    }

    fn index(&self, pixel: IVec2) -> Option<usize> {
        let (x, y) = (usize::try_from(pixel.x).ok()?, usize::try_from(pixel.y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PixelCollider {
    pub mask: PixelMask,
    pub flip_x: bool,
    pub flip_y: bool,
}

fn parity(size: i32) -> i32 {
    if size % 2 == 0 { 1 } else { 0 }
}

impl PixelCollider {
    pub fn new(mask: PixelMask) -> Self {
        Self {
            mask,
            flip_x: false,
            flip_y: false,
        }
    }

    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    fn dims(&self) -> (i32, i32) {
        (self.mask.width as i32, self.mask.height as i32)
    }

    pub fn pixel_to_local(&self, offset: Vec2, pixel: IVec2) -> Vec2 {
        let (w, h) = self.dims();
        let col = if self.flip_x { w - 1 - pixel.x } else { pixel.x };
        let row = if self.flip_y { h - 1 - pixel.y } else { pixel.y };
        Vec2::new(
            (col - w / 2 + parity(w)) as f32,
            -((row - h / 2 + parity(h)) as f32),
        ) + offset
    }

    pub fn local_to_pixel(&self, offset: Vec2, point: Vec2) -> IVec2 {
        let (w, h) = self.dims();
        let q = point - offset;
        // Float to int casts saturate; far points clamp instead of wrapping.
        let col = ((q.x.round() as i32).saturating_add(w / 2)).saturating_sub(parity(w));
        let row = (((-q.y).round() as i32).saturating_add(h / 2)).saturating_sub(parity(h));
        IVec2::new(
            if self.flip_x { (w - 1).saturating_sub(col) } else { col },
            if self.flip_y { (h - 1).saturating_sub(row) } else { row },
        )
    }

    pub fn contains_local_point(&self, offset: Vec2, point: Vec2) -> bool {
        self.mask.is_opaque(self.local_to_pixel(offset, point))
    }

    /// Local positions of the corner cells.
    pub fn local_corners(&self, offset: Vec2) -> [Vec2; 4] {
        let (w, h) = self.dims();
        [
            IVec2::new(0, h - 1),
            IVec2::new(0, 0),
            IVec2::new(w - 1, 0),
            IVec2::new(w - 1, h - 1),
        ]
        .map(|p| self.pixel_to_local(offset, p))
    }

    /// Local rectangle covering every cell, padded by one cell on each side.
    fn local_bounds(&self, offset: Vec2) -> (Vec2, Vec2) {
        let corners = self.local_corners(offset);
        let min = corners.iter().copied().fold(Vec2::INFINITY, Vec2::min);
        let max = corners.iter().copied().fold(Vec2::NEG_INFINITY, Vec2::max);
        (min - Vec2::splat(1.5), max + Vec2::splat(1.5))
    }

    pub fn world_corners(&self, offset: Vec2, world: &WorldTransform) -> [Vec2; 4] {
        self.local_corners(offset)
            .map(|p| world.local_to_world.convert_point(p))
    }

    pub fn bounding_radius(&self, offset: Vec2, world: &WorldTransform) -> f32 {
        let center = world.local_to_world.convert_point(offset);
        let cell = world.scale.abs().max_element() * std::f32::consts::SQRT_2;
        self.world_corners(offset, world)
            .iter()
            .map(|c| c.distance(center))
            .fold(0.0, f32::max)
            + cell
    }

    /// Walk the cells from `from` to `to` (both included) with an integer
    /// line algorithm and return the first opaque cell.
    pub fn cast_pixels(&self, from: IVec2, to: IVec2) -> Option<IVec2> {
        let d = to - from;
        let (step_x, step_y) = (d.x.signum(), d.y.signum());
        let mut longest = d.x.abs();
        let mut shortest = d.y.abs();
        let mut straight = IVec2::new(step_x, 0);
        if longest <= shortest {
            std::mem::swap(&mut longest, &mut shortest);
            straight = IVec2::new(0, step_y);
        }
        let diagonal = IVec2::new(step_x, step_y);

        let mut numerator = longest >> 1;
        let mut current = from;
        for _ in 0..=longest {
            if self.mask.is_opaque(current) {
                return Some(current);
            }
            numerator += shortest;
            if numerator >= longest {
                numerator -= longest;
                current += diagonal;
            } else {
                current += straight;
            }
        }
        None
    }

    /// Local-space normal estimated from the opaque cells around `pixel`.
    /// Zero when fewer than [`NORMAL_MIN_NEIGHBOURS`] cells are opaque.
    pub fn surface_normal_local(&self, offset: Vec2, pixel: IVec2) -> Vec2 {
        let center = self.pixel_to_local(offset, pixel);
        let mut sum = Vec2::ZERO;
        let mut count = 0;
        for y in pixel.y - NORMAL_SAMPLE_RADIUS..=pixel.y + NORMAL_SAMPLE_RADIUS {
            for x in pixel.x - NORMAL_SAMPLE_RADIUS..=pixel.x + NORMAL_SAMPLE_RADIUS {
                let neighbour = IVec2::new(x, y);
                if neighbour == pixel || !self.mask.is_opaque(neighbour) {
                    continue;
                }
                sum += center - self.pixel_to_local(offset, neighbour);
                count += 1;
            }
        }
        if count < NORMAL_MIN_NEIGHBOURS {
            return Vec2::ZERO;
        }
        sum.normalize_or_zero()
    }

    /// First opaque cell crossed by the world segment
    /// `origin..origin + direction`, as `(point, normal)` in world space.
    /// Segments starting on an opaque cell report nothing.
    pub fn raycast(
        &self,
        offset: Vec2,
        world: &WorldTransform,
        origin: Vec2,
        direction: Vec2,
    ) -> Option<(Vec2, Vec2)> {
        let local_origin = world.world_to_local.convert_point(origin);
        let local_direction = world.world_to_local.convert_vector(direction);
        if self.mask.is_opaque(self.local_to_pixel(offset, local_origin)) {
            return None;
        }
        // Only the part of the segment over the mask (plus a cell of margin)
        // can hit, so the walk stays bounded by the mask size.
        let (min, max) = self.local_bounds(offset);
        let (t0, t1) = segment_rect_clip(local_origin, local_direction, min, max)?;
        let from = self.local_to_pixel(offset, local_origin + local_direction * t0);
        let to = self.local_to_pixel(offset, local_origin + local_direction * t1);
        let hit = self.cast_pixels(from, to)?;
        let point = world
            .local_to_world
            .convert_point(self.pixel_to_local(offset, hit));
        let normal = world
            .local_to_world
            .convert_vector(self.surface_normal_local(offset, hit))
            .normalize_or_zero();
        Some((point, normal))
    }
}
