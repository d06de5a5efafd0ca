//! Shared 2D camera resource.
//!
//! Holds the camera position, its size (world units per screen pixel) and the
//! output resolution, and derives four matrices used by the renderer and the
//! cursor:
//!
//! - world → screen: centred on `position`, scaled by `1 / size`, y flipped
//! - screen → world: inverse of the above
//! - ui → screen: origin at the screen centre, unit scale, y flipped
//! - screen → ui: inverse of the above
//!
//! Matrices are rebuilt lazily on first access after a change.

use bevy_ecs::prelude::Resource;
use glam::{UVec2, Vec2};
use log::error;
use thiserror::Error;

use crate::geometry::matrix::TransformationMatrix;

/// Smallest accepted camera size.
pub const MIN_CAMERA_SIZE: f32 = 0.01;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum CameraError {
    #[error("invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
    #[error("invalid camera size {0}")]
    InvalidSize(f32),
}

#[derive(Debug, Clone, Copy, Default)]
struct CameraMatrices {
    world_to_screen: TransformationMatrix,
    screen_to_world: TransformationMatrix,
    ui_to_screen: TransformationMatrix,
    screen_to_ui: TransformationMatrix,
}

#[derive(Resource, Debug, Clone)]
pub struct Camera {
    position: Vec2,
    size: f32,
    resolution: UVec2,
    cache: Option<CameraMatrices>,
}

fn invert(matrix: &TransformationMatrix) -> TransformationMatrix {
    matrix.try_inverse().unwrap_or_else(|e| {
        error!("Cannot invert camera matrix: {}", e);
        TransformationMatrix::DEGENERATE
    })
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Result<Self, CameraError> {
        let mut camera = Self {
            position: Vec2::ZERO,
            size: 1.0,
            resolution: UVec2::ONE,
            cache: None,
        };
        camera.set_resolution(width, height)?;
        Ok(camera)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.cache = None;
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Sizes below [`MIN_CAMERA_SIZE`] are raised to it.
    pub fn set_size(&mut self, size: f32) -> Result<(), CameraError> {
        if !size.is_finite() {
            return Err(CameraError::InvalidSize(size));
        }
        self.size = size.max(MIN_CAMERA_SIZE);
        self.cache = None;
        Ok(())
    }

    pub fn resolution(&self) -> UVec2 {
        self.resolution
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) -> Result<(), CameraError> {
        if width == 0 || height == 0 {
            return Err(CameraError::InvalidResolution { width, height });
        }
        let resolution = UVec2::new(width, height);
        if resolution != self.resolution {
            self.resolution = resolution;
            self.cache = None;
        }
        Ok(())
    }

    fn matrices(&mut self) -> CameraMatrices {
        if let Some(cache) = self.cache {
            return cache;
        }
        let half = self.resolution.as_vec2() * 0.5;
        let inv_size = 1.0 / self.size;
        let world_to_screen = TransformationMatrix::world_to_screen(
            half + Vec2::new(-self.position.x, self.position.y) * inv_size,
            Vec2::splat(inv_size),
        );
        let ui_to_screen = TransformationMatrix::world_to_screen(half, Vec2::ONE);
        let cache = CameraMatrices {
            world_to_screen,
            screen_to_world: invert(&world_to_screen),
            ui_to_screen,
            screen_to_ui: invert(&ui_to_screen),
        };
        self.cache = Some(cache);
        cache
    }

    pub fn world_to_screen_matrix(&mut self) -> TransformationMatrix {
        self.matrices().world_to_screen
    }

    pub fn screen_to_world_matrix(&mut self) -> TransformationMatrix {
        self.matrices().screen_to_world
    }

    pub fn ui_to_screen_matrix(&mut self) -> TransformationMatrix {
        self.matrices().ui_to_screen
    }

    pub fn screen_to_ui_matrix(&mut self) -> TransformationMatrix {
        self.matrices().screen_to_ui
    }

    pub fn screen_to_world(&mut self, screen: Vec2) -> Vec2 {
        self.screen_to_world_matrix().convert_point(screen)
    }

    pub fn world_to_screen(&mut self, world: Vec2) -> Vec2 {
        self.world_to_screen_matrix().convert_point(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_approx_eq(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn camera_position_maps_to_screen_centre() {
        let mut cam = Camera::new(800, 600).unwrap();
        cam.set_position(Vec2::new(100.0, 50.0));
        cam.set_size(2.0).unwrap();
        assert!(vec_approx_eq(cam.world_to_screen(Vec2::new(100.0, 50.0)), Vec2::new(400.0, 300.0)));
        // 20 world units right and up is 10 pixels right and up
        assert!(vec_approx_eq(cam.world_to_screen(Vec2::new(120.0, 70.0)), Vec2::new(410.0, 290.0)));
    }

    #[test]
    fn screen_to_world_inverts() {
        let mut cam = Camera::new(640, 360).unwrap();
        cam.set_position(Vec2::new(-30.0, 12.0));
        cam.set_size(0.5).unwrap();
        let p = Vec2::new(5.0, -7.0);
        let screen = cam.world_to_screen(p);
        assert!(vec_approx_eq(cam.screen_to_world(screen), p));
    }

    #[test]
    fn ui_origin_is_screen_centre() {
        let mut cam = Camera::new(200, 100).unwrap();
        let m = cam.ui_to_screen_matrix();
        assert!(vec_approx_eq(m.convert_point(Vec2::ZERO), Vec2::new(100.0, 50.0)));
        let back = cam.screen_to_ui_matrix().convert_point(Vec2::new(100.0, 0.0));
        assert!(vec_approx_eq(back, Vec2::new(0.0, 50.0)));
    }

    #[test]
    fn size_is_clamped_and_validated() {
        let mut cam = Camera::new(10, 10).unwrap();
        cam.set_size(0.0).unwrap();
        assert_eq!(cam.size(), MIN_CAMERA_SIZE);
        assert!(matches!(cam.set_size(f32::NAN), Err(CameraError::InvalidSize(_))));
        assert_eq!(cam.size(), MIN_CAMERA_SIZE);
    }

    #[test]
    fn zero_resolution_is_rejected() {
        assert!(matches!(
            Camera::new(0, 10),
            Err(CameraError::InvalidResolution { width: 0, height: 10 })
        ));
    }
}
