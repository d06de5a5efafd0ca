//! 2D affine transformation matrix.
//!
//! [`TransformationMatrix`] wraps a [`glam::Affine2`] (a 2×2 linear part plus a
//! translation, i.e. the upper two rows of a 3×3 homogeneous matrix). Points
//! are affected by translation, vectors are not.
//!
//! Composition follows the usual column-vector convention: `a * b` applies `b`
//! first and `a` second. [`TransformationMatrix::then`] reads left to right.

use std::ops::Mul;

use glam::{Affine2, Mat2, Vec2};
use thiserror::Error;

/// Errors produced by matrix operations.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum MatrixError {
    #[error("matrix is not invertible (determinant {0})")]
    Singular(f32),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformationMatrix(Affine2);

impl Default for TransformationMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformationMatrix {
    pub const IDENTITY: Self = Self(Affine2::IDENTITY);

    /// Matrix that collapses every point onto the origin. Used as the result of
    /// a failed inversion so that downstream geometry degenerates instead of
    /// panicking.
    pub const DEGENERATE: Self = Self(Affine2::ZERO);

    pub fn from_affine(affine: Affine2) -> Self {
        Self(affine)
    }

    pub fn from_translation(translation: Vec2) -> Self {
        Self(Affine2::from_translation(translation))
    }

    /// Counter-clockwise rotation in degrees (y axis pointing up).
    pub fn from_rotation_degrees(degrees: f32) -> Self {
        Self(Affine2::from_angle(degrees.to_radians()))
    }

    pub fn from_scale(scale: Vec2) -> Self {
        Self(Affine2::from_scale(scale))
    }

    /// `Translate(translation) ∘ Rotate(degrees) ∘ Scale(scale)`.
    pub fn from_translation_rotation_scale(translation: Vec2, degrees: f32, scale: Vec2) -> Self {
        Self(Affine2::from_scale_angle_translation(
            scale,
            degrees.to_radians(),
            translation,
        ))
    }

    /// World (y up) to screen (y down) mapping: scales by `scale`, flips the
    /// y axis and then translates by `translation` in screen space.
    pub fn world_to_screen(translation: Vec2, scale: Vec2) -> Self {
        Self(Affine2::from_mat2_translation(
            Mat2::from_diagonal(Vec2::new(scale.x, -scale.y)),
            translation,
        ))
    }

    /// Apply `self` first and `next` afterwards.
    pub fn then(self, next: Self) -> Self {
        next * self
    }

    pub fn convert_point(&self, point: Vec2) -> Vec2 {
        self.0.transform_point2(point)
    }

    pub fn convert_vector(&self, vector: Vec2) -> Vec2 {
        self.0.transform_vector2(vector)
    }

    pub fn translation(&self) -> Vec2 {
        self.0.translation
    }

    pub fn determinant(&self) -> f32 {
        self.0.matrix2.determinant()
    }

    pub fn as_affine(&self) -> Affine2 {
        self.0
    }

    /// Inverse matrix, failing when the linear part is singular (for example
    /// a zero scale on either axis).
    pub fn try_inverse(&self) -> Result<Self, MatrixError> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return Err(MatrixError::Singular(det));
        }
        Ok(Self(self.0.inverse()))
    }
}

impl Mul for TransformationMatrix {
    type Output = TransformationMatrix;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
