//! Geometry shared by transforms and colliders.
//!
//! - [`matrix`] – 2D affine [`TransformationMatrix`](matrix::TransformationMatrix)
//! - [`intersect`] – pairwise overlap tests across all collider shapes
//! - [`contact`] – contact normal and penetration depth for solid pairs
//! - [`segment`] – segment/circle and segment/segment helpers used by raycasts

pub mod contact;
pub mod intersect;
pub mod matrix;
pub mod segment;
