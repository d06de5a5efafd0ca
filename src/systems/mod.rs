//! Engine systems.
//!
//! Submodules overview
//! - [`cleanup`] – deferred destruction of game objects and their subtrees
//! - [`collision`] – impulse resolution of overlapping solid bodies
//! - [`mouse`] – cursor hover/click detection and script dispatch
//! - [`movement`] – integrate accelerations and velocities over a fixed step
//! - [`raycast`] – nearest collider hit along a segment
//! - [`scripts`] – script lifecycle passes and callback dispatch
//! - [`time`] – update simulation time and delta
//! - [`triggers`] – trigger pair transitions and script dispatch

pub mod cleanup;
pub mod collision;
pub mod mouse;
pub mod movement;
pub mod raycast;
pub mod scripts;
pub mod time;
pub mod triggers;
