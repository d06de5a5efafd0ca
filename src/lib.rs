//! kinetic2d library.
//!
//! Transform hierarchy, colliders, overlap tests, contact resolution and the
//! fixed-step loop of a 2D engine, built on bevy_ecs. The [`game::Game`]
//! driver wires everything together; the modules are public for tests and
//! for embedding the pieces in another schedule.

pub mod components;
pub mod events;
pub mod game;
pub mod geometry;
pub mod resources;
pub mod scene;
pub mod systems;
