//! ECS components for game objects.
//!
//! Submodules overview:
//! - [`gameobject`] – name, tag, layer and active flag, plus the builder that
//!   spawns a game object with its transform node
//! - [`collider`] – the [`Collider`](collider::Collider) component and its shape enum
//! - [`boxcollider`] – rectangle given by half-extents
//! - [`circlecollider`] – circle, exact under uniform scale
//! - [`polygoncollider`] – arbitrary local-space vertex list
//! - [`pixelcollider`] – opacity mask with flip flags
//! - [`rigidbody`] – velocity, inverse mass, bounciness and named accelerations
//! - [`script`] – behaviour scripts and the context they run with

pub mod boxcollider;
pub mod circlecollider;
pub mod collider;
pub mod gameobject;
pub mod pixelcollider;
pub mod polygoncollider;
pub mod rigidbody;
pub mod script;
