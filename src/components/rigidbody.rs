//! Dynamic body component with multiple named acceleration forces.
//!
//! The [`RigidBody`] component stores linear velocity, inverse mass,
//! bounciness and a set of named acceleration forces. Each force can be
//! individually enabled/disabled, allowing game logic to toggle forces like
//! gravity, wind, or motor thrust independently.
//!
//! An inverse mass of `0.0` makes the body immovable: collision impulses and
//! positional corrections never affect it, although it still integrates its
//! own velocity.
//!
//! The `frozen` flag skips integration entirely, useful when an entity's
//! position is controlled externally (e.g., ball stuck to paddle).

use bevy_ecs::prelude::Component;
use glam::Vec2;
use log::warn;
use rustc_hash::FxHashMap;

/// A named acceleration force that can be toggled on/off.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AccelerationForce {
    /// The acceleration vector in world units per second squared.
    pub value: Vec2,
    pub enabled: bool,
}

impl AccelerationForce {
    /// Create a new enabled acceleration force.
    pub fn new(value: Vec2) -> Self {
        Self {
            value,
            enabled: true,
        }
    }

    pub fn with_enabled(value: Vec2, enabled: bool) -> Self {
        Self { value, enabled }
    }
}

/// Dynamic body consumed by the fixed-step integrator and the collision
/// resolver.
///
/// # Example
/// ```ignore
/// let mut rb = RigidBody::with_mass(2.0).with_bounciness(0.8);
/// rb.add_force("gravity", Vec2::new(0.0, -980.0));
/// rb.set_force_enabled("gravity", false);
/// ```
#[derive(Component, Clone, Debug, PartialEq)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// `1 / mass`; `0.0` means immovable.
    inverse_mass: f32,
    /// Restitution in `[0, 1]`.
    bounciness: f32,
    /// Named acceleration forces. The total acceleration is the sum of all enabled forces.
    pub forces: FxHashMap<String, AccelerationForce>,
    /// When true, integration skips this body.
    pub frozen: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Unit mass, no bounce, zero velocity and no forces.
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            inverse_mass: 1.0,
            bounciness: 0.0,
            forces: FxHashMap::default(),
            frozen: false,
        }
    }

    /// Body with the given mass. Non-positive or non-finite masses produce an
    /// immovable body.
    pub fn with_mass(mass: f32) -> Self {
        let mut rb = Self::new();
        rb.set_mass(mass);
        rb
    }

    pub fn immovable() -> Self {
        let mut rb = Self::new();
        rb.inverse_mass = 0.0;
        rb
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_bounciness(mut self, bounciness: f32) -> Self {
        self.set_bounciness(bounciness);
        self
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0
    }

    pub fn set_mass(&mut self, mass: f32) {
        self.inverse_mass = if mass > 0.0 && mass.is_finite() {
            1.0 / mass
        } else {
            0.0
        };
    }

    pub fn set_inverse_mass(&mut self, inverse_mass: f32) {
        self.inverse_mass = if inverse_mass.is_finite() {
            inverse_mass.max(0.0)
        } else {
            0.0
        };
    }

    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    /// Values outside `[0, 1]` are clamped.
    pub fn set_bounciness(&mut self, bounciness: f32) {
        self.bounciness = if bounciness.is_nan() {
            0.0
        } else {
            bounciness.clamp(0.0, 1.0)
        };
    }

    /// Add or update a named acceleration force (enabled by default).
    pub fn add_force(&mut self, name: &str, value: Vec2) {
        self.forces
            .insert(name.to_string(), AccelerationForce::new(value));
    }

    pub fn add_force_with_state(&mut self, name: &str, value: Vec2, enabled: bool) {
        self.forces.insert(
            name.to_string(),
            AccelerationForce::with_enabled(value, enabled),
        );
    }

    pub fn remove_force(&mut self, name: &str) {
        self.forces.remove(name);
    }

    /// Enable or disable a specific force by name.
    /// Returns false if the force doesn't exist.
    pub fn set_force_enabled(&mut self, name: &str, enabled: bool) -> bool {
        if let Some(force) = self.forces.get_mut(name) {
            force.enabled = enabled;
            true
        } else {
            false
        }
    }

    pub fn is_force_enabled(&self, name: &str) -> bool {
        self.forces.get(name).is_some_and(|f| f.enabled)
    }

    /// Returns false if the force doesn't exist.
    pub fn set_force_value(&mut self, name: &str, value: Vec2) -> bool {
        if let Some(force) = self.forces.get_mut(name) {
            force.value = value;
            true
        } else {
            false
        }
    }

    pub fn get_force(&self, name: &str) -> Option<&AccelerationForce> {
        self.forces.get(name)
    }

    /// Sum of all enabled forces.
    pub fn total_acceleration(&self) -> Vec2 {
        self.forces
            .values()
            .filter(|f| f.enabled)
            .map(|f| f.value)
            .sum()
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn unfreeze(&mut self) {
        self.frozen = false;
    }

    /// Set speed while maintaining the current direction of velocity.
    ///
    /// If the current velocity is zero this is a no-op, since there's no
    /// direction to maintain.
    pub fn set_speed(&mut self, new_speed: f32) {
        match self.velocity.try_normalize() {
            Some(direction) => self.velocity = direction * new_speed,
            None => warn!("RigidBody::set_speed called with zero velocity - operation ignored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn new_has_unit_mass() {
        let rb = RigidBody::new();
        assert_eq!(rb.velocity, Vec2::ZERO);
        assert!(approx_eq(rb.inverse_mass(), 1.0));
        assert!(approx_eq(rb.bounciness(), 0.0));
        assert!(rb.forces.is_empty());
        assert!(!rb.frozen);
    }

    #[test]
    fn mass_converts_to_inverse() {
        assert!(approx_eq(RigidBody::with_mass(4.0).inverse_mass(), 0.25));
        assert!(RigidBody::with_mass(0.0).is_immovable());
        assert!(RigidBody::with_mass(-3.0).is_immovable());
        assert!(RigidBody::with_mass(f32::INFINITY).is_immovable());
        assert!(RigidBody::immovable().is_immovable());
    }

    #[test]
    fn bounciness_is_clamped() {
        assert!(approx_eq(RigidBody::new().with_bounciness(1.5).bounciness(), 1.0));
        assert!(approx_eq(RigidBody::new().with_bounciness(-0.5).bounciness(), 0.0));
        assert!(approx_eq(RigidBody::new().with_bounciness(0.3).bounciness(), 0.3));
    }

    #[test]
    fn add_force_overwrites() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, 100.0));
        rb.add_force("gravity", Vec2::new(0.0, 200.0));
        assert_eq!(rb.forces.len(), 1);
        assert!(approx_eq(rb.get_force("gravity").unwrap().value.y, 200.0));
    }

    #[test]
    fn toggling_missing_force_reports_false() {
        let mut rb = RigidBody::new();
        assert!(!rb.set_force_enabled("nonexistent", true));
        assert!(!rb.set_force_value("nonexistent", Vec2::ZERO));
        assert!(!rb.is_force_enabled("nonexistent"));
    }

    #[test]
    fn total_acceleration_skips_disabled_forces() {
        let mut rb = RigidBody::new();
        rb.add_force("gravity", Vec2::new(0.0, 100.0));
        rb.add_force("thrust", Vec2::new(0.0, -30.0));
        rb.add_force_with_state("wind", Vec2::new(50.0, 0.0), false);
        assert_eq!(rb.total_acceleration(), Vec2::new(0.0, 70.0));

        rb.set_force_enabled("wind", true);
        assert_eq!(rb.total_acceleration(), Vec2::new(50.0, 70.0));
        rb.remove_force("wind");
        assert_eq!(rb.total_acceleration(), Vec2::new(0.0, 70.0));
    }

    #[test]
    fn freeze_and_unfreeze() {
        let mut rb = RigidBody::new();
        rb.freeze();
        assert!(rb.frozen);
        rb.unfreeze();
        assert!(!rb.frozen);
    }

    #[test]
    fn set_speed_maintains_direction() {
        let mut rb = RigidBody::new().with_velocity(Vec2::new(3.0, 4.0));
        rb.set_speed(10.0);
        assert!(approx_eq(rb.velocity.x, 6.0));
        assert!(approx_eq(rb.velocity.y, 8.0));
    }

    #[test]
    fn set_speed_with_zero_velocity_is_ignored() {
        let mut rb = RigidBody::new();
        rb.set_speed(10.0);
        assert_eq!(rb.velocity, Vec2::ZERO);
    }
}
