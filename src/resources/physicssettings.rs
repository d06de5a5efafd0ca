//! Physics tuning and the layer interaction matrix.
//!
//! Layers are named; each game object belongs to exactly one. Two colliders
//! are only tested against each other (for solid contacts and for triggers)
//! when their layers interact. Every pair of layers interacts by default.
//!
//! The [`IGNORE_RAYCAST_LAYER`] layer is skipped by raycast queries.

use arrayvec::ArrayVec;
use bevy_ecs::prelude::Resource;
use log::debug;
use thiserror::Error;

use crate::resources::fixedtimestep::FIXED_STEP;

pub const DEFAULT_LAYER: &str = "default";
pub const IGNORE_RAYCAST_LAYER: &str = "ignore_raycast";
/// Interaction masks are stored as `u32` bit sets.
pub const MAX_LAYERS: usize = 32;

/// Share of the remaining penetration corrected each step.
pub const DEFAULT_CORRECTION_FRACTION: f32 = 0.2;
/// Penetration depth tolerated without positional correction.
pub const DEFAULT_PENETRATION_SLOP: f32 = 0.01;
/// Steps in a single frame above which a warning is logged.
pub const DEFAULT_MAX_STEPS_WARNING: u32 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("unknown layer '{0}'")]
    Unknown(String),
    #[error("layer '{0}' is already defined")]
    Duplicate(String),
    #[error("at most {MAX_LAYERS} layers can be defined")]
    TooMany,
}

#[derive(Resource, Debug, Clone)]
pub struct PhysicsSettings {
    pub fixed_step: f64,
    pub correction_fraction: f32,
    pub penetration_slop: f32,
    pub max_steps_warning: u32,
    layers: ArrayVec<String, MAX_LAYERS>,
    masks: ArrayVec<u32, MAX_LAYERS>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        let mut settings = Self {
            fixed_step: FIXED_STEP,
            correction_fraction: DEFAULT_CORRECTION_FRACTION,
            penetration_slop: DEFAULT_PENETRATION_SLOP,
            max_steps_warning: DEFAULT_MAX_STEPS_WARNING,
            layers: ArrayVec::new(),
            masks: ArrayVec::new(),
        };
        for name in [DEFAULT_LAYER, IGNORE_RAYCAST_LAYER] {
            settings.layers.push(name.to_string());
            settings.masks.push(u32::MAX);
        }
        settings
    }
}

impl PhysicsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new layer interacting with every layer.
    pub fn add_layer(&mut self, name: &str) -> Result<usize, LayerError> {
        if self.layers.iter().any(|l| l == name) {
            return Err(LayerError::Duplicate(name.to_string()));
        }
        if self.layers.is_full() {
            return Err(LayerError::TooMany);
        }
        self.layers.push(name.to_string());
        self.masks.push(u32::MAX);
        debug!("registered physics layer '{}'", name);
        Ok(self.layers.len() - 1)
    }

    /// Register every name that is not known yet.
    pub fn ensure_layers<'a>(
        &mut self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), LayerError> {
        for name in names {
            if self.layer_index(name).is_err() {
                self.add_layer(name)?;
            }
        }
        Ok(())
    }

    pub fn layer_index(&self, name: &str) -> Result<usize, LayerError> {
        self.layers
            .iter()
            .position(|l| l == name)
            .ok_or_else(|| LayerError::Unknown(name.to_string()))
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(String::as_str)
    }

    /// Enable or disable interaction between two layers (symmetric).
    pub fn set_layers_interact(&mut self, a: &str, b: &str, interact: bool) -> Result<(), LayerError> {
        let (ia, ib) = (self.layer_index(a)?, self.layer_index(b)?);
        if interact {
            self.masks[ia] |= 1 << ib;
            self.masks[ib] |= 1 << ia;
        } else {
            self.masks[ia] &= !(1 << ib);
            self.masks[ib] &= !(1 << ia);
        }
        Ok(())
    }

    /// Unknown layers interact with nothing.
    pub fn layers_interact(&self, a: &str, b: &str) -> bool {
        match (self.layer_index(a), self.layer_index(b)) {
            (Ok(ia), Ok(ib)) => self.masks[ia] & (1 << ib) != 0,
            _ => false,
        }
    }

    pub fn ignores_raycast(&self, layer: &str) -> bool {
        layer == IGNORE_RAYCAST_LAYER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layers_interact() {
        let s = PhysicsSettings::default();
        assert!(s.layers_interact(DEFAULT_LAYER, DEFAULT_LAYER));
        assert!(s.layers_interact(DEFAULT_LAYER, IGNORE_RAYCAST_LAYER));
        assert!(s.ignores_raycast(IGNORE_RAYCAST_LAYER));
    }

    #[test]
    fn disabling_interaction_is_symmetric() {
        let mut s = PhysicsSettings::default();
        s.add_layer("player").unwrap();
        s.add_layer("ghost").unwrap();
        s.set_layers_interact("ghost", "player", false).unwrap();
        assert!(!s.layers_interact("player", "ghost"));
        assert!(!s.layers_interact("ghost", "player"));
        assert!(s.layers_interact("ghost", "ghost"));
        s.set_layers_interact("player", "ghost", true).unwrap();
        assert!(s.layers_interact("ghost", "player"));
    }

    #[test]
    fn unknown_layers_are_errors() {
        let mut s = PhysicsSettings::default();
        assert_eq!(
            s.set_layers_interact("nope", DEFAULT_LAYER, false),
            Err(LayerError::Unknown("nope".into()))
        );
        assert!(!s.layers_interact("nope", DEFAULT_LAYER));
        assert_eq!(s.add_layer(DEFAULT_LAYER), Err(LayerError::Duplicate(DEFAULT_LAYER.into())));
    }

    #[test]
    fn layer_capacity_is_bounded() {
        let mut s = PhysicsSettings::default();
        for i in 0..(MAX_LAYERS - 2) {
            s.add_layer(&format!("layer{i}")).unwrap();
        }
        assert_eq!(s.add_layer("overflow"), Err(LayerError::TooMany));
        assert!(s.layers_interact("layer0", "layer29"));
    }
}
