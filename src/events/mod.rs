//! Messages exchanged between the detection and dispatch systems.
//!
//! Submodules:
//! - [`trigger`] – enter/stay/exit transitions of trigger pairs
//! - [`mouse`] – cursor enter/exit/click on colliders
pub mod mouse;
pub mod trigger;
