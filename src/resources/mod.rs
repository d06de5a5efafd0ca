//! ECS resources made available to systems.
//!
//! Overview
//! - `camera` – world/screen/UI conversion matrices for the renderer
//! - `cursor` – cursor state from the input layer and current hover set
//! - `fixedtimestep` – accumulator deciding how many physics steps run
//! - `gameconfig` – engine settings loaded from an INI file
//! - `physicssettings` – layers, interaction masks and resolver tuning
//! - `physicsstats` – counters from the physics passes
//! - `sceneobjects` – live game objects in creation order and pending destroys
//! - `transformtree` – arena of hierarchical transforms with cached world data
//! - `triggertracker` – trigger pairs active since the previous step
//! - `worldtime` – simulation time and delta
pub mod camera;
pub mod cursor;
pub mod fixedtimestep;
pub mod gameconfig;
pub mod physicssettings;
pub mod physicsstats;
pub mod sceneobjects;
pub mod transformtree;
pub mod triggertracker;
pub mod worldtime;
