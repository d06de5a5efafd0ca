//! Trigger transition messages.
//!
//! The trigger detection system writes one [`TriggerEvent`] per pair and
//! transition; the dispatch system drains them and calls each participant's
//! scripts with the other entity.
use bevy_ecs::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerPhase {
    Enter,
    Stay,
    Exit,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub a: Entity,
    pub b: Entity,
    pub phase: TriggerPhase,
}
