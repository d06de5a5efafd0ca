//! Cursor interaction messages, one per entity and transition.
use bevy_ecs::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseInteraction {
    Enter,
    Exit,
    Click,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub entity: Entity,
    pub interaction: MouseInteraction,
}
