//! Cursor state written by the input layer and read by the mouse trigger
//! system.

use bevy_ecs::prelude::*;
use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Cursor {
    /// Position in screen pixels, origin at the top-left corner.
    pub screen_position: Vec2,
    /// Primary button held down.
    pub pressed: bool,
    /// False when the cursor is hidden or outside the window.
    pub visible: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    pub fn move_to(&mut self, screen_position: Vec2) {
        self.screen_position = screen_position;
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }
}

/// Entities currently under the cursor, plus the button state seen on the
/// previous fixed step for click edge detection.
#[derive(Resource, Debug, Default)]
pub struct MouseHover {
    hovered: FxHashSet<Entity>,
    was_pressed: bool,
}

impl MouseHover {
    pub fn is_hovered(&self, entity: Entity) -> bool {
        self.hovered.contains(&entity)
    }

    pub fn hovered_count(&self) -> usize {
        self.hovered.len()
    }

    /// Record the hover state of `entity`; returns true if it changed.
    pub fn set_hovered(&mut self, entity: Entity, hovered: bool) -> bool {
        if hovered {
            self.hovered.insert(entity)
        } else {
            self.hovered.remove(&entity)
        }
    }

    /// Drop entities not accepted by `keep`, returning them.
    pub fn retain(&mut self, mut keep: impl FnMut(Entity) -> bool) -> Vec<Entity> {
        let dropped: Vec<Entity> = self.hovered.iter().copied().filter(|e| !keep(*e)).collect();
        for e in &dropped {
            self.hovered.remove(e);
        }
        dropped
    }

    /// True on the step the button goes down.
    pub fn update_press(&mut self, pressed: bool) -> bool {
        let clicked = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        clicked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_is_a_press_edge() {
        let mut hover = MouseHover::default();
        assert!(hover.update_press(true));
        assert!(!hover.update_press(true));
        assert!(!hover.update_press(false));
        assert!(hover.update_press(true));
    }

    #[test]
    fn hover_changes_are_reported_once() {
        let mut world = World::new();
        let e = world.spawn_empty().id();
        let mut hover = MouseHover::default();
        assert!(hover.set_hovered(e, true));
        assert!(!hover.set_hovered(e, true));
        assert_eq!(hover.retain(|_| false), vec![e]);
        assert!(!hover.is_hovered(e));
    }
}
