//! Active trigger pairs between fixed steps.
//!
//! Detection produces the set of overlapping pairs for the current step.
//! [`TriggerTracker::update`] diffs it against the previous step: new pairs
//! enter, surviving pairs stay and missing pairs exit.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashSet;

use crate::events::trigger::{TriggerEvent, TriggerPhase};

/// Unordered entity pair; `EntityPair::new(a, b) == EntityPair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityPair {
    pub first: Entity,
    pub second: Entity,
}

impl EntityPair {
    pub fn new(a: Entity, b: Entity) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.first == entity || self.second == entity
    }

    /// The member that is not `entity`.
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.first == entity {
            Some(self.second)
        } else if self.second == entity {
            Some(self.first)
        } else {
            None
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct TriggerTracker {
    active: Vec<EntityPair>,
    active_set: FxHashSet<EntityPair>,
}

impl TriggerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, pair: EntityPair) -> bool {
        self.active_set.contains(&pair)
    }

    pub fn active_pairs(&self) -> &[EntityPair] {
        &self.active
    }

    /// Replace the active set with `current` and return the transitions:
    /// enter/stay in `current` order, then exits in previous order.
    /// Duplicates in `current` are ignored.
    pub fn update(&mut self, current: impl IntoIterator<Item = EntityPair>) -> Vec<TriggerEvent> {
        let mut events = Vec::new();
        let mut next = Vec::new();
        let mut next_set = FxHashSet::default();
        for pair in current {
            if !next_set.insert(pair) {
                continue;
            }
            let phase = if self.active_set.contains(&pair) {
                TriggerPhase::Stay
            } else {
                TriggerPhase::Enter
            };
            events.push(TriggerEvent {
                a: pair.first,
                b: pair.second,
                phase,
            });
            next.push(pair);
        }
        for pair in &self.active {
            if !next_set.contains(pair) {
                events.push(TriggerEvent {
                    a: pair.first,
                    b: pair.second,
                    phase: TriggerPhase::Exit,
                });
            }
        }
        self.active = next;
        self.active_set = next_set;
        events
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.active_set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn pair_is_unordered() {
        let e = entities(2);
        assert_eq!(EntityPair::new(e[0], e[1]), EntityPair::new(e[1], e[0]));
        assert_eq!(EntityPair::new(e[1], e[0]).other(e[0]), Some(e[1]));
    }

    #[test]
    fn enter_stay_exit_sequence() {
        let e = entities(2);
        let pair = EntityPair::new(e[0], e[1]);
        let mut tracker = TriggerTracker::new();

        let first = tracker.update([pair]);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].phase, TriggerPhase::Enter);

        let second = tracker.update([pair, pair]);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].phase, TriggerPhase::Stay);

        let third = tracker.update([]);
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].phase, TriggerPhase::Exit);
        assert!(!tracker.is_active(pair));

        assert!(tracker.update([]).is_empty());
    }

    #[test]
    fn exits_follow_current_transitions() {
        let e = entities(3);
        let old = EntityPair::new(e[0], e[1]);
        let new = EntityPair::new(e[1], e[2]);
        let mut tracker = TriggerTracker::new();
        tracker.update([old]);
        let events = tracker.update([new]);
        let phases: Vec<_> = events.iter().map(|ev| ev.phase).collect();
        assert_eq!(phases, vec![TriggerPhase::Enter, TriggerPhase::Exit]);
        assert_eq!(tracker.active_pairs(), &[new]);
    }
}
