use bevy_ecs::prelude::Resource;

/// Counters updated by the physics systems. `last_*` values describe the most
/// recent fixed step, `total_*` values the whole run.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    pub frames: u64,
    pub fixed_steps: u64,
    pub last_overlap_tests: u32,
    pub last_resolved_pairs: u32,
    pub total_resolved_pairs: u64,
    pub total_trigger_events: u64,
    pub max_steps_in_frame: u32,
}

impl PhysicsStats {
    pub fn record_step(&mut self, overlap_tests: u32, resolved_pairs: u32) {
        self.fixed_steps += 1;
        self.last_overlap_tests = overlap_tests;
        self.last_resolved_pairs = resolved_pairs;
        self.total_resolved_pairs += u64::from(resolved_pairs);
    }
}
