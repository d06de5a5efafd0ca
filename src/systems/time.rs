//! Time update system.
//!
//! Updates the shared [`WorldTime`](crate::resources::worldtime::WorldTime)
//! resource once per frame, applying `time_scale` to the provided delta.
use bevy_ecs::prelude::*;

use crate::resources::worldtime::WorldTime;

/// Update elapsed and delta seconds on the `WorldTime` resource.
///
/// `dt` is expected to be the unscaled frame delta in seconds. The system
/// applies the current `time_scale`, writes both `elapsed` and `delta` and
/// returns the scaled delta.
pub fn update_world_time(world: &mut World, dt: f32) -> f32 {
    let mut wt = world.get_resource_or_insert_with(WorldTime::default);
    let scaled_dt = (dt * wt.time_scale).max(0.0);
    wt.elapsed += scaled_dt;
    wt.delta = scaled_dt;
    wt.frame += 1;
    scaled_dt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_time_scale() {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(0.5));
        assert_eq!(update_world_time(&mut world, 0.1), 0.05);
        update_world_time(&mut world, 0.1);
        let wt = world.resource::<WorldTime>();
        assert!((wt.elapsed - 0.1).abs() < 1e-6);
        assert_eq!(wt.frame, 2);
    }
}
