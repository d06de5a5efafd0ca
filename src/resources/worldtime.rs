use bevy_ecs::prelude::Resource;

/// Simulation clock. `delta` is the scaled time of the current frame and
/// `fixed_delta` the length of a physics step.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub fixed_delta: f32,
    pub time_scale: f32,
    pub frame: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            fixed_delta: crate::resources::fixedtimestep::FIXED_STEP as f32,
            time_scale: 1.0,
            frame: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
