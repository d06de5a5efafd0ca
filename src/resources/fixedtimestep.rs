//! Fixed-timestep accumulator.
//!
//! Frame time is added to an accumulator; each consumed step removes exactly
//! one `step` from it. The comparison allows [`STEP_TOLERANCE`] seconds of
//! float drift so that frame deltas adding up to a whole number of steps
//! always produce that number of steps regardless of how they were split.

use bevy_ecs::prelude::Resource;

/// Default physics step in seconds (50 Hz).
pub const FIXED_STEP: f64 = 0.02;
/// Slack allowed when comparing the accumulator with the step.
pub const STEP_TOLERANCE: f64 = 1e-6;

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    step: f64,
    accumulated: f64,
    total_steps: u64,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(FIXED_STEP)
    }
}

impl FixedTimestep {
    /// Non-positive or non-finite steps fall back to [`FIXED_STEP`].
    pub fn new(step: f64) -> Self {
        let step = if step > 0.0 && step.is_finite() {
            step
        } else {
            FIXED_STEP
        };
        Self {
            step,
            accumulated: 0.0,
            total_steps: 0,
        }
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn step_f32(&self) -> f32 {
        self.step as f32
    }

    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Steps consumed since creation.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Add elapsed frame time. Negative and non-finite values are ignored.
    pub fn accumulate(&mut self, seconds: f64) {
        if seconds > 0.0 && seconds.is_finite() {
            self.accumulated += seconds;
        }
    }

    /// Number of steps the current accumulator would yield.
    pub fn steps_due(&self) -> u32 {
        ((self.accumulated + STEP_TOLERANCE) / self.step).floor() as u32
    }

    /// Consume one step if enough time has accumulated.
    pub fn consume_step(&mut self) -> bool {
        if self.accumulated + STEP_TOLERANCE < self.step {
            return false;
        }
        self.accumulated = (self.accumulated - self.step).max(0.0);
        self.total_steps += 1;
        true
    }

    /// Fraction of a step left in the accumulator, in `[0, 1)`.
    pub fn overstep_fraction(&self) -> f64 {
        (self.accumulated / self.step).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(deltas: &[f64]) -> u64 {
        let mut ts = FixedTimestep::default();
        for dt in deltas {
            ts.accumulate(*dt);
            while ts.consume_step() {}
        }
        ts.total_steps()
    }

    #[test]
    fn uneven_frames_produce_six_steps() {
        assert_eq!(run(&[0.05, 0.03, 0.04]), 6);
    }

    #[test]
    fn step_count_is_independent_of_split() {
        assert_eq!(run(&[0.12]), 6);
        assert_eq!(run(&[0.04, 0.04, 0.04]), 6);
        assert_eq!(run(&[0.01; 12]), 6);
    }

    #[test]
    fn short_frames_accumulate() {
        let mut ts = FixedTimestep::default();
        ts.accumulate(0.015);
        assert!(!ts.consume_step());
        ts.accumulate(0.015);
        assert_eq!(ts.steps_due(), 1);
        assert!(ts.consume_step());
        assert!((ts.accumulated() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn invalid_values_are_ignored() {
        let mut ts = FixedTimestep::new(-1.0);
        assert_eq!(ts.step(), FIXED_STEP);
        ts.accumulate(-5.0);
        ts.accumulate(f64::NAN);
        assert_eq!(ts.accumulated(), 0.0);
    }
}
