//! Wait Task
//!
//! Accumulates elapsed time against a configured duration, optionally
//! jittered by a random deviation sampled once at task entry.

use rand::Rng;

use crate::behavior::task::{Task, TaskCtx, TaskResult};

/// Waits a configured number of seconds, then succeeds.
pub struct Wait {
    wait_time: f32,
    random_deviation: f32,
    elapsed: f32,
    threshold: f32,
}

impl Wait {
    pub fn new(wait_time: f32) -> Self {
        Self {
            wait_time,
            random_deviation: 0.0,
            elapsed: 0.0,
            threshold: wait_time,
        }
    }

    /// Jitters the duration by up to ±`deviation` seconds per run.
    pub fn with_deviation(mut self, deviation: f32) -> Self {
        self.random_deviation = deviation;
        self
    }
}

impl Task for Wait {
    fn name(&self) -> &'static str {
        "wait"
    }

    fn on_begin(&mut self, ctx: &mut TaskCtx<'_>) {
        self.elapsed = 0.0;
        self.threshold = self.wait_time;

        if self.random_deviation != 0.0 {
            let jitter = ctx
                .world
                .rng_mut()
                .gen_range(-self.random_deviation..=self.random_deviation);
            self.threshold = (self.wait_time + jitter).max(0.0);
        }
    }

    fn on_update(&mut self, ctx: &mut TaskCtx<'_>, dt: f32) {
        self.elapsed += dt;
        if self.elapsed < self.threshold {
            return;
        }
        ctx.finish(TaskResult::Succeeded);
    }
}
