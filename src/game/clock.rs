//! Fixed-timestep accumulator
//!
//! Converts irregular host frame intervals into a whole number of fixed
//! simulation steps. Frame intervals are capped so a stalled host never
//! triggers an unbounded burst of catch-up steps.

use crate::game::constants::timing::{FIXED_DT, MAX_FRAME};

/// Result of feeding one frame interval into the accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSteps {
    /// Fixed steps due this frame
    pub steps: u32,
    /// Frame interval after sanitizing and capping (seconds)
    pub frame_dt: f64,
    /// Real time discarded by the cap (seconds)
    pub dropped: f64,
}

/// Tracks unconsumed real time between frames
#[derive(Debug, Clone)]
pub struct TimeAccumulator {
    fixed_dt: f64,
    max_frame: f64,
    remainder: f64,
    total_steps: u64,
}

impl Default for TimeAccumulator {
    fn default() -> Self {
        Self::new(FIXED_DT, MAX_FRAME)
    }
}

impl TimeAccumulator {
    pub fn new(fixed_dt: f64, max_frame: f64) -> Self {
        Self {
            fixed_dt,
            max_frame,
            remainder: 0.0,
            total_steps: 0,
        }
    }

    /// Build an accumulator from a step rate in Hz
    pub fn with_rate(hz: u32, max_frame: f64) -> Self {
        Self::new(1.0 / hz as f64, max_frame)
    }

    #[inline]
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    #[inline]
    pub fn max_frame(&self) -> f64 {
        self.max_frame
    }

    /// Unconsumed time carried into the next frame
    #[inline]
    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    /// Fixed steps emitted since creation
    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Simulated time covered by the emitted steps
    pub fn simulated_time(&self) -> f64 {
        self.total_steps as f64 * self.fixed_dt
    }

    /// Clamp a raw frame interval into `[0, max_frame]`.
    ///
    /// Non-finite or negative intervals count as zero.
    pub fn cap_frame(&self, real_elapsed: f64) -> f64 {
        if !real_elapsed.is_finite() || real_elapsed <= 0.0 {
            return 0.0;
        }
        real_elapsed.min(self.max_frame)
    }

    /// Add one frame's elapsed time and report how many fixed steps are due
    pub fn advance(&mut self, real_elapsed: f64) -> FrameSteps {
        let frame_dt = self.cap_frame(real_elapsed);
        let dropped = if real_elapsed.is_finite() {
            (real_elapsed - frame_dt).max(0.0)
        } else {
            0.0
        };

        self.remainder += frame_dt;
        let steps = (self.remainder / self.fixed_dt).floor().max(0.0) as u32;
        // Rounding can leave a hair below zero after consuming exact multiples
        self.remainder = (self.remainder - steps as f64 * self.fixed_dt).max(0.0);
        self.total_steps += steps as u64;

        FrameSteps {
            steps,
            frame_dt,
            dropped,
        }
    }

    /// How far the render state sits between the last and the next fixed step (0.0 to 1.0)
    pub fn interpolation_alpha(&self) -> f64 {
        (self.remainder / self.fixed_dt).clamp(0.0, 1.0)
    }

    pub fn reset(&mut self) {
        self.remainder = 0.0;
        self.total_steps = 0;
    }
}
