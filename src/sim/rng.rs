//! Injectable random source
//!
//! Every probabilistic decision in the simulation (spawn types, patrol
//! targets, interruption rolls) draws from a `RandomSource`, so a seeded
//! `Pcg32` gives reproducible runs and tests can script exact values.

use rand::Rng;
use rand_pcg::Pcg32;

/// A source of uniform floats in `[0, 1)`
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    /// Uniform float in `[min, max)` for millisecond windows
    fn range_ms(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f32() as f64 * (max - min)
    }

    /// Uniform index into a slice of length `len` (0 when empty)
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

impl RandomSource for Pcg32 {
    fn next_f32(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of values forever (for deterministic tests and demos)
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v.clamp(0.0, 0.999_999)
    }
}
