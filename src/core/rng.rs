// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Source of independent variates uniformly distributed on [0, 1).
pub trait UniformSource {
    fn next_f32(&mut self) -> Float;
}

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// A generator for sub-stream `stream` of the run seeded with `seed`.
    /// Distinct streams start from well separated states, so batches traced
    /// on different workers do not share variates.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        Self::new(mix64(seed ^ mix64(stream.wrapping_add(0x9E3779B97F4A7C15))))
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    pub fn next_f32(&mut self) -> Float {
        // 24 high bits fill the f32 mantissa exactly; the result is never 1.
        ((self.next_u32() >> 8) as Float) * (1.0 / 16777216.0)
    }
}

impl UniformSource for LcgRng {
    fn next_f32(&mut self) -> Float {
        LcgRng::next_f32(self)
    }
}

// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
