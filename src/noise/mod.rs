//! Noise generation module for terrain synthesis.
//!
//! Uses simdnoise for high-performance SIMD-accelerated noise generation.

mod fractal;

pub use fractal::{accumulate_octaves, NoiseSettings};
