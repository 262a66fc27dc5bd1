// Copyright @yucwang 2026

use crate::math::constants::{ Float, PI, Vector3f };
use crate::math::warp::rotate_direction;

/// Angular distribution of scattered light inside a medium.
pub trait PhaseFunction: Send + Sync {
    /// Density over the sphere of directions for a deflection with cosine
    /// `cos_theta`.
    fn eval(&self, cos_theta: Float) -> Float;

    /// Map a uniform variate on [0, 1) to a deflection cosine in [-1, 1].
    fn sample_cos_theta(&self, u: Float) -> Float;

    /// Scatter `dir` into a new unit direction. `u1` drives the deflection,
    /// `u2` the azimuth.
    fn sample_direction(&self, dir: &Vector3f, u1: Float, u2: Float) -> Vector3f {
        let cos_theta = self.sample_cos_theta(u1);
        let phi = 2.0 * PI * u2;
        rotate_direction(dir, cos_theta, phi)
    }
}
