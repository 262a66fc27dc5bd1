// Copyright @yucwang 2023

use super::constants::{ Float, Vector3f };

// Directions whose xy-projection is shorter than this are treated
// as lying on the polar axis.
pub const POLE_EPSILON: Float = 1e-6;

// Rounding slack tolerated on 1 - cos^2 before it counts as a bad cosine.
const EPSILON_SIN: Float = 1e-5;

/// Rotate `dir` by the polar angle `theta` (given as its cosine) and the
/// azimuth `phi` around itself, using Rodrigues' rotation formula.
///
/// Both branches for the poles (+z, -z) pick a fixed azimuthal frame, so
/// they coincide with the general formula when the pole is approached from
/// +x (north) or -x (south).
pub fn rotate_direction(dir: &Vector3f, cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta_sqr = 1.0 - cos_theta * cos_theta;
    debug_assert!(sin_theta_sqr > -EPSILON_SIN, "cos_theta out of range: {}", cos_theta);
    let sin_theta = sin_theta_sqr.max(0.0).sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let denom = (dir.x * dir.x + dir.y * dir.y).sqrt();
    let rotated = if denom < POLE_EPSILON {
        if dir.z > 0.0 {
            Vector3f::new(sin_theta * cos_phi, sin_theta * sin_phi, cos_theta)
        } else {
            Vector3f::new(sin_theta * cos_phi, -sin_theta * sin_phi, -cos_theta)
        }
    } else {
        let muz_cos_phi = dir.z * cos_phi;
        Vector3f::new(
            sin_theta * (dir.x * muz_cos_phi - dir.y * sin_phi) / denom + dir.x * cos_theta,
            sin_theta * (dir.y * muz_cos_phi + dir.x * sin_phi) / denom + dir.y * cos_theta,
            -denom * sin_theta * cos_phi + dir.z * cos_theta,
        )
    };

    let norm = rotated.norm();
    debug_assert!((norm - 1.0).abs() < 1e-3, "direction left the unit sphere: |d| = {}", norm);
    rotated / norm
}
