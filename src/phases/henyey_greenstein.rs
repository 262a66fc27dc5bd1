// Copyright @yucwang 2026

use crate::core::phase::PhaseFunction;
use crate::math::constants::{ Float, INV_FOUR_PI };

// Slack for rounding in the inverse CDF. Anything further out is a bug.
const COS_TOLERANCE: Float = 5e-5;

// Below this |g| the inverse CDF divides rounding error by 2g; the
// distribution is isotropic to within |g| there anyway.
const ISOTROPIC_G: Float = 1e-3;

/// Inverse CDF of the Henyey-Greenstein distribution of deflection cosines.
/// Small `g` degenerates to the isotropic case.
pub fn sample_cos_theta(g: Float, u: Float) -> Float {
    let cos_theta = raw_cos_theta(g, u);
    debug_assert!(cos_theta.abs() <= 1.0 + COS_TOLERANCE,
                  "hg cosine out of range: g = {}, u = {}, cos = {}", g, u, cos_theta);
    // Only rounding is removed here, the assertion above guards the rest.
    cos_theta.max(-1.0).min(1.0)
}

fn raw_cos_theta(g: Float, u: Float) -> Float {
    if g.abs() < ISOTROPIC_G {
        return 2.0 * u - 1.0;
    }

    let g2 = g * g;
    let mu = (1.0 - g2) / (1.0 - g + 2.0 * g * u);
    (1.0 + g2 - mu * mu) / (2.0 * g)
}

pub struct HenyeyGreenstein {
    g: Float,
}

impl HenyeyGreenstein {
    pub fn new(g: Float) -> Self {
        Self { g }
    }

    pub fn g(&self) -> Float {
        self.g
    }
}

impl PhaseFunction for HenyeyGreenstein {
    fn eval(&self, cos_theta: Float) -> Float {
        let g2 = self.g * self.g;
        let denom = 1.0 + g2 - 2.0 * self.g * cos_theta;
        INV_FOUR_PI * (1.0 - g2) / (denom * denom.sqrt())
    }

    fn sample_cos_theta(&self, u: Float) -> Float {
        sample_cos_theta(self.g, u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::constants::{ PI, Vector3f };

    const ANISOTROPIES: [Float; 9] = [-0.99, -0.75, -0.3, -0.01, 0.0, 0.01, 0.3, 0.75, 0.99];

    fn test_variates() -> Vec<Float> {
        let ulp = 1.0 / (1u32 << 24) as Float;
        let mut us: Vec<Float> = (0..=1000).map(|i| (i as Float / 1000.0).min(1.0 - ulp)).collect();
        us.extend((0..4096).map(|i| i as Float * ulp));
        us.extend((0..4096).map(|i| 1.0 - (i + 1) as Float * ulp));
        us
    }

    #[test]
    fn test_cos_theta_in_range() {
        let us = test_variates();
        let small: [Float; 4] = [-1e-3, 1e-3, 2e-3, 5e-4];
        for &g in ANISOTROPIES.iter().chain(small.iter()) {
            for &u in &us {
                // The formula itself must stay in range up to rounding,
                // not only after the clamp.
                let raw = raw_cos_theta(g, u);
                assert!(raw.abs() <= 1.0 + 2e-5, "g = {}, u = {}, raw cos = {}", g, u, raw);
                let c = sample_cos_theta(g, u);
                assert!(c >= -1.0 && c <= 1.0, "g = {}, u = {}, cos = {}", g, u, c);
            }
        }
    }

    #[test]
    fn test_tiny_anisotropy_is_isotropic() {
        for &u in &[0.0, 0.25, 0.5, 0.75] {
            assert_eq!(sample_cos_theta(1e-4, u), 2.0 * u - 1.0);
            assert_eq!(sample_cos_theta(-1e-6, u), 2.0 * u - 1.0);
        }
    }

    #[test]
    fn test_cos_theta_endpoints() {
        for &g in &[-0.5, 0.3, 0.75] {
            assert!((sample_cos_theta(g, 0.0) + 1.0).abs() < 1e-5);
            assert!((sample_cos_theta(g, 0.99999994) - 1.0).abs() < 1e-3);
        }
        assert_eq!(sample_cos_theta(0.0, 0.0), -1.0);
        assert_eq!(sample_cos_theta(0.0, 0.5), 0.0);
    }

    #[test]
    fn test_cos_theta_monotonic() {
        let mut prev = -2.0;
        for i in 0..1000 {
            let c = sample_cos_theta(0.75, i as Float / 1000.0);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn test_isotropic_is_uniform_ks() {
        let mut rng = LcgRng::new(2024);
        let n = 20000;
        let mut samples: Vec<Float> = (0..n).map(|_| sample_cos_theta(0.0, rng.next_f32())).collect();
        samples.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let mut d_max: f64 = 0.0;
        for (i, c) in samples.iter().enumerate() {
            let cdf = (*c as f64 + 1.0) / 2.0;
            let lo = i as f64 / n as f64;
            let hi = (i + 1) as f64 / n as f64;
            d_max = d_max.max((cdf - lo).abs()).max((hi - cdf).abs());
        }
        // 99.9% critical value of the one sample Kolmogorov-Smirnov statistic.
        let critical = 1.949 / (n as f64).sqrt();
        assert!(d_max < critical, "D = {}, critical = {}", d_max, critical);
    }

    #[test]
    fn test_mean_cosine_is_g() {
        let mut rng = LcgRng::new(99);
        let n = 200000;
        for &g in &[-0.5, 0.0, 0.75] {
            let phase = HenyeyGreenstein::new(g);
            let mean: f64 = (0..n).map(|_| phase.sample_cos_theta(rng.next_f32()) as f64).sum::<f64>() / n as f64;
            assert!((mean - g as f64).abs() < 0.01, "g = {}, mean = {}", g, mean);
        }
    }

    #[test]
    fn test_eval_normalized() {
        // Integrate over the sphere: 2 pi * int_{-1}^{1} p(mu) dmu.
        for &g in &[-0.6, 0.0, 0.3, 0.75] {
            let phase = HenyeyGreenstein::new(g);
            let steps = 20000;
            let h = 2.0 / steps as f64;
            let mut integral = 0.0f64;
            for i in 0..steps {
                let mu = -1.0 + (i as f64 + 0.5) * h;
                integral += phase.eval(mu as Float) as f64 * h;
            }
            integral *= 2.0 * PI as f64;
            assert!((integral - 1.0).abs() < 1e-3, "g = {}, integral = {}", g, integral);
        }
    }

    #[test]
    fn test_scatter_preserves_norm() {
        let mut rng = LcgRng::new(5);
        for &g in ANISOTROPIES.iter() {
            let phase = HenyeyGreenstein::new(g);
            for _ in 0..2000 {
                let z = 2.0 * rng.next_f32() - 1.0;
                let r = (1.0 - z * z).max(0.0).sqrt();
                let phi = 2.0 * PI * rng.next_f32();
                let dir = Vector3f::new(r * phi.cos(), r * phi.sin(), z).normalize();

                let out = phase.sample_direction(&dir, rng.next_f32(), rng.next_f32());
                assert!((out.norm() - 1.0).abs() < 1e-5, "|out| = {}", out.norm());
            }
        }
    }

    #[test]
    fn test_repeated_scatter_stays_on_sphere() {
        let mut rng = LcgRng::new(11);
        let phase = HenyeyGreenstein::new(0.9);
        let mut dir = Vector3f::new(0.0, 0.0, 1.0);
        for _ in 0..1000000 {
            dir = phase.sample_direction(&dir, rng.next_f32(), rng.next_f32());
        }
        assert!((dir.norm() - 1.0).abs() < 1e-5);
    }
}
