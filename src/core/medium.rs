// Copyright @yucwang 2026

use crate::core::phase::PhaseFunction;
use crate::math::constants::Float;

/// Optical properties of the material filling the slab.
pub trait Medium: Send + Sync {
    fn sigma_a(&self) -> Float;
    fn sigma_s(&self) -> Float;
    fn phase(&self) -> &dyn PhaseFunction;

    fn sigma_t(&self) -> Float {
        self.sigma_a() + self.sigma_s()
    }

    /// Fraction of the weight that survives an interaction.
    fn albedo(&self) -> Float {
        let sigma_t = self.sigma_t();
        if sigma_t > 0.0 {
            self.sigma_s() / sigma_t
        } else {
            0.0
        }
    }
}
