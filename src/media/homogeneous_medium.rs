// Copyright @yucwang 2026

use crate::core::medium::Medium;
use crate::core::phase::PhaseFunction;
use crate::core::settings::SimulationError;
use crate::math::constants::Float;
use crate::phases::henyey_greenstein::HenyeyGreenstein;

pub struct HomogeneousMedium {
    sigma_a: Float,
    sigma_s: Float,
    phase: HenyeyGreenstein,
}

impl HomogeneousMedium {
    /// Build a medium, rejecting coefficients that would make the free path
    /// or the phase function meaningless.
    pub fn new(sigma_a: Float, sigma_s: Float, g: Float) -> Result<Self, SimulationError> {
        if !(sigma_a >= 0.0) || !(sigma_s >= 0.0) {
            return Err(SimulationError::InvalidSettings(
                format!("coefficients must be non-negative: sigma_a = {}, sigma_s = {}", sigma_a, sigma_s)));
        }
        if !(sigma_a + sigma_s > 0.0) || !(sigma_a + sigma_s).is_finite() {
            return Err(SimulationError::InvalidSettings(
                format!("extinction must be positive and finite: sigma_t = {}", sigma_a + sigma_s)));
        }
        if !(g > -1.0 && g < 1.0) {
            return Err(SimulationError::InvalidSettings(
                format!("anisotropy must lie in (-1, 1): g = {}", g)));
        }

        Ok(Self {
            sigma_a,
            sigma_s,
            phase: HenyeyGreenstein::new(g),
        })
    }

    pub fn anisotropy(&self) -> Float {
        self.phase.g()
    }
}

impl Medium for HomogeneousMedium {
    fn sigma_a(&self) -> Float {
        self.sigma_a
    }

    fn sigma_s(&self) -> Float {
        self.sigma_s
    }

    fn phase(&self) -> &dyn PhaseFunction {
        &self.phase
    }
}
