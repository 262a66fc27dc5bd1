// Copyright @yucwang 2026

use crate::math::constants::{ Float, Vector3f };
use crate::media::homogeneous_medium::HomogeneousMedium;

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidSettings(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidSettings(msg) => write!(f, "invalid settings: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {}

/// Every knob of a slab simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub photons_per_pass: usize,
    pub passes: usize,
    pub image_size: usize,
    /// Physical width of the square region imaged by the histogram,
    /// centered on the entry point.
    pub slab_extent: Float,
    pub thickness: Float,
    pub sigma_a: Float,
    pub sigma_s: Float,
    pub anisotropy: Float,
    pub roulette_m: u32,
    pub roulette_threshold: Float,
    pub seed: u64,
    /// Worker threads, 0 picks the available parallelism.
    pub threads: usize,
    /// Photons traced per unit of work handed to a worker.
    pub batch_size: usize,
    pub color: Vector3f,
    pub gamma: Float,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            photons_per_pass: 1_000_000,
            passes: 64,
            image_size: 512,
            slab_extent: 2.0,
            thickness: 0.5,
            sigma_a: 1.0,
            sigma_s: 2.0,
            anisotropy: 0.75,
            roulette_m: 10,
            roulette_threshold: 0.001,
            seed: 0,
            threads: 0,
            batch_size: 65536,
            color: Vector3f::new(0.0, 0.77, 0.80),
            gamma: 1.0,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |msg: String| Err(SimulationError::InvalidSettings(msg));

        if self.photons_per_pass == 0 {
            return invalid("photon count must be positive".to_string());
        }
        if self.passes == 0 {
            return invalid("pass count must be positive".to_string());
        }
        if self.image_size == 0 {
            return invalid("image size must be positive".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch size must be positive".to_string());
        }
        if !(self.slab_extent > 0.0) || !self.slab_extent.is_finite() {
            return invalid(format!("slab extent must be positive: {}", self.slab_extent));
        }
        if !(self.thickness > 0.0) || !self.thickness.is_finite() {
            return invalid(format!("slab thickness must be positive: {}", self.thickness));
        }
        if self.roulette_m < 1 {
            return invalid("russian roulette factor must be at least 1".to_string());
        }
        if !(self.roulette_threshold > 0.0 && self.roulette_threshold < 1.0) {
            return invalid(format!("russian roulette threshold must lie in (0, 1): {}", self.roulette_threshold));
        }
        if !(self.gamma > 0.0) {
            return invalid(format!("gamma must be positive: {}", self.gamma));
        }

        self.medium().map(|_| ())
    }

    pub fn medium(&self) -> Result<HomogeneousMedium, SimulationError> {
        HomogeneousMedium::new(self.sigma_a, self.sigma_s, self.anisotropy)
    }

    pub fn total_photons(&self) -> usize {
        self.photons_per_pass * self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = SimulationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.total_photons(), 64_000_000);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let base = SimulationSettings::default();

        let mut s = base.clone();
        s.photons_per_pass = 0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.image_size = 0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.sigma_a = 0.0;
        s.sigma_s = 0.0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.anisotropy = 1.0;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.thickness = -0.5;
        assert!(s.validate().is_err());

        let mut s = base.clone();
        s.roulette_m = 0;
        assert!(s.validate().is_err());

        let mut s = base;
        s.roulette_threshold = Float::NAN;
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_error_message() {
        let mut s = SimulationSettings::default();
        s.passes = 0;
        let err = s.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid settings: pass count must be positive");
    }
}
