// Copyright @yucwang 2026

use crate::core::medium::Medium;
use crate::core::photon::Photon;
use crate::core::rng::UniformSource;
use crate::core::settings::{ SimulationError, SimulationSettings };
use crate::core::tally::{ ExitHistogram, PassResult, PhotonExit, PhotonFate };
use crate::math::constants::Float;

/// Monte Carlo random walk of photon packets through a slab
/// 0 <= z <= thickness of infinite lateral extent, lit at the origin by a
/// normally incident pencil beam.
pub struct PhotonTransport {
    medium: Box<dyn Medium>,
    thickness: Float,
    extent: Float,
    roulette_m: u32,
    roulette_threshold: Float,
}

impl PhotonTransport {
    pub fn new(medium: Box<dyn Medium>, thickness: Float, extent: Float) -> Result<Self, SimulationError> {
        if !(thickness > 0.0) || !thickness.is_finite() {
            return Err(SimulationError::InvalidSettings(format!("slab thickness must be positive: {}", thickness)));
        }
        if !(extent > 0.0) || !extent.is_finite() {
            return Err(SimulationError::InvalidSettings(format!("slab extent must be positive: {}", extent)));
        }
        if !(medium.sigma_t() > 0.0) {
            return Err(SimulationError::InvalidSettings(format!("extinction must be positive: {}", medium.sigma_t())));
        }

        Ok(Self {
            medium,
            thickness,
            extent,
            roulette_m: 10,
            roulette_threshold: 0.001,
        })
    }

    pub fn from_settings(settings: &SimulationSettings) -> Result<Self, SimulationError> {
        settings.validate()?;
        let medium = settings.medium()?;
        let transport = Self::new(Box::new(medium), settings.thickness, settings.slab_extent)?;
        transport.with_roulette(settings.roulette_m, settings.roulette_threshold)
    }

    /// Replace the Russian roulette survival factor `m` and the weight below
    /// which a photon has to play.
    pub fn with_roulette(mut self, m: u32, threshold: Float) -> Result<Self, SimulationError> {
        if m < 1 {
            return Err(SimulationError::InvalidSettings("russian roulette factor must be at least 1".to_string()));
        }
        if !(threshold > 0.0 && threshold < 1.0) {
            return Err(SimulationError::InvalidSettings(format!("russian roulette threshold must lie in (0, 1): {}", threshold)));
        }
        self.roulette_m = m;
        self.roulette_threshold = threshold;
        Ok(self)
    }

    pub fn medium(&self) -> &dyn Medium {
        self.medium.as_ref()
    }

    pub fn thickness(&self) -> Float {
        self.thickness
    }

    pub fn extent(&self) -> Float {
        self.extent
    }

    /// Follow one photon until it leaves the slab or loses the roulette.
    /// Transmitted photons are binned into `histogram` by their exit
    /// position; reflected ones are only reported.
    pub fn trace_photon<R: UniformSource>(&self, rng: &mut R, histogram: &mut ExitHistogram) -> PhotonExit {
        let sigma_t = self.medium.sigma_t();
        let dw = self.medium.sigma_a() / sigma_t;
        let phase = self.medium.phase();
        let survival = 1.0 / self.roulette_m as Float;

        let mut photon = Photon::default();
        let mut scatterings = 0u32;

        loop {
            // Free path from the Beer-Lambert law, 1 - u keeps the log finite.
            let s = -(1.0 - rng.next_f32()).ln() / sigma_t;
            let dist = photon.distance_to_boundary(self.thickness);

            if s > dist {
                return if photon.direction.z > 0.0 {
                    let binned = histogram.deposit(photon.position.x, photon.position.y, photon.weight);
                    PhotonExit { fate: PhotonFate::Transmitted, weight: photon.weight, binned, scatterings }
                } else {
                    PhotonExit { fate: PhotonFate::Reflected, weight: photon.weight, binned: false, scatterings }
                };
            }

            photon.advance(s);

            photon.weight = (photon.weight - dw).max(0.0);
            if photon.weight < self.roulette_threshold {
                if rng.next_f32() > survival {
                    return PhotonExit { fate: PhotonFate::Absorbed, weight: 0.0, binned: false, scatterings };
                }
                photon.weight *= self.roulette_m as Float;
                if photon.weight == 0.0 {
                    return PhotonExit { fate: PhotonFate::Absorbed, weight: 0.0, binned: false, scatterings };
                }
            }

            let u1 = rng.next_f32();
            let u2 = rng.next_f32();
            photon.direction = phase.sample_direction(&photon.direction, u1, u2);
            scatterings += 1;
        }
    }

    /// Trace `photons` walks and return their tallies in a fresh
    /// `size` x `size` histogram. Rd and Tt are not normalized.
    pub fn run_pass<R: UniformSource>(&self, photons: usize, size: usize, rng: &mut R) -> Result<PassResult, SimulationError> {
        check_pass_inputs(photons, size)?;

        let mut result = PassResult::new(size, self.extent);
        for _ in 0..photons {
            let exit = self.trace_photon(rng, &mut result.histogram);
            result.record(&exit);
        }

        log::debug!("pass of {} photons: {} transmitted, {} reflected, {} absorbed",
                    photons, result.transmitted, result.reflected, result.absorbed);
        Ok(result)
    }

    /// Trace `photons` walks, adding transmitted weight into the caller's
    /// histogram, and return the raw (Rd, Tt) sums of this call.
    pub fn run_pass_into<R: UniformSource>(&self, histogram: &mut ExitHistogram, photons: usize, rng: &mut R) -> Result<(f64, f64), SimulationError> {
        check_pass_inputs(photons, histogram.size())?;

        let mut reflectance = 0.0f64;
        let mut transmittance = 0.0f64;
        for _ in 0..photons {
            let exit = self.trace_photon(rng, histogram);
            match exit.fate {
                PhotonFate::Transmitted => transmittance += exit.weight as f64,
                PhotonFate::Reflected => reflectance += exit.weight as f64,
                PhotonFate::Absorbed => {}
            }
        }

        Ok((reflectance, transmittance))
    }
}

fn check_pass_inputs(photons: usize, size: usize) -> Result<(), SimulationError> {
    if photons == 0 {
        return Err(SimulationError::InvalidSettings("photon count must be positive".to_string()));
    }
    if size == 0 {
        return Err(SimulationError::InvalidSettings("image size must be positive".to_string()));
    }
    Ok(())
}
