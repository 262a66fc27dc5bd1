// Copyright @yucwang 2021

use crate::core::rng::LcgRng;
use crate::core::settings::SimulationError;
use crate::core::tally::PassResult;
use crate::core::transport::PhotonTransport;
use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

/// Reduced tallies of every pass of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub total: PassResult,
    pub passes: usize,
}

impl SimulationResult {
    /// Diffuse reflectance as a fraction of all launched photons.
    pub fn reflectance(&self) -> f64 {
        self.total.normalized_reflectance()
    }

    /// Transmittance as a fraction of all launched photons.
    pub fn transmittance(&self) -> f64 {
        self.total.normalized_transmittance()
    }

    /// Exit histogram averaged over the passes.
    pub fn averaged_histogram(&self) -> Bitmap {
        let mut bins = self.total.histogram.bins().clone();
        if self.passes > 0 {
            bins.scale(1.0 / self.passes as Float);
        }
        bins
    }
}

pub trait Simulator {
    fn simulate(&self, transport: &PhotonTransport) -> Result<SimulationResult, SimulationError>;
}

/// Split of a run into units of work. Unit `i` belongs to pass
/// `i / batches_per_pass` and is traced with random stream `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    pub photons_per_pass: usize,
    pub passes: usize,
    pub batch_size: usize,
}

impl BatchPlan {
    pub fn batches_per_pass(&self) -> usize {
        (self.photons_per_pass + self.batch_size - 1) / self.batch_size
    }

    pub fn total_batches(&self) -> usize {
        self.batches_per_pass() * self.passes
    }

    /// (pass index, photons) of batch `index`.
    pub fn batch(&self, index: usize) -> (usize, usize) {
        let per_pass = self.batches_per_pass();
        let pass = index / per_pass;
        let first = (index % per_pass) * self.batch_size;
        (pass, self.batch_size.min(self.photons_per_pass - first))
    }
}

/// Trace batch `index` of `plan` with its own random stream of the run
/// seeded by `seed`. The outcome depends only on these arguments, not on
/// which worker runs it or when.
pub fn trace_batch(transport: &PhotonTransport,
                   plan: &BatchPlan,
                   index: usize,
                   size: usize,
                   seed: u64) -> Result<PassResult, SimulationError> {
    let (_pass, photons) = plan.batch(index);
    let mut rng = LcgRng::for_stream(seed, index as u64);
    transport.run_pass(photons, size, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_plan_splits_passes() {
        let plan = BatchPlan { photons_per_pass: 10, passes: 3, batch_size: 4 };
        assert_eq!(plan.batches_per_pass(), 3);
        assert_eq!(plan.total_batches(), 9);
        assert_eq!(plan.batch(0), (0, 4));
        assert_eq!(plan.batch(2), (0, 2));
        assert_eq!(plan.batch(3), (1, 4));
        assert_eq!(plan.batch(8), (2, 2));

        let total: usize = (0..plan.total_batches()).map(|i| plan.batch(i).1).sum();
        assert_eq!(total, 30);
    }

    #[test]
    fn test_averaged_histogram() {
        let mut total = PassResult::new(2, 2.0);
        total.histogram.deposit(0.5, 0.5, 4.0);
        let result = SimulationResult { total, passes: 4 };
        let avg = result.averaged_histogram();
        assert_eq!(avg[(1, 1)], 1.0);
        assert_eq!(avg.sum(), 1.0);
    }
}
