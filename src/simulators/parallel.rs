// Copyright @yucwang 2021

use crate::core::settings::{ SimulationError, SimulationSettings };
use crate::core::tally::PassResult;
use crate::core::transport::PhotonTransport;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

pub use super::simulator::{ BatchPlan, SimulationResult, Simulator, trace_batch };

/// Runs every pass of a simulation on a pool of scoped worker threads.
///
/// Workers pull batch indices from a shared counter and send their tallies
/// back over a channel. The main thread reduces them strictly in batch
/// order, so the result for a seed does not depend on the thread count.
pub struct ParallelSimulator {
    plan: BatchPlan,
    image_size: usize,
    seed: u64,
    threads: usize,
    show_progress: bool,
}

impl ParallelSimulator {
    pub fn new(plan: BatchPlan, image_size: usize, seed: u64, threads: usize) -> Self {
        Self {
            plan,
            image_size,
            seed,
            threads,
            show_progress: false,
        }
    }

    pub fn from_settings(settings: &SimulationSettings) -> Self {
        let plan = BatchPlan {
            photons_per_pass: settings.photons_per_pass,
            passes: settings.passes,
            batch_size: settings.batch_size,
        };
        Self::new(plan, settings.image_size, settings.seed, settings.threads)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn thread_count(&self, total_batches: usize) -> usize {
        let threads = match self.threads {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        };
        threads.min(total_batches).max(1)
    }
}

impl Simulator for ParallelSimulator {
    fn simulate(&self, transport: &PhotonTransport) -> Result<SimulationResult, SimulationError> {
        if self.plan.photons_per_pass == 0 || self.plan.passes == 0 || self.plan.batch_size == 0 {
            return Err(SimulationError::InvalidSettings("empty batch plan".to_string()));
        }
        if self.image_size == 0 {
            return Err(SimulationError::InvalidSettings("image size must be positive".to_string()));
        }

        let plan = self.plan;
        let size = self.image_size;
        let seed = self.seed;
        let total_batches = plan.total_batches();
        let per_pass = plan.batches_per_pass();
        let thread_count = self.thread_count(total_batches);

        log::info!("Tracing {} photons in {} passes ({} batches) on {} threads.",
                   plan.photons_per_pass * plan.passes, plan.passes, total_batches, thread_count);

        let progress = if self.show_progress {
            ProgressBar::new(total_batches as u64)
        } else {
            ProgressBar::hidden()
        };
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} batches")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let next_batch = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(usize, Result<PassResult, SimulationError>)>();
        let mut total = PassResult::new(size, transport.extent());
        let mut pending: BTreeMap<usize, PassResult> = BTreeMap::new();
        let mut next_merge = 0usize;
        let mut failure: Option<SimulationError> = None;

        thread::scope(|scope| {
            for _ in 0..thread_count {
                let next_batch = Arc::clone(&next_batch);
                let tx = tx.clone();
                scope.spawn(move || {
                    loop {
                        let index = next_batch.fetch_add(1, Ordering::Relaxed);
                        if index >= total_batches {
                            break;
                        }

                        let result = trace_batch(transport, &plan, index, size, seed);
                        if tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for (index, result) in rx.iter() {
                match result {
                    Ok(batch) => {
                        pending.insert(index, batch);
                        while let Some(batch) = pending.remove(&next_merge) {
                            total.merge(&batch);
                            next_merge += 1;
                            if next_merge % per_pass == 0 {
                                log::debug!("{}", pass_summary(next_merge / per_pass, plan.passes, &total));
                            }
                        }
                        progress.inc(1);
                    }
                    Err(err) => {
                        log::error!("Batch {} failed: {}.", index, err);
                        next_batch.store(total_batches, Ordering::Relaxed);
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
            }
        });
        progress.finish_and_clear();

        if let Some(err) = failure {
            return Err(err);
        }

        let result = SimulationResult { total, passes: plan.passes };
        log::info!("Done: Rd = {:.6}, Tt = {:.6}, {:.3}% of the transmitted weight off the grid.",
                   result.reflectance(), result.transmittance(), 100.0 * result.total.dropped_fraction());
        Ok(result)
    }
}

/// Progress line for the first `pass` passes, with Rd and Tt normalized by
/// the photons reduced so far.
fn pass_summary(pass: usize, passes: usize, total: &PassResult) -> String {
    format!("Pass {}/{} reduced: Rd = {:.6}, Tt = {:.6}.",
            pass, passes, total.normalized_reflectance(), total.normalized_transmittance())
}

/// Runs the batches one after another on the calling thread, in the same
/// order and with the same streams as `ParallelSimulator`.
pub struct SequentialSimulator {
    plan: BatchPlan,
    image_size: usize,
    seed: u64,
}

impl SequentialSimulator {
    pub fn new(plan: BatchPlan, image_size: usize, seed: u64) -> Self {
        Self { plan, image_size, seed }
    }
}

impl Simulator for SequentialSimulator {
    fn simulate(&self, transport: &PhotonTransport) -> Result<SimulationResult, SimulationError> {
        if self.plan.photons_per_pass == 0 || self.plan.passes == 0 || self.plan.batch_size == 0 {
            return Err(SimulationError::InvalidSettings("empty batch plan".to_string()));
        }

        let per_pass = self.plan.batches_per_pass();
        let mut total = PassResult::new(self.image_size, transport.extent());
        for index in 0..self.plan.total_batches() {
            let batch = trace_batch(transport, &self.plan, index, self.image_size, self.seed)?;
            total.merge(&batch);
            if (index + 1) % per_pass == 0 {
                log::debug!("{}", pass_summary((index + 1) / per_pass, self.plan.passes, &total));
            }
        }
        Ok(SimulationResult { total, passes: self.plan.passes })
    }
}
