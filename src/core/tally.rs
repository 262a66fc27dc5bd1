// Copyright @yucwang 2026

use crate::math::bitmap::Bitmap;
use crate::math::constants::Float;

/// Square histogram of the lateral positions at which photons leave the
/// slab, covering [-extent / 2, extent / 2)^2.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitHistogram {
    bins: Bitmap,
    extent: Float,
}

impl ExitHistogram {
    pub fn new(size: usize, extent: Float) -> Self {
        Self { bins: Bitmap::new(size, size), extent }
    }

    pub fn size(&self) -> usize {
        self.bins.width()
    }

    pub fn extent(&self) -> Float {
        self.extent
    }

    pub fn bins(&self) -> &Bitmap {
        &self.bins
    }

    /// Bin holding the lateral position (x, y), if it is inside the grid.
    pub fn bin_index(&self, x: Float, y: Float) -> Option<(usize, usize)> {
        let size = self.size() as Float;
        let fx = ((x + 0.5 * self.extent) / self.extent * size).floor();
        let fy = ((y + 0.5 * self.extent) / self.extent * size).floor();
        if fx >= 0.0 && fx < size && fy >= 0.0 && fy < size {
            Some((fx as usize, fy as usize))
        } else {
            None
        }
    }

    /// Add `weight` at (x, y). Returns false when the position falls outside
    /// the grid and the weight is dropped.
    pub fn deposit(&mut self, x: Float, y: Float, weight: Float) -> bool {
        match self.bin_index(x, y) {
            Some(idx) => {
                self.bins[idx] += weight;
                true
            }
            None => false,
        }
    }

    pub fn total(&self) -> f64 {
        self.bins.sum()
    }
}

/// How a single photon walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotonFate {
    /// Left through the far face.
    Transmitted,
    /// Left through the entry face.
    Reflected,
    /// Killed by Russian roulette.
    Absorbed,
}

/// Outcome of one photon walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonExit {
    pub fate: PhotonFate,
    /// Weight carried out of the slab, zero for absorbed photons.
    pub weight: Float,
    /// Whether the weight was written into the exit histogram.
    pub binned: bool,
    pub scatterings: u32,
}

/// Tallies of one pass (or one batch of a pass). Rd and Tt are raw weight
/// sums, normalize them with `photons`.
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    pub histogram: ExitHistogram,
    pub reflectance: f64,
    pub transmittance: f64,
    pub photons: usize,
    pub transmitted: usize,
    pub reflected: usize,
    pub absorbed: usize,
    /// Transmitted weight that landed outside the histogram.
    pub dropped: f64,
}

impl PassResult {
    pub fn new(size: usize, extent: Float) -> Self {
        Self {
            histogram: ExitHistogram::new(size, extent),
            reflectance: 0.0,
            transmittance: 0.0,
            photons: 0,
            transmitted: 0,
            reflected: 0,
            absorbed: 0,
            dropped: 0.0,
        }
    }

    /// Account for a finished walk. The histogram write itself happens
    /// during the walk.
    pub fn record(&mut self, exit: &PhotonExit) {
        self.photons += 1;
        match exit.fate {
            PhotonFate::Transmitted => {
                self.transmitted += 1;
                self.transmittance += exit.weight as f64;
                if !exit.binned {
                    self.dropped += exit.weight as f64;
                }
            }
            PhotonFate::Reflected => {
                self.reflected += 1;
                self.reflectance += exit.weight as f64;
            }
            PhotonFate::Absorbed => self.absorbed += 1,
        }
    }

    /// Sum `other` into `self`.
    pub fn merge(&mut self, other: &PassResult) {
        self.histogram.bins.add_assign(&other.histogram.bins);
        self.reflectance += other.reflectance;
        self.transmittance += other.transmittance;
        self.photons += other.photons;
        self.transmitted += other.transmitted;
        self.reflected += other.reflected;
        self.absorbed += other.absorbed;
        self.dropped += other.dropped;
    }

    pub fn normalized_reflectance(&self) -> f64 {
        if self.photons == 0 { 0.0 } else { self.reflectance / self.photons as f64 }
    }

    pub fn normalized_transmittance(&self) -> f64 {
        if self.photons == 0 { 0.0 } else { self.transmittance / self.photons as f64 }
    }

    pub fn dropped_fraction(&self) -> f64 {
        if self.transmittance > 0.0 { self.dropped / self.transmittance } else { 0.0 }
    }
}
