//! K-means clustering of sketch sets.
//!
//! Each sketch byte becomes one `f64` feature; the numerical work is
//! delegated to `linfa-clustering`. Runs are reproducible: the RNG is
//! seeded from [`ClusteringParams::seed`], so identical inputs and
//! parameters yield identical labels.

use crate::errors::ClusterError;
use crate::sketch::SketchSet;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::io::{self, Write};

/// Parameters for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusteringParams {
    /// Number of clusters to produce.
    pub num_clusters: usize,
    /// RNG seed for centroid initialization.
    pub seed: u64,
    /// Iteration cap for the fitting loop.
    pub max_iterations: u64,
}

impl ClusteringParams {
    /// Creates parameters for `num_clusters` clusters with the default
    /// seed and iteration cap.
    #[must_use]
    pub fn new(num_clusters: usize) -> Self {
        Self {
            num_clusters,
            seed: 13,
            max_iterations: 300,
        }
    }

    /// Sets the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Clusters a sketch set, returning one label per sketch in input order.
///
/// # Errors
///
/// Returns [`ClusterError::EmptySketchSet`] for an empty input,
/// [`ClusterError::InvalidClusterCount`] when the requested cluster count
/// is zero or exceeds the number of sketches, and
/// [`ClusterError::Fit`] when the numerical library fails to fit.
pub fn cluster_sketches(
    sketches: &SketchSet,
    params: &ClusteringParams,
) -> Result<Vec<usize>, ClusterError> {
    if sketches.is_empty() {
        return Err(ClusterError::EmptySketchSet);
    }
    if params.num_clusters == 0 || params.num_clusters > sketches.len() {
        return Err(ClusterError::InvalidClusterCount {
            requested: params.num_clusters,
            available: sketches.len(),
        });
    }

    let rows = sketches.len();
    let cols = sketches.bytes_per_sketch();
    let bytes = sketches.as_bytes();
    let observations = Array2::from_shape_fn((rows, cols), |(i, j)| f64::from(bytes[i * cols + j]));

    let rng = Xoshiro256Plus::seed_from_u64(params.seed);
    let dataset = DatasetBase::from(observations);
    let model = KMeans::params_with_rng(params.num_clusters, rng)
        .max_n_iterations(params.max_iterations)
        .fit(&dataset)?;

    let labels = model.predict(dataset.records());
    Ok(labels.iter().copied().collect())
}

/// Writes labels whitespace-separated, in input order, ending with a
/// newline.
///
/// # Errors
///
/// Propagates any write failure.
pub fn write_labels(mut writer: impl Write, labels: &[usize]) -> io::Result<()> {
    for (index, label) in labels.iter().enumerate() {
        if index > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{label}")?;
    }
    writeln!(writer)?;
    Ok(())
}
