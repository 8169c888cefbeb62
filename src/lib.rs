//! Parallel density-based clustering over a uniform spatial grid.
//!
//! This crate implements DBSCAN for 2-D point sets with a per-dimension
//! box neighborhood: `p` and `q` are neighbors when `|p.x - q.x| <= eps.x`
//! and `|p.y - q.y| <= eps.y`. Candidate pairs come from a uniform grid
//! with cell side `eps`, neighborhoods are materialized in parallel, and
//! clusters are formed with a lock-free union-find over core points.
//!
//! Cluster ids are dense, start at 0, and are assigned in ascending order
//! of each cluster's first point, so identical inputs produce identical
//! label vectors regardless of the worker count.
//!
//! # Example
//!
//! ```
//! use grid_dbscan::{cluster, NOISE};
//!
//! let points = vec![
//!     [0.0_f32, 0.0], [0.1, 0.1], [0.2, 0.0],
//!     [10.0, 10.0], [10.1, 10.1], [10.2, 10.0],
//!     [50.0, 50.0],
//! ];
//!
//! let output = cluster(&points, [0.5, 0.5], 2).expect("clustering should succeed");
//! assert_eq!(output.num_clusters, 2);
//! assert_eq!(output.num_noise, 1);
//! assert_eq!(output.labels[6], NOISE);
//! ```

mod classify;
mod error;
mod grid;
mod neighbors;
mod types;
mod union_find;
mod util;

pub use error::DbscanError;
pub use types::{Point2Like, DIMS, NOISE};

use glam::Vec2;

use crate::grid::UniformGrid;
use crate::util::PhaseTimer;

/// Clustering parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DbscanParams {
    /// Per-dimension neighborhood half-width; must be positive and finite.
    pub eps: [f32; 2],
    /// Minimum neighbor count (self excluded) for a core point; at least 1.
    pub min_pts: u32,
    /// Worker threads for the parallel phases; at least 1.
    pub threads: usize,
}

impl DbscanParams {
    /// Parameters with `threads` defaulting to the available parallelism.
    pub fn new(eps: [f32; 2], min_pts: u32) -> Self {
        let threads = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self {
            eps,
            min_pts,
            threads,
        }
    }

    /// Override the worker-thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    fn validate(&self) -> Result<(), DbscanError> {
        for (dim, &value) in self.eps.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(DbscanError::InvalidEps { dim, value });
            }
        }
        if self.min_pts == 0 {
            return Err(DbscanError::ZeroMinPts);
        }
        if self.threads == 0 {
            return Err(DbscanError::ZeroThreads);
        }
        Ok(())
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOutput {
    /// Per-point label: a dense cluster id in `0..num_clusters`, or [`NOISE`].
    pub labels: Vec<i32>,
    /// Number of clusters found.
    pub num_clusters: usize,
    /// Number of points labeled [`NOISE`].
    pub num_noise: usize,
}

impl ClusterOutput {
    fn empty() -> Self {
        Self {
            labels: Vec::new(),
            num_clusters: 0,
            num_noise: 0,
        }
    }

    /// Point count per cluster id.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.num_clusters];
        for &label in &self.labels {
            if label >= 0 {
                sizes[label as usize] += 1;
            }
        }
        sizes
    }
}

/// Cluster `points` with default threading. See [`cluster_with`].
pub fn cluster<P: Point2Like>(
    points: &[P],
    eps: [f32; 2],
    min_pts: u32,
) -> Result<ClusterOutput, DbscanError> {
    cluster_with(points, &DbscanParams::new(eps, min_pts))
}

/// Cluster `points` under explicit parameters.
///
/// Runs the grid build, neighborhood construction, and classification
/// pipeline inside a dedicated worker pool of `params.threads` threads.
/// The input is only borrowed for the duration of the call and no state
/// survives between calls.
///
/// # Errors
/// Rejects non-positive or non-finite `eps`, zero `min_pts` or `threads`,
/// inputs past `i32::MAX` points, and radii so small relative to the data
/// spread that the grid cannot be allocated.
pub fn cluster_with<P: Point2Like>(
    points: &[P],
    params: &DbscanParams,
) -> Result<ClusterOutput, DbscanError> {
    params.validate()?;
    if points.len() > i32::MAX as usize {
        return Err(DbscanError::TooManyPoints(points.len()));
    }
    if points.is_empty() {
        return Ok(ClusterOutput::empty());
    }

    let buffer: Vec<Vec2> = points.iter().map(|p| Vec2::new(p.x(), p.y())).collect();
    let eps = Vec2::from(params.eps);
    let min_pts = params.min_pts;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(params.threads)
        .build()
        .map_err(|e| DbscanError::ThreadPool(e.to_string()))?;

    pool.install(|| run_pipeline(&buffer, eps, min_pts))
}

/// Cluster a flat row-major coordinate buffer of `x0, y0, x1, y1, ...`.
pub fn cluster_flat(coords: &[f32], params: &DbscanParams) -> Result<ClusterOutput, DbscanError> {
    if coords.len() % DIMS != 0 {
        return Err(DbscanError::RaggedCoordinates(coords.len()));
    }
    let points: Vec<[f32; 2]> = coords.chunks_exact(DIMS).map(|c| [c[0], c[1]]).collect();
    cluster_with(&points, params)
}

fn run_pipeline(points: &[Vec2], eps: Vec2, min_pts: u32) -> Result<ClusterOutput, DbscanError> {
    let grid = {
        let _t = PhaseTimer::start("grid build");
        UniformGrid::build(points, eps)?
    };
    log::debug!("grid dims: {:?}, {:?}", grid.dims(), grid.stats());

    let neighbors = {
        let _t = PhaseTimer::start("neighbor lists");
        neighbors::build_neighbor_lists(points, eps, &grid)
    };
    log::debug!(
        "neighbor pairs: {} across {} points",
        neighbors.total(),
        points.len()
    );

    let classification = {
        let _t = PhaseTimer::start("classify");
        classify::classify(&neighbors, min_pts)
    };

    Ok(ClusterOutput {
        labels: classification.labels,
        num_clusters: classification.num_clusters,
        num_noise: classification.num_noise,
    })
}
