//! Parallel box-neighborhood construction over the uniform grid.
//!
//! The index range is split into blocked chunks; each chunk scans the 3x3
//! cell block per point, keeps the box-test survivors in chunk-local
//! buffers, and the chunks are then stitched into one flat CSR list
//! (per-point offsets plus a shared index buffer).

use glam::Vec2;
use rayon::prelude::*;

use crate::grid::UniformGrid;

/// True when `a` and `b` are within the per-dimension box radius.
#[inline]
pub(crate) fn within_box(a: Vec2, b: Vec2, eps: Vec2) -> bool {
    (a - b).abs().cmple(eps).all()
}

/// Per-point neighborhoods in CSR form. `neighbors(i)` never contains `i`
/// or a duplicate, and is ordered by cell (row-major 3x3 block) then by
/// index within the cell, independent of the worker count.
pub(crate) struct NeighborList {
    offsets: Vec<u32>,
    indices: Vec<u32>,
}

impl NeighborList {
    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// `|N(i)|`.
    #[inline]
    pub fn count(&self, i: usize) -> usize {
        (self.offsets[i + 1] - self.offsets[i]) as usize
    }

    /// The indices of point `i`'s box neighbors.
    #[inline]
    pub fn neighbors(&self, i: usize) -> &[u32] {
        let start = self.offsets[i] as usize;
        let end = self.offsets[i + 1] as usize;
        &self.indices[start..end]
    }

    /// Total directed neighbor pairs.
    #[inline]
    pub fn total(&self) -> usize {
        self.indices.len()
    }
}

struct Block {
    counts: Vec<u32>,
    indices: Vec<u32>,
}

pub(crate) fn build_neighbor_lists(points: &[Vec2], eps: Vec2, grid: &UniformGrid) -> NeighborList {
    let n = points.len();

    let threads = rayon::current_num_threads().max(1);
    let chunk_size = (n / (threads * 8)).clamp(256, 4096).max(1);
    let mut ranges = Vec::with_capacity(n.div_ceil(chunk_size));
    let mut start = 0;
    while start < n {
        let end = (start + chunk_size).min(n);
        ranges.push((start, end));
        start = end;
    }

    let blocks: Vec<Block> = ranges
        .par_iter()
        .map(|&(start, end)| {
            let mut cells: Vec<u32> = Vec::with_capacity(9);
            let mut counts = Vec::with_capacity(end - start);
            let mut indices = Vec::new();

            for i in start..end {
                let query = points[i];
                let before = indices.len();
                grid.neighbor_cells(grid.coords_of(query), &mut cells);
                for &cell in &cells {
                    for &j in grid.cell_points(cell as usize) {
                        if j as usize != i && within_box(query, points[j as usize], eps) {
                            indices.push(j);
                        }
                    }
                }
                counts.push((indices.len() - before) as u32);
            }

            Block { counts, indices }
        })
        .collect();

    let total: usize = blocks.iter().map(|b| b.indices.len()).sum();
    let total_u32 = u32::try_from(total).expect("neighbor list exceeds u32 capacity");

    let mut offsets = Vec::with_capacity(n + 1);
    offsets.push(0u32);
    let mut indices = Vec::with_capacity(total);
    let mut running = 0u32;
    for block in &blocks {
        for &count in &block.counts {
            running += count;
            offsets.push(running);
        }
        indices.extend_from_slice(&block.indices);
    }
    debug_assert_eq!(running, total_u32);

    NeighborList { offsets, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn random_points(n: usize, extent: f32, seed: u64) -> Vec<Vec2> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|_| Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent)))
            .collect()
    }

    fn build(points: &[Vec2], eps: Vec2) -> NeighborList {
        let grid = UniformGrid::build(points, eps).unwrap();
        build_neighbor_lists(points, eps, &grid)
    }

    fn brute_force(points: &[Vec2], eps: Vec2, i: usize) -> HashSet<u32> {
        points
            .iter()
            .enumerate()
            .filter(|&(j, &q)| j != i && within_box(points[i], q, eps))
            .map(|(j, _)| j as u32)
            .collect()
    }

    #[test]
    fn box_test_is_per_dimension() {
        let eps = Vec2::new(1.0, 0.25);
        assert!(within_box(Vec2::ZERO, Vec2::new(0.9, 0.2), eps));
        assert!(!within_box(Vec2::ZERO, Vec2::new(0.9, 0.3), eps));
        assert!(!within_box(Vec2::ZERO, Vec2::new(1.1, 0.0), eps));
    }

    #[test]
    fn boundary_distance_counts_as_neighbor() {
        // 0.5 and 0.25 are binary-exact, so the comparison is exact too.
        let eps = Vec2::new(0.5, 0.25);
        assert!(within_box(Vec2::ZERO, Vec2::new(0.5, 0.25), eps));
        assert!(within_box(Vec2::ZERO, Vec2::new(-0.5, 0.0), eps));
    }

    #[test]
    fn matches_brute_force_on_random_points() {
        for (n, extent, eps) in [
            (200, 5.0, Vec2::splat(0.8)),
            (1000, 20.0, Vec2::new(1.5, 0.6)),
            (1000, 3.0, Vec2::splat(0.5)),
        ] {
            let points = random_points(n, extent, 0xD5_BA + n as u64);
            let list = build(&points, eps);

            assert_eq!(list.len(), n);
            for i in 0..n {
                let got: HashSet<u32> = list.neighbors(i).iter().copied().collect();
                assert_eq!(got.len(), list.count(i), "duplicates in N({})", i);
                assert!(!got.contains(&(i as u32)), "N({}) contains itself", i);
                assert_eq!(got, brute_force(&points, eps, i), "N({}) mismatch", i);
            }
        }
    }

    #[test]
    fn neighborhoods_are_symmetric() {
        let eps = Vec2::splat(0.7);
        let points = random_points(800, 8.0, 1337);
        let list = build(&points, eps);

        for i in 0..points.len() {
            for &j in list.neighbors(i) {
                assert!(
                    list.neighbors(j as usize).contains(&(i as u32)),
                    "{} lists {} but not vice versa",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn single_point_has_no_neighbors() {
        let points = vec![Vec2::new(1.0, 2.0)];
        let list = build(&points, Vec2::splat(1.0));
        assert_eq!(list.len(), 1);
        assert_eq!(list.count(0), 0);
        assert_eq!(list.total(), 0);
    }

    #[test]
    fn coincident_points_are_mutual_neighbors() {
        let points = vec![Vec2::splat(2.0); 6];
        let list = build(&points, Vec2::splat(0.1));
        for i in 0..6 {
            assert_eq!(list.count(i), 5);
        }
        assert_eq!(list.total(), 30);
    }
}
