//! Core-point classification and cluster assignment.
//!
//! Three barrier-separated parallel phases over the neighbor lists: mark
//! core points, unite box-adjacent cores in the lock-free forest, then
//! resolve a label per point. A cluster is a connected component of core
//! points; a non-core point joins the claiming core with the smallest
//! root, or falls out as noise. A final sequential pass renumbers roots
//! into dense ids in first-encounter order, which makes the label vector
//! identical for every worker count.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::neighbors::NeighborList;
use crate::types::NOISE;
use crate::union_find::AtomicForest;

pub(crate) struct Classification {
    pub labels: Vec<i32>,
    pub num_clusters: usize,
    pub num_noise: usize,
}

pub(crate) fn classify(neighbors: &NeighborList, min_pts: u32) -> Classification {
    let n = neighbors.len();
    let min_pts = min_pts as usize;

    let is_core: Vec<bool> = (0..n)
        .into_par_iter()
        .map(|i| neighbors.count(i) >= min_pts)
        .collect();

    // Border points are deliberately not united: linking a non-core point
    // into a tree would fuse two clusters that merely share it.
    let forest = AtomicForest::new(n);
    (0..n).into_par_iter().for_each(|i| {
        if !is_core[i] {
            return;
        }
        for &j in neighbors.neighbors(i) {
            if is_core[j as usize] {
                forest.unite(i as u32, j);
            }
        }
    });

    let mut labels: Vec<i32> = (0..n)
        .into_par_iter()
        .map(|i| {
            if is_core[i] {
                forest.find(i as u32) as i32
            } else {
                neighbors
                    .neighbors(i)
                    .iter()
                    .filter(|&&j| is_core[j as usize])
                    .map(|&j| forest.find(j) as i32)
                    .min()
                    .unwrap_or(NOISE)
            }
        })
        .collect();

    // Canonical relabel: dense ids in ascending first-encounter order.
    let mut dense: FxHashMap<i32, i32> = FxHashMap::default();
    let mut num_noise = 0usize;
    for label in labels.iter_mut() {
        if *label == NOISE {
            num_noise += 1;
            continue;
        }
        let next = dense.len() as i32;
        *label = *dense.entry(*label).or_insert(next);
    }

    Classification {
        num_clusters: dense.len(),
        num_noise,
        labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::UniformGrid;
    use crate::neighbors::build_neighbor_lists;
    use glam::Vec2;

    fn classify_points(points: &[Vec2], eps: f32, min_pts: u32) -> Classification {
        let eps = Vec2::splat(eps);
        let grid = UniformGrid::build(points, eps).unwrap();
        let neighbors = build_neighbor_lists(points, eps, &grid);
        classify(&neighbors, min_pts)
    }

    #[test]
    fn adjacent_cores_share_a_cluster() {
        let points = vec![Vec2::ZERO, Vec2::new(0.1, 0.0), Vec2::new(0.2, 0.0)];
        let c = classify_points(&points, 0.5, 2);
        assert_eq!(c.labels, vec![0, 0, 0]);
        assert_eq!(c.num_clusters, 1);
        assert_eq!(c.num_noise, 0);
    }

    #[test]
    fn sparse_points_are_noise() {
        let points = vec![Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0)];
        let c = classify_points(&points, 0.5, 1);
        assert_eq!(c.labels, vec![NOISE, NOISE, NOISE]);
        assert_eq!(c.num_clusters, 0);
        assert_eq!(c.num_noise, 3);
    }

    #[test]
    fn a_lone_neighbor_pair_below_min_pts_is_noise() {
        let points = vec![Vec2::ZERO, Vec2::new(0.1, 0.0)];
        let c = classify_points(&points, 0.5, 2);
        assert_eq!(c.labels, vec![NOISE, NOISE]);
    }

    #[test]
    fn border_point_attaches_to_its_core_neighbor() {
        // 0, 1, 2 form a dense clump; 3 only reaches point 2.
        let points = vec![
            Vec2::ZERO,
            Vec2::new(0.1, 0.0),
            Vec2::new(0.2, 0.0),
            Vec2::new(0.6, 0.0),
        ];
        let c = classify_points(&points, 0.45, 2);
        assert_eq!(c.labels, vec![0, 0, 0, 0]);
        assert_eq!(c.num_clusters, 1);
        assert_eq!(c.num_noise, 0);
    }

    #[test]
    fn cluster_ids_are_dense_and_ordered_by_first_point() {
        // Two clumps, the second appearing first in index order.
        let points = vec![
            Vec2::new(5.0, 5.0),
            Vec2::new(5.1, 5.0),
            Vec2::new(5.2, 5.0),
            Vec2::ZERO,
            Vec2::new(0.1, 0.0),
            Vec2::new(0.2, 0.0),
        ];
        let c = classify_points(&points, 0.5, 2);
        assert_eq!(c.labels, vec![0, 0, 0, 1, 1, 1]);
        assert_eq!(c.num_clusters, 2);
    }
}
