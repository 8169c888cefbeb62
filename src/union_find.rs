//! Lock-free disjoint sets over point indices.
//!
//! `find` uses path halving; `unite` always installs the smaller root as
//! the parent of the larger one. Parent links therefore only ever point at
//! smaller indices, the root of a component only ever decreases, and a
//! failed CAS always observes a parent at least as promoted as the one it
//! tried to install, so retry loops make strict progress without locks.

use std::sync::atomic::{AtomicU32, Ordering};

pub(crate) struct AtomicForest {
    parent: Vec<AtomicU32>,
}

impl AtomicForest {
    pub fn new(n: usize) -> Self {
        debug_assert!(n <= u32::MAX as usize);
        Self {
            parent: (0..n).map(|i| AtomicU32::new(i as u32)).collect(),
        }
    }

    /// Root of the set holding `x`, halving the traversed path as it goes.
    pub fn find(&self, mut x: u32) -> u32 {
        loop {
            let p = self.parent[x as usize].load(Ordering::Acquire);
            if p == x {
                return x;
            }
            let gp = self.parent[p as usize].load(Ordering::Acquire);
            if gp == p {
                return p;
            }
            // Re-point x at its grandparent; a lost race left an equal or
            // smaller parent in place, so just move on.
            let _ = self.parent[x as usize].compare_exchange_weak(
                p,
                gp,
                Ordering::Release,
                Ordering::Relaxed,
            );
            x = p;
        }
    }

    /// Merge the sets holding `x` and `y`. The smaller root wins.
    pub fn unite(&self, mut x: u32, mut y: u32) {
        loop {
            x = self.find(x);
            y = self.find(y);
            if x == y {
                return;
            }
            let (small, large) = if x < y { (x, y) } else { (y, x) };
            match self.parent[large as usize].compare_exchange(
                large,
                small,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(_) => {
                    x = small;
                    y = large;
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use rayon::prelude::*;

    /// Plain sequential disjoint set used as a reference.
    struct SeqDsu {
        parent: Vec<usize>,
    }

    impl SeqDsu {
        fn new(n: usize) -> Self {
            Self {
                parent: (0..n).collect(),
            }
        }

        fn find(&mut self, x: usize) -> usize {
            if self.parent[x] != x {
                let root = self.find(self.parent[x]);
                self.parent[x] = root;
            }
            self.parent[x]
        }

        fn union(&mut self, a: usize, b: usize) {
            let ra = self.find(a);
            let rb = self.find(b);
            if ra != rb {
                let (min, max) = if ra < rb { (ra, rb) } else { (rb, ra) };
                self.parent[max] = min;
            }
        }
    }

    #[test]
    fn singletons_are_their_own_roots() {
        let forest = AtomicForest::new(8);
        for i in 0..8 {
            assert_eq!(forest.find(i), i);
        }
    }

    #[test]
    fn min_root_wins_every_union() {
        let forest = AtomicForest::new(10);
        forest.unite(7, 3);
        assert_eq!(forest.find(7), 3);
        forest.unite(3, 9);
        assert_eq!(forest.find(9), 3);
        forest.unite(1, 9);
        assert_eq!(forest.find(7), 1);
        assert_eq!(forest.find(3), 1);
    }

    #[test]
    fn chain_collapses_to_minimum_index() {
        let forest = AtomicForest::new(100);
        for i in (1..100).rev() {
            forest.unite(i, i - 1);
        }
        for i in 0..100 {
            assert_eq!(forest.find(i), 0);
        }
    }

    #[test]
    fn parents_never_exceed_their_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 500u32;
        let forest = AtomicForest::new(n as usize);
        for _ in 0..2000 {
            forest.unite(rng.gen_range(0..n), rng.gen_range(0..n));
        }
        for i in 0..n {
            let p = forest.parent[i as usize].load(Ordering::Acquire);
            assert!(p <= i);
        }
    }

    #[test]
    fn concurrent_unions_match_sequential_reference() {
        let n = 10_000usize;
        let mut rng = ChaCha8Rng::seed_from_u64(314159);
        let edges: Vec<(u32, u32)> = (0..30_000)
            .map(|_| {
                (
                    rng.gen_range(0..n as u32),
                    rng.gen_range(0..n as u32),
                )
            })
            .collect();

        let forest = AtomicForest::new(n);
        edges.par_iter().for_each(|&(a, b)| forest.unite(a, b));

        let mut reference = SeqDsu::new(n);
        for &(a, b) in &edges {
            reference.union(a as usize, b as usize);
        }

        // Min-root unions make the component representative the minimum
        // member index in both structures, so roots must agree exactly.
        for i in 0..n {
            assert_eq!(forest.find(i as u32) as usize, reference.find(i));
        }
    }
}
