//! Uniform spatial grid sized to the neighborhood box.
//!
//! Cell side length equals `eps` per dimension, so every box neighbor of a
//! point lies in the 3x3 block of cells around the point's own cell. The
//! grid is a flat CSR layout built with a counting sort: per-cell offsets
//! into one index buffer holding point indices grouped by cell.

use glam::{IVec2, Vec2};

use crate::error::DbscanError;

/// Upper bound on total cells. Radii far below the data spread produce cell
/// counts past any sane allocation; reject them instead of thrashing.
const MAX_CELLS: u64 = 1 << 31;

pub(crate) struct UniformGrid {
    min_bounds: Vec2,
    cell_size: Vec2,
    dims: IVec2,
    /// Start index into `point_indices` per cell, plus final length.
    /// Length: `dims.x * dims.y + 1`.
    cell_offsets: Vec<u32>,
    /// Point indices grouped by cell, ascending within each cell.
    point_indices: Vec<u32>,
}

impl UniformGrid {
    /// Build the grid for a non-empty point set. `eps` must already be
    /// validated as positive and finite.
    pub fn build(points: &[Vec2], eps: Vec2) -> Result<Self, DbscanError> {
        debug_assert!(!points.is_empty(), "caller short-circuits empty inputs");

        let mut min_bounds = Vec2::splat(f32::INFINITY);
        let mut max_bounds = Vec2::splat(f32::NEG_INFINITY);
        for &p in points {
            min_bounds = min_bounds.min(p);
            max_bounds = max_bounds.max(p);
        }

        let dims = Self::compute_dims(min_bounds, max_bounds, eps)?;
        let num_cells = (dims.x as usize) * (dims.y as usize);

        let grid_of = |p: Vec2| -> usize {
            let c = ((p - min_bounds) / eps).as_ivec2();
            let c = c.clamp(IVec2::ZERO, dims - IVec2::ONE);
            (c.y * dims.x + c.x) as usize
        };

        let mut counts = vec![0u32; num_cells];
        for &p in points {
            counts[grid_of(p)] += 1;
        }

        let mut cell_offsets = Vec::with_capacity(num_cells + 1);
        cell_offsets.push(0u32);
        let mut sum = 0u32;
        for &count in &counts {
            sum += count;
            cell_offsets.push(sum);
        }

        let mut point_indices = vec![0u32; points.len()];
        let mut cursors = cell_offsets[..num_cells].to_vec();
        for (i, &p) in points.iter().enumerate() {
            let cell = grid_of(p);
            point_indices[cursors[cell] as usize] = i as u32;
            cursors[cell] += 1;
        }

        Ok(UniformGrid {
            min_bounds,
            cell_size: eps,
            dims,
            cell_offsets,
            point_indices,
        })
    }

    fn compute_dims(min_bounds: Vec2, max_bounds: Vec2, eps: Vec2) -> Result<IVec2, DbscanError> {
        let mut dims = [0u64; 2];
        for d in 0..2 {
            let range = (max_bounds[d] - min_bounds[d]) as f64;
            let cells = (range / eps[d] as f64).ceil().max(1.0);
            if !cells.is_finite() || cells >= MAX_CELLS as f64 {
                dims[d] = if cells.is_finite() { cells as u64 } else { u64::MAX };
                return Err(DbscanError::GridTooLarge { dims });
            }
            dims[d] = cells as u64;
        }
        match dims[0].checked_mul(dims[1]) {
            Some(total) if total <= MAX_CELLS => {
                Ok(IVec2::new(dims[0] as i32, dims[1] as i32))
            }
            _ => Err(DbscanError::GridTooLarge { dims }),
        }
    }

    /// Grid coordinates for a point, clamped into `[0, dims)` per dimension.
    #[inline]
    pub fn coords_of(&self, p: Vec2) -> IVec2 {
        let c = ((p - self.min_bounds) / self.cell_size).as_ivec2();
        c.clamp(IVec2::ZERO, self.dims - IVec2::ONE)
    }

    /// Row-major flat index for in-range coordinates.
    #[inline]
    pub fn cell_index(&self, coords: IVec2) -> usize {
        debug_assert!(coords.cmpge(IVec2::ZERO).all() && coords.cmplt(self.dims).all());
        (coords.y * self.dims.x + coords.x) as usize
    }

    /// Point indices stored in a cell.
    #[inline]
    pub fn cell_points(&self, cell: usize) -> &[u32] {
        let start = self.cell_offsets[cell] as usize;
        let end = self.cell_offsets[cell + 1] as usize;
        &self.point_indices[start..end]
    }

    /// Collect the flat indices of every existing cell in the 3x3 block
    /// around `coords`, in row-major order. Out-of-range cells are skipped.
    pub fn neighbor_cells(&self, coords: IVec2, out: &mut Vec<u32>) {
        out.clear();
        for dy in -1..=1 {
            let y = coords.y + dy;
            if y < 0 || y >= self.dims.y {
                continue;
            }
            for dx in -1..=1 {
                let x = coords.x + dx;
                if x < 0 || x >= self.dims.x {
                    continue;
                }
                out.push(self.cell_index(IVec2::new(x, y)) as u32);
            }
        }
    }

    #[inline]
    pub fn dims(&self) -> IVec2 {
        self.dims
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        (self.dims.x as usize) * (self.dims.y as usize)
    }

    /// Occupancy statistics, for debug logging.
    pub fn stats(&self) -> GridStats {
        let num_cells = self.num_cells();
        let mut max_occupancy = 0u32;
        let mut empty_cells = 0usize;
        for cell in 0..num_cells {
            let count = self.cell_offsets[cell + 1] - self.cell_offsets[cell];
            max_occupancy = max_occupancy.max(count);
            if count == 0 {
                empty_cells += 1;
            }
        }
        GridStats {
            num_cells,
            empty_cells,
            max_occupancy: max_occupancy as usize,
            mean_occupancy: self.point_indices.len() as f64 / num_cells as f64,
        }
    }
}

#[derive(Debug)]
pub(crate) struct GridStats {
    pub num_cells: usize,
    pub empty_cells: usize,
    pub max_occupancy: usize,
    pub mean_occupancy: f64,
}
