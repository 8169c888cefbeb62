//! Input point types and label constants.

use glam::Vec2;

/// Coordinates per point. The pipeline is monomorphic in two dimensions.
pub const DIMS: usize = 2;

/// Label assigned to noise points. The only negative value that ever appears
/// in [`ClusterOutput::labels`](crate::ClusterOutput::labels).
pub const NOISE: i32 = -1;

/// Types accepted as 2-D input points.
///
/// The entry points copy inputs into a contiguous `Vec2` buffer once, so
/// implementors only need cheap coordinate accessors.
pub trait Point2Like {
    fn x(&self) -> f32;
    fn y(&self) -> f32;
}

impl Point2Like for Vec2 {
    #[inline]
    fn x(&self) -> f32 {
        self.x
    }

    #[inline]
    fn y(&self) -> f32 {
        self.y
    }
}

impl Point2Like for [f32; 2] {
    #[inline]
    fn x(&self) -> f32 {
        self[0]
    }

    #[inline]
    fn y(&self) -> f32 {
        self[1]
    }
}

impl Point2Like for (f32, f32) {
    #[inline]
    fn x(&self) -> f32 {
        self.0
    }

    #[inline]
    fn y(&self) -> f32 {
        self.1
    }
}
