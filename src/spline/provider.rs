//! Spline evaluation seam.
//!
//! Road generation never evaluates curves itself; it asks a provider for the
//! frame of a spline at a normalized parameter.

use bevy::prelude::*;

/// Position, tangent and up vector of a spline at one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplineFrame {
    pub position: Vec3,
    /// Direction of travel. Not required to be normalized.
    pub tangent: Vec3,
    pub up: Vec3,
}

/// Source of spline geometry, indexed by spline.
pub trait SplineProvider {
    /// Number of splines currently available.
    fn spline_count(&self) -> usize;

    /// Number of knots of a spline, or `None` if the index is unknown.
    fn knot_count(&self, spline: usize) -> Option<usize>;

    /// Evaluate a spline at `t` in `[0, 1]`.
    ///
    /// Returns `None` if the spline is unknown or cannot be evaluated.
    fn evaluate(&self, spline: usize, t: f32) -> Option<SplineFrame>;
}
