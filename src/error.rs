//! Error kinds raised while registering junctions and rebuilding road meshes.
//!
//! Registration errors are returned to the caller with no state change.
//! Rebuild errors never abort a rebuild; they are collected as warnings.

use thiserror::Error;

use crate::road::JunctionHandle;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoadError {
    /// A junction needs at least two spline endpoints.
    #[error("junction group needs at least 2 references, got {count}")]
    InvalidJunctionGroup { count: usize },

    /// The spline cannot produce a usable frame (too few knots, zero tangent,
    /// or a tangent parallel to the up axis).
    #[error("spline {spline} is degenerate and cannot be sampled")]
    DegenerateSpline { spline: usize },

    /// The reference points at a spline or knot that no longer exists.
    #[error("reference to spline {spline}, knot {knot} is stale")]
    StaleReference { spline: usize, knot: usize },

    /// Junctions only occur at the first or last knot of a spline.
    #[error("knot {knot} of spline {spline} is not an endpoint")]
    NotAnEndpoint { spline: usize, knot: usize },

    #[error("no junction with handle {0:?}")]
    UnknownJunction(JunctionHandle),

    #[error("edge {edge} out of range for junction with {count} edges")]
    EdgeOutOfRange { edge: usize, count: usize },
}
