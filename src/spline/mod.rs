//! Spline access for road generation.
//!
//! - `provider`: the evaluation seam (`SplineProvider`)
//! - `container`: Catmull-Rom splines stored on road entities
//! - `sampler`: centerline frames and road-edge points

pub mod container;
pub mod provider;
pub mod sampler;

pub use container::{RoadSpline, RoadSplines};
pub use provider::{SplineFrame, SplineProvider};
pub use sampler::{EdgePair, SplineSampler};
