//! Road data model: generation parameters and junction groups.

pub mod junction_group;
pub mod state;

pub use junction_group::{
    JunctionEntry, JunctionGroup, JunctionHandle, JunctionReference, DEFAULT_BULGE_FACTOR,
};
pub use state::{RoadGeometryState, RoadParams, MIN_CURVE_STEP};
