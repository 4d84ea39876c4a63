//! Procedural road mesh generation.
//!
//! - Ribbons: one quad strip per spline
//! - Junctions: Bezier-bounded fans joining spline endpoints
//! - Assembler: full rebuild into shared vertex and submesh buffers

pub mod assembler;
pub mod buffers;
pub mod junction;
pub mod ribbon;

pub use assembler::{assemble_road, RebuildReport, RoadDebugGeometry};
pub use buffers::{MeshBuffers, MeshSink, JUNCTION_SUBMESH, ROAD_SUBMESH};
pub use junction::{build_junction_geometry, JunctionCurve, JunctionEdge, JunctionGeometry};
pub use ribbon::build_ribbon;
