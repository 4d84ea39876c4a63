//! Spline Roads - procedural road meshes from spline centerlines.
//!
//! Each road entity carries [`spline::RoadSplines`] and a
//! [`road::RoadGeometryState`]. Ribbons are extruded along every spline and
//! registered groups of spline endpoints are blended into junction fans.
//! Whenever splines, parameters or junctions change, the whole mesh is
//! regenerated.

use bevy::prelude::*;

pub mod error;
pub mod procgen;
pub mod render;
pub mod road;
pub mod spline;
pub mod tools;
pub mod ui;

pub use error::RoadError;

/// Registers road mesh generation, the junction tools and the debug overlay.
pub struct SplineRoadsPlugin;

impl Plugin for SplineRoadsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(tools::ToolsPlugin)
            .add_plugins(render::RenderPlugin)
            .add_plugins(ui::UiPlugin)
            .configure_sets(
                Update,
                tools::JunctionEditSet.before(render::RoadMeshSet),
            );
    }
}
