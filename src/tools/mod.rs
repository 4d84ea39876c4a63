//! Editing tools for road junctions.
//!
//! Tools translate selections and requests into edits on a road's geometry
//! state; the render systems pick the resulting dirty flag up afterwards.

use bevy::prelude::*;

pub mod junction_builder;

pub use junction_builder::{
    BuildJunctionRequest, BulgeFactorEdit, JunctionEditSet, JunctionSelection,
    RemoveJunctionRequest, RemoveSplineRequest,
};

pub struct ToolsPlugin;

impl Plugin for ToolsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(junction_builder::JunctionBuilderPlugin);
    }
}
