//! Rendering of generated road meshes.

use bevy::prelude::*;

pub mod road_mesh;

pub use road_mesh::{
    BevyMeshSink, RoadMaterials, RoadMeshConfig, RoadMeshHandles, RoadMeshSet, RoadRebuilt,
    RoadSubmesh,
};

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(road_mesh::RoadMeshPlugin);
    }
}
