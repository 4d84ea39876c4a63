//! Road mesh rendering.
//!
//! Every road entity gets two child mesh entities, one per submesh (road
//! surface and junctions). Dirty roads are rebuilt and their buffers written
//! straight into `Assets<Mesh>`.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use crate::procgen::{MeshSink, RoadDebugGeometry, JUNCTION_SUBMESH, ROAD_SUBMESH};
use crate::road::{RoadGeometryState, RoadParams};
use crate::spline::RoadSplines;

pub struct RoadMeshPlugin;

impl Plugin for RoadMeshPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RoadMeshConfig>()
            .add_event::<RoadRebuilt>()
            .add_systems(Startup, setup_road_materials)
            .add_systems(
                Update,
                (spawn_road_meshes, rebuild_dirty_roads)
                    .chain()
                    .in_set(RoadMeshSet),
            );
    }
}

/// Systems that spawn and rebuild road meshes.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoadMeshSet;

/// Configuration for road mesh generation.
#[derive(Resource)]
pub struct RoadMeshConfig {
    /// Parameters given to roads spawned without a `RoadGeometryState`.
    pub default_params: RoadParams,
    pub road_color: Color,
    pub junction_color: Color,
}

impl Default for RoadMeshConfig {
    fn default() -> Self {
        Self {
            default_params: RoadParams::default(),
            road_color: Color::srgb(0.35, 0.35, 0.4),
            junction_color: Color::srgb(0.3, 0.3, 0.34),
        }
    }
}

/// Shared materials for the two road submeshes.
#[derive(Resource)]
pub struct RoadMaterials {
    pub road: Handle<StandardMaterial>,
    pub junction: Handle<StandardMaterial>,
}

/// Mesh assets backing a road's submeshes.
#[derive(Component, Clone, Debug)]
pub struct RoadMeshHandles {
    pub road: Handle<Mesh>,
    pub junction: Handle<Mesh>,
}

/// Marks a child mesh entity with the submesh it renders.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoadSubmesh(pub usize);

/// Sent after a road mesh has been regenerated.
#[derive(Event, Clone, Debug)]
pub struct RoadRebuilt {
    pub road: Entity,
    pub warnings: usize,
}

fn setup_road_materials(
    mut commands: Commands,
    config: Res<RoadMeshConfig>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let road = materials.add(StandardMaterial {
        base_color: config.road_color,
        perceptual_roughness: 0.9,
        ..default()
    });
    let junction = materials.add(StandardMaterial {
        base_color: config.junction_color,
        perceptual_roughness: 0.85,
        ..default()
    });
    commands.insert_resource(RoadMaterials { road, junction });
}

/// Give new roads their geometry state and submesh entities.
pub fn spawn_road_meshes(
    mut commands: Commands,
    config: Res<RoadMeshConfig>,
    materials: Res<RoadMaterials>,
    mut meshes: ResMut<Assets<Mesh>>,
    roads: Query<(Entity, Has<RoadGeometryState>), (With<RoadSplines>, Without<RoadMeshHandles>)>,
) {
    for (entity, has_state) in &roads {
        let handles = RoadMeshHandles {
            road: meshes.add(empty_mesh()),
            junction: meshes.add(empty_mesh()),
        };

        let mut road = commands.entity(entity);
        if !has_state {
            road.insert(RoadGeometryState::new(config.default_params));
        }
        road.with_children(|parent| {
            parent.spawn((
                Mesh3d(handles.road.clone()),
                MeshMaterial3d(materials.road.clone()),
                RoadSubmesh(ROAD_SUBMESH),
            ));
            parent.spawn((
                Mesh3d(handles.junction.clone()),
                MeshMaterial3d(materials.junction.clone()),
                RoadSubmesh(JUNCTION_SUBMESH),
            ));
        });
        road.insert((handles, RoadDebugGeometry::default()));

        debug!("Spawned road meshes for {:?}", entity);
    }
}

/// Rebuild every road whose splines changed or whose state is dirty.
pub fn rebuild_dirty_roads(
    mut meshes: ResMut<Assets<Mesh>>,
    mut rebuilt: EventWriter<RoadRebuilt>,
    mut roads: Query<(
        Entity,
        Ref<RoadSplines>,
        &mut RoadGeometryState,
        &RoadMeshHandles,
        &mut RoadDebugGeometry,
    )>,
) {
    for (entity, splines, mut state, handles, mut debug_geometry) in &mut roads {
        if !splines.is_changed() && !state.is_dirty() {
            continue;
        }

        let mut sink = BevyMeshSink {
            meshes: &mut *meshes,
            handles,
        };
        let report = state.rebuild(splines.as_ref(), &mut sink);

        info!(
            "Rebuilt road {:?}: {} vertices, {} warning(s)",
            entity,
            report.buffers.vertex_count(),
            report.warnings.len()
        );
        *debug_geometry = report.debug;
        rebuilt.send(RoadRebuilt {
            road: entity,
            warnings: report.warnings.len(),
        });
    }
}

/// Writes each submesh into its own mesh asset. Both assets carry the full
/// vertex array.
pub struct BevyMeshSink<'a> {
    pub meshes: &'a mut Assets<Mesh>,
    pub handles: &'a RoadMeshHandles,
}

impl MeshSink for BevyMeshSink<'_> {
    fn set_submeshes(&mut self, vertices: &[Vec3], submeshes: &[Vec<u32>], uvs: &[Vec2]) {
        let targets = [&self.handles.road, &self.handles.junction];
        for (handle, indices) in targets.into_iter().zip(submeshes) {
            self.meshes.insert(handle, submesh_mesh(vertices, indices, uvs));
        }
    }
}

fn empty_mesh() -> Mesh {
    Mesh::new(PrimitiveTopology::TriangleList, default())
}

/// Build one render mesh with area-weighted normals and tangents.
fn submesh_mesh(vertices: &[Vec3], indices: &[u32], uvs: &[Vec2]) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, vertices.to_vec())
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, area_weighted_normals(vertices, indices))
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs.to_vec())
        .with_inserted_indices(Indices::U32(indices.to_vec()));

    if !indices.is_empty() {
        if let Err(err) = mesh.generate_tangents() {
            warn!("Skipping road mesh tangents: {}", err);
        }
    }
    mesh
}

/// Vertex normals summed from the (unnormalized) face normals of every
/// triangle using the vertex. Unreferenced vertices point up.
///
/// Each submesh mesh carries the whole shared vertex array, so most of its
/// vertices belong to the other submesh and no triangle here touches them.
/// `Mesh::compute_smooth_normals` would leave those with zero-length normals.
fn area_weighted_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let face = (vertices[b] - vertices[a]).cross(vertices[c] - vertices[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}
