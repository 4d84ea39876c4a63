//! Spline roads demo.
//!
//! Spawns a road with three splines meeting near the origin. Pick endpoints
//! with the number keys, press B to build a junction, then tune each boundary
//! curve's bulge with Tab and the arrow keys.

use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;

use spline_roads::road::{JunctionReference, RoadGeometryState, RoadParams};
use spline_roads::spline::{RoadSplines, SplineProvider};
use spline_roads::tools::{
    BuildJunctionRequest, BulgeFactorEdit, JunctionEditSet, JunctionSelection,
    RemoveJunctionRequest,
};
use spline_roads::SplineRoadsPlugin;

const BULGE_STEP: f32 = 0.1;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Spline Roads".into(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(SplineRoadsPlugin)
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                (pick_endpoints, edit_active_junction).before(JunctionEditSet),
                camera_zoom,
                camera_rotate,
            ),
        )
        .run();
}

/// Camera orbit state.
#[derive(Component)]
struct DemoCamera {
    zoom: f32,
}

/// The road being edited.
#[derive(Component)]
struct DemoRoad;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let iso_angle = 35.264_f32.to_radians();
    let distance = 30.0;

    commands.spawn((
        Camera3d::default(),
        Projection::Orthographic(OrthographicProjection {
            scale: 0.02,
            ..OrthographicProjection::default_3d()
        }),
        Transform::from_xyz(distance, distance * iso_angle.tan(), distance)
            .looking_at(Vec3::ZERO, Vec3::Y),
        DemoCamera { zoom: 1.0 },
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(24.0, 24.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.25, 0.4, 0.2),
            perceptual_roughness: 1.0,
            ..default()
        })),
    ));

    let mut splines = RoadSplines::default();
    splines.add_spline([
        Vec3::new(0.6, 0.0, 0.0),
        Vec3::new(4.0, 0.0, 1.0),
        Vec3::new(8.0, 0.0, 0.0),
    ]);
    splines.add_spline([
        Vec3::new(-8.0, 0.0, 1.5),
        Vec3::new(-4.0, 0.0, 0.5),
        Vec3::new(-0.6, 0.0, 0.0),
    ]);
    splines.add_spline([
        Vec3::new(0.0, 0.0, 0.6),
        Vec3::new(-1.0, 0.0, 4.0),
        Vec3::new(0.0, 0.0, 8.0),
    ]);

    commands.spawn((
        splines,
        RoadGeometryState::new(RoadParams {
            width: 1.0,
            ..default()
        }),
        DemoRoad,
    ));

    info!("Demo scene ready: 3 splines, no junctions");
}

/// Every endpoint of the road, numbered for the digit keys.
fn endpoints(splines: &RoadSplines) -> Vec<JunctionReference> {
    (0..splines.spline_count())
        .flat_map(|spline| {
            let last = splines.knot_count(spline).unwrap_or(1).saturating_sub(1);
            [JunctionReference::new(spline, 0), JunctionReference::new(spline, last)]
        })
        .collect()
}

fn pick_endpoints(
    keys: Res<ButtonInput<KeyCode>>,
    mut selection: ResMut<JunctionSelection>,
    mut build: EventWriter<BuildJunctionRequest>,
    roads: Query<(Entity, &RoadSplines), With<DemoRoad>>,
) {
    let Ok((road, splines)) = roads.get_single() else {
        return;
    };

    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    let choices = endpoints(splines);
    for (key, reference) in DIGITS.iter().zip(choices) {
        if keys.just_pressed(*key) {
            selection.toggle(road, reference);
        }
    }

    if keys.just_pressed(KeyCode::KeyB) {
        build.send(BuildJunctionRequest);
    }
    if keys.just_pressed(KeyCode::Escape) {
        selection.clear();
    }
}

/// Tab cycles the edited curve, Up/Down change its bulge, X removes the
/// junction.
fn edit_active_junction(
    keys: Res<ButtonInput<KeyCode>>,
    selection: Res<JunctionSelection>,
    mut curve: Local<usize>,
    mut edits: EventWriter<BulgeFactorEdit>,
    mut removals: EventWriter<RemoveJunctionRequest>,
    roads: Query<&RoadGeometryState>,
) {
    let (Some(road), Some(junction)) = (selection.road, selection.active_junction) else {
        *curve = 0;
        return;
    };
    let Some(group) = roads.get(road).ok().and_then(|state| state.junction(junction)) else {
        return;
    };
    if group.is_empty() {
        return;
    }

    if keys.just_pressed(KeyCode::Tab) {
        *curve = (*curve + 1) % group.len();
        info!("Editing curve {}", *curve);
    }

    let edge = *curve % group.len();
    let current = group.bulge_factors()[edge];
    let delta = if keys.just_pressed(KeyCode::ArrowUp) {
        BULGE_STEP
    } else if keys.just_pressed(KeyCode::ArrowDown) {
        -BULGE_STEP
    } else {
        0.0
    };
    if delta != 0.0 {
        edits.send(BulgeFactorEdit {
            road,
            junction,
            edge,
            value: current + delta,
        });
    }

    if keys.just_pressed(KeyCode::KeyX) {
        removals.send(RemoveJunctionRequest { road, junction });
    }
}

fn camera_zoom(
    mut query: Query<(&mut Projection, &mut DemoCamera)>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let scroll: f32 = scroll_events.read().map(|e| e.y).sum();
    if scroll == 0.0 {
        return;
    }

    for (mut projection, mut camera) in &mut query {
        camera.zoom = (camera.zoom - scroll * 0.1).clamp(0.1, 10.0);
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = camera.zoom * 0.02;
        }
    }
}

fn camera_rotate(
    mut query: Query<&mut Transform, With<DemoCamera>>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let mut rotation_delta = 0.0;
    if keys.pressed(KeyCode::KeyQ) {
        rotation_delta -= time.delta_secs();
    }
    if keys.pressed(KeyCode::KeyR) {
        rotation_delta += time.delta_secs();
    }

    if rotation_delta != 0.0 {
        for mut transform in &mut query {
            transform.rotate_around(Vec3::ZERO, Quat::from_rotation_y(rotation_delta));
        }
    }
}
