//! Debug rendering of sampled road geometry using Bevy gizmos.

use bevy::prelude::*;

use crate::procgen::RoadDebugGeometry;
use crate::ui::DebugConfig;

pub struct DebugRenderPlugin;

impl Plugin for DebugRenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (render_ribbon_edges, render_junction_edges));
    }
}

const LEFT_COLOR: Color = Color::srgb(0.2, 0.4, 1.0);
const RIGHT_COLOR: Color = Color::srgb(1.0, 0.2, 0.2);
const CURVE_COLOR: Color = Color::srgb(0.2, 1.0, 0.4);

fn cross_marker(gizmos: &mut Gizmos, pos: Vec3, size: f32, color: Color) {
    gizmos.line(pos + Vec3::X * size, pos - Vec3::X * size, color);
    gizmos.line(pos + Vec3::Z * size, pos - Vec3::Z * size, color);
}

/// Ribbon edge samples and the rungs between them.
fn render_ribbon_edges(
    config: Res<DebugConfig>,
    roads: Query<(&RoadDebugGeometry, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    if !config.show_ribbon_edges {
        return;
    }

    for (geometry, transform) in &roads {
        for pair in &geometry.ribbon_edges {
            let left = transform.transform_point(pair.left);
            let right = transform.transform_point(pair.right);
            gizmos.line(left, right, Color::srgb(0.7, 0.7, 0.7));
            cross_marker(&mut gizmos, left, config.marker_size, LEFT_COLOR);
            cross_marker(&mut gizmos, right, config.marker_size, RIGHT_COLOR);
        }
    }
}

/// Junction edge endpoints (left blue, right red) and boundary curve samples.
fn render_junction_edges(
    config: Res<DebugConfig>,
    roads: Query<(&RoadDebugGeometry, &GlobalTransform)>,
    mut gizmos: Gizmos,
) {
    for (geometry, transform) in &roads {
        if config.show_junction_edges {
            for pair in &geometry.junction_edges {
                let size = config.marker_size * 1.5;
                cross_marker(&mut gizmos, transform.transform_point(pair.left), size, LEFT_COLOR);
                cross_marker(&mut gizmos, transform.transform_point(pair.right), size, RIGHT_COLOR);
            }
        }

        if config.show_curve_points {
            for point in &geometry.curve_points {
                cross_marker(
                    &mut gizmos,
                    transform.transform_point(*point),
                    config.marker_size,
                    CURVE_COLOR,
                );
            }
        }
    }
}
