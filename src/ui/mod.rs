//! Debug UI and visualization tools.

use bevy::prelude::*;

use crate::road::RoadGeometryState;
use crate::tools::JunctionSelection;

pub mod debug_render;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(debug_render::DebugRenderPlugin)
            .init_resource::<DebugConfig>()
            .add_systems(Startup, setup_hud)
            .add_systems(Update, (update_selection_label, toggle_debug_views));
    }
}

/// Configuration for debug visualization.
#[derive(Resource)]
pub struct DebugConfig {
    pub show_ribbon_edges: bool,
    pub show_junction_edges: bool,
    pub show_curve_points: bool,
    /// Half-length of the cross drawn at each sample.
    pub marker_size: f32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_ribbon_edges: false,
            show_junction_edges: true,
            show_curve_points: true,
            marker_size: 0.05,
        }
    }
}

/// Marker for the junction selection text.
#[derive(Component)]
struct SelectionText;

fn setup_hud(mut commands: Commands) {
    let panel_bg = Color::srgb(0.04, 0.05, 0.06);
    let border = Color::srgb(0.0, 0.75, 0.35);

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(10.0),
                right: Val::Px(10.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(10.0)),
                border: UiRect::all(Val::Px(1.0)),
                row_gap: Val::Px(6.0),
                flex_direction: FlexDirection::Column,
                ..default()
            },
            BackgroundColor(panel_bg),
            BorderColor(border),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("ROAD JUNCTION BUILDER"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.6, 0.2)),
            ));

            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.4, 0.95, 0.6)),
                SelectionText,
            ));
        });

    commands.spawn((
        Text::new("1-9: Pick Endpoint | B: Build | Tab/Up/Down: Bulge | X: Remove | E/J/C: Debug"),
        TextFont {
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.65, 0.85, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

/// Show the picked endpoints, or the bulge factors of the active junction.
fn update_selection_label(
    selection: Res<JunctionSelection>,
    roads: Query<Ref<RoadGeometryState>>,
    mut query: Query<&mut Text, With<SelectionText>>,
) {
    let state = selection.road.and_then(|road| roads.get(road).ok());
    let state_changed = state.as_ref().is_some_and(|s| s.is_changed());
    if !selection.is_changed() && !state_changed {
        return;
    }

    let mut label = selection.label();
    if let Some(group) = selection
        .active_junction
        .and_then(|handle| state.as_ref().and_then(|s| s.junction(handle)))
    {
        for (i, bulge) in group.bulge_factors().iter().enumerate() {
            label.push_str(&format!("\nCurve {}: {:.2}", i, bulge));
        }
    }

    for mut text in &mut query {
        **text = label.clone();
    }
}

/// Toggle debug visualization modes with keyboard.
fn toggle_debug_views(keys: Res<ButtonInput<KeyCode>>, mut config: ResMut<DebugConfig>) {
    if keys.just_pressed(KeyCode::KeyE) {
        config.show_ribbon_edges = !config.show_ribbon_edges;
        info!(
            "Ribbon edges: {}",
            if config.show_ribbon_edges { "ON" } else { "OFF" }
        );
    }

    if keys.just_pressed(KeyCode::KeyJ) {
        config.show_junction_edges = !config.show_junction_edges;
        info!(
            "Junction edges: {}",
            if config.show_junction_edges { "ON" } else { "OFF" }
        );
    }

    if keys.just_pressed(KeyCode::KeyC) {
        config.show_curve_points = !config.show_curve_points;
        info!(
            "Curve points: {}",
            if config.show_curve_points { "ON" } else { "OFF" }
        );
    }
}
