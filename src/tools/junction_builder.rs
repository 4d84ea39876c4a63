//! Junction builder tool.
//!
//! Collects selected spline endpoints and turns requests into edits on the
//! selected road's [`RoadGeometryState`]. Invalid requests are logged and
//! leave the road untouched.

use bevy::prelude::*;

use crate::road::{JunctionHandle, JunctionReference, RoadGeometryState};
use crate::spline::RoadSplines;

pub struct JunctionBuilderPlugin;

impl Plugin for JunctionBuilderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<JunctionSelection>()
            .add_event::<BuildJunctionRequest>()
            .add_event::<BulgeFactorEdit>()
            .add_event::<RemoveJunctionRequest>()
            .add_event::<RemoveSplineRequest>()
            .add_systems(
                Update,
                (
                    handle_build_requests,
                    handle_bulge_edits,
                    handle_junction_removal,
                    handle_spline_removal,
                )
                    .chain()
                    .in_set(JunctionEditSet),
            );
    }
}

/// Systems applying junction edits. Runs before meshes are rebuilt.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct JunctionEditSet;

/// Spline endpoints picked for the next junction, and the junction being
/// edited.
#[derive(Resource, Default, Debug)]
pub struct JunctionSelection {
    /// Road the selection belongs to.
    pub road: Option<Entity>,
    /// Selected endpoints in pick order.
    pub references: Vec<JunctionReference>,
    /// Junction shown for bulge editing after a build.
    pub active_junction: Option<JunctionHandle>,
}

impl JunctionSelection {
    /// Toggle an endpoint. Picking on another road starts a new selection.
    pub fn toggle(&mut self, road: Entity, reference: JunctionReference) {
        if self.road != Some(road) {
            self.clear();
            self.road = Some(road);
        }
        self.active_junction = None;

        if let Some(index) = self.references.iter().position(|r| *r == reference) {
            self.references.remove(index);
        } else {
            self.references.push(reference);
        }
    }

    pub fn clear(&mut self) {
        self.road = None;
        self.references.clear();
        self.active_junction = None;
    }

    /// One line per selected endpoint, or a header once a junction is built.
    pub fn label(&self) -> String {
        if self.active_junction.is_some() {
            return "Selected Junction".to_string();
        }
        self.references
            .iter()
            .map(|r| format!("Spline {}, Knot {}\n", r.spline, r.knot))
            .collect()
    }
}

/// Build a junction from the current [`JunctionSelection`].
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct BuildJunctionRequest;

/// Change one boundary curve's bulge factor.
#[derive(Event, Clone, Copy, Debug)]
pub struct BulgeFactorEdit {
    pub road: Entity,
    pub junction: JunctionHandle,
    pub edge: usize,
    pub value: f32,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct RemoveJunctionRequest {
    pub road: Entity,
    pub junction: JunctionHandle,
}

/// Delete a spline from a road, retargeting every junction that uses it.
#[derive(Event, Clone, Copy, Debug)]
pub struct RemoveSplineRequest {
    pub road: Entity,
    pub spline: usize,
}

fn handle_build_requests(
    mut requests: EventReader<BuildJunctionRequest>,
    mut selection: ResMut<JunctionSelection>,
    mut roads: Query<(&RoadSplines, &mut RoadGeometryState)>,
) {
    for _ in requests.read() {
        let Some(road) = selection.road else {
            warn!("Select at least two spline endpoints to build a junction");
            continue;
        };
        let Ok((splines, mut state)) = roads.get_mut(road) else {
            warn!("Selected road {:?} no longer exists", road);
            selection.clear();
            continue;
        };

        match state.build_junction(&selection.references, splines) {
            Ok(handle) => {
                selection.references.clear();
                selection.active_junction = Some(handle);
            }
            Err(err) => warn!("Cannot build junction: {}", err),
        }
    }
}

fn handle_bulge_edits(
    mut edits: EventReader<BulgeFactorEdit>,
    mut roads: Query<&mut RoadGeometryState>,
) {
    for edit in edits.read() {
        let Ok(mut state) = roads.get_mut(edit.road) else {
            continue;
        };
        if let Err(err) = state.set_bulge_factor(edit.junction, edit.edge, edit.value) {
            warn!("Cannot edit bulge factor: {}", err);
        }
    }
}

fn handle_junction_removal(
    mut requests: EventReader<RemoveJunctionRequest>,
    mut selection: ResMut<JunctionSelection>,
    mut roads: Query<&mut RoadGeometryState>,
) {
    for request in requests.read() {
        let Ok(mut state) = roads.get_mut(request.road) else {
            continue;
        };
        match state.remove_junction(request.junction) {
            Ok(_) => {
                info!("Removed junction {:?}", request.junction);
                if selection.active_junction == Some(request.junction) {
                    selection.active_junction = None;
                }
            }
            Err(err) => warn!("Cannot remove junction: {}", err),
        }
    }
}

fn handle_spline_removal(
    mut requests: EventReader<RemoveSplineRequest>,
    mut selection: ResMut<JunctionSelection>,
    mut roads: Query<(&mut RoadSplines, &mut RoadGeometryState)>,
) {
    for request in requests.read() {
        let Ok((mut splines, mut state)) = roads.get_mut(request.road) else {
            continue;
        };
        if splines.remove_spline(request.spline).is_none() {
            warn!("Road {:?} has no spline {}", request.road, request.spline);
            continue;
        }

        let dropped = state.retarget_removed_spline(request.spline);
        info!(
            "Removed spline {} from {:?}, dropped {} junction(s)",
            request.spline,
            request.road,
            dropped.len()
        );
        if selection.road == Some(request.road) {
            selection.clear();
        }
    }
}
