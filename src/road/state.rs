//! Per-road generation parameters and junction registry.

use std::collections::BTreeMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::junction_group::{JunctionGroup, JunctionHandle, JunctionReference};
use crate::error::RoadError;
use crate::procgen::{assemble_road, MeshSink, RebuildReport};
use crate::spline::SplineProvider;

/// Lowest accepted Bezier sampling step.
pub const MIN_CURVE_STEP: f32 = 0.05;

/// Mesh generation parameters for one road.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadParams {
    /// Full road width.
    pub width: f32,
    /// Height added to every generated vertex.
    pub y_offset: f32,
    /// Quads per spline.
    pub resolution: usize,
    /// Parameter step used to sample junction boundary curves.
    pub curve_step: f32,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            width: 0.5,
            y_offset: 0.02,
            resolution: 25,
            curve_step: 0.1,
        }
    }
}

impl RoadParams {
    /// Clamp every field into its usable range.
    pub fn sanitized(self) -> Self {
        Self {
            width: self.width.max(0.0),
            y_offset: self.y_offset,
            resolution: self.resolution.max(1),
            curve_step: self.usable_curve_step(),
        }
    }

    /// `curve_step` clamped to `[MIN_CURVE_STEP, 1]`; NaN falls back to the
    /// default step.
    fn usable_curve_step(&self) -> f32 {
        if self.curve_step.is_nan() {
            Self::default().curve_step
        } else {
            self.curve_step.clamp(MIN_CURVE_STEP, 1.0)
        }
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Boundary points emitted per junction curve: the start point, one
    /// point per step in `[0, 1)`, and the end point.
    pub fn samples_per_curve(&self) -> usize {
        self.curve_parameters().count() + 2
    }

    /// Bezier parameters sampled between the explicit curve endpoints.
    ///
    /// Uses the clamped step, so unsanitized parameters still terminate.
    pub fn curve_parameters(&self) -> impl Iterator<Item = f32> {
        let step = self.usable_curve_step();
        (0u32..)
            .map(move |i| i as f32 * step)
            .take_while(|t| *t < 1.0)
    }
}

/// Junction groups and parameters owned by one road entity.
///
/// Any edit marks the state dirty; [`RoadGeometryState::rebuild`] regenerates
/// the whole mesh. Rebuilding takes `&mut self` and is not reentrant: never
/// share one state between threads while rebuilding.
#[derive(Component, Clone, Debug, Serialize, Deserialize)]
#[serde(from = "PersistedRoad", into = "PersistedRoad")]
pub struct RoadGeometryState {
    params: RoadParams,
    junctions: BTreeMap<JunctionHandle, JunctionGroup>,
    next_handle: u32,
    dirty: bool,
}

impl Default for RoadGeometryState {
    fn default() -> Self {
        Self::new(RoadParams::default())
    }
}

impl RoadGeometryState {
    pub fn new(params: RoadParams) -> Self {
        Self {
            params: params.sanitized(),
            junctions: BTreeMap::new(),
            next_handle: 0,
            dirty: true,
        }
    }

    pub fn params(&self) -> &RoadParams {
        &self.params
    }

    pub fn set_params(&mut self, params: RoadParams) {
        self.params = params.sanitized();
        self.mark_dirty();
    }

    pub fn set_width(&mut self, width: f32) {
        self.set_params(RoadParams { width, ..self.params });
    }

    pub fn set_y_offset(&mut self, y_offset: f32) {
        self.set_params(RoadParams { y_offset, ..self.params });
    }

    pub fn set_resolution(&mut self, resolution: usize) {
        self.set_params(RoadParams { resolution, ..self.params });
    }

    pub fn set_curve_step(&mut self, curve_step: f32) {
        self.set_params(RoadParams { curve_step, ..self.params });
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Junction groups in creation order.
    pub fn junctions(&self) -> impl Iterator<Item = (JunctionHandle, &JunctionGroup)> {
        self.junctions.iter().map(|(handle, group)| (*handle, group))
    }

    pub fn junction(&self, handle: JunctionHandle) -> Option<&JunctionGroup> {
        self.junctions.get(&handle)
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    /// The group that already contains `reference`, if any.
    pub fn junction_containing(&self, reference: JunctionReference) -> Option<JunctionHandle> {
        self.junctions
            .iter()
            .find(|(_, group)| group.contains(reference))
            .map(|(handle, _)| *handle)
    }

    /// Register the selected endpoints as a junction.
    ///
    /// If any selected endpoint already belongs to a group, the unregistered
    /// ones are appended to that group instead of creating a new one. When the
    /// selection touches several groups, the group of the last such endpoint
    /// in selection order receives them. Fails without
    /// changing anything if fewer than two distinct endpoints are selected or
    /// any of them is not a spline endpoint.
    pub fn build_junction<P: SplineProvider + ?Sized>(
        &mut self,
        selection: &[JunctionReference],
        provider: &P,
    ) -> Result<JunctionHandle, RoadError> {
        let mut unique: Vec<JunctionReference> = Vec::with_capacity(selection.len());
        for reference in selection {
            if !unique.contains(reference) {
                unique.push(*reference);
            }
        }

        if unique.len() < 2 {
            return Err(RoadError::InvalidJunctionGroup { count: unique.len() });
        }
        for reference in &unique {
            reference.check_endpoint(provider)?;
        }

        // The last selected endpoint that already has a group picks the target.
        // Endpoints already owned by some group are never moved between groups.
        let existing = unique
            .iter()
            .filter_map(|r| self.junction_containing(*r))
            .last();
        let free: Vec<JunctionReference> = unique
            .iter()
            .copied()
            .filter(|r| self.junction_containing(*r).is_none())
            .collect();

        let handle = match existing.and_then(|h| self.junctions.get_mut(&h).map(|g| (h, g))) {
            Some((handle, group)) => {
                for reference in &free {
                    group.push(*reference);
                }
                info!("Extended junction {:?} with {} edge(s)", handle, free.len());
                handle
            }
            None => {
                let handle = self.insert(JunctionGroup::new(free));
                info!("Built junction {:?} with {} edges", handle, unique.len());
                handle
            }
        };

        self.mark_dirty();
        Ok(handle)
    }

    fn insert(&mut self, group: JunctionGroup) -> JunctionHandle {
        let handle = JunctionHandle(self.next_handle);
        self.next_handle += 1;
        self.junctions.insert(handle, group);
        handle
    }

    /// Set the bulge factor of boundary curve `edge`, clamped to `[0, 1]`.
    pub fn set_bulge_factor(&mut self, handle: JunctionHandle, edge: usize, value: f32) -> Result<(), RoadError> {
        let group = self
            .junctions
            .get_mut(&handle)
            .ok_or(RoadError::UnknownJunction(handle))?;
        group.set_bulge_factor(edge, value)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn remove_junction(&mut self, handle: JunctionHandle) -> Result<JunctionGroup, RoadError> {
        let group = self
            .junctions
            .remove(&handle)
            .ok_or(RoadError::UnknownJunction(handle))?;
        self.mark_dirty();
        Ok(group)
    }

    /// Keep junction references valid after spline `removed` was deleted.
    ///
    /// Returns the handles of groups dropped because they fell below two
    /// edges.
    pub fn retarget_removed_spline(&mut self, removed: usize) -> Vec<JunctionHandle> {
        let mut dropped = Vec::new();
        self.junctions.retain(|handle, group| {
            let keep = group.retarget_removed_spline(removed);
            if !keep {
                dropped.push(*handle);
            }
            keep
        });
        self.mark_dirty();
        dropped
    }

    /// Regenerate the full road mesh and push it to `sink`.
    ///
    /// Never fails: bad splines and junction groups are skipped and reported
    /// as warnings. Repeated calls with unchanged inputs produce identical
    /// buffers.
    pub fn rebuild<P, S>(&mut self, provider: &P, sink: &mut S) -> RebuildReport
    where
        P: SplineProvider + ?Sized,
        S: MeshSink + ?Sized,
    {
        let report = assemble_road(provider, self);
        for warning in &report.warnings {
            warn!("Road rebuild: {}", warning);
        }
        report.buffers.push_to(sink);
        self.dirty = false;
        report
    }
}

/// Serialized layout: parameters plus each group as `(spline, knot, bulge)`
/// triples. Handles are reassigned in order on load.
#[derive(Serialize, Deserialize)]
struct PersistedRoad {
    params: RoadParams,
    junctions: Vec<JunctionGroup>,
}

impl From<PersistedRoad> for RoadGeometryState {
    fn from(persisted: PersistedRoad) -> Self {
        let mut state = RoadGeometryState::new(persisted.params);
        for group in persisted.junctions {
            state.insert(group);
        }
        state
    }
}

impl From<RoadGeometryState> for PersistedRoad {
    fn from(state: RoadGeometryState) -> Self {
        Self {
            params: state.params,
            junctions: state.junctions.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::DEFAULT_BULGE_FACTOR;
    use crate::spline::RoadSplines;

    fn three_roads() -> RoadSplines {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0)]);
        splines.add_spline([Vec3::new(-5.0, 0.0, 0.0), Vec3::ZERO]);
        splines.add_spline([Vec3::ZERO, Vec3::new(0.0, 0.0, 2.5), Vec3::new(0.0, 0.0, 5.0)]);
        splines
    }

    #[test]
    fn params_are_sanitized() {
        let params = RoadParams {
            width: -1.0,
            y_offset: 0.3,
            resolution: 0,
            curve_step: 0.0,
        }
        .sanitized();

        assert_eq!(params.width, 0.0);
        assert_eq!(params.resolution, 1);
        assert_eq!(params.curve_step, MIN_CURVE_STEP);
    }

    #[test]
    fn samples_per_curve_counts_steps_below_one() {
        let mut params = RoadParams::default();
        assert_eq!(params.samples_per_curve(), 12);

        params.curve_step = 0.3;
        assert_eq!(params.curve_parameters().collect::<Vec<_>>().len(), 4);

        params.curve_step = 1.0;
        assert_eq!(params.samples_per_curve(), 3);
    }

    #[test]
    fn unusable_curve_steps_still_terminate() {
        let finest = RoadParams {
            curve_step: MIN_CURVE_STEP,
            ..default()
        }
        .samples_per_curve();

        for step in [0.0, -0.5, f32::NEG_INFINITY] {
            let params = RoadParams {
                curve_step: step,
                ..default()
            };
            assert_eq!(params.samples_per_curve(), finest);
        }

        let nan = RoadParams {
            curve_step: f32::NAN,
            ..default()
        };
        assert_eq!(nan.samples_per_curve(), RoadParams::default().samples_per_curve());
    }

    #[test]
    fn single_selection_is_rejected_without_state_change() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();
        state.dirty = false;

        let result = state.build_junction(
            &[JunctionReference::new(0, 0), JunctionReference::new(0, 0)],
            &splines,
        );

        assert_eq!(result, Err(RoadError::InvalidJunctionGroup { count: 1 }));
        assert_eq!(state.junction_count(), 0);
        assert!(!state.is_dirty());
    }

    #[test]
    fn interior_knots_are_rejected() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();

        let result = state.build_junction(
            &[JunctionReference::new(0, 0), JunctionReference::new(2, 1)],
            &splines,
        );

        assert_eq!(result, Err(RoadError::NotAnEndpoint { spline: 2, knot: 1 }));
        assert_eq!(state.junction_count(), 0);
    }

    #[test]
    fn overlapping_selection_extends_existing_group() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();

        let first = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        let second = state
            .build_junction(&[JunctionReference::new(1, 1), JunctionReference::new(2, 0)], &splines)
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(state.junction_count(), 1);
        let group = state.junction(first).unwrap();
        assert_eq!(group.len(), 3);
        assert_eq!(group.bulge_factors(), &[DEFAULT_BULGE_FACTOR; 3]);
        assert_eq!(state.junction_containing(JunctionReference::new(2, 0)), Some(first));
    }

    #[test]
    fn selection_spanning_two_groups_extends_the_last_one_touched() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();

        let a = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        let b = state
            .build_junction(&[JunctionReference::new(0, 1), JunctionReference::new(1, 0)], &splines)
            .unwrap();

        let target = state
            .build_junction(
                &[
                    JunctionReference::new(0, 0),
                    JunctionReference::new(0, 1),
                    JunctionReference::new(2, 0),
                ],
                &splines,
            )
            .unwrap();
        assert_eq!(target, b);
        assert_eq!(state.junction_containing(JunctionReference::new(2, 0)), Some(b));
        assert_eq!(state.junction(a).unwrap().len(), 2);

        let target = state
            .build_junction(
                &[
                    JunctionReference::new(0, 1),
                    JunctionReference::new(1, 1),
                    JunctionReference::new(2, 2),
                ],
                &splines,
            )
            .unwrap();
        assert_eq!(target, a);
        assert_eq!(state.junction(a).unwrap().len(), 3);
        assert_eq!(state.junction(b).unwrap().len(), 3);
        assert_eq!(state.junction_count(), 2);
    }

    #[test]
    fn handles_stay_stable_across_removal() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();

        let a = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        let b = state
            .build_junction(&[JunctionReference::new(0, 1), JunctionReference::new(2, 2)], &splines)
            .unwrap();

        state.remove_junction(a).unwrap();
        assert_eq!(state.remove_junction(a), Err(RoadError::UnknownJunction(a)));
        assert_eq!(state.set_bulge_factor(a, 0, 0.5), Err(RoadError::UnknownJunction(a)));

        state.set_bulge_factor(b, 1, 0.2).unwrap();
        assert_eq!(state.junction(b).unwrap().bulge_factors()[1], 0.2);

        let c = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        assert_ne!(c, a);
    }

    #[test]
    fn removing_a_spline_drops_groups_that_become_too_small() {
        let splines = three_roads();
        let mut state = RoadGeometryState::default();

        let pair = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        let triple = state
            .build_junction(
                &[
                    JunctionReference::new(0, 1),
                    JunctionReference::new(1, 0),
                    JunctionReference::new(2, 2),
                ],
                &splines,
            )
            .unwrap();

        let dropped = state.retarget_removed_spline(0);

        assert_eq!(dropped, vec![pair]);
        let group = state.junction(triple).unwrap();
        assert_eq!(
            group.references(),
            &[JunctionReference::new(0, 0), JunctionReference::new(1, 2)]
        );
    }

    #[test]
    fn persisted_layout_round_trips() {
        let splines = three_roads();
        let mut state = RoadGeometryState::new(RoadParams {
            width: 1.0,
            ..default()
        });
        let handle = state
            .build_junction(&[JunctionReference::new(0, 0), JunctionReference::new(1, 1)], &splines)
            .unwrap();
        state.set_bulge_factor(handle, 0, 0.5).unwrap();

        let text = ron::to_string(&state).unwrap();
        assert!(text.contains("junctions:[[(0,0,0.5),(1,1,0.9)]]"));

        let restored: RoadGeometryState = ron::from_str(&text).unwrap();
        assert_eq!(restored.params(), state.params());
        assert_eq!(restored.junction_count(), 1);
        let (_, group) = restored.junctions().next().unwrap();
        assert_eq!(group, state.junction(handle).unwrap());
        assert!(restored.is_dirty());
    }
}
