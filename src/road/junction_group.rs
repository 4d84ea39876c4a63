//! Junction groups: spline endpoints that meet at one logical point.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::RoadError;
use crate::spline::SplineProvider;

/// Bulge factor given to every newly registered edge.
pub const DEFAULT_BULGE_FACTOR: f32 = 0.9;

/// One endpoint of one spline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JunctionReference {
    pub spline: usize,
    pub knot: usize,
}

impl JunctionReference {
    pub fn new(spline: usize, knot: usize) -> Self {
        Self { spline, knot }
    }

    /// Knot 0: the road leaves the junction. Any other knot: it arrives.
    pub fn is_outgoing(&self) -> bool {
        self.knot == 0
    }

    /// Spline parameter of the referenced endpoint.
    pub fn parameter(&self) -> f32 {
        if self.is_outgoing() {
            0.0
        } else {
            1.0
        }
    }

    /// Check that the reference still names the first or last knot of an
    /// existing spline.
    pub fn check_endpoint<P: SplineProvider + ?Sized>(&self, provider: &P) -> Result<(), RoadError> {
        let stale = RoadError::StaleReference {
            spline: self.spline,
            knot: self.knot,
        };
        let count = provider.knot_count(self.spline).ok_or(stale.clone())?;
        if self.knot >= count {
            return Err(stale);
        }
        if self.knot != 0 && self.knot != count - 1 {
            return Err(RoadError::NotAnEndpoint {
                spline: self.spline,
                knot: self.knot,
            });
        }
        Ok(())
    }
}

/// Stable id of a junction group within one road.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JunctionHandle(pub(crate) u32);

impl JunctionHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// Persisted form of one edge: `(spline, knot, bulge)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JunctionEntry(pub usize, pub usize, pub f32);

/// Spline endpoints blended into one junction mesh.
///
/// `bulge_factors[i]` shapes boundary curve `i` in angular order around the
/// junction center, so edits map onto the curves as they are drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<JunctionEntry>", into = "Vec<JunctionEntry>")]
pub struct JunctionGroup {
    references: SmallVec<[JunctionReference; 4]>,
    bulge_factors: SmallVec<[f32; 4]>,
}

impl JunctionGroup {
    /// Create a group with the default bulge factor on every edge.
    pub fn new(references: impl IntoIterator<Item = JunctionReference>) -> Self {
        let mut group = Self::empty();
        for reference in references {
            group.push(reference);
        }
        group
    }

    fn empty() -> Self {
        Self {
            references: SmallVec::new(),
            bulge_factors: SmallVec::new(),
        }
    }

    /// Append an edge unless the group already contains it.
    pub(crate) fn push(&mut self, reference: JunctionReference) -> bool {
        self.push_with_bulge(reference, DEFAULT_BULGE_FACTOR)
    }

    fn push_with_bulge(&mut self, reference: JunctionReference, bulge: f32) -> bool {
        if self.contains(reference) {
            return false;
        }
        self.references.push(reference);
        self.bulge_factors.push(clamp_bulge(bulge));
        true
    }

    pub fn references(&self) -> &[JunctionReference] {
        &self.references
    }

    pub fn bulge_factors(&self) -> &[f32] {
        &self.bulge_factors
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// A junction needs at least two edges.
    pub fn is_valid(&self) -> bool {
        self.references.len() >= 2
    }

    pub fn contains(&self, reference: JunctionReference) -> bool {
        self.references.contains(&reference)
    }

    /// Set the bulge factor of one boundary curve, clamped to `[0, 1]`.
    pub fn set_bulge_factor(&mut self, edge: usize, value: f32) -> Result<(), RoadError> {
        let count = self.bulge_factors.len();
        let slot = self
            .bulge_factors
            .get_mut(edge)
            .ok_or(RoadError::EdgeOutOfRange { edge, count })?;
        *slot = clamp_bulge(value);
        Ok(())
    }

    /// Rewrite references after spline `removed` was deleted from the
    /// container. Returns false if the group fell below two edges.
    pub(crate) fn retarget_removed_spline(&mut self, removed: usize) -> bool {
        let mut kept = Self::empty();
        for (reference, bulge) in self.references.iter().zip(&self.bulge_factors) {
            if reference.spline == removed {
                continue;
            }
            let spline = if reference.spline > removed {
                reference.spline - 1
            } else {
                reference.spline
            };
            kept.push_with_bulge(JunctionReference::new(spline, reference.knot), *bulge);
        }
        *self = kept;
        self.is_valid()
    }
}

fn clamp_bulge(value: f32) -> f32 {
    if value.is_nan() {
        DEFAULT_BULGE_FACTOR
    } else {
        value.clamp(0.0, 1.0)
    }
}

impl From<Vec<JunctionEntry>> for JunctionGroup {
    fn from(entries: Vec<JunctionEntry>) -> Self {
        let mut group = Self::empty();
        for JunctionEntry(spline, knot, bulge) in entries {
            group.push_with_bulge(JunctionReference::new(spline, knot), bulge);
        }
        group
    }
}

impl From<JunctionGroup> for Vec<JunctionEntry> {
    fn from(group: JunctionGroup) -> Self {
        group
            .references
            .iter()
            .zip(&group.bulge_factors)
            .map(|(r, b)| JunctionEntry(r.spline, r.knot, *b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::RoadSplines;
    use bevy::prelude::Vec3;

    #[test]
    fn new_groups_get_default_bulge_per_edge() {
        let group = JunctionGroup::new([
            JunctionReference::new(0, 0),
            JunctionReference::new(1, 1),
            JunctionReference::new(0, 0),
        ]);

        assert_eq!(group.len(), 2);
        assert_eq!(group.bulge_factors(), &[DEFAULT_BULGE_FACTOR; 2]);
        assert!(group.is_valid());
    }

    #[test]
    fn bulge_edits_are_clamped_and_bounds_checked() {
        let mut group = JunctionGroup::new([JunctionReference::new(0, 0), JunctionReference::new(1, 2)]);

        group.set_bulge_factor(1, 1.7).unwrap();
        group.set_bulge_factor(0, -3.0).unwrap();
        assert_eq!(group.bulge_factors(), &[0.0, 1.0]);

        assert_eq!(
            group.set_bulge_factor(2, 0.5),
            Err(RoadError::EdgeOutOfRange { edge: 2, count: 2 })
        );
    }

    #[test]
    fn endpoint_checks() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)]);

        assert!(JunctionReference::new(0, 0).check_endpoint(&splines).is_ok());
        assert!(JunctionReference::new(0, 2).check_endpoint(&splines).is_ok());
        assert_eq!(
            JunctionReference::new(0, 1).check_endpoint(&splines),
            Err(RoadError::NotAnEndpoint { spline: 0, knot: 1 })
        );
        assert_eq!(
            JunctionReference::new(0, 3).check_endpoint(&splines),
            Err(RoadError::StaleReference { spline: 0, knot: 3 })
        );
        assert_eq!(
            JunctionReference::new(2, 0).check_endpoint(&splines),
            Err(RoadError::StaleReference { spline: 2, knot: 0 })
        );
    }

    #[test]
    fn serializes_as_ordered_triples() {
        let mut group = JunctionGroup::new([JunctionReference::new(2, 0), JunctionReference::new(0, 3)]);
        group.set_bulge_factor(1, 0.25).unwrap();

        let text = ron::to_string(&group).unwrap();
        assert_eq!(text, "[(2,0,0.9),(0,3,0.25)]");

        let restored: JunctionGroup = ron::from_str(&text).unwrap();
        assert_eq!(restored, group);
    }

    #[test]
    fn retargeting_drops_removed_spline_and_shifts_the_rest() {
        let mut group = JunctionGroup::new([
            JunctionReference::new(0, 0),
            JunctionReference::new(1, 1),
            JunctionReference::new(3, 0),
        ]);
        group.set_bulge_factor(2, 0.4).unwrap();

        assert!(group.retarget_removed_spline(1));
        assert_eq!(
            group.references(),
            &[JunctionReference::new(0, 0), JunctionReference::new(2, 0)]
        );
        assert_eq!(group.bulge_factors(), &[DEFAULT_BULGE_FACTOR, 0.4]);

        assert!(!group.retarget_removed_spline(0));
        assert_eq!(group.len(), 1);
    }
}
