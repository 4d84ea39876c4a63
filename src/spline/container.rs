//! Catmull-Rom spline container attached to road entities.
//!
//! Each spline passes through its knots; the curve is refitted whenever a
//! knot changes. Positions are in the road entity's local space.

use bevy::math::cubic_splines::{CubicCardinalSpline, CubicCurve, CubicGenerator};
use bevy::prelude::*;

use super::provider::{SplineFrame, SplineProvider};

/// A single centerline through an ordered list of knots.
#[derive(Clone, Debug)]
pub struct RoadSpline {
    knots: Vec<Vec3>,
    /// `None` when there are fewer than two knots.
    curve: Option<CubicCurve<Vec3>>,
}

impl RoadSpline {
    pub fn new(knots: impl IntoIterator<Item = Vec3>) -> Self {
        let knots: Vec<Vec3> = knots.into_iter().collect();
        let curve = Self::fit(&knots);
        Self { knots, curve }
    }

    fn fit(knots: &[Vec3]) -> Option<CubicCurve<Vec3>> {
        if knots.len() < 2 {
            return None;
        }
        CubicCardinalSpline::new_catmull_rom(knots.to_vec())
            .to_curve()
            .ok()
    }

    pub fn knots(&self) -> &[Vec3] {
        &self.knots
    }

    /// Move a knot and refit the curve. Returns false if the knot is unknown.
    pub fn set_knot(&mut self, index: usize, position: Vec3) -> bool {
        let Some(knot) = self.knots.get_mut(index) else {
            return false;
        };
        *knot = position;
        self.curve = Self::fit(&self.knots);
        true
    }

    /// Evaluate at `t` in `[0, 1]` across the whole spline.
    pub fn evaluate(&self, t: f32) -> Option<SplineFrame> {
        let curve = self.curve.as_ref()?;
        let segments = curve.segments().len() as f32;
        let local_t = t.clamp(0.0, 1.0) * segments;

        Some(SplineFrame {
            position: curve.position(local_t),
            tangent: curve.velocity(local_t),
            up: Vec3::Y,
        })
    }
}

/// All splines of one road. Mutating it marks the road for a rebuild.
#[derive(Component, Clone, Debug, Default)]
#[require(Transform, Visibility)]
pub struct RoadSplines {
    splines: Vec<RoadSpline>,
}

impl RoadSplines {
    pub fn new(splines: impl IntoIterator<Item = RoadSpline>) -> Self {
        Self {
            splines: splines.into_iter().collect(),
        }
    }

    /// Add a spline through `knots`, returning its index.
    pub fn add_spline(&mut self, knots: impl IntoIterator<Item = Vec3>) -> usize {
        self.splines.push(RoadSpline::new(knots));
        self.splines.len() - 1
    }

    /// Remove a spline. Splines after it shift down by one index, so junction
    /// references must be retargeted with
    /// [`RoadGeometryState::retarget_removed_spline`](crate::road::RoadGeometryState::retarget_removed_spline).
    pub fn remove_spline(&mut self, index: usize) -> Option<RoadSpline> {
        (index < self.splines.len()).then(|| self.splines.remove(index))
    }

    pub fn spline(&self, index: usize) -> Option<&RoadSpline> {
        self.splines.get(index)
    }

    pub fn set_knot(&mut self, spline: usize, knot: usize, position: Vec3) -> bool {
        self.splines
            .get_mut(spline)
            .is_some_and(|s| s.set_knot(knot, position))
    }

    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }
}

impl SplineProvider for RoadSplines {
    fn spline_count(&self) -> usize {
        self.splines.len()
    }

    fn knot_count(&self, spline: usize) -> Option<usize> {
        self.splines.get(spline).map(|s| s.knots.len())
    }

    fn evaluate(&self, spline: usize, t: f32) -> Option<SplineFrame> {
        self.splines.get(spline)?.evaluate(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn two_knot_spline_is_a_straight_line() {
        let spline = RoadSpline::new([Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]);

        let start = spline.evaluate(0.0).unwrap();
        let mid = spline.evaluate(0.5).unwrap();
        let end = spline.evaluate(1.0).unwrap();

        assert_relative_eq!(start.position.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(mid.position.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(mid.position.z, 0.0, epsilon = 1e-5);
        assert_relative_eq!(end.position.x, 4.0, epsilon = 1e-4);
        assert!(mid.tangent.x > 0.0);
        assert_eq!(mid.up, Vec3::Y);
    }

    #[test]
    fn curve_passes_through_interior_knots() {
        let spline = RoadSpline::new([
            Vec3::ZERO,
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(4.0, 0.0, 0.0),
        ]);

        // Two segments: t = 0.5 lands exactly on the middle knot.
        let frame = spline.evaluate(0.5).unwrap();
        assert_relative_eq!(frame.position.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(frame.position.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn single_knot_spline_cannot_be_evaluated() {
        let splines = RoadSplines::new([RoadSpline::new([Vec3::ONE])]);

        assert_eq!(splines.knot_count(0), Some(1));
        assert!(splines.evaluate(0, 0.5).is_none());
        assert!(splines.evaluate(3, 0.5).is_none());
    }

    #[test]
    fn moving_a_knot_refits_the_curve() {
        let mut splines = RoadSplines::default();
        let index = splines.add_spline([Vec3::ZERO, Vec3::X]);

        assert!(splines.set_knot(index, 1, Vec3::new(0.0, 0.0, 3.0)));
        assert!(!splines.set_knot(index, 5, Vec3::ZERO));

        let end = splines.evaluate(index, 1.0).unwrap();
        assert_relative_eq!(end.position.z, 3.0, epsilon = 1e-4);
    }

    #[test]
    fn removing_a_spline_shifts_later_indices() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::X]);
        splines.add_spline([Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, 2.0)]);

        assert!(splines.remove_spline(0).is_some());
        assert!(splines.remove_spline(7).is_none());
        assert_eq!(splines.spline_count(), 1);
        assert_eq!(splines.knot_count(0), Some(3));
    }
}
