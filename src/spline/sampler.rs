//! Road-edge sampling on top of a [`SplineProvider`].

use bevy::prelude::*;

use super::provider::{SplineFrame, SplineProvider};
use crate::error::RoadError;

/// The two road-edge points across a spline at one parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgePair {
    pub left: Vec3,
    pub right: Vec3,
}

impl EdgePair {
    pub fn midpoint(&self) -> Vec3 {
        (self.left + self.right) / 2.0
    }

    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    /// Lift both points along world up.
    pub fn raised(self, offset: f32) -> Self {
        Self {
            left: self.left + Vec3::Y * offset,
            right: self.right + Vec3::Y * offset,
        }
    }
}

/// Samples centerline frames and edge points from a provider.
pub struct SplineSampler<'a, P: SplineProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: SplineProvider + ?Sized> SplineSampler<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &'a P {
        self.provider
    }

    /// Evaluate a spline, rejecting frames that cannot define a road edge.
    ///
    /// An unknown spline index is stale; a known spline that cannot produce
    /// a usable frame is degenerate.
    pub fn frame(&self, spline: usize, t: f32) -> Result<SplineFrame, RoadError> {
        let degenerate = RoadError::DegenerateSpline { spline };

        match self.provider.knot_count(spline) {
            None => return Err(RoadError::StaleReference { spline, knot: 0 }),
            Some(count) if count < 2 => return Err(degenerate),
            Some(_) => {}
        }

        let frame = self.provider.evaluate(spline, t).ok_or(degenerate.clone())?;
        if frame.tangent.length_squared() <= f32::EPSILON {
            return Err(degenerate);
        }
        Ok(frame)
    }

    /// Edge points at `half_width` either side of the centerline.
    ///
    /// `left` lies along `cross(tangent, up)`, `right` opposite to it.
    pub fn edge_points(&self, spline: usize, t: f32, half_width: f32) -> Result<EdgePair, RoadError> {
        let frame = self.frame(spline, t)?;
        let side = frame
            .tangent
            .cross(frame.up)
            .try_normalize()
            .ok_or(RoadError::DegenerateSpline { spline })?;

        Ok(EdgePair {
            left: frame.position + side * half_width,
            right: frame.position - side * half_width,
        })
    }
}
