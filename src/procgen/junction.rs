//! Junction mesh construction.
//!
//! Road ends registered in one [`JunctionGroup`] are blended into a single
//! fan:
//!
//! 1. Each referenced endpoint is sampled into an edge, oriented so that
//!    `left`/`right` are consistent for incoming and outgoing splines.
//! 2. The center is the mean of all edge points.
//! 3. Edges are ordered by signed angle around the up axis.
//! 4. Adjacent edges are joined by quadratic Bezier arcs whose control point
//!    slides between a wide outward bow (bulge 0) and the center (bulge 1).
//! 5. The boundary is fanned around one shared center vertex.

use std::cmp::Ordering;

use bevy::prelude::*;

use super::buffers::{MeshBuffers, JUNCTION_SUBMESH};
use crate::error::RoadError;
use crate::road::{JunctionGroup, JunctionReference, RoadParams};
use crate::spline::{SplineProvider, SplineSampler};

/// Fixed direction angles are measured against.
const REFERENCE_DIRECTION: Vec3 = Vec3::Z;

/// How far past the chord midpoint the unbulged control point is pushed,
/// in multiples of its distance from the center.
const CONTROL_SPREAD: f32 = 5.0;

/// One road end entering a junction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JunctionEdge {
    pub reference: JunctionReference,
    pub left: Vec3,
    pub right: Vec3,
}

impl JunctionEdge {
    pub fn midpoint(&self) -> Vec3 {
        (self.left + self.right) / 2.0
    }
}

/// Quadratic Bezier arc joining two neighbouring edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JunctionCurve {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl JunctionCurve {
    /// Arc from `start` to `end` bowing away from `center` by `1 - bulge`.
    pub fn new(start: Vec3, end: Vec3, center: Vec3, bulge: f32) -> Self {
        let mid = start.lerp(end, 0.5);
        let widened = mid + (mid - center) * CONTROL_SPREAD;
        Self {
            start,
            control: widened.lerp(center, bulge),
            end,
        }
    }

    /// B(t) = (1-t)²·start + 2(1-t)t·control + t²·end
    pub fn point_at(&self, t: f32) -> Vec3 {
        let one_minus_t = 1.0 - t;
        one_minus_t * one_minus_t * self.start
            + 2.0 * one_minus_t * t * self.control
            + t * t * self.end
    }
}

/// Everything needed to mesh one junction.
#[derive(Clone, Debug, PartialEq)]
pub struct JunctionGeometry {
    pub center: Vec3,
    /// Edges in angular order.
    pub edges: Vec<JunctionEdge>,
    /// `curves[j]` joins `edges[j]` to `edges[(j + 1) % n]`.
    pub curves: Vec<JunctionCurve>,
    /// Boundary points in fan order.
    pub boundary: Vec<Vec3>,
}

impl JunctionGeometry {
    pub fn triangle_count(&self) -> usize {
        self.boundary.len()
    }
}

/// Sample and orient the edge of every reference in the group, in
/// registration order.
///
/// Outgoing ends (knot 0) keep the sampled `(left, right)`; incoming ends are
/// swapped so every edge is described looking into the junction.
pub fn extract_edges<P: SplineProvider + ?Sized>(
    sampler: &SplineSampler<P>,
    group: &JunctionGroup,
    params: &RoadParams,
) -> Result<Vec<JunctionEdge>, RoadError> {
    group
        .references()
        .iter()
        .map(|reference| {
            reference.check_endpoint(sampler.provider())?;
            let sampled = sampler
                .edge_points(reference.spline, reference.parameter(), params.half_width())?
                .raised(params.y_offset);
            let oriented = if reference.is_outgoing() {
                sampled
            } else {
                sampled.swapped()
            };
            Ok(JunctionEdge {
                reference: *reference,
                left: oriented.left,
                right: oriented.right,
            })
        })
        .collect()
}

/// Mean of every edge point.
pub fn junction_center(edges: &[JunctionEdge]) -> Vec3 {
    if edges.is_empty() {
        return Vec3::ZERO;
    }
    let sum: Vec3 = edges.iter().map(|e| e.left + e.right).sum();
    sum / (edges.len() * 2) as f32
}

/// Signed angle about +Y from `direction` to [`REFERENCE_DIRECTION`], after
/// flattening onto the ground plane. Range `(-π, π]`.
pub fn signed_angle_about_up(direction: Vec3) -> f32 {
    let flat = direction.reject_from_normalized(Vec3::Y);
    // Adding 0.0 folds -0.0 so directions opposite the reference land on +π.
    let sin = Vec3::Y.dot(flat.cross(REFERENCE_DIRECTION)) + 0.0;
    let cos = flat.dot(REFERENCE_DIRECTION);
    sin.atan2(cos)
}

/// Order edges by the angle of their midpoint around `center`.
///
/// The sort is stable: edges with identical angles keep registration order.
pub fn sort_edges_by_angle(edges: &mut Vec<JunctionEdge>, center: Vec3) {
    let mut keyed: Vec<(f32, JunctionEdge)> = edges
        .drain(..)
        .map(|edge| (signed_angle_about_up(edge.midpoint() - center), edge))
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    edges.extend(keyed.into_iter().map(|(_, edge)| edge));
}

/// Compute center, ordering, boundary curves and fan boundary for a group.
pub fn build_junction_geometry<P: SplineProvider + ?Sized>(
    sampler: &SplineSampler<P>,
    group: &JunctionGroup,
    params: &RoadParams,
) -> Result<JunctionGeometry, RoadError> {
    if !group.is_valid() {
        return Err(RoadError::InvalidJunctionGroup { count: group.len() });
    }

    let mut edges = extract_edges(sampler, group, params)?;
    let center = junction_center(&edges);
    sort_edges_by_angle(&mut edges, center);

    let count = edges.len();
    let mut curves = Vec::with_capacity(count);
    let mut boundary = Vec::with_capacity(count * params.samples_per_curve());

    for (j, edge) in edges.iter().enumerate() {
        let next = &edges[(j + 1) % count];
        let curve = JunctionCurve::new(edge.left, next.right, center, group.bulge_factors()[j]);

        boundary.push(curve.start);
        boundary.extend(params.curve_parameters().map(|t| curve.point_at(t)));
        boundary.push(curve.end);

        curves.push(curve);
    }

    // The arcs were traced the opposite way round; flip so the fan faces up.
    boundary.reverse();

    Ok(JunctionGeometry {
        center,
        edges,
        curves,
        boundary,
    })
}

/// Append the junction fan: one center vertex, one vertex per boundary
/// point, and a triangle per boundary segment including the closing one.
///
/// UVs are the planar `(z, x)` projection of each vertex.
pub fn append_junction_mesh(geometry: &JunctionGeometry, buffers: &mut MeshBuffers) {
    let planar_uv = |p: Vec3| Vec2::new(p.z, p.x);

    let center = buffers.push_vertex(geometry.center, planar_uv(geometry.center));
    let first = buffers.vertex_count() as u32;
    for point in &geometry.boundary {
        buffers.push_vertex(*point, planar_uv(*point));
    }

    let count = geometry.boundary.len() as u32;
    for i in 0..count {
        let next = (i + 1) % count;
        buffers.push_triangle(JUNCTION_SUBMESH, [center, first + i, first + next]);
    }
}
