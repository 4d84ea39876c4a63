//! Ribbon extrusion: one quad strip per spline.
//!
//! Quads do not share vertices, so each spline with resolution R yields
//! 4R vertices and 2R triangles.

use bevy::prelude::*;

use super::buffers::{MeshBuffers, ROAD_SUBMESH};
use crate::error::RoadError;
use crate::road::RoadParams;
use crate::spline::{EdgePair, SplineProvider, SplineSampler};

/// Distance along the road covered by one texture repeat.
const UV_TILE_LENGTH: f32 = 4.0;

/// Sample `resolution + 1` edge pairs along a spline, lifted by `y_offset`.
pub fn sample_ribbon_edges<P: SplineProvider + ?Sized>(
    sampler: &SplineSampler<P>,
    spline: usize,
    params: &RoadParams,
) -> Result<Vec<EdgePair>, RoadError> {
    let resolution = params.resolution.max(1);
    let half_width = params.half_width();

    (0..=resolution)
        .map(|i| {
            let t = if i == resolution {
                1.0
            } else {
                i as f32 / resolution as f32
            };
            sampler
                .edge_points(spline, t, half_width)
                .map(|edges| edges.raised(params.y_offset))
        })
        .collect()
}

/// Append the quad strip of one spline to the road submesh.
///
/// `u_offset` is the running texture coordinate along the road; it starts the
/// strip and is advanced past it, so consecutive splines continue the same
/// texture. Nothing is written and `u_offset` is left alone if any sample
/// fails. Returns the sampled edge pairs.
pub fn build_ribbon<P: SplineProvider + ?Sized>(
    sampler: &SplineSampler<P>,
    spline: usize,
    params: &RoadParams,
    u_offset: &mut f32,
    buffers: &mut MeshBuffers,
) -> Result<Vec<EdgePair>, RoadError> {
    let edges = sample_ribbon_edges(sampler, spline, params)?;

    let mut u = *u_offset;
    for pair in edges.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);

        // p3 -- p4
        // |      |
        // p1 -- p2
        let next_u = u + prev.left.distance(cur.left) / UV_TILE_LENGTH;
        let p1 = buffers.push_vertex(prev.left, Vec2::new(u, 0.0));
        let p2 = buffers.push_vertex(prev.right, Vec2::new(u, 1.0));
        let p3 = buffers.push_vertex(cur.left, Vec2::new(next_u, 0.0));
        let p4 = buffers.push_vertex(cur.right, Vec2::new(next_u, 1.0));

        buffers.push_triangle(ROAD_SUBMESH, [p1, p3, p4]);
        buffers.push_triangle(ROAD_SUBMESH, [p4, p2, p1]);

        u = next_u;
    }

    *u_offset = u;
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procgen::JUNCTION_SUBMESH;
    use crate::spline::RoadSplines;
    use approx::assert_relative_eq;

    fn params(resolution: usize) -> RoadParams {
        RoadParams {
            width: 2.0,
            y_offset: 0.5,
            resolution,
            curve_step: 0.1,
        }
    }

    fn face_normal(buffers: &MeshBuffers, [a, b, c]: [u32; 3]) -> Vec3 {
        let [a, b, c] = [a, b, c].map(|i| buffers.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    #[test]
    fn emits_resolution_quads_without_shared_vertices() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::new(3.0, 0.0, 1.0), Vec3::new(8.0, 0.0, 0.0)]);
        let sampler = SplineSampler::new(&splines);

        for resolution in [1, 4, 25] {
            let mut buffers = MeshBuffers::default();
            let edges = build_ribbon(&sampler, 0, &params(resolution), &mut 0.0, &mut buffers).unwrap();

            assert_eq!(edges.len(), resolution + 1);
            assert_eq!(buffers.vertex_count(), 4 * resolution);
            assert_eq!(buffers.uvs.len(), 4 * resolution);
            assert_eq!(buffers.triangle_count(ROAD_SUBMESH), 2 * resolution);
            assert_eq!(buffers.triangle_count(JUNCTION_SUBMESH), 0);
        }
    }

    #[test]
    fn uv_u_accumulates_quarter_distance() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0)]);
        let sampler = SplineSampler::new(&splines);
        let mut buffers = MeshBuffers::default();

        build_ribbon(&sampler, 0, &params(4), &mut 0.0, &mut buffers).unwrap();

        assert_eq!(buffers.uvs[0], Vec2::new(0.0, 0.0));
        assert_eq!(buffers.uvs[1], Vec2::new(0.0, 1.0));
        // Quads are 2 long: u advances by 0.5 each.
        assert_relative_eq!(buffers.uvs[2].x, 0.5, epsilon = 1e-4);
        assert_relative_eq!(buffers.uvs[4].x, 0.5, epsilon = 1e-4);
        let last = buffers.uvs.last().unwrap();
        assert_relative_eq!(last.x, 2.0, epsilon = 1e-3);
        assert_eq!(last.y, 1.0);
    }

    #[test]
    fn quads_face_up_and_are_lifted() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::new(0.0, 0.0, -6.0), Vec3::new(-4.0, 0.0, -9.0)]);
        let sampler = SplineSampler::new(&splines);
        let mut buffers = MeshBuffers::default();

        build_ribbon(&sampler, 0, &params(10), &mut 0.0, &mut buffers).unwrap();

        for triangle in buffers.triangles(ROAD_SUBMESH) {
            assert!(face_normal(&buffers, triangle).y > 0.0);
        }
        for vertex in &buffers.vertices {
            assert_relative_eq!(vertex.y, 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn failed_sampling_writes_nothing() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ONE, Vec3::ONE]);
        let sampler = SplineSampler::new(&splines);
        let mut buffers = MeshBuffers::default();
        let mut u = 1.5;

        let result = build_ribbon(&sampler, 0, &params(4), &mut u, &mut buffers);

        assert_eq!(result, Err(RoadError::DegenerateSpline { spline: 0 }));
        assert_eq!(buffers, MeshBuffers::default());
        assert_eq!(u, 1.5);
    }

    #[test]
    fn uv_u_continues_across_splines() {
        let mut splines = RoadSplines::default();
        splines.add_spline([Vec3::ZERO, Vec3::new(8.0, 0.0, 0.0)]);
        splines.add_spline([Vec3::new(0.0, 0.0, 3.0), Vec3::new(8.0, 0.0, 3.0)]);
        let sampler = SplineSampler::new(&splines);
        let mut buffers = MeshBuffers::default();
        let mut u = 0.0;

        build_ribbon(&sampler, 0, &params(4), &mut u, &mut buffers).unwrap();
        let end_of_first = buffers.uvs[15].x;
        build_ribbon(&sampler, 1, &params(4), &mut u, &mut buffers).unwrap();

        assert_relative_eq!(end_of_first, 2.0, epsilon = 1e-3);
        assert_eq!(buffers.uvs[16].x, end_of_first);
        assert_eq!(buffers.uvs[17].x, end_of_first);
        assert_relative_eq!(buffers.uvs.last().unwrap().x, 4.0, epsilon = 1e-3);
        assert_eq!(u, buffers.uvs.last().unwrap().x);
    }
}
