//! Full road rebuild: ribbons for every spline, then every junction group.

use bevy::prelude::*;

use super::buffers::MeshBuffers;
use super::junction::{append_junction_mesh, build_junction_geometry, JunctionGeometry};
use super::ribbon::build_ribbon;
use crate::error::RoadError;
use crate::road::{RoadGeometryState, RoadParams};
use crate::spline::{EdgePair, SplineProvider, SplineSampler};

/// Sample points kept from the last rebuild for the debug overlay.
#[derive(Component, Clone, Debug, Default, PartialEq)]
pub struct RoadDebugGeometry {
    /// Edge pairs sampled along every ribbon.
    pub ribbon_edges: Vec<EdgePair>,
    /// Oriented junction edges, in angular order per junction.
    pub junction_edges: Vec<EdgePair>,
    /// Interior samples of every junction boundary curve.
    pub curve_points: Vec<Vec3>,
}

impl RoadDebugGeometry {
    fn record_junction(&mut self, geometry: &JunctionGeometry, params: &RoadParams) {
        self.junction_edges
            .extend(geometry.edges.iter().map(|e| EdgePair {
                left: e.left,
                right: e.right,
            }));
        for curve in &geometry.curves {
            self.curve_points.extend(
                params
                    .curve_parameters()
                    .filter(|t| *t > 0.0)
                    .map(|t| curve.point_at(t)),
            );
        }
    }
}

/// Output of one rebuild.
#[derive(Clone, Debug, Default)]
pub struct RebuildReport {
    pub buffers: MeshBuffers,
    pub debug: RoadDebugGeometry,
    /// Recovered problems: skipped splines and dropped junction groups.
    pub warnings: Vec<RoadError>,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Generate the complete road mesh for `state` from scratch.
///
/// Ribbon triangles go to the road submesh, junction fans to the junction
/// submesh; both share one vertex array. Ribbon `u` runs on from one spline
/// to the next for the whole rebuild. A spline that cannot be sampled is
/// skipped and a junction group that cannot be built is dropped, each with a
/// warning; the rest of the road is still generated.
pub fn assemble_road<P: SplineProvider + ?Sized>(provider: &P, state: &RoadGeometryState) -> RebuildReport {
    let sampler = SplineSampler::new(provider);
    let params = state.params();
    let mut report = RebuildReport::default();
    let mut u_offset = 0.0;

    for spline in 0..provider.spline_count() {
        match build_ribbon(&sampler, spline, params, &mut u_offset, &mut report.buffers) {
            Ok(edges) => report.debug.ribbon_edges.extend(edges),
            Err(err) => report.warnings.push(err),
        }
    }

    for (handle, group) in state.junctions() {
        match build_junction_geometry(&sampler, group, params) {
            Ok(geometry) => {
                append_junction_mesh(&geometry, &mut report.buffers);
                report.debug.record_junction(&geometry, params);
            }
            Err(err) => {
                debug!("Dropping junction {:?} from rebuild", handle);
                report.warnings.push(err);
            }
        }
    }

    report
}
