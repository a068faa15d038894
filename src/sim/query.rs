//! Proximity queries between points and arena geometry
//!
//! The tricky part of the collision core: closest-feature classification
//! against convex polygons. Near a convex corner the minimum-depth edge's
//! projection gives a wrong push-out normal, so the query distinguishes the
//! edge-interior case from the shared-vertex case explicitly.

use glam::DVec2;

use super::geom::{Polygon, Segment};
use crate::math::unit;

/// Distance below which a query counts as intersecting
pub const QUERY_TOL: f64 = 1e-8;

/// Result of a proximity query
///
/// Produced fresh by every query call; never stored or mutated afterward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionQuery {
    /// Separation distance (0 when intersecting)
    pub distance: f64,
    /// Outward push-out direction, when the query defines one
    pub normal: Option<DVec2>,
    /// Closest point on the query object
    pub point_on_query: DVec2,
    /// Closest point on the target shape
    pub point_on_target: DVec2,
    /// Whether the shapes touch within tolerance
    pub intersecting: bool,
}

/// Closest point and separation between a point and a line segment
///
/// When the projection falls inside the segment the normal is left unset:
/// the caller supplies the owning edge's normal. When an endpoint is
/// closest, the normal is the unit push-out direction from that endpoint.
pub fn point_segment_query(point: DVec2, segment: &Segment) -> CollisionQuery {
    let q = segment.start - point;
    let t = -q.dot(segment.v) / segment.v.dot(segment.v);

    if (0.0..=1.0).contains(&t) {
        let r = segment.start + t * segment.v;
        let distance = (point - r).length();
        return CollisionQuery {
            distance,
            normal: None,
            point_on_query: point,
            point_on_target: r,
            intersecting: distance < QUERY_TOL,
        };
    }

    let d1 = (point - segment.start).length();
    let d2 = (point - segment.end).length();
    let endpoint = if d1 < d2 { segment.start } else { segment.end };
    CollisionQuery {
        distance: d1.min(d2),
        normal: Some(unit(point - endpoint)),
        point_on_query: point,
        point_on_target: endpoint,
        intersecting: false,
    }
}

/// Closest point, separation, and outward normal between a point and a
/// convex polygon
///
/// Inside (minimum inward depth >= 0): distance 0, normal of the
/// shallowest edge. Outside: the closest feature is either the interior of
/// the most-negative-depth edge or, when an adjacent edge is also violated,
/// the vertex those edges share.
pub fn point_poly_query(point: DVec2, poly: &Polygon) -> CollisionQuery {
    let depths: Vec<f64> = poly
        .vertices()
        .iter()
        .zip(poly.in_normals())
        .map(|(v, n)| (point - *v).dot(*n))
        .collect();

    let min_idx = depths
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
        .unwrap();

    // all depths non-negative: the point is inside or on the boundary
    if depths[min_idx] >= 0.0 {
        return CollisionQuery {
            distance: 0.0,
            normal: Some(poly.out_normals()[min_idx]),
            point_on_query: point,
            point_on_target: point,
            intersecting: true,
        };
    }

    // a second violated edge adjacent to the closest one means the shared
    // vertex is the closest feature
    let n = poly.vertices().len();
    let prev_idx = (min_idx + n - 1) % n;
    let next_idx = (min_idx + 1) % n;
    if depths[prev_idx] < 0.0 || depths[next_idx] < 0.0 {
        let vertex = if depths[prev_idx] < 0.0 {
            poly.vertices()[min_idx]
        } else {
            poly.vertices()[next_idx]
        };
        return CollisionQuery {
            distance: (point - vertex).length(),
            normal: Some(unit(point - vertex)),
            point_on_query: point,
            point_on_target: vertex,
            intersecting: false,
        };
    }

    // otherwise the closest point lies on the edge interior
    let mut query = point_segment_query(point, &poly.edges()[min_idx]);
    query.normal = Some(poly.out_normals()[min_idx]);
    query
}
