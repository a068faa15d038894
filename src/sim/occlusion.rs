//! Occlusion polygon construction
//!
//! Obstacles cast shadows away from a viewpoint: the umbra is bounded by the
//! two witness vertices of the obstacle, the rays through them extended to
//! the screen boundary, and any screen corners caught between those rays.
//! The renderer fills the returned polygons directly.
//!
//! Agents also cast a view-cone occlusion (everything outside their field of
//! view), built the same way from the two view-edge rays.

use glam::DVec2;

use super::geom::{AARect, GeometryError};
use crate::consts::VIEW_HALF_ANGLE;
use crate::math::{angle_to, orth, rotate, wrap_to_pi};

/// Tolerance for the witness-vertex side tests
const WITNESS_TOL: f64 = 1e-3;

/// Intersection of a ray with the boundary of a rectangle containing its
/// origin
///
/// Intersects `p + t * v` with the four boundary lines and keeps the
/// smallest non-negative `t`.
pub fn line_rect_edge_intersection(
    p: DVec2,
    v: DVec2,
    rect: &AARect,
) -> Result<DVec2, GeometryError> {
    if v.length_squared() == 0.0 {
        return Err(GeometryError::ZeroRayDirection);
    }

    let mut t_min = f64::INFINITY;

    // vertical edges
    if v.x.abs() > 1e-12 {
        for t in [(rect.x - p.x) / v.x, (rect.x + rect.w - p.x) / v.x] {
            if t >= 0.0 && t < t_min {
                t_min = t;
            }
        }
    }
    // horizontal edges
    if v.y.abs() > 1e-12 {
        for t in [(rect.y - p.y) / v.y, (rect.y + rect.h - p.y) / v.y] {
            if t >= 0.0 && t < t_min {
                t_min = t;
            }
        }
    }

    if !t_min.is_finite() {
        return Err(GeometryError::RayMissesRect(p.x, p.y));
    }
    Ok(p + t_min * v)
}

/// The two obstacle vertices bounding the shadow cast from `viewpoint`
///
/// A vertex is the right witness if every obstacle vertex lies on the
/// non-negative side of the normal to its sight line, and the left witness
/// symmetrically on the non-positive side. Returns `(right, left)`.
pub fn witness_vertices(
    rect: &AARect,
    viewpoint: DVec2,
) -> Result<(DVec2, DVec2), GeometryError> {
    if rect.contains_point(viewpoint, WITNESS_TOL) {
        return Err(GeometryError::ViewpointInsideObstacle(
            viewpoint.x,
            viewpoint.y,
        ));
    }

    let mut right = None;
    let mut left = None;
    for vertex in rect.vertices() {
        let normal = orth(*vertex - viewpoint);
        let dists = rect.vertices().iter().map(|v| (*v - viewpoint).dot(normal));
        if dists.clone().all(|d| d >= -WITNESS_TOL) {
            right = Some(*vertex);
        } else if dists.clone().all(|d| d <= WITNESS_TOL) {
            left = Some(*vertex);
        }
        if let (Some(r), Some(l)) = (right, left) {
            return Ok((r, l));
        }
    }

    // unreachable for a convex quad viewed from strictly outside
    Err(GeometryError::ViewpointInsideObstacle(
        viewpoint.x,
        viewpoint.y,
    ))
}

/// Ordered polygon covering the umbra cast by `rect` away from `viewpoint`,
/// clipped to `screen_rect`
pub fn occlusion_polygon(
    rect: &AARect,
    viewpoint: DVec2,
    screen_rect: &AARect,
) -> Result<Vec<DVec2>, GeometryError> {
    let (right, left) = witness_vertices(rect, viewpoint)?;

    let delta_right = right - viewpoint;
    let extra_right = line_rect_edge_intersection(right, delta_right, screen_rect)?;
    let normal_right = orth(delta_right);

    let delta_left = left - viewpoint;
    let extra_left = line_rect_edge_intersection(left, delta_left, screen_rect)?;
    let normal_left = orth(delta_left);

    // screen corners strictly between the two rays, ordered by increasing
    // offset along the right ray's normal; at most two can qualify
    let mut screen_dists: Vec<f64> = Vec::with_capacity(2);
    let mut screen_vs: Vec<DVec2> = Vec::with_capacity(2);
    for v in screen_rect.vertices() {
        if -(*v - viewpoint).dot(normal_left) < 0.0 {
            continue;
        }
        let dist = (*v - viewpoint).dot(normal_right);
        if dist >= 0.0 {
            if !screen_dists.is_empty() && screen_dists[0] > dist {
                screen_vs = vec![*v, screen_vs[0]];
                break;
            }
            screen_dists.push(dist);
            screen_vs.push(*v);
            if screen_vs.len() == 2 {
                break;
            }
        }
    }

    let mut polygon = Vec::with_capacity(4 + screen_vs.len());
    polygon.push(right);
    polygon.push(extra_right);
    polygon.extend(screen_vs);
    polygon.push(extra_left);
    polygon.push(left);
    Ok(polygon)
}

/// Ordered polygon covering everything outside an agent's view cone,
/// clipped to `screen_rect`
///
/// The cone is centered on `heading` (flipped by `look_back`) with
/// half-angle [`VIEW_HALF_ANGLE`]. Screen corners outside the cone are
/// inserted in order of increasing angle from the heading.
pub fn view_occlusion_polygon(
    position: DVec2,
    heading: f64,
    look_back: bool,
    screen_rect: &AARect,
) -> Result<Vec<DVec2>, GeometryError> {
    use std::f64::consts::{PI, TAU};

    let angle = if look_back {
        wrap_to_pi(heading + PI)
    } else {
        heading
    };

    let vr = rotate(DVec2::X, angle + VIEW_HALF_ANGLE);
    let vl = rotate(DVec2::X, angle - VIEW_HALF_ANGLE);
    let extra_right = line_rect_edge_intersection(position, vr, screen_rect)?;
    let extra_left = line_rect_edge_intersection(position, vl, screen_rect)?;

    let mut corners: Vec<(f64, DVec2)> = screen_rect
        .vertices()
        .iter()
        .filter_map(|v| {
            let a = angle_to(*v - position, angle);
            (a >= VIEW_HALF_ANGLE && a <= TAU - VIEW_HALF_ANGLE).then_some((a, *v))
        })
        .collect();
    corners.sort_by(|(a, _), (b, _)| a.total_cmp(b));

    let mut polygon = Vec::with_capacity(3 + corners.len());
    polygon.push(position);
    polygon.push(extra_right);
    polygon.extend(corners.into_iter().map(|(_, v)| v));
    polygon.push(extra_left);
    Ok(polygon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> AARect {
        AARect::new(x, y, w, h).unwrap()
    }

    fn screen() -> AARect {
        rect(0.0, 0.0, 50.0, 50.0)
    }

    #[test]
    fn test_ray_exit_point() {
        let p = line_rect_edge_intersection(
            DVec2::new(25.0, 25.0),
            DVec2::new(1.0, 0.0),
            &screen(),
        )
        .unwrap();
        assert_eq!(p, DVec2::new(50.0, 25.0));

        let p = line_rect_edge_intersection(
            DVec2::new(25.0, 25.0),
            DVec2::new(-2.0, -2.0),
            &screen(),
        )
        .unwrap();
        assert_eq!(p, DVec2::new(0.0, 0.0));
    }

    #[test]
    fn test_ray_zero_direction() {
        assert!(matches!(
            line_rect_edge_intersection(DVec2::new(25.0, 25.0), DVec2::ZERO, &screen()),
            Err(GeometryError::ZeroRayDirection)
        ));
    }

    #[test]
    fn test_witness_vertices_from_left() {
        let obstacle = rect(20.0, 20.0, 10.0, 10.0);
        let (right, left) = witness_vertices(&obstacle, DVec2::new(10.0, 25.0)).unwrap();
        assert_eq!(right, DVec2::new(20.0, 30.0));
        assert_eq!(left, DVec2::new(20.0, 20.0));
    }

    #[test]
    fn test_witness_viewpoint_inside_fails() {
        let obstacle = rect(20.0, 20.0, 10.0, 10.0);
        assert!(matches!(
            witness_vertices(&obstacle, DVec2::new(25.0, 25.0)),
            Err(GeometryError::ViewpointInsideObstacle(..))
        ));
    }

    #[test]
    fn test_occlusion_no_screen_corners() {
        // viewed from the left, the shadow exits through the right screen
        // edge without wrapping a corner
        let obstacle = rect(20.0, 20.0, 10.0, 10.0);
        let poly =
            occlusion_polygon(&obstacle, DVec2::new(10.0, 25.0), &screen()).unwrap();
        assert_eq!(
            poly,
            vec![
                DVec2::new(20.0, 30.0),
                DVec2::new(50.0, 45.0),
                DVec2::new(50.0, 5.0),
                DVec2::new(20.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_occlusion_collects_two_screen_corners() {
        // viewed from just above, the shadow fans past both bottom corners
        let obstacle = rect(20.0, 20.0, 10.0, 10.0);
        let poly =
            occlusion_polygon(&obstacle, DVec2::new(25.0, 15.0), &screen()).unwrap();
        assert_eq!(
            poly,
            vec![
                DVec2::new(20.0, 20.0),
                DVec2::new(0.0, 40.0),
                DVec2::new(0.0, 50.0),
                DVec2::new(50.0, 50.0),
                DVec2::new(50.0, 40.0),
                DVec2::new(30.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_view_occlusion_facing_right() {
        let poly = view_occlusion_polygon(DVec2::new(25.0, 25.0), 0.0, false, &screen())
            .unwrap();
        assert_eq!(poly.len(), 5);
        assert_eq!(poly[0], DVec2::new(25.0, 25.0));
        // right view edge exits through the top of the screen, left through
        // the bottom (screen frame, clockwise-positive)
        assert!(poly[1].y.abs() < 1e-9);
        assert!((poly[4].y - 50.0).abs() < 1e-9);
        // the two corners behind the agent, in increasing angle order
        assert_eq!(poly[2], DVec2::new(0.0, 0.0));
        assert_eq!(poly[3], DVec2::new(0.0, 50.0));
    }

    #[test]
    fn test_view_occlusion_lookback_flips() {
        let fwd = view_occlusion_polygon(DVec2::new(25.0, 25.0), 0.0, false, &screen())
            .unwrap();
        let back = view_occlusion_polygon(DVec2::new(25.0, 25.0), 0.0, true, &screen())
            .unwrap();
        // looking back mirrors the cone: the hidden corners swap sides
        assert_eq!(fwd[2], DVec2::new(0.0, 0.0));
        assert_eq!(back[2], DVec2::new(50.0, 50.0));
    }
}
