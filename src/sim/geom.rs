//! Geometry primitives for the arena
//!
//! Obstacles are axis-aligned rectangles, but all proximity queries run
//! against the general convex-polygon form so the arena could grow other
//! convex shapes without touching the query code.

use glam::DVec2;
use thiserror::Error;

use crate::math::{orth, unit};

/// Invalid-input conditions for geometric constructors and queries.
///
/// The core does not try to recover a plausible answer from degenerate
/// geometry; callers get an explicit error instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("segment endpoints coincide at ({0}, {1})")]
    DegenerateSegment(f64, f64),
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("rectangle has non-positive extent {w}x{h}")]
    EmptyRect { w: f64, h: f64 },
    #[error("viewpoint ({0}, {1}) lies inside the obstacle")]
    ViewpointInsideObstacle(f64, f64),
    #[error("ray direction is zero")]
    ZeroRayDirection,
    #[error("ray from ({0}, {1}) never reaches the rectangle boundary")]
    RayMissesRect(f64, f64),
}

/// 2D circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// 2D line segment with derived direction and normal
///
/// Derived data is computed once at construction; segments are never
/// mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: DVec2,
    pub end: DVec2,
    /// end - start (not normalized)
    pub v: DVec2,
    /// Unit direction from start to end
    pub direction: DVec2,
    /// Unit normal, `orth(direction)`
    pub normal: DVec2,
}

impl Segment {
    pub fn new(start: DVec2, end: DVec2) -> Result<Self, GeometryError> {
        let v = end - start;
        if v.length_squared() == 0.0 {
            return Err(GeometryError::DegenerateSegment(start.x, start.y));
        }
        let direction = unit(v);
        Ok(Self {
            start,
            end,
            v,
            direction,
            normal: orth(direction),
        })
    }

    /// Segment length
    #[inline]
    pub fn length(&self) -> f64 {
        self.v.length()
    }
}

/// Convex polygon with derived per-edge segments and normals
///
/// Vertices are ordered so that each edge normal (`orth` of the edge
/// direction) points into the interior; [`AARect`] produces this winding.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec2>,
    edges: Vec<Segment>,
    in_normals: Vec<DVec2>,
    out_normals: Vec<DVec2>,
}

impl Polygon {
    pub fn new(vertices: Vec<DVec2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }

        let n = vertices.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(Segment::new(vertices[i], vertices[(i + 1) % n])?);
        }

        let in_normals: Vec<DVec2> = edges.iter().map(|e| e.normal).collect();
        let out_normals: Vec<DVec2> = in_normals.iter().map(|n| -*n).collect();

        Ok(Self {
            vertices,
            edges,
            in_normals,
            out_normals,
        })
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Normals of each edge pointing into the polygon interior
    #[inline]
    pub fn in_normals(&self) -> &[DVec2] {
        &self.in_normals
    }

    /// Normals of each edge pointing out of the polygon interior
    #[inline]
    pub fn out_normals(&self) -> &[DVec2] {
        &self.out_normals
    }

    /// Check if a point is inside the polygon, within tolerance.
    pub fn contains_point(&self, point: DVec2, tol: f64) -> bool {
        self.vertices
            .iter()
            .zip(&self.in_normals)
            .all(|(v, n)| (point - *v).dot(*n) >= -tol)
    }
}

/// Axis-aligned rectangle
///
/// Stores its own bounds alongside the derived polygon: bounds checks stay
/// cheap while proximity and occlusion queries run on the polygon form.
#[derive(Debug, Clone, PartialEq)]
pub struct AARect {
    /// x-coordinate of the top-left corner
    pub x: f64,
    /// y-coordinate of the top-left corner
    pub y: f64,
    pub w: f64,
    pub h: f64,
    poly: Polygon,
}

impl AARect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Result<Self, GeometryError> {
        if w <= 0.0 || h <= 0.0 {
            return Err(GeometryError::EmptyRect { w, h });
        }

        // fixed corner order; edge normals point inward with this winding
        let vertices = vec![
            DVec2::new(x, y),
            DVec2::new(x, y + h),
            DVec2::new(x + w, y + h),
            DVec2::new(x + w, y),
        ];
        let poly = Polygon::new(vertices)?;

        Ok(Self { x, y, w, h, poly })
    }

    /// The rectangle as a convex polygon for queries
    #[inline]
    pub fn as_polygon(&self) -> &Polygon {
        &self.poly
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec2] {
        self.poly.vertices()
    }

    /// Check if a point is inside the rectangle, within tolerance.
    pub fn contains_point(&self, point: DVec2, tol: f64) -> bool {
        point.x >= self.x - tol
            && point.x <= self.x + self.w + tol
            && point.y >= self.y - tol
            && point.y <= self.y + self.h + tol
    }
}
