//! Host projection boundary.
//!
//! The editor never computes a map projection itself. The host supplies a
//! forward (`to_screen`) and inverse (`to_geo`) mapping; both must be pure
//! and inverse to each other up to floating-point rounding.

use crate::model::{Geometry, LngLat, Vertex};
use crate::project::{Flattened, project, project_all};
use kurbo::Point;

pub trait Projection {
    fn to_screen(&self, geo: LngLat) -> Point;
    fn to_geo(&self, screen: Point) -> LngLat;

    /// Dual-coordinate vertex for a geographic position.
    fn vertex(&self, geo: LngLat) -> Vertex {
        Vertex::new(self.to_screen(geo), geo)
    }

    /// Dual-coordinate vertex for a screen position.
    fn vertex_at(&self, screen: Point) -> Vertex {
        Vertex::new(screen, self.to_geo(screen))
    }

    /// Fill in the geographic half of a staged vertex.
    fn resolve(&self, v: &Vertex) -> Vertex {
        match v.geo {
            Some(_) => *v,
            None => self.vertex_at(v.screen),
        }
    }
}

/// Axis-aligned linear mapping: `screen = (geo - origin) * scale` per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearProjection {
    /// Geographic position drawn at screen (0, 0).
    pub origin: LngLat,
    /// Pixels per degree of longitude.
    pub scale_x: f64,
    /// Pixels per degree of latitude; negative when north is up.
    pub scale_y: f64,
}

impl LinearProjection {
    /// North-up mapping with `scale` pixels per degree.
    pub const fn new(origin: LngLat, scale: f64) -> Self {
        Self {
            origin,
            scale_x: scale,
            scale_y: -scale,
        }
    }

    /// Screen space equals geographic space (useful for tests and for hosts
    /// that hand over pixel geometry).
    pub const fn identity() -> Self {
        Self {
            origin: LngLat::new(0.0, 0.0),
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Projection for LinearProjection {
    fn to_screen(&self, geo: LngLat) -> Point {
        Point::new(
            (geo.lng - self.origin.lng) * self.scale_x,
            (geo.lat - self.origin.lat) * self.scale_y,
        )
    }

    fn to_geo(&self, screen: Point) -> LngLat {
        LngLat::new(
            self.origin.lng + screen.x / self.scale_x,
            self.origin.lat + screen.y / self.scale_y,
        )
    }
}

/// Project host geometries onto the canvas, collecting the flat lists both
/// indexes are built from.
pub fn to_canvas(data: &[Geometry<LngLat>], projection: &impl Projection) -> Flattened<Vertex> {
    project_all(data, |c: &LngLat| projection.vertex(*c))
}

/// Map canvas geometries back to geographic coordinates for the host.
/// Staged vertices are resolved through `to_geo`.
pub fn to_geographic(data: &[Geometry<Vertex>], projection: &impl Projection) -> Vec<Geometry<LngLat>> {
    data.iter()
        .map(|g| {
            project(
                g,
                |v: &Vertex| v.geo.unwrap_or_else(|| projection.to_geo(v.screen)),
                None,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_projection_inverts() {
        let proj = LinearProjection::new(LngLat::new(4.0, 52.5), 2048.0);
        let geo = LngLat::new(4.123456, 52.345678);
        let back = proj.to_geo(proj.to_screen(geo));
        assert!((back.lng - geo.lng).abs() < 1e-9);
        assert!((back.lat - geo.lat).abs() < 1e-9);
    }

    #[test]
    fn staged_vertices_resolve_on_export() {
        let proj = LinearProjection::new(LngLat::new(0.0, 10.0), 10.0);
        let data = vec![Geometry::point(Vertex::staged(Point::new(20.0, 30.0)))];
        let out = to_geographic(&data, &proj);
        assert_eq!(out[0], Geometry::point(LngLat::new(2.0, 7.0)));
    }
}
