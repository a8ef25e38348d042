//! Geometry data model.
//!
//! Geometries are a closed sum type over the GeoJSON kinds the editor
//! understands. The type is generic over its coordinate so the same tree
//! can hold geographic positions (`LngLat`, host interchange), dual
//! screen/geographic vertices (`Vertex`, while on the canvas), or bare
//! screen points (`kurbo::Point`).

use crate::error::GeometryError;
use kurbo::{Line, Point, Rect};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Coordinates ─────────────────────────────────────────────────────────

/// Geographic coordinate in degrees. Encoded as a `[lng, lat]` array;
/// extra elements (altitude) are accepted and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Round both components to `digits` decimal places.
    pub fn rounded(self, digits: i32) -> Self {
        let scale = 10f64.powi(digits);
        Self {
            lng: (self.lng * scale).round() / scale,
            lat: (self.lat * scale).round() / scale,
        }
    }
}

impl TryFrom<Vec<f64>> for LngLat {
    type Error = GeometryError;

    fn try_from(position: Vec<f64>) -> Result<Self, Self::Error> {
        match position.as_slice() {
            [lng, lat, ..] => Ok(Self::new(*lng, *lat)),
            _ => Err(GeometryError::ShortPosition(position.len())),
        }
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(c: LngLat) -> Self {
        [c.lng, c.lat]
    }
}

/// A vertex on the editing canvas.
///
/// `screen` is authoritative for drawing and hit testing. `geo` is the
/// geographic position as of the last commit; `None` marks a staged
/// position (a vertex dragged to the cursor) whose geographic half has not
/// been resolved through the host projection yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub screen: Point,
    pub geo: Option<LngLat>,
}

impl Vertex {
    pub const fn new(screen: Point, geo: LngLat) -> Self {
        Self {
            screen,
            geo: Some(geo),
        }
    }

    /// A vertex whose geographic half is stale until the next commit.
    pub const fn staged(screen: Point) -> Self {
        Self { screen, geo: None }
    }

    pub fn is_staged(&self) -> bool {
        self.geo.is_none()
    }
}

/// Anything with a planar position. Drives flattening, hit testing, and
/// bounding boxes independently of the coordinate representation.
pub trait Coord {
    fn position(&self) -> Point;

    /// Exact positional equality (no tolerance).
    fn same_position(&self, p: Point) -> bool {
        let q = self.position();
        q.x == p.x && q.y == p.y
    }
}

impl Coord for Point {
    fn position(&self) -> Point {
        *self
    }
}

impl Coord for LngLat {
    fn position(&self) -> Point {
        Point::new(self.lng, self.lat)
    }
}

impl Coord for Vertex {
    fn position(&self) -> Point {
        self.screen
    }
}

// ─── Segments ────────────────────────────────────────────────────────────

/// An edge between two consecutive vertices of a ring or line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point,
    pub b: Point,
}

impl Segment {
    pub const fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    pub fn to_line(self) -> Line {
        Line::new(self.a, self.b)
    }

    /// Closest point on the segment to `p`, and its distance.
    ///
    /// Projects `p` onto the segment's supporting line and clamps the
    /// parameter to `[0, 1]`. A zero-length segment resolves to `a`.
    pub fn closest_point(&self, p: Point) -> (Point, f64) {
        let d = self.b - self.a;
        let len_sq = d.hypot2();
        let t = if len_sq == 0.0 {
            0.0
        } else {
            ((p - self.a).dot(d) / len_sq).clamp(0.0, 1.0)
        };
        let closest = self.a.lerp(self.b, t);
        (closest, closest.distance(p))
    }

    /// Exact endpoint equality in the given direction.
    pub fn matches(&self, a: Point, b: Point) -> bool {
        self.a == a && self.b == b
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// A linear ring: closed when its first and last coordinates are equal.
pub type Ring<C> = Vec<C>;

/// Editable geometry, encoded with the GeoJSON `"type"` tag.
///
/// `FeatureCollection` entries are expected to be `Feature`s but any
/// geometry is accepted and walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry<C> {
    Point {
        coordinates: C,
    },
    MultiPoint {
        coordinates: Vec<C>,
    },
    LineString {
        coordinates: Vec<C>,
    },
    MultiLineString {
        coordinates: Vec<Vec<C>>,
    },
    Polygon {
        coordinates: Vec<Ring<C>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Ring<C>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry<C>>,
    },
    Feature {
        geometry: Option<Box<Geometry<C>>>,
        #[serde(default)]
        properties: Value,
    },
    FeatureCollection {
        features: Vec<Geometry<C>>,
    },
}

impl<C> Geometry<C> {
    pub fn point(coordinates: C) -> Self {
        Self::Point { coordinates }
    }

    pub fn line_string(coordinates: Vec<C>) -> Self {
        Self::LineString { coordinates }
    }

    pub fn polygon(rings: Vec<Ring<C>>) -> Self {
        Self::Polygon { coordinates: rings }
    }

    pub fn feature(geometry: Geometry<C>, properties: Value) -> Self {
        Self::Feature {
            geometry: Some(Box::new(geometry)),
            properties,
        }
    }

    /// GeoJSON type name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::MultiPoint { .. } => "MultiPoint",
            Self::LineString { .. } => "LineString",
            Self::MultiLineString { .. } => "MultiLineString",
            Self::Polygon { .. } => "Polygon",
            Self::MultiPolygon { .. } => "MultiPolygon",
            Self::GeometryCollection { .. } => "GeometryCollection",
            Self::Feature { .. } => "Feature",
            Self::FeatureCollection { .. } => "FeatureCollection",
        }
    }

    /// Whether this geometry has an area (Polygon/MultiPolygon, possibly
    /// wrapped in a Feature). Only area geometries are culled by the
    /// viewport; everything else is always redrawn.
    pub fn is_poly_like(&self) -> bool {
        match self {
            Self::Polygon { .. } | Self::MultiPolygon { .. } => true,
            Self::Feature {
                geometry: Some(g), ..
            } => g.is_poly_like(),
            _ => false,
        }
    }

    /// Every polygon (as its ring list) reachable from this geometry.
    pub fn polygons(&self) -> Vec<&[Ring<C>]> {
        let mut out = Vec::new();
        self.collect_polygons(&mut out);
        out
    }

    fn collect_polygons<'a>(&'a self, out: &mut Vec<&'a [Ring<C>]>) {
        match self {
            Self::Polygon { coordinates } => out.push(coordinates),
            Self::MultiPolygon { coordinates } => {
                out.extend(coordinates.iter().map(|p| p.as_slice()));
            }
            Self::Feature {
                geometry: Some(g), ..
            } => g.collect_polygons(out),
            Self::FeatureCollection { features: items }
            | Self::GeometryCollection { geometries: items } => {
                for g in items {
                    g.collect_polygons(out);
                }
            }
            Self::Feature { geometry: None, .. }
            | Self::Point { .. }
            | Self::MultiPoint { .. }
            | Self::LineString { .. }
            | Self::MultiLineString { .. } => {}
        }
    }
}

impl<C: Coord> Geometry<C> {
    /// Visit every coordinate in document order.
    pub fn for_each_coord(&self, f: &mut impl FnMut(&C)) {
        match self {
            Self::Point { coordinates } => f(coordinates),
            Self::MultiPoint { coordinates } | Self::LineString { coordinates } => {
                coordinates.iter().for_each(f)
            }
            Self::MultiLineString { coordinates } | Self::Polygon { coordinates } => {
                coordinates.iter().flatten().for_each(f)
            }
            Self::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(f)
            }
            Self::GeometryCollection { geometries: items }
            | Self::FeatureCollection { features: items } => {
                for g in items {
                    g.for_each_coord(f);
                }
            }
            Self::Feature { geometry, .. } => {
                if let Some(g) = geometry {
                    g.for_each_coord(f);
                }
            }
        }
    }

    /// Axis-aligned bounding box over all coordinates, `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        let mut bbox: Option<Rect> = None;
        self.for_each_coord(&mut |c| {
            let p = c.position();
            bbox = Some(match bbox {
                Some(r) => r.union_pt(p),
                None => Rect::from_points(p, p),
            });
        });
        bbox
    }

    pub fn coord_count(&self) -> usize {
        let mut n = 0;
        self.for_each_coord(&mut |_| n += 1);
        n
    }
}
