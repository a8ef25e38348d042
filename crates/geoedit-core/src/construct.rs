//! Incremental shape construction for the add-shape gesture.
//!
//! Each click appends one coordinate and promotes the geometry:
//! Point → LineString → Polygon. The ring is closed only once three
//! vertices exist; later clicks are inserted before the closing coordinate.

use crate::model::Geometry;

/// The geometry after appending `next` to `current`.
///
/// Wrappers recurse into their contents. Kinds that cannot grow
/// (MultiPoint, MultiLineString, MultiPolygon) are returned unchanged.
pub fn next_geometry<C: Clone>(current: &Geometry<C>, next: C) -> Geometry<C> {
    match current {
        Geometry::Point { coordinates } => Geometry::LineString {
            coordinates: vec![coordinates.clone(), next],
        },
        Geometry::LineString { coordinates } => match coordinates.first() {
            Some(first) => {
                let mut ring = coordinates.clone();
                ring.push(next);
                ring.push(first.clone());
                Geometry::Polygon {
                    coordinates: vec![ring],
                }
            }
            None => Geometry::Point { coordinates: next },
        },
        Geometry::Polygon { coordinates } => {
            let mut rings = coordinates.clone();
            match rings.first_mut() {
                Some(outer) if !outer.is_empty() => {
                    let closing = outer.len() - 1;
                    outer.insert(closing, next);
                }
                Some(outer) => outer.push(next),
                None => rings.push(vec![next]),
            }
            Geometry::Polygon { coordinates: rings }
        }
        Geometry::Feature {
            geometry,
            properties,
        } => Geometry::Feature {
            geometry: geometry
                .as_deref()
                .map(|g| Box::new(next_geometry(g, next.clone()))),
            properties: properties.clone(),
        },
        Geometry::FeatureCollection { features } => Geometry::FeatureCollection {
            features: features
                .iter()
                .map(|g| next_geometry(g, next.clone()))
                .collect(),
        },
        Geometry::GeometryCollection { geometries } => Geometry::GeometryCollection {
            geometries: geometries
                .iter()
                .map(|g| next_geometry(g, next.clone()))
                .collect(),
        },
        Geometry::MultiPoint { .. }
        | Geometry::MultiLineString { .. }
        | Geometry::MultiPolygon { .. } => current.clone(),
    }
}
