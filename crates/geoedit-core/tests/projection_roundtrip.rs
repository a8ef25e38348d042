//! Integration tests: GeoJSON → canvas projection → back to geographic.
//!
//! Exercises decoding, the flattening walk, and the inverse projection
//! across every geometry kind in the fixture.

use geoedit_core::projection::{to_canvas, to_geographic};
use geoedit_core::{Coord, Geometry, LinearProjection, LngLat, Projection, Segment, parse_geometries};

fn fixture() -> Vec<Geometry<LngLat>> {
    parse_geometries(include_str!("fixtures/parcels.geojson")).unwrap()
}

fn projection() -> LinearProjection {
    LinearProjection::new(LngLat::new(5.015, 51.925), 60_000.0)
}

fn all_coords(geoms: &[Geometry<LngLat>]) -> Vec<LngLat> {
    let mut out = Vec::new();
    for g in geoms {
        g.for_each_coord(&mut |c| out.push(*c));
    }
    out
}

#[test]
fn every_coordinate_survives_the_round_trip() {
    let data = fixture();
    let proj = projection();
    let canvas = to_canvas(&data, &proj);
    let back = to_geographic(&canvas.data, &proj);

    let before = all_coords(&data);
    let after = all_coords(&back);
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert!((a.lng - b.lng).abs() < 1e-9, "lng drifted: {a:?} vs {b:?}");
        assert!((a.lat - b.lat).abs() < 1e-9, "lat drifted: {a:?} vs {b:?}");
    }
}

#[test]
fn recomputed_geo_matches_inverse_projection() {
    let data = fixture();
    let proj = projection();
    let canvas = to_canvas(&data, &proj);
    for g in &canvas.data {
        g.for_each_coord(&mut |v| {
            let geo = v.geo.expect("projected vertices carry their geographic half");
            let inv = proj.to_geo(v.screen);
            assert!((inv.lng - geo.lng).abs() < 1e-9);
            assert!((inv.lat - geo.lat).abs() < 1e-9);
        });
    }
}

#[test]
fn flattening_covers_every_vertex_and_edge() {
    let data = fixture();
    let canvas = to_canvas(&data, &projection());

    // 5 + 4 outer/hole, 5 + 4 multipolygon, 2 line, 1 point
    assert_eq!(canvas.coordinates.len(), 21);
    // 4 + 3, 4 + 3, 1; points add no edges
    assert_eq!(canvas.lines.len(), 15);
    assert_eq!(canvas.bounds.len(), 3);

    let first = canvas.data[0].polygons()[0][0][0].position();
    let second = canvas.data[0].polygons()[0][0][1].position();
    assert_eq!(canvas.coordinates[0], first);
    assert_eq!(canvas.lines[0], Segment::new(first, second));
}

#[test]
fn structure_and_properties_are_preserved() {
    let data = fixture();
    let canvas = to_canvas(&data, &projection());
    for (a, b) in data.iter().zip(&canvas.data) {
        assert_eq!(a.kind(), b.kind());
    }
    match &canvas.data[0] {
        Geometry::Feature { properties, .. } => {
            assert_eq!(properties["name"], "north field");
        }
        other => panic!("expected Feature, got {}", other.kind()),
    }
}
