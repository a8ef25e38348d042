//! Hit testing: point → geometry lookup.
//!
//! A point hits a polygon when it is inside the outer ring and outside
//! every hole. Rings are tested with an even-odd ray cast, so winding order
//! does not matter and an unclosed ring is treated as implicitly closed.

use crate::index::Indexes;
use crate::model::{Coord, Geometry, Ring};
use kurbo::{Point, Rect};

/// Even-odd containment test for a single ring.
/// Rings with fewer than three coordinates contain nothing.
pub fn ring_contains<C: Coord>(ring: &[C], p: Point) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i].position();
        let b = ring[j].position();
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the first ring and not inside any later ring.
pub fn polygon_contains<C: Coord>(rings: &[Ring<C>], p: Point) -> bool {
    match rings.split_first() {
        Some((outer, holes)) => {
            ring_contains(outer, p) && !holes.iter().any(|h| ring_contains(h, p))
        }
        None => false,
    }
}

/// Whether any polygon reachable from `geom` contains `p`.
pub fn geometry_contains<C: Coord>(geom: &Geometry<C>, p: Point) -> bool {
    geom.polygons().iter().any(|rings| polygon_contains(rings, p))
}

/// First geometry (in collection order) containing `p`.
///
/// The box index narrows the candidates; the winner is still the lowest
/// index, exactly as a front-to-back linear scan would find it.
pub fn hit_test<C: Coord>(data: &[Geometry<C>], indexes: &Indexes, p: Point) -> Option<usize> {
    indexes
        .geometries_in(Rect::from_points(p, p))
        .into_iter()
        .find(|&i| data.get(i).is_some_and(|g| geometry_contains(g, p)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::flatten;

    fn ring(points: &[(f64, f64)]) -> Vec<Point> {
        points.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn square(x: f64, y: f64, size: f64) -> Vec<Point> {
        ring(&[(x, y), (x, y + size), (x + size, y + size), (x + size, y), (x, y)])
    }

    #[test]
    fn hole_is_not_inside() {
        let rings = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
        assert!(polygon_contains(&rings, Point::new(1.0, 1.0)));
        assert!(!polygon_contains(&rings, Point::new(5.0, 5.0)));
        assert!(!polygon_contains(&rings, Point::new(11.0, 5.0)));
    }

    #[test]
    fn degenerate_ring_contains_nothing() {
        assert!(!ring_contains(&ring(&[(0.0, 0.0), (5.0, 5.0)]), Point::new(1.0, 1.0)));
        assert!(!polygon_contains::<Point>(&[], Point::ZERO));
    }

    #[test]
    fn unclosed_ring_is_implicitly_closed() {
        let open = ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]);
        assert!(ring_contains(&open, Point::new(5.0, 5.0)));
    }

    #[test]
    fn first_match_wins_for_overlaps() {
        let data = vec![
            Geometry::polygon(vec![square(20.0, 20.0, 5.0)]),
            Geometry::polygon(vec![square(0.0, 0.0, 10.0)]),
            Geometry::polygon(vec![square(2.0, 2.0, 10.0)]),
        ];
        let flat = flatten(&data);
        let idx = Indexes::build(&flat.coordinates, &flat.bounds);
        assert_eq!(hit_test(&data, &idx, Point::new(5.0, 5.0)), Some(1));
        assert_eq!(hit_test(&data, &idx, Point::new(11.0, 11.0)), Some(2));
        assert_eq!(hit_test(&data, &idx, Point::new(50.0, 50.0)), None);
    }

    #[test]
    fn lines_and_points_are_never_hit() {
        let data = vec![
            Geometry::line_string(square(0.0, 0.0, 10.0)),
            Geometry::point(Point::new(5.0, 5.0)),
        ];
        let flat = flatten(&data);
        let idx = Indexes::build(&flat.coordinates, &flat.bounds);
        assert_eq!(hit_test(&data, &idx, Point::new(5.0, 5.0)), None);
    }
}
