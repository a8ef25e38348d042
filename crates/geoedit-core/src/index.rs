//! Static spatial indexes.
//!
//! Both indexes are bulk-loaded and immutable: every geometry mutation
//! rebuilds them from scratch, which keeps them trivially consistent with
//! the state they were built from.
//!
//! - [`PointIndex`]: k-d tree over vertex positions for radius queries.
//! - [`BoxIndex`]: packed R-tree (sort-tile-recursive) over bounding boxes.

use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// Leaf size below which the k-d tree falls back to a linear scan.
const KD_NODE_SIZE: usize = 64;

/// Fan-out of every R-tree node.
const RTREE_NODE_CAPACITY: usize = 16;

// ─── Point index ─────────────────────────────────────────────────────────

/// Hits from a radius query: indexes into the source point list.
pub type PointHits = SmallVec<[usize; 8]>;

/// Immutable k-d tree over a point list.
#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    points: Vec<Point>,
    /// Point ids arranged in k-d order (alternating x/y medians).
    ids: Vec<usize>,
}

impl PointIndex {
    pub fn new(points: &[Point]) -> Self {
        let mut ids: Vec<usize> = (0..points.len()).collect();
        if !ids.is_empty() {
            let right = ids.len() - 1;
            sort_kd(&mut ids, points, 0, right, 0);
        }
        Self {
            points: points.to_vec(),
            ids,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, id: usize) -> Option<Point> {
        self.points.get(id).copied()
    }

    /// All points within Euclidean `radius` of `center` (inclusive),
    /// nearest first. Ties keep source order.
    pub fn within(&self, center: Point, radius: f64) -> PointHits {
        let mut hits = PointHits::new();
        if self.ids.is_empty() {
            return hits;
        }

        let r2 = radius * radius;
        let inside = |id: usize| self.points[id].distance_squared(center) <= r2;
        let mut stack: SmallVec<[(usize, usize, usize); 32]> = SmallVec::new();
        stack.push((0, self.ids.len() - 1, 0));

        while let Some((left, right, axis)) = stack.pop() {
            if right - left <= KD_NODE_SIZE {
                hits.extend(self.ids[left..=right].iter().copied().filter(|&id| inside(id)));
                continue;
            }

            let m = (left + right) / 2;
            let id = self.ids[m];
            if inside(id) {
                hits.push(id);
            }

            let p = self.points[id];
            let (c, split) = if axis == 0 { (center.x, p.x) } else { (center.y, p.y) };
            if c - radius <= split {
                stack.push((left, m - 1, 1 - axis));
            }
            if c + radius >= split {
                stack.push((m + 1, right, 1 - axis));
            }
        }

        hits.sort_by(|&a, &b| {
            let da = self.points[a].distance_squared(center);
            let db = self.points[b].distance_squared(center);
            da.total_cmp(&db).then(a.cmp(&b))
        });
        hits
    }
}

fn axis_value(p: Point, axis: usize) -> f64 {
    if axis == 0 { p.x } else { p.y }
}

fn sort_kd(ids: &mut [usize], points: &[Point], left: usize, right: usize, axis: usize) {
    if right - left <= KD_NODE_SIZE {
        return;
    }
    let m = (left + right) / 2;
    ids[left..=right].select_nth_unstable_by(m - left, |&a, &b| {
        axis_value(points[a], axis).total_cmp(&axis_value(points[b], axis))
    });
    sort_kd(ids, points, left, m - 1, 1 - axis);
    sort_kd(ids, points, m + 1, right, 1 - axis);
}

// ─── Box index ───────────────────────────────────────────────────────────

/// Inclusive rectangle overlap (touching edges count).
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Immutable packed R-tree keyed by bounding box.
#[derive(Debug, Clone)]
pub struct BoxIndex<T> {
    /// Leaf entries in tile order.
    entries: Vec<(Rect, T)>,
    /// Node boxes per level; `levels[0]` groups `entries`, the last level
    /// holds the root.
    levels: Vec<Vec<Rect>>,
}

impl<T> Default for BoxIndex<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            levels: Vec::new(),
        }
    }
}

impl<T> BoxIndex<T> {
    pub fn new(mut entries: Vec<(Rect, T)>) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let leaf_nodes = entries.len().div_ceil(RTREE_NODE_CAPACITY);
        let slices = (leaf_nodes as f64).sqrt().ceil() as usize;
        let slice_len = slices.max(1) * RTREE_NODE_CAPACITY;

        entries.sort_by(|a, b| a.0.center().x.total_cmp(&b.0.center().x));
        for slice in entries.chunks_mut(slice_len) {
            slice.sort_by(|a, b| a.0.center().y.total_cmp(&b.0.center().y));
        }

        let mut levels = vec![group(entries.iter().map(|(r, _)| *r))];
        while levels.last().is_some_and(|l| l.len() > 1) {
            let next = group(levels[levels.len() - 1].iter().copied());
            levels.push(next);
        }

        Self { entries, levels }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every payload whose box overlaps `query`, in tree order.
    pub fn search(&self, query: Rect) -> Vec<&T> {
        let mut out = Vec::new();
        let Some(top) = self.levels.len().checked_sub(1) else {
            return out;
        };

        let mut stack: SmallVec<[(usize, usize); 32]> = SmallVec::new();
        for (i, r) in self.levels[top].iter().enumerate() {
            if rects_overlap(*r, query) {
                stack.push((top, i));
            }
        }

        while let Some((level, node)) = stack.pop() {
            let start = node * RTREE_NODE_CAPACITY;
            if level == 0 {
                let end = (start + RTREE_NODE_CAPACITY).min(self.entries.len());
                out.extend(
                    self.entries[start..end]
                        .iter()
                        .filter(|(r, _)| rects_overlap(*r, query))
                        .map(|(_, item)| item),
                );
            } else {
                let below = &self.levels[level - 1];
                let end = (start + RTREE_NODE_CAPACITY).min(below.len());
                for (i, r) in below[start..end].iter().enumerate() {
                    if rects_overlap(*r, query) {
                        stack.push((level - 1, start + i));
                    }
                }
            }
        }
        out
    }
}

fn group(rects: impl Iterator<Item = Rect>) -> Vec<Rect> {
    let rects: Vec<Rect> = rects.collect();
    rects
        .chunks(RTREE_NODE_CAPACITY)
        .map(|chunk| chunk.iter().skip(1).fold(chunk[0], |acc, r| acc.union(*r)))
        .collect()
}

// ─── Paired indexes ──────────────────────────────────────────────────────

/// The two indexes the editor keeps in lockstep with its geometry.
#[derive(Debug, Clone, Default)]
pub struct Indexes {
    /// Over the flat vertex list, positionally aligned with it.
    pub points: PointIndex,
    /// Over top-level geometry bounding boxes; payload is the geometry index.
    pub boxes: BoxIndex<usize>,
}

impl Indexes {
    /// Bulk-load both indexes. `bounds[i]` is the box of geometry `i`;
    /// geometries without coordinates are left out of the box index.
    pub fn build(coordinates: &[Point], bounds: &[Option<Rect>]) -> Self {
        let boxes = bounds
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.map(|r| (r, i)))
            .collect();
        log::trace!(
            "rebuilding indexes: {} points, {} boxes",
            coordinates.len(),
            bounds.len()
        );
        Self {
            points: PointIndex::new(coordinates),
            boxes: BoxIndex::new(boxes),
        }
    }

    /// Geometry indexes whose box overlaps `query`, ascending.
    pub fn geometries_in(&self, query: Rect) -> SmallVec<[usize; 16]> {
        let mut hits: SmallVec<[usize; 16]> = self.boxes.search(query).into_iter().copied().collect();
        hits.sort_unstable();
        hits
    }
}
