use super::Point2;

/// Returns the minimum distance from point `(px, py)` to the line segment
/// from `(ax, ay)` to `(bx, by)`.
#[must_use]
pub fn point_to_segment_dist(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((px - ax) * dx + (py - ay) * dy) / len_sq;
    let t = t.clamp(0.0, 1.0);

    let closest_x = ax + t * dx;
    let closest_y = ay + t * dy;

    ((px - closest_x).powi(2) + (py - closest_y).powi(2)).sqrt()
}

/// Bucket grid over the edges of a set of closed rings for bounded
/// nearest-edge queries.
///
/// Only edges in cells overlapping the query disc are visited, so a query
/// costs the number of nearby edges instead of all of them.
#[derive(Debug)]
pub struct SegmentIndex {
    segments: Vec<(Point2, Point2)>,
    origin: Point2,
    cell: f64,
    nx: usize,
    ny: usize,
    buckets: Vec<Vec<usize>>,
}

impl SegmentIndex {
    /// Indexes every edge of every ring with square cells of side `cell`.
    #[must_use]
    pub fn new<'a>(rings: impl IntoIterator<Item = &'a [Point2]>, cell: f64) -> Self {
        let mut segments = Vec::new();
        for ring in rings {
            let n = ring.len();
            segments.extend((0..n).map(|i| (ring[i], ring[(i + 1) % n])));
        }
        let (mut min, mut max) = (
            Point2::new(f64::INFINITY, f64::INFINITY),
            Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for (a, b) in &segments {
            min = min.inf(&a.inf(b));
            max = max.sup(&a.sup(b));
        }
        if segments.is_empty() {
            min = Point2::origin();
            max = Point2::origin();
        }
        let cell = if cell.is_finite() && cell > 0.0 { cell } else { 1.0 };
        let mut index = Self {
            segments: Vec::new(),
            origin: min,
            cell,
            nx: cell_count(max.x - min.x, cell),
            ny: cell_count(max.y - min.y, cell),
            buckets: Vec::new(),
        };
        index.buckets = vec![Vec::new(); index.nx * index.ny];
        for (k, (a, b)) in segments.iter().enumerate() {
            let (i0, j0) = index.cell_of(&a.inf(b));
            let (i1, j1) = index.cell_of(&a.sup(b));
            for j in j0..=j1 {
                for i in i0..=i1 {
                    index.buckets[j * index.nx + i].push(k);
                }
            }
        }
        index.segments = segments;
        index
    }

    /// Distance from `p` to the nearest indexed edge, capped at `radius`.
    #[must_use]
    pub fn distance_within(&self, p: &Point2, radius: f64) -> f64 {
        let (i0, j0) = self.cell_of(&Point2::new(p.x - radius, p.y - radius));
        let (i1, j1) = self.cell_of(&Point2::new(p.x + radius, p.y + radius));
        let mut best = radius;
        for j in j0..=j1 {
            for i in i0..=i1 {
                for &k in &self.buckets[j * self.nx + i] {
                    let (a, b) = self.segments[k];
                    best = best.min(point_to_segment_dist(p.x, p.y, a.x, a.y, b.x, b.y));
                }
            }
        }
        best
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn cell_of(&self, p: &Point2) -> (usize, usize) {
        let clamp = |v: f64, n: usize| (v.max(0.0) as usize).min(n - 1);
        (
            clamp(((p.x - self.origin.x) / self.cell).floor(), self.nx),
            clamp(((p.y - self.origin.y) / self.cell).floor(), self.ny),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_count(extent: f64, cell: f64) -> usize {
    ((extent / cell).floor() as usize).saturating_add(1)
}
