use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the axis-aligned bounds `(min, max)` of a point set.
///
/// An empty slice yields an inverted box (`min > max`).
#[must_use]
pub fn bounds_2d(points: &[Point2]) -> (Point2, Point2) {
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Even-odd point-in-polygon test.
///
/// Points exactly on the boundary may be classified either way.
#[must_use]
pub fn point_in_ring(p: &Point2, ring: &[Point2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Collects, in ascending order, the x positions where the horizontal line
/// at `y` crosses the edges of the given closed rings.
///
/// Uses the same half-open rule as [`point_in_ring`], so a point `(x, y)` is
/// inside the even-odd region exactly when an odd number of crossings lie
/// strictly right of `x` (see [`inside_by_crossings`]).
pub fn scanline_crossings<'a>(rings: impl IntoIterator<Item = &'a [Point2]>, y: f64, out: &mut Vec<f64>) {
    out.clear();
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (&ring[i], &ring[j]);
            if (a.y > y) != (b.y > y) {
                out.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
            j = i;
        }
    }
    out.sort_by(f64::total_cmp);
}

/// Even-odd test against crossings from [`scanline_crossings`].
#[must_use]
pub fn inside_by_crossings(crossings: &[f64], x: f64) -> bool {
    let right = crossings.len() - crossings.partition_point(|&c| c <= x);
    right % 2 == 1
}

/// Rotates a closed polygon so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Removes consecutive points closer than `tolerance`, including the
/// wrap-around pair of a closed ring.
#[must_use]
pub fn dedup_closed(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let tol_sq = tolerance * tolerance;
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for &p in points {
        if out.last().is_some_and(|q| (p - q).norm_squared() <= tol_sq) {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if (first - last).norm_squared() <= tol_sq {
            out.pop();
        } else {
            break;
        }
    }
    out
}

/// Drops vertices of a closed ring that lie on the straight line through
/// their neighbours (cross product below `tolerance`).
///
/// Marching squares emits long straight runs along pixel rows; merging them
/// shrinks the input of the triangulator without moving the boundary.
#[must_use]
pub fn merge_collinear_closed(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out = points.to_vec();
    loop {
        let n = out.len();
        if n <= 3 {
            return out;
        }
        let keep: Vec<bool> = (0..n)
            .map(|i| {
                let prev = out[(i + n - 1) % n];
                let curr = out[i];
                let next = out[(i + 1) % n];
                let d1 = curr - prev;
                let d2 = next - curr;
                let cross = d1.x * d2.y - d1.y * d2.x;
                cross.abs() > tolerance || d1.dot(&d2) < 0.0
            })
            .collect();
        if keep.iter().all(|&k| k) {
            return out;
        }
        // Remove every other candidate per pass so neighbours are re-tested.
        let mut removed_prev = false;
        let mut next_out = Vec::with_capacity(n);
        for (i, &p) in out.iter().enumerate() {
            if !keep[i] && !removed_prev {
                removed_prev = true;
                continue;
            }
            removed_prev = false;
            next_out.push(p);
        }
        if next_out.len() < 3 {
            return out;
        }
        out = next_out;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn signed_area_ccw_square() {
        let area = signed_area_2d(&square(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_cw_square() {
        let mut pts = square(0.0, 0.0, 1.0);
        pts.reverse();
        assert!((signed_area_2d(&pts) + 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn signed_area_degenerate() {
        assert!(signed_area_2d(&[Point2::new(0.0, 0.0)]).abs() < TOLERANCE);
        assert!(signed_area_2d(&[]).abs() < TOLERANCE);
    }

    #[test]
    fn point_in_ring_inside_and_outside() {
        let sq = square(0.0, 0.0, 2.0);
        assert!(point_in_ring(&Point2::new(1.0, 1.0), &sq));
        assert!(!point_in_ring(&Point2::new(3.0, 1.0), &sq));
        assert!(!point_in_ring(&Point2::new(1.0, -0.5), &sq));
    }

    #[test]
    fn point_in_concave_ring() {
        // U shape: the notch is outside.
        let u = vec![
            Point2::new(0.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 3.0),
            Point2::new(2.0, 3.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 3.0),
            Point2::new(0.0, 3.0),
        ];
        assert!(!point_in_ring(&Point2::new(1.5, 2.0), &u));
        assert!(point_in_ring(&Point2::new(0.5, 2.0), &u));
        assert!(point_in_ring(&Point2::new(1.5, 0.5), &u));
    }

    #[test]
    fn bounds_of_square() {
        let (min, max) = bounds_2d(&square(-1.0, 2.0, 3.0));
        assert!((min.x + 1.0).abs() < TOLERANCE);
        assert!((min.y - 2.0).abs() < TOLERANCE);
        assert!((max.x - 2.0).abs() < TOLERANCE);
        assert!((max.y - 5.0).abs() < TOLERANCE);
    }

    #[test]
    fn canonical_start_rotation() {
        let pts = vec![
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let rotated = rotate_to_canonical_start(&pts);
        assert!(rotated[0].x.abs() < TOLERANCE);
        assert!(rotated[0].y.abs() < TOLERANCE);
        assert_eq!(rotated.len(), 4);
    }

    #[test]
    fn dedup_removes_wraparound_duplicate() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        let out = dedup_closed(&pts, 1e-9);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn merge_collinear_keeps_corners() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
            Point2::new(3.0, 1.5),
            Point2::new(3.0, 3.0),
            Point2::new(0.0, 3.0),
            Point2::new(0.0, 1.0),
        ];
        let out = merge_collinear_closed(&pts, 1e-9);
        assert_eq!(out.len(), 4);
        assert!((signed_area_2d(&out) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn scanline_agrees_with_point_in_ring() {
        let outer = square(0.0, 0.0, 10.0);
        let mut hole = square(3.0, 3.0, 4.0);
        hole.reverse();
        let mut crossings = Vec::new();
        for row in 0..20_i32 {
            let y = f64::from(row) * 0.55 - 0.3;
            scanline_crossings([outer.as_slice(), hole.as_slice()], y, &mut crossings);
            for col in 0..25_i32 {
                let p = Point2::new(f64::from(col) * 0.45 - 0.7, y);
                let expected = point_in_ring(&p, &outer) && !point_in_ring(&p, &hole);
                assert_eq!(inside_by_crossings(&crossings, p.x), expected, "at {p:?}");
            }
        }
    }
}
