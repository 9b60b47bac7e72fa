//! Geometry primitives backing the board hit tests
//!
//! Points come in as integer coordinates; the arithmetic is done in `f64`
//! to keep products of nanometre values from overflowing.

use super::types::{Point, Polygon, Rect};

fn to_f(p: Point) -> [f64; 2] {
    [p.x as f64, p.y as f64]
}

/// Point-to-segment minimum distance
pub fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let ab_len2 = ab[0] * ab[0] + ab[1] * ab[1];

    if ab_len2 < 1e-10 {
        // Degenerate segment
        return ((p[0] - a[0]).powi(2) + (p[1] - a[1]).powi(2)).sqrt();
    }

    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / ab_len2).clamp(0.0, 1.0);
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1]];
    ((p[0] - closest[0]).powi(2) + (p[1] - closest[1]).powi(2)).sqrt()
}

/// Even-odd containment test against a closed ring
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let [px, py] = to_f(p);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let [xi, yi] = to_f(ring[i]);
        let [xj, yj] = to_f(ring[j]);
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Inside the outer ring and outside every hole
pub fn point_in_polygon(p: Point, polygon: &Polygon) -> bool {
    point_in_ring(p, &polygon.outer_ring) && !polygon.holes.iter().any(|h| point_in_ring(p, h))
}

fn ring_edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// True when `p` lies within `accuracy` of any edge of the outline or its holes
pub fn point_near_outline(p: Point, polygon: &Polygon, accuracy: f64) -> bool {
    let pf = to_f(p);
    std::iter::once(&polygon.outer_ring)
        .chain(polygon.holes.iter())
        .filter(|ring| ring.len() >= 2)
        .flat_map(|ring| ring_edges(ring))
        .any(|(a, b)| point_segment_distance(pf, to_f(a), to_f(b)) <= accuracy)
}

/// Segment vs closed rectangle (Liang-Barsky clip)
pub fn segment_intersects_rect(a: Point, b: Point, rect: &Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }
    let [x0, y0] = to_f(a);
    let [x1, y1] = to_f(b);
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (xmin, ymin) = (rect.origin.x as f64, rect.origin.y as f64);
    let (xmax, ymax) = (rect.right() as f64, rect.bottom() as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x0 - xmin), (dx, xmax - x0), (-dy, y0 - ymin), (dy, ymax - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return false;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return false;
            }
            t1 = t1.min(r);
        }
    }
    t0 <= t1
}

/// Minimum distance between a segment and a closed rectangle (0 when they touch)
pub fn segment_rect_distance(a: Point, b: Point, rect: &Rect) -> f64 {
    if segment_intersects_rect(a, b, rect) {
        return 0.0;
    }
    let corners = [
        rect.origin,
        Point::new(rect.right(), rect.origin.y),
        Point::new(rect.right(), rect.bottom()),
        Point::new(rect.origin.x, rect.bottom()),
    ];
    let mut best = f64::MAX;
    for (c0, c1) in ring_edges(&corners) {
        best = best.min(point_segment_distance(to_f(a), to_f(c0), to_f(c1)));
        best = best.min(point_segment_distance(to_f(b), to_f(c0), to_f(c1)));
    }
    for c in corners {
        best = best.min(point_segment_distance(to_f(c), to_f(a), to_f(b)));
    }
    best
}
