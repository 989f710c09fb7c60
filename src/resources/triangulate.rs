//! Polygon triangulation for glyph caps.
//!
//! Holes are first bridged into their outer contour, turning the shape into a
//! single (weakly simple) polygon, which is then ear-clipped. Glyph outlines
//! are a few hundred points at most, so the quadratic ear search is fine.

use cgmath::Point2;

pub type Point = Point2<f32>;

/// Signed area (shoelace formula). Positive for counter-clockwise contours.
pub fn signed_area(contour: &[Point]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        / 2.0
}

/// Even-odd point-in-polygon test.
pub fn contains(contour: &[Point], p: Point) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn cross(o: Point, a: Point, b: Point) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q1, q2, p1);
    let d2 = cross(q1, q2, p2);
    let d3 = cross(p1, p2, q1);
    let d4 = cross(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

fn ring_edges(ring: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

/// Triangulate `outer` minus `holes`.
///
/// Returned indices address the concatenation `outer ++ holes[0] ++ holes[1] ...`.
/// Triangles wind counter-clockwise regardless of the input orientation.
pub fn triangulate_shape(outer: &[Point], holes: &[Vec<Point>]) -> Vec<[usize; 3]> {
    let mut points: Vec<Point> = outer.to_vec();
    let mut ring: Vec<usize> = (0..outer.len()).collect();
    if signed_area(outer) < 0.0 {
        ring.reverse();
    }

    let mut hole_rings: Vec<Vec<usize>> = holes
        .iter()
        .map(|hole| {
            let start = points.len();
            points.extend_from_slice(hole);
            let mut hole_ring: Vec<usize> = (start..points.len()).collect();
            if signed_area(hole) > 0.0 {
                hole_ring.reverse();
            }
            hole_ring
        })
        .filter(|hole_ring| hole_ring.len() >= 3)
        .collect();

    // Rightmost holes first, so later bridges never have to cross earlier ones.
    let max_x = |r: &Vec<usize>| r.iter().map(|&i| points[i].x).fold(f32::MIN, f32::max);
    hole_rings.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));

    for h in 0..hole_rings.len() {
        let hole_ring = &hole_rings[h];
        let m_pos = (0..hole_ring.len())
            .max_by(|&a, &b| points[hole_ring[a]].x.total_cmp(&points[hole_ring[b]].x))
            .unwrap_or(0);
        let m = hole_ring[m_pos];

        let visible = |j: usize| {
            let (pm, pj) = (points[m], points[j]);
            if pm == pj {
                return false;
            }
            let blocked = ring_edges(&ring)
                .chain(hole_rings[h..].iter().flat_map(|r| ring_edges(r)))
                .filter(|&(a, b)| a != j && b != j && a != m && b != m)
                .any(|(a, b)| segments_cross(pm, pj, points[a], points[b]));
            if blocked {
                return false;
            }
            let mid = Point::new((pm.x + pj.x) / 2.0, (pm.y + pj.y) / 2.0);
            contains(outer, mid) && !holes.iter().any(|hole| contains(hole, mid))
        };

        let dist2 = |j: usize| {
            let (dx, dy) = (points[j].x - points[m].x, points[j].y - points[m].y);
            dx * dx + dy * dy
        };
        let bridge = (0..ring.len())
            .filter(|&k| visible(ring[k]))
            .min_by(|&a, &b| dist2(ring[a]).total_cmp(&dist2(ring[b])))
            // no clean bridge: fall back to the nearest vertex
            .or_else(|| {
                log::debug!("hole {h} has no visible bridge vertex");
                (0..ring.len()).min_by(|&a, &b| dist2(ring[a]).total_cmp(&dist2(ring[b])))
            });
        let Some(k) = bridge else {
            continue;
        };

        let j = ring[k];
        let mut spliced: Vec<usize> = Vec::with_capacity(ring.len() + hole_ring.len() + 2);
        spliced.extend_from_slice(&ring[..=k]);
        spliced.extend(hole_ring[m_pos..].iter().chain(hole_ring[..m_pos].iter()));
        spliced.push(m);
        spliced.push(j);
        spliced.extend_from_slice(&ring[k + 1..]);
        ring = spliced;
    }

    ear_clip(&points, ring)
}

fn in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    cross(a, b, p) >= 0.0 && cross(b, c, p) >= 0.0 && cross(c, a, p) >= 0.0
}

fn ear_clip(points: &[Point], mut ring: Vec<usize>) -> Vec<[usize; 3]> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;

    while ring.len() > 3 {
        let n = ring.len();
        i %= n;
        let (ia, ib, ic) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
        let (a, b, c) = (points[ia], points[ib], points[ic]);
        let turn = cross(a, b, c);

        if turn.abs() <= f32::EPSILON * 16.0 {
            // collinear or folded back: zero-area, drop it
            ring.remove(i);
            misses = 0;
            continue;
        }

        let is_ear = turn > 0.0
            && !ring.iter().any(|&ip| {
                let p = points[ip];
                ip != ia
                    && ip != ib
                    && ip != ic
                    && p != a
                    && p != b
                    && p != c
                    && in_triangle(p, a, b, c)
            });

        if is_ear || misses > n {
            if !is_ear {
                log::debug!("no ear found among {n} vertices, clipping anyway");
            }
            triangles.push([ia, ib, ic]);
            ring.remove(i);
            misses = 0;
        } else {
            i += 1;
            misses += 1;
        }
    }

    if let [a, b, c] = ring[..] {
        if cross(points[a], points[b], points[c]) > 0.0 {
            triangles.push([a, b, c]);
        }
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn square(x0: f32, y0: f32, size: f32) -> Vec<Point> {
        vec![
            p(x0, y0),
            p(x0 + size, y0),
            p(x0 + size, y0 + size),
            p(x0, y0 + size),
        ]
    }

    fn covered_area(points: &[Point], triangles: &[[usize; 3]]) -> f32 {
        triangles
            .iter()
            .map(|t| cross(points[t[0]], points[t[1]], points[t[2]]) / 2.0)
            .sum()
    }

    fn all_points(outer: &[Point], holes: &[Vec<Point>]) -> Vec<Point> {
        outer
            .iter()
            .chain(holes.iter().flatten())
            .copied()
            .collect()
    }

    #[test]
    fn signed_area_follows_orientation() {
        let mut sq = square(0.0, 0.0, 2.0);
        assert_eq!(signed_area(&sq), 4.0);
        sq.reverse();
        assert_eq!(signed_area(&sq), -4.0);
    }

    #[test]
    fn contains_points() {
        let sq = square(0.0, 0.0, 1.0);
        assert!(contains(&sq, p(0.5, 0.5)));
        assert!(!contains(&sq, p(1.5, 0.5)));
    }

    #[test]
    fn triangulates_a_square() {
        let sq = square(0.0, 0.0, 1.0);
        let tris = triangulate_shape(&sq, &[]);
        assert_eq!(tris.len(), 2);
        assert!((covered_area(&sq, &tris) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn clockwise_input_still_yields_counter_clockwise_triangles() {
        let mut sq = square(0.0, 0.0, 1.0);
        sq.reverse();
        let tris = triangulate_shape(&sq, &[]);
        for t in &tris {
            assert!(cross(sq[t[0]], sq[t[1]], sq[t[2]]) > 0.0);
        }
    }

    #[test]
    fn concave_z_outline_keeps_its_area() {
        // a blocky "Z"
        let z = vec![
            p(0.0, 0.0),
            p(5.0, 0.0),
            p(5.0, 1.0),
            p(1.5, 1.0),
            p(5.0, 4.0),
            p(5.0, 5.0),
            p(0.0, 5.0),
            p(0.0, 4.0),
            p(3.5, 4.0),
            p(0.0, 1.0),
        ];
        let tris = triangulate_shape(&z, &[]);
        assert_eq!(tris.len(), z.len() - 2);
        assert!((covered_area(&z, &tris) - signed_area(&z)).abs() < 1e-4);
    }

    #[test]
    fn square_with_hole() {
        let outer = square(0.0, 0.0, 4.0);
        let holes = vec![square(1.0, 1.0, 2.0)];
        let tris = triangulate_shape(&outer, &holes);
        let points = all_points(&outer, &holes);
        assert!((covered_area(&points, &tris) - 12.0).abs() < 1e-4);
        // n vertices + 2 per hole - 2
        assert_eq!(tris.len(), 8);
    }

    #[test]
    fn eight_with_two_holes() {
        let outer = vec![p(0.0, 0.0), p(3.0, 0.0), p(3.0, 7.0), p(0.0, 7.0)];
        let holes = vec![square(1.0, 1.0, 1.0), square(1.0, 4.0, 2.0)];
        let tris = triangulate_shape(&outer, &holes);
        let points = all_points(&outer, &holes);
        assert!((covered_area(&points, &tris) - (21.0 - 1.0 - 4.0)).abs() < 1e-4);
        for t in &tris {
            assert!(cross(points[t[0]], points[t[1]], points[t[2]]) > 0.0);
        }
    }
}
