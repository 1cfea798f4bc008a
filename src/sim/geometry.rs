//! Shape geometry and exact intersection tests
//!
//! Every shape is a closed region: circles, axis-aligned rectangles and
//! triangles. Polygon pairs use the separating axis test, circle/polygon pairs
//! use closest-point-on-edge distance, so triangles are never approximated by
//! their bounding boxes.

use glam::DVec2;

/// Axis-aligned rectangle (min corner inclusive, max corner inclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Rectangle from its top-left corner and extent
    pub fn from_origin_size(origin: DVec2, size: DVec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    /// Length of the diagonal
    #[inline]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }

    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Intersection with positive area, `None` if the rectangles only touch or are apart
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.x < max.x && min.y < max.y {
            Some(Rect { min, max })
        } else {
            None
        }
    }
}

/// Concrete geometry of an entity at its current position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { center: DVec2, radius: f64 },
    Rect(Rect),
    /// Vertices in drawing order: apex, bottom-right, bottom-left
    Triangle([DVec2; 3]),
}

impl Shape {
    /// Tight axis-aligned bounds
    pub fn bounds(&self) -> Rect {
        match *self {
            Shape::Circle { center, radius } => Rect {
                min: center - DVec2::splat(radius),
                max: center + DVec2::splat(radius),
            },
            Shape::Rect(rect) => rect,
            Shape::Triangle([a, b, c]) => Rect {
                min: a.min(b).min(c),
                max: a.max(b).max(c),
            },
        }
    }

    /// Point-in-shape test (boundary counts as inside)
    pub fn contains(&self, p: DVec2) -> bool {
        match *self {
            Shape::Circle { center, radius } => center.distance_squared(p) <= radius * radius,
            Shape::Rect(rect) => rect.contains(p),
            Shape::Triangle(ref vertices) => convex_contains(vertices, p),
        }
    }

    /// Whether the two closed regions share at least one point
    pub fn intersects(&self, other: &Shape) -> bool {
        match (self, other) {
            (
                Shape::Circle { center: c1, radius: r1 },
                Shape::Circle { center: c2, radius: r2 },
            ) => {
                let reach = r1 + r2;
                c1.distance_squared(*c2) <= reach * reach
            }
            (Shape::Circle { center, radius }, poly) | (poly, Shape::Circle { center, radius }) => {
                let (buf, n) = poly.polygon();
                circle_polygon_intersect(*center, *radius, &buf[..n])
            }
            (a, b) => {
                let (buf_a, na) = a.polygon();
                let (buf_b, nb) = b.polygon();
                polygons_intersect(&buf_a[..na], &buf_b[..nb])
            }
        }
    }

    /// Vertices of a polygonal shape; circles yield an empty list
    fn polygon(&self) -> ([DVec2; 4], usize) {
        match *self {
            Shape::Rect(r) => (
                [
                    r.min,
                    DVec2::new(r.max.x, r.min.y),
                    r.max,
                    DVec2::new(r.min.x, r.max.y),
                ],
                4,
            ),
            Shape::Triangle([a, b, c]) => ([a, b, c, DVec2::ZERO], 3),
            Shape::Circle { .. } => ([DVec2::ZERO; 4], 0),
        }
    }
}

/// Closest point on segment `a..b` to `p`
pub fn closest_point_on_segment(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < 1e-12 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Point-in-convex-polygon for either winding
fn convex_contains(vertices: &[DVec2], p: DVec2) -> bool {
    let mut has_pos = false;
    let mut has_neg = false;
    for (i, &a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let cross = (b - a).perp_dot(p - a);
        if cross > 0.0 {
            has_pos = true;
        } else if cross < 0.0 {
            has_neg = true;
        }
        if has_pos && has_neg {
            return false;
        }
    }
    true
}

fn circle_polygon_intersect(center: DVec2, radius: f64, vertices: &[DVec2]) -> bool {
    if vertices.is_empty() {
        return false;
    }
    if convex_contains(vertices, center) {
        return true;
    }
    let r_sq = radius * radius;
    vertices.iter().enumerate().any(|(i, &a)| {
        let b = vertices[(i + 1) % vertices.len()];
        closest_point_on_segment(center, a, b).distance_squared(center) <= r_sq
    })
}

/// Separating axis test for two convex polygons
fn polygons_intersect(a: &[DVec2], b: &[DVec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    !has_separating_axis(a, b) && !has_separating_axis(b, a)
}

/// True if some edge normal of `edges_of` separates the two polygons
fn has_separating_axis(edges_of: &[DVec2], other: &[DVec2]) -> bool {
    for (i, &p) in edges_of.iter().enumerate() {
        let q = edges_of[(i + 1) % edges_of.len()];
        let axis = (q - p).perp();
        if axis.length_squared() < 1e-12 {
            continue;
        }
        let (min_a, max_a) = project(edges_of, axis);
        let (min_b, max_b) = project(other, axis);
        if max_a < min_b || max_b < min_a {
            return true;
        }
    }
    false
}

fn project(vertices: &[DVec2], axis: DVec2) -> (f64, f64) {
    vertices
        .iter()
        .map(|v| v.dot(axis))
        .fold((f64::MAX, f64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)))
}
