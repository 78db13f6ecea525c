//! # Polygon for BSP Operations
//!
//! Convex planar polygon with splitting support.

use glam::DVec3;

use super::plane::{Classification, Plane};

// =============================================================================
// POLYGON
// =============================================================================

/// A convex polygon with its supporting plane.
///
/// Fragments produced by splitting keep the parent plane, so slivers never
/// need a plane of their own.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in counter-clockwise order.
    pub vertices: Vec<DVec3>,
    /// Plane containing this polygon.
    pub plane: Plane,
}

impl Polygon {
    /// Creates a polygon with a known plane.
    pub fn new(vertices: Vec<DVec3>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    /// Converts a mesh face into BSP polygons.
    ///
    /// Planar convex faces become one polygon. Anything else is split into
    /// triangles by ear clipping. Zero-area pieces are dropped.
    pub fn from_face(points: Vec<DVec3>, epsilon: f64) -> Vec<Polygon> {
        let Some(plane) = Plane::from_polygon(&points) else {
            return Vec::new();
        };

        if points.len() == 3 || is_planar_convex(&points, &plane, epsilon) {
            return vec![Polygon::new(points, plane)];
        }

        ear_clip(&points, plane.normal)
            .into_iter()
            .filter_map(|[a, b, c]| {
                let tri = vec![points[a], points[b], points[c]];
                Plane::from_polygon(&tri).map(|plane| Polygon::new(tri, plane))
            })
            .collect()
    }

    /// Reverses winding order and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }

    /// Splits this polygon by a plane into the four csg.js buckets.
    ///
    /// ## Parameters
    ///
    /// - `coplanar_front`: coplanar polygons facing the same way as `plane`
    /// - `coplanar_back`: coplanar polygons facing the other way
    /// - `front`/`back`: pieces on either side
    pub fn split(
        self,
        plane: &Plane,
        epsilon: f64,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let sides: Vec<Classification> = self
            .vertices
            .iter()
            .map(|v| plane.classify_point(*v, epsilon))
            .collect();

        let has_front = sides.contains(&Classification::Front);
        let has_back = sides.contains(&Classification::Back);

        match (has_front, has_back) {
            (false, false) => {
                if self.plane.normal.dot(plane.normal) > 0.0 {
                    coplanar_front.push(self);
                } else {
                    coplanar_back.push(self);
                }
            }
            (true, false) => front.push(self),
            (false, true) => back.push(self),
            (true, true) => {
                let n = self.vertices.len();
                let mut front_verts = Vec::with_capacity(n + 1);
                let mut back_verts = Vec::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (vi, vj) = (self.vertices[i], self.vertices[j]);
                    let (ti, tj) = (sides[i], sides[j]);

                    if ti != Classification::Back {
                        front_verts.push(vi);
                    }
                    if ti != Classification::Front {
                        back_verts.push(vi);
                    }

                    let crosses = matches!(
                        (ti, tj),
                        (Classification::Front, Classification::Back)
                            | (Classification::Back, Classification::Front)
                    );
                    if crosses {
                        let t = (plane.w - plane.normal.dot(vi)) / plane.normal.dot(vj - vi);
                        let v = vi.lerp(vj, t);
                        front_verts.push(v);
                        back_verts.push(v);
                    }
                }

                if front_verts.len() >= 3 {
                    front.push(Polygon::new(front_verts, self.plane));
                }
                if back_verts.len() >= 3 {
                    back.push(Polygon::new(back_verts, self.plane));
                }
            }
        }
    }
}

/// Returns true when every vertex lies on `plane` and every turn is convex.
fn is_planar_convex(points: &[DVec3], plane: &Plane, epsilon: f64) -> bool {
    if points
        .iter()
        .any(|p| plane.signed_distance(*p).abs() > epsilon)
    {
        return false;
    }

    let n = points.len();
    (0..n).all(|i| {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        (b - a).cross(c - b).dot(plane.normal) >= -epsilon
    })
}

/// Triangulates a simple polygon, using `normal` as the facing direction.
///
/// Falls back to a fan over the remaining vertices if no ear can be found.
fn ear_clip(points: &[DVec3], normal: DVec3) -> Vec<[usize; 3]> {
    let turns_left = |a: DVec3, b: DVec3, c: DVec3| (b - a).cross(c - b).dot(normal) > 0.0;
    let contains = |a: DVec3, b: DVec3, c: DVec3, p: DVec3| {
        (b - a).cross(p - a).dot(normal) >= 0.0
            && (c - b).cross(p - b).dot(normal) >= 0.0
            && (a - c).cross(p - c).dot(normal) >= 0.0
    };

    let mut ring: Vec<usize> = (0..points.len()).collect();
    let mut triangles = Vec::with_capacity(points.len().saturating_sub(2));

    while ring.len() > 3 {
        let n = ring.len();
        let ear = (0..n).find(|&i| {
            let (ia, ib, ic) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
            let (a, b, c) = (points[ia], points[ib], points[ic]);
            turns_left(a, b, c)
                && ring
                    .iter()
                    .filter(|&&k| k != ia && k != ib && k != ic)
                    .all(|&k| !contains(a, b, c, points[k]))
        });

        match ear {
            Some(i) => {
                triangles.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
                ring.remove(i);
            }
            None => break,
        }
    }

    for w in ring[1..].windows(2) {
        triangles.push([ring[0], w[0], w[1]]);
    }
    triangles
}

// =============================================================================
// TESTS
// =============================================================================
