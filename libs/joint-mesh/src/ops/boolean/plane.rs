//! # Plane for BSP Operations
//!
//! Plane representation with point classification.

use glam::DVec3;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// In front of the plane (positive side).
    Front,
    /// Behind the plane (negative side).
    Back,
    /// On the plane within tolerance.
    Coplanar,
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane `normal · p = w` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub w: f64,
}

impl Plane {
    /// Creates a plane from a unit normal and its distance from the origin.
    #[cfg(test)]
    pub fn new(normal: DVec3, w: f64) -> Self {
        Self { normal, w }
    }

    /// Fits a plane through a polygon using Newell's method.
    ///
    /// Returns `None` for polygons with (near) zero area.
    pub fn from_polygon(points: &[DVec3]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }

        let mut normal = DVec3::ZERO;
        let mut centroid = DVec3::ZERO;
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            normal.x += (p.y - q.y) * (p.z + q.z);
            normal.y += (p.z - q.z) * (p.x + q.x);
            normal.z += (p.x - q.x) * (p.y + q.y);
            centroid += *p;
        }

        let length = normal.length();
        if !(length > f64::EPSILON) {
            return None;
        }
        let normal = normal / length;
        let centroid = centroid / points.len() as f64;
        Some(Self {
            normal,
            w: normal.dot(centroid),
        })
    }

    /// Returns the plane facing the opposite direction.
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance from point to plane.
    ///
    /// Positive = front, negative = back.
    #[inline]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.w
    }

    /// Classifies a point with the given tolerance.
    #[inline]
    pub fn classify_point(&self, point: DVec3, epsilon: f64) -> Classification {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            Classification::Front
        } else if dist < -epsilon {
            Classification::Back
        } else {
            Classification::Coplanar
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-5;

    #[test]
    fn test_plane_from_polygon() {
        let plane = Plane::from_polygon(&[DVec3::ZERO, DVec3::X, DVec3::Y]).unwrap();
        assert!((plane.normal - DVec3::Z).length() < EPSILON);
        assert!(plane.w.abs() < EPSILON);
    }

    #[test]
    fn test_plane_from_degenerate_polygon() {
        let collinear = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        assert!(Plane::from_polygon(&collinear).is_none());
    }

    #[test]
    fn test_plane_classify_point() {
        let plane = Plane::new(DVec3::Z, 0.0);
        assert_eq!(plane.classify_point(DVec3::Z, EPSILON), Classification::Front);
        assert_eq!(plane.classify_point(-DVec3::Z, EPSILON), Classification::Back);
        assert_eq!(
            plane.classify_point(DVec3::new(1.0, 1.0, 1e-7), EPSILON),
            Classification::Coplanar
        );
    }

    #[test]
    fn test_plane_flip() {
        let plane = Plane::new(DVec3::Z, 5.0);
        let flipped = plane.flipped();
        assert_eq!(flipped.normal, -DVec3::Z);
        assert_eq!(flipped.w, -5.0);
    }
}
