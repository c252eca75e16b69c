use nalgebra::{Point3, Vector3};

use crate::geom::Triangle;
use crate::settings::INTERSECT_EPSILON;

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tri() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn ray_hits_triangle() {
        let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::new(0.0, 0.0, 1.0));
        let t = intersect_triangle(&ray, &unit_tri(), 0.0, f32::INFINITY);
        assert!((t.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn ray_misses_triangle() {
        let ray = Ray::new(Point3::new(2.0, 2.0, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&ray, &unit_tri(), 0.0, f32::INFINITY).is_none());
    }

    #[test]
    fn hit_outside_parameter_range_is_rejected() {
        let ray = Ray::new(Point3::new(0.25, 0.25, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&ray, &unit_tri(), 0.0, 0.5).is_none());
        assert!(intersect_triangle(&ray, &unit_tri(), 1.5, f32::INFINITY).is_none());
    }

    #[test]
    fn parallel_ray_is_rejected() {
        let ray = Ray::new(Point3::new(0.25, 0.25, 1.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&ray, &unit_tri(), 0.0, f32::INFINITY).is_none());
    }
}

/// A ray with origin and (not necessarily unit) direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter of the hit if it lies within `(t_min, t_max)`.
/// Uses the triangle's precomputed edge vectors; rays parallel to the
/// triangle plane (|det| below [`INTERSECT_EPSILON`]) report no hit, which
/// also covers degenerate triangles.
pub fn intersect_triangle(ray: &Ray, tri: &Triangle, t_min: f32, t_max: f32) -> Option<f32> {
    let pvec = ray.direction.cross(&tri.edge2);
    let det = tri.edge1.dot(&pvec);
    if det.abs() < INTERSECT_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - tri.v0;
    let u = tvec.dot(&pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(&tri.edge1);
    let v = ray.direction.dot(&qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = tri.edge2.dot(&qvec) * inv_det;
    if t <= t_min || t > t_max {
        return None;
    }
    Some(t)
}
