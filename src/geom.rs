use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};

use crate::error::SolarError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_derived_fields() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(tri.edge1, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(tri.edge2, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(tri.normal, Vector3::new(0.0, 0.0, 1.0));
        assert!((tri.centroid.x - 1.0 / 3.0).abs() < 1e-6);
        assert!((tri.centroid.y - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(tri.centroid.z, 0.0);
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        // Collinear vertices: the cross product vanishes and the safe
        // normalization must return the zero vector, never NaN.
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(tri.normal, Vector3::zeros());
        assert!(tri.normal.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn normalize_safe_zero_vector() {
        assert_eq!(normalize_safe(&Vector3::zeros()), Vector3::zeros());
        let n = normalize_safe(&Vector3::new(0.0, 0.0, 2.0));
        assert_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn flat_conversions() {
        let points = points_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point3::new(3.0, 4.0, 5.0));

        let tris = triangles_from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].normal, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn flat_conversions_reject_bad_shapes() {
        assert!(points_from_flat(&[1.0, 2.0]).is_err());
        assert!(vectors_from_flat(&[1.0, 2.0, 3.0, 4.0]).is_err());
        assert!(triangles_from_flat(&[0.0; 10]).is_err());
    }
}

/// Normalizes a vector, returning the zero vector for zero-length input
/// instead of dividing by zero.
pub fn normalize_safe(v: &Vector3<f32>) -> Vector3<f32> {
    v.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
}

/// A scene triangle with its derived fields computed once at construction.
///
/// Degenerate triangles (collinear vertices) carry a zero normal and are
/// retained rather than rejected, so face indices stay stable.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f32>,
    pub v1: Point3<f32>,
    pub v2: Point3<f32>,
    pub edge1: Vector3<f32>,
    pub edge2: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub centroid: Point3<f32>,
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;
        let normal = normalize_safe(&edge1.cross(&edge2));
        let centroid = Point3::from((v0.coords + v1.coords + v2.coords) / 3.0);

        Self {
            v0,
            v1,
            v2,
            edge1,
            edge2,
            normal,
            centroid,
        }
    }

    /// True if all vertex coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.v0.coords.iter().all(|c| c.is_finite())
            && self.v1.coords.iter().all(|c| c.is_finite())
            && self.v2.coords.iter().all(|c| c.is_finite())
    }
}

/// A triangulated surface mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Loads a mesh from a Wavefront .obj file. Faces are triangulated on
    /// load; all models in the file are flattened into one triangle buffer.
    pub fn from_file(filename: &str) -> Result<Mesh> {
        let options = tobj::LoadOptions {
            triangulate: true,
            ..Default::default()
        };
        let (models, _) = tobj::load_obj(filename, &options)
            .with_context(|| format!("failed to load OBJ file: {}", filename))?;

        let mut triangles = Vec::new();
        for m in &models {
            let mesh = &m.mesh;
            let vertices: Vec<Point3<f32>> = (0..mesh.positions.len() / 3)
                .map(|vtx| {
                    Point3::new(
                        mesh.positions[3 * vtx],
                        mesh.positions[3 * vtx + 1],
                        mesh.positions[3 * vtx + 2],
                    )
                })
                .collect();

            for face in mesh.indices.chunks_exact(3) {
                triangles.push(Triangle::new(
                    vertices[face[0] as usize],
                    vertices[face[1] as usize],
                    vertices[face[2] as usize],
                ));
            }
        }

        Ok(Mesh { triangles })
    }

    pub fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    /// Per-face centroids, in face order.
    pub fn centroids(&self) -> Vec<Point3<f32>> {
        self.triangles.iter().map(|t| t.centroid).collect()
    }

    /// Per-face unit normals, in face order. Degenerate faces yield the
    /// zero vector.
    pub fn normals(&self) -> Vec<Vector3<f32>> {
        self.triangles.iter().map(|t| t.normal).collect()
    }
}

/// Converts a flattened (N, 3) buffer into points.
pub fn points_from_flat(data: &[f32]) -> Result<Vec<Point3<f32>>, SolarError> {
    if data.len() % 3 != 0 {
        return Err(SolarError::InputValidation(format!(
            "expected a flattened (N, 3) point buffer, got {} floats",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| Point3::new(c[0], c[1], c[2]))
        .collect())
}

/// Converts a flattened (N, 3) buffer into vectors.
pub fn vectors_from_flat(data: &[f32]) -> Result<Vec<Vector3<f32>>, SolarError> {
    if data.len() % 3 != 0 {
        return Err(SolarError::InputValidation(format!(
            "expected a flattened (N, 3) vector buffer, got {} floats",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(3)
        .map(|c| Vector3::new(c[0], c[1], c[2]))
        .collect())
}

/// Converts a flattened (N, 3, 3) buffer (N triangles, 3 vertices,
/// 3 coordinates) into triangles with derived fields.
pub fn triangles_from_flat(data: &[f32]) -> Result<Vec<Triangle>, SolarError> {
    if data.len() % 9 != 0 {
        return Err(SolarError::InputValidation(format!(
            "expected a flattened (N, 3, 3) triangle buffer, got {} floats",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(9)
        .map(|c| {
            Triangle::new(
                Point3::new(c[0], c[1], c[2]),
                Point3::new(c[3], c[4], c[5]),
                Point3::new(c[6], c[7], c[8]),
            )
        })
        .collect())
}
