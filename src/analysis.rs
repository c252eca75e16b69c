//! Ray dispatch and visibility engine.
//!
//! For every (face, sun direction) pair a shadow ray is cast from the face
//! centroid, offset along the face normal, toward the sun. A face whose
//! normal points away from the sun is self-shadowed and marked not visible
//! without casting a ray. Queries are independent and dispatched in
//! parallel over faces; results are a pure function of the inputs and do
//! not depend on execution order.
//!
//! Reduction: the contract scalar per face is the fraction of supplied sun
//! directions with an unoccluded line of sight, in `[0, 1]`. Callers that
//! need to reduce differently can use [`analyze_matrix`], which exposes the
//! full per-face-per-direction visibility matrix.

use itertools::izip;
use nalgebra::{Point3, Vector3};
use ndarray::Array2;
use rayon::prelude::*;

use crate::bvh::Bvh;
use crate::error::SolarError;
use crate::ray::Ray;
use crate::settings::SHADOW_T_MIN;


/// Runs the visibility analysis and reduces to one scalar per face.
///
/// `result[f]` is the count of sun directions visible from face `f`
/// divided by the number of supplied directions. Fails with an input
/// validation error before any dispatch when the centroid and normal
/// counts differ, the sun set is empty, the offset is negative, or any
/// input coordinate is non-finite.
pub fn analyze(
    centroids: &[Point3<f32>],
    normals: &[Vector3<f32>],
    bvh: &Bvh,
    suns: &[Vector3<f32>],
    ray_offset: f32,
) -> Result<Vec<f32>, SolarError> {
    validate_inputs(centroids, normals, suns, ray_offset)?;

    let exposure: Vec<f32> = centroids
        .par_iter()
        .zip(normals.par_iter())
        .map(|(centroid, normal)| face_exposure(centroid, normal, bvh, suns, ray_offset))
        .collect();

    check_output(&exposure, centroids.len(), suns.len(), ray_offset)?;
    Ok(exposure)
}

/// Runs the visibility analysis without reduction, returning the full
/// faces × directions matrix of 0/1 visibility values.
pub fn analyze_matrix(
    centroids: &[Point3<f32>],
    normals: &[Vector3<f32>],
    bvh: &Bvh,
    suns: &[Vector3<f32>],
    ray_offset: f32,
) -> Result<Array2<f32>, SolarError> {
    validate_inputs(centroids, normals, suns, ray_offset)?;

    let cells: Vec<f32> = centroids
        .par_iter()
        .zip(normals.par_iter())
        .flat_map_iter(|(centroid, normal)| {
            suns.iter().map(move |sun| {
                if visible(centroid, normal, bvh, sun, ray_offset) {
                    1.0
                } else {
                    0.0
                }
            })
        })
        .collect();

    Array2::from_shape_vec((centroids.len(), suns.len()), cells).map_err(|e| {
        SolarError::Dispatch(format!(
            "visibility matrix has wrong shape ({} faces, {} sun directions): {}",
            centroids.len(),
            suns.len(),
            e
        ))
    })
}

/// Exposure of a single face: the fraction of sun directions visible.
pub fn face_exposure(
    centroid: &Point3<f32>,
    normal: &Vector3<f32>,
    bvh: &Bvh,
    suns: &[Vector3<f32>],
    ray_offset: f32,
) -> f32 {
    let visible_count = suns
        .iter()
        .filter(|sun| visible(centroid, normal, bvh, sun, ray_offset))
        .count();
    visible_count as f32 / suns.len() as f32
}

/// Visibility of one (face, sun direction) pair.
///
/// Back-face cull first: a face whose normal points away from the sun
/// cannot receive direct sun, so no ray is cast. Otherwise the shadow ray
/// starts at the centroid offset along the normal; without that offset the
/// ray would immediately re-intersect its own triangle and every face
/// would report occluded.
fn visible(
    centroid: &Point3<f32>,
    normal: &Vector3<f32>,
    bvh: &Bvh,
    sun: &Vector3<f32>,
    ray_offset: f32,
) -> bool {
    if normal.dot(sun) <= 0.0 {
        return false;
    }
    let ray = Ray::new(*centroid + *normal * ray_offset, *sun);
    !bvh.any_hit(&ray, SHADOW_T_MIN, f32::INFINITY)
}

pub(crate) fn validate_inputs(
    centroids: &[Point3<f32>],
    normals: &[Vector3<f32>],
    suns: &[Vector3<f32>],
    ray_offset: f32,
) -> Result<(), SolarError> {
    if centroids.len() != normals.len() {
        return Err(SolarError::InputValidation(format!(
            "face centroid and normal counts differ: {} vs {}",
            centroids.len(),
            normals.len()
        )));
    }
    if suns.is_empty() {
        return Err(SolarError::InputValidation(
            "no sun directions supplied".to_string(),
        ));
    }
    if !ray_offset.is_finite() || ray_offset < 0.0 {
        return Err(SolarError::InputValidation(format!(
            "ray offset must be finite and non-negative, got {}",
            ray_offset
        )));
    }
    for (i, (centroid, normal)) in izip!(centroids, normals).enumerate() {
        if !centroid.coords.iter().all(|c| c.is_finite()) {
            return Err(SolarError::InputValidation(format!(
                "face centroid {} has non-finite coordinates",
                i
            )));
        }
        if !normal.iter().all(|c| c.is_finite()) {
            return Err(SolarError::InputValidation(format!(
                "face normal {} has non-finite coordinates",
                i
            )));
        }
    }
    for (i, sun) in suns.iter().enumerate() {
        if !sun.iter().all(|c| c.is_finite()) {
            return Err(SolarError::InputValidation(format!(
                "sun direction {} has non-finite coordinates",
                i
            )));
        }
    }
    Ok(())
}

/// Output-contract check: one finite scalar in [0, 1] per face.
fn check_output(
    exposure: &[f32],
    num_faces: usize,
    num_suns: usize,
    ray_offset: f32,
) -> Result<(), SolarError> {
    if exposure.len() != num_faces {
        return Err(SolarError::Dispatch(format!(
            "expected {} face results, got {} ({} sun directions, offset {})",
            num_faces,
            exposure.len(),
            num_suns,
            ray_offset
        )));
    }
    if exposure.iter().any(|v| !v.is_finite() || !(0.0..=1.0).contains(v)) {
        return Err(SolarError::Dispatch(format!(
            "exposure values outside [0, 1] ({} faces, {} sun directions, offset {})",
            num_faces, num_suns, ray_offset
        )));
    }
    Ok(())
}
