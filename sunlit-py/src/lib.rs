use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use sunlit::geom::{points_from_flat, triangles_from_flat, vectors_from_flat};
use sunlit::{analysis, Bvh, Scene, SolarError};

fn to_value_error(err: SolarError) -> PyErr {
    PyValueError::new_err(format!("Solar analysis failed: {}", err))
}

/// Per-face solar exposure for a set of faces against a triangle scene.
///
/// All geometry arrives as flat f32 buffers: `face_centroids` and
/// `face_normals` are `3 * num_faces` long, `scene_triangles` is
/// `9 * num_triangles` (three vertices per triangle), `sun_directions` is
/// `3 * num_directions`. Returns one exposure fraction in `[0, 1]` per
/// face. Raises `ValueError` on malformed buffers or invalid inputs.
#[pyfunction]
fn analyze(
    face_centroids: Vec<f32>,
    face_normals: Vec<f32>,
    scene_triangles: Vec<f32>,
    sun_directions: Vec<f32>,
    ray_offset: f32,
) -> PyResult<Vec<f32>> {
    let centroids = points_from_flat(&face_centroids).map_err(to_value_error)?;
    let normals = vectors_from_flat(&face_normals).map_err(to_value_error)?;
    let triangles = triangles_from_flat(&scene_triangles).map_err(to_value_error)?;
    let suns = vectors_from_flat(&sun_directions).map_err(to_value_error)?;

    let scene = Scene::build(triangles, Vec::new());
    let bvh = Bvh::build(&scene).map_err(to_value_error)?;

    analysis::analyze(&centroids, &normals, &bvh, &suns, ray_offset).map_err(to_value_error)
}

#[pymodule]
fn sunlit_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
