//! Solar-exposure analysis for architectural scenes.
//!
//! Given a subject (building) mesh, a context mesh of surrounding occluders
//! and a set of sun directions (one per simulated time step), `sunlit`
//! determines for every subject face whether it has an unoccluded line of
//! sight to the sun. A BVH is built over the combined scene triangles and a
//! shadow ray is cast from each offset face centroid toward each sun
//! direction; the per-face result is the fraction of sun directions with
//! clear sight, in `[0, 1]`.

pub mod analysis;
pub mod bvh;
pub mod error;
pub mod geom;
pub mod output;
pub mod problem;
pub mod ray;
pub mod result;
pub mod scene;
pub mod settings;
pub mod sun;

pub use analysis::analyze;
pub use bvh::Bvh;
pub use error::SolarError;
pub use problem::SolarProblem;
pub use result::Results;
pub use scene::Scene;
