use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::analysis::face_exposure;
use crate::bvh::Bvh;
use crate::geom::{Mesh, Triangle};
use crate::output;
use crate::result::Results;
use crate::scene::Scene;
use crate::settings::Settings;
use crate::sun::read_sun_file;


/// A solvable solar-exposure problem: subject geometry, optional context
/// geometry, and a set of sun directions, assembled from [`Settings`] or
/// directly from parts.
#[derive(Debug, Clone)]
pub struct SolarProblem {
    pub scene: Scene,
    pub centroids: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub suns: Vec<Vector3<f32>>,
    pub settings: Settings,
    pub result: Option<Results>,
}

impl SolarProblem {
    /// Loads the problem inputs named by the settings: subject geometry,
    /// optional context geometry, and the sun direction file.
    pub fn new(settings: Settings) -> Result<Self> {
        let subject = Mesh::from_file(&settings.geom_name)
            .with_context(|| format!("failed to load subject geometry: {}", settings.geom_name))?;

        let context = match &settings.context_name {
            Some(name) => {
                Mesh::from_file(name)
                    .with_context(|| format!("failed to load context geometry: {}", name))?
                    .triangles
            }
            None => vec![],
        };

        let suns = read_sun_file(Path::new(&settings.sun_name))?;

        Ok(Self::from_parts(subject.triangles, context, suns, settings))
    }

    /// Assembles a problem from already-built triangle lists. The subject
    /// faces are the analysis targets; both subject and context triangles
    /// occlude.
    pub fn from_parts(
        subject: Vec<Triangle>,
        context: Vec<Triangle>,
        suns: Vec<Vector3<f32>>,
        settings: Settings,
    ) -> Self {
        let centroids: Vec<Point3<f32>> = subject.iter().map(|t| t.centroid).collect();
        let normals: Vec<Vector3<f32>> = subject.iter().map(|t| t.normal).collect();
        let scene = Scene::build(subject, context);

        Self {
            scene,
            centroids,
            normals,
            suns,
            settings,
            result: None,
        }
    }

    /// Runs the analysis: builds the acceleration structure, dispatches the
    /// visibility queries in parallel over faces, and stores the reduced
    /// per-face exposure fractions.
    pub fn solve(&mut self) -> Result<Results> {
        let start = Instant::now();
        println!(
            "Solving: {} subject faces, {} scene triangles, {} sun directions",
            self.centroids.len(),
            self.scene.num_triangles(),
            self.suns.len()
        );

        let bvh = Bvh::build(&self.scene)?;

        crate::analysis::validate_inputs(
            &self.centroids,
            &self.normals,
            &self.suns,
            self.settings.ray_offset,
        )?;

        let m = MultiProgress::new();
        let n = self.centroids.len();
        let pb = m.add(ProgressBar::new(n as u64));
        pb.set_style(
            ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
            )
            .unwrap()
            .progress_chars("█▇▆▅▄▃▂▁")
        );
        pb.set_message("face".to_string());

        let exposure: Vec<f32> = self
            .centroids
            .par_iter()
            .zip(self.normals.par_iter())
            .map(|(centroid, normal)| {
                let value =
                    face_exposure(centroid, normal, &bvh, &self.suns, self.settings.ray_offset);
                pb.inc(1);
                value
            })
            .collect();

        pb.finish();

        let results = Results::new(exposure, self.centroids.len(), self.suns.len())?;

        let end = Instant::now();
        let duration = end.duration_since(start);
        if !self.centroids.is_empty() {
            let time_per_face = duration / self.centroids.len() as u32;
            println!(
                "Time taken: {:.2?}, Time per face: {:.2?}",
                duration, time_per_face
            );
        } else {
            println!("Time taken: {:.2?}", duration);
        }

        self.result = Some(results.clone());
        Ok(results)
    }

    /// Writes all results to the output directory and prints the summary.
    pub fn writeup(&self) {
        let Some(results) = &self.result else {
            println!("No results to write; run solve() first");
            return;
        };

        let _ = output::write_exposure(results, &self.settings.directory);
        let _ = output::write_summary(results, &self.settings);
        let _ = output::write_settings(&self.settings);

        results.print();
    }
}
