use serde::Serialize;

use crate::error::SolarError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_stats() {
        let results = Results::new(vec![1.0, 0.5, 0.0], 3, 4).unwrap();
        assert_eq!(results.total(), 1.5);
        assert_eq!(results.mean(), 0.5);
        assert_eq!(results.max(), 1.0);
        assert_eq!(results.sunlit_faces(), 2);
    }

    #[test]
    fn sun_hours_scales_by_direction_count() {
        // 4 directions sampled at 2 samples per hour: full exposure = 2 hours.
        let results = Results::new(vec![1.0, 0.25], 2, 4).unwrap();
        let hours = results.sun_hours(2.0);
        assert_eq!(hours, vec![2.0, 0.5]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        assert!(matches!(
            Results::new(vec![1.0], 2, 4),
            Err(SolarError::Dispatch(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Results::new(vec![1.5], 1, 4).is_err());
        assert!(Results::new(vec![f32::NAN], 1, 4).is_err());
    }

    #[test]
    fn empty_results_are_valid() {
        let results = Results::new(vec![], 0, 4).unwrap();
        assert_eq!(results.total(), 0.0);
        assert_eq!(results.mean(), 0.0);
        assert_eq!(results.max(), 0.0);
    }
}

/// Per-face solar-exposure results for one analysis run.
///
/// `exposure[f]` is the fraction of the supplied sun directions visible
/// from face `f`, in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Results {
    pub exposure: Vec<f32>,
    pub num_faces: usize,
    pub num_directions: usize,
}

impl Results {
    /// Wraps the engine output, enforcing the boundary contract: one
    /// finite scalar in `[0, 1]` per subject face.
    pub fn new(
        exposure: Vec<f32>,
        num_faces: usize,
        num_directions: usize,
    ) -> Result<Self, SolarError> {
        if exposure.len() != num_faces {
            return Err(SolarError::Dispatch(format!(
                "result length {} does not match face count {} ({} sun directions)",
                exposure.len(),
                num_faces,
                num_directions
            )));
        }
        if exposure
            .iter()
            .any(|v| !v.is_finite() || !(0.0..=1.0).contains(v))
        {
            return Err(SolarError::Dispatch(format!(
                "exposure values outside [0, 1] ({} faces, {} sun directions)",
                num_faces, num_directions
            )));
        }

        Ok(Self {
            exposure,
            num_faces,
            num_directions,
        })
    }

    pub fn total(&self) -> f32 {
        self.exposure.iter().sum()
    }

    pub fn mean(&self) -> f32 {
        if self.exposure.is_empty() {
            0.0
        } else {
            self.total() / self.exposure.len() as f32
        }
    }

    pub fn max(&self) -> f32 {
        self.exposure.iter().fold(0.0, |acc, &v| acc.max(v))
    }

    /// Number of faces that see the sun for at least one direction.
    pub fn sunlit_faces(&self) -> usize {
        self.exposure.iter().filter(|&&v| v > 0.0).count()
    }

    /// Per-face direct sun hours, given the sampling rate the sun
    /// directions were generated with (samples per hour).
    pub fn sun_hours(&self, timestep: f32) -> Vec<f32> {
        let scale = self.num_directions as f32 / timestep;
        self.exposure.iter().map(|v| v * scale).collect()
    }

    /// Prints a run summary.
    pub fn print(&self) {
        println!("Faces analyzed: {}", self.num_faces);
        println!("Sun directions: {}", self.num_directions);
        println!("Total exposure: {:.2}", self.total());
        println!("Mean exposure per face: {:.3}", self.mean());
        println!("Max exposure: {:.3}", self.max());
        println!(
            "Faces with sun: {}/{}",
            self.sunlit_faces(),
            self.num_faces
        );
    }
}
