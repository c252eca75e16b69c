use crate::geom::Triangle;

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn tri(z: f32) -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        )
    }

    #[test]
    fn subject_triangles_come_first() {
        let scene = Scene::build(vec![tri(0.0), tri(1.0)], vec![tri(2.0)]);
        assert_eq!(scene.num_triangles(), 3);
        assert_eq!(scene.subject_count, 2);
        assert!(scene.is_subject(0));
        assert!(scene.is_subject(1));
        assert!(!scene.is_subject(2));
        assert_eq!(scene.triangles[2].v0.z, 2.0);
    }

    #[test]
    fn empty_scene_is_valid() {
        let scene = Scene::build(vec![], vec![]);
        assert_eq!(scene.num_triangles(), 0);
    }
}

/// The combined occluder geometry for one analysis run.
///
/// Subject triangles are stored first, context triangles second, so a hit
/// triangle index below `subject_count` maps back to the subject mesh.
/// The buffer is immutable for the lifetime of the run; any acceleration
/// structure built over it must be rebuilt if it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub triangles: Vec<Triangle>,
    pub subject_count: usize,
}

impl Scene {
    /// Concatenates the subject and context triangle buffers, subject first.
    /// No deduplication is performed; index order is stable.
    pub fn build(subject: Vec<Triangle>, context: Vec<Triangle>) -> Self {
        let subject_count = subject.len();
        let mut triangles = subject;
        triangles.reserve(context.len());
        triangles.extend(context);

        Self {
            triangles,
            subject_count,
        }
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// True if the triangle at `index` came from the subject mesh.
    pub fn is_subject(&self, index: usize) -> bool {
        index < self.subject_count
    }
}
