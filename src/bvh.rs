use std::sync::Arc;

use nalgebra::Point3;

use crate::error::SolarError;
use crate::geom::Triangle;
use crate::ray::{intersect_triangle, Ray};
use crate::scene::Scene;
use crate::settings::BVH_LEAF_SIZE;

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn quad(z: f32) -> Vec<Triangle> {
        vec![
            Triangle::new(
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, z),
                Point3::new(1.0, 1.0, z),
                Point3::new(0.0, 1.0, z),
            ),
        ]
    }

    #[test]
    fn any_hit_finds_blocker() {
        let scene = Scene::build(quad(0.0), quad(5.0));
        let bvh = Bvh::build(&scene).unwrap();

        let up = Ray::new(Point3::new(0.5, 0.5, 0.1), Vector3::new(0.0, 0.0, 1.0));
        assert!(bvh.any_hit(&up, 1e-4, f32::INFINITY));

        let down = Ray::new(Point3::new(0.5, 0.5, 0.1), Vector3::new(0.0, 0.0, -1.0));
        assert!(bvh.any_hit(&down, 1e-4, f32::INFINITY));

        let sideways = Ray::new(Point3::new(0.5, 0.5, 0.1), Vector3::new(1.0, 0.0, 0.0));
        assert!(!bvh.any_hit(&sideways, 1e-4, f32::INFINITY));
    }

    #[test]
    fn any_hit_respects_t_range() {
        let scene = Scene::build(vec![], quad(5.0));
        let bvh = Bvh::build(&scene).unwrap();

        let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(bvh.any_hit(&ray, 1e-4, f32::INFINITY));
        // The blocker sits at t = 5; a capped range must miss it.
        assert!(!bvh.any_hit(&ray, 1e-4, 4.0));
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::build(vec![], vec![]);
        let bvh = Bvh::build(&scene).unwrap();
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
        assert!(!bvh.any_hit(&ray, 0.0, f32::INFINITY));
    }

    #[test]
    fn non_finite_geometry_is_rejected() {
        let bad = Triangle::new(
            Point3::new(f32::NAN, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let scene = Scene::build(vec![bad], vec![]);
        assert!(matches!(Bvh::build(&scene), Err(SolarError::Build(_))));
    }

    #[test]
    fn many_triangles_split_into_internal_nodes() {
        // A column of quads, enough to force several levels of splits.
        let mut context = Vec::new();
        for i in 0..64 {
            context.extend(quad(i as f32));
        }
        let scene = Scene::build(vec![], context);
        let bvh = Bvh::build(&scene).unwrap();
        assert!(bvh.nodes.len() > 1);

        let ray = Ray::new(Point3::new(0.5, 0.5, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(bvh.any_hit(&ray, 1e-4, f32::INFINITY));
        let miss = Ray::new(Point3::new(5.0, 5.0, -1.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!bvh.any_hit(&miss, 1e-4, f32::INFINITY));
    }

    #[test]
    fn degenerate_triangles_are_retained() {
        let degenerate = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        let scene = Scene::build(vec![degenerate], quad(1.0));
        let bvh = Bvh::build(&scene).unwrap();
        assert_eq!(bvh.scene().num_triangles(), 3);
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    fn empty() -> Self {
        Self {
            min: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    fn from_triangle(tri: &Triangle) -> Self {
        let mut aabb = Self::empty();
        for v in [&tri.v0, &tri.v1, &tri.v2] {
            for axis in 0..3 {
                aabb.min[axis] = aabb.min[axis].min(v[axis]);
                aabb.max[axis] = aabb.max[axis].max(v[axis]);
            }
        }
        aabb
    }

    fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = out.min[axis].min(other.min[axis]);
            out.max[axis] = out.max[axis].max(other.max[axis]);
        }
        out
    }

    fn centroid(&self) -> Point3<f32> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Slab test against the parameter range `[t0, t1]`. Zero direction
    /// components are handled explicitly to avoid 0 * inf = NaN.
    fn hit(&self, ray: &Ray, mut t0: f32, mut t1: f32) -> bool {
        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            if d != 0.0 {
                let inv = 1.0 / d;
                let mut near = (self.min[axis] - o) * inv;
                let mut far = (self.max[axis] - o) * inv;
                if near > far {
                    std::mem::swap(&mut near, &mut far);
                }
                t0 = t0.max(near);
                t1 = t1.min(far);
                if t0 > t1 {
                    return false;
                }
            } else if o < self.min[axis] || o > self.max[axis] {
                return false;
            }
        }
        true
    }
}

/// A BVH node. Negative child indices mark a leaf; leaves reference a
/// contiguous range of the reordered triangle index.
#[derive(Debug, Clone)]
struct Node {
    aabb: Aabb,
    left: i32,
    right: i32,
    start: u32,
    count: u32,
}

/// Bounding volume hierarchy over a [`Scene`], supporting any-hit shadow
/// queries.
///
/// The structure owns a shared handle to the scene it was built from and is
/// read-only after construction, so it is safe to query concurrently from
/// multiple threads. It must be rebuilt if the scene's triangle buffer
/// changes; partial updates are not supported.
#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
    tri_index: Vec<u32>,
    root: usize,
    scene: Arc<Scene>,
}

impl Bvh {
    /// Builds the hierarchy by recursive median split on the largest
    /// centroid-extent axis. Fails with a build error if any triangle has
    /// non-finite coordinates; no partial structure is returned.
    pub fn build(scene: &Scene) -> Result<Self, SolarError> {
        for (i, tri) in scene.triangles.iter().enumerate() {
            if !tri.is_finite() {
                return Err(SolarError::Build(format!(
                    "triangle {} of {} has non-finite vertex coordinates",
                    i,
                    scene.num_triangles()
                )));
            }
        }

        let scene = Arc::new(scene.clone());
        let bounds: Vec<Aabb> = scene.triangles.iter().map(Aabb::from_triangle).collect();
        let mut tri_index: Vec<u32> = (0..scene.triangles.len() as u32).collect();

        let mut nodes = Vec::new();
        let root = if tri_index.is_empty() {
            0
        } else {
            build_range(&mut nodes, &mut tri_index, &bounds, 0)
        };

        Ok(Self {
            nodes,
            tri_index,
            root,
            scene,
        })
    }

    /// Any-hit query: does the ray intersect any scene triangle with
    /// parameter in `(t_min, t_max)`? Exits on the first hit found;
    /// traversal order is irrelevant since only existence matters.
    pub fn any_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        if self.nodes.is_empty() {
            return false;
        }

        let mut stack: Vec<usize> = Vec::with_capacity(64);
        stack.push(self.root);

        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.aabb.hit(ray, t_min, t_max) {
                continue;
            }
            if node.left < 0 {
                let start = node.start as usize;
                let end = start + node.count as usize;
                for &ti in &self.tri_index[start..end] {
                    let tri = &self.scene.triangles[ti as usize];
                    if intersect_triangle(ray, tri, t_min, t_max).is_some() {
                        return true;
                    }
                }
            } else {
                stack.push(node.left as usize);
                stack.push(node.right as usize);
            }
        }

        false
    }

    /// The scene this hierarchy was built over.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

/// Recursively builds nodes over `index` (a reorderable view of triangle
/// indices whose first element sits at `base` in the full index buffer).
/// Returns the node's position in `nodes`.
fn build_range(nodes: &mut Vec<Node>, index: &mut [u32], bounds: &[Aabb], base: usize) -> usize {
    let mut aabb = Aabb::empty();
    for &i in index.iter() {
        aabb = aabb.union(&bounds[i as usize]);
    }

    if index.len() <= BVH_LEAF_SIZE {
        nodes.push(Node {
            aabb,
            left: -1,
            right: -1,
            start: base as u32,
            count: index.len() as u32,
        });
        return nodes.len() - 1;
    }

    // Split axis: largest extent of the triangle centroids.
    let mut cmin = [f32::INFINITY; 3];
    let mut cmax = [f32::NEG_INFINITY; 3];
    for &i in index.iter() {
        let c = bounds[i as usize].centroid();
        for axis in 0..3 {
            cmin[axis] = cmin[axis].min(c[axis]);
            cmax[axis] = cmax[axis].max(c[axis]);
        }
    }
    let mut axis = 0;
    let mut extent = cmax[0] - cmin[0];
    for candidate in 1..3 {
        let e = cmax[candidate] - cmin[candidate];
        if e > extent {
            axis = candidate;
            extent = e;
        }
    }

    index.sort_by(|&a, &b| {
        let ca = bounds[a as usize].centroid()[axis];
        let cb = bounds[b as usize].centroid()[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let count = index.len();
    let mid = count / 2;
    let (left_index, right_index) = index.split_at_mut(mid);
    let left = build_range(nodes, left_index, bounds, base);
    let right = build_range(nodes, right_index, bounds, base + mid);

    nodes.push(Node {
        aabb,
        left: left as i32,
        right: right as i32,
        start: base as u32,
        count: count as u32,
    });
    nodes.len() - 1
}
