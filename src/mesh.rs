use crate::algebra::Vec3;
use crate::cuboid::Cuboid;
use crate::material::Material;
use crate::polygon::Triangle;
use crate::ray::{Contact, Ray};
use std::path::Path;

/// Indexed triangle soup with an axis-aligned bounding cuboid used as a
/// pre-test before the linear triangle scan.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<[u32; 3]>,
    bounds: Cuboid,
    pub material: Material,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, indices: Vec<[u32; 3]>, material: Material) -> Self {
        let bounds = bounding_cuboid(&vertices, material);
        Self { vertices, indices, bounds, material }
    }

    /// Load the triangles of every model in an OBJ file.
    pub fn load_obj(path: &Path, material: Material) -> Result<Self, tobj::LoadError> {
        let (models, _) = tobj::load_obj(
            path,
            &tobj::LoadOptions { triangulate: true, ..Default::default() },
        )?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();
        for model in models {
            let base = vertices.len() as u32;
            let mesh = model.mesh;
            vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .map(|p| Vec3(p[0], p[1], p[2])),
            );
            indices.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [base + f[0], base + f[1], base + f[2]]),
            );
        }
        Ok(Self::new(vertices, indices, material))
    }

    /// Apply a model-to-world transform to every vertex and rebuild the
    /// bounding volume.
    pub fn transform(&mut self, f: impl Fn(Vec3) -> Vec3) {
        for v in &mut self.vertices {
            *v = f(*v);
        }
        self.bounds = bounding_cuboid(&self.vertices, self.material);
    }

    pub fn intersect(&self, ray: &Ray) -> Option<Contact> {
        self.bounds.intersect(ray)?;

        let mut closest: Option<Contact> = None;
        for idx in &self.indices {
            let Some(tri) = Triangle::new(
                self.vertices[idx[0] as usize],
                self.vertices[idx[1] as usize],
                self.vertices[idx[2] as usize],
            ) else {
                continue; // zero-area faces never hit
            };
            if let Some((time, point)) = tri.intersect(ray) {
                if closest.as_ref().map_or(true, |c| time < c.time) {
                    closest = Some(Contact { time, point, normal: tri.normal, material: self.material });
                }
            }
        }
        closest
    }
}

fn bounding_cuboid(vertices: &[Vec3], material: Material) -> Cuboid {
    let mut min = Vec3(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Vec3(-f32::MAX, -f32::MAX, -f32::MAX);
    for v in vertices {
        min = Vec3(min.0.min(v.0), min.1.min(v.1), min.2.min(v.2));
        max = Vec3(max.0.max(v.0), max.1.max(v.1), max.2.max(v.2));
    }
    Cuboid::new(
        min,
        Vec3(0.0, 0.0, max.2 - min.2),
        Vec3(max.0 - min.0, 0.0, 0.0),
        Vec3(0.0, max.1 - min.1, 0.0),
        material,
    )
}
