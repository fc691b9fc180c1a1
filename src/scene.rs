use crate::algebra::{Mat3, Vec2, Vec3};
use crate::camera::Camera;
use crate::cuboid::Cuboid;
use crate::ellipsoid::Ellipsoid;
use crate::light::{Ambient, PointLight};
use crate::material::{Material, Medium};
use crate::mesh::Mesh;
use crate::polygon::Polygon;
use crate::primitive::Primitive;
use crate::ray::{Contact, Ray};
use crate::sphere::Sphere;
use log::warn;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("cannot read scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot load mesh: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("scene parse error: {0}")]
    Parse(String),
}

/// Immutable world: primitives in declaration order, point lights, one
/// ambient term, the enclosing medium, one camera.
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub lights: Vec<PointLight>,
    pub ambient: Ambient,
    pub air: Medium,
    pub camera: Camera,
}

impl Scene {
    pub fn load(path: &Path) -> Result<Scene, SceneError> {
        let data = std::fs::read_to_string(path)?;
        Scene::parse(&data)
    }

    /// Closest hit over every primitive; declaration order does not
    /// matter.
    pub fn raycast(&self, ray: &Ray) -> Option<Contact> {
        self.primitives
            .iter()
            .filter_map(|p| p.intersect(ray))
            .min_by(|a, b| a.time.total_cmp(&b.time))
    }

    pub fn parse(text: &str) -> Result<Scene, SceneError> {
        let mut cursor = Cursor::new(text);

        let mut primitives = Vec::new();
        let mut lights = Vec::new();
        let mut ambient = Ambient::default();
        let mut air = Medium::default();
        let mut camera = None;

        while let Some(tag) = cursor.next() {
            match tag {
                "SPHERE" => {
                    let pos = cursor.vec3("SPHERE pos")?;
                    let radius = cursor.float("SPHERE radius")?;
                    let material = read_material(&mut cursor)?;
                    primitives.push(Primitive::Sphere(Sphere { pos, radius, material }));
                }
                "BOX" => {
                    let corner = cursor.vec3("BOX corner")?;
                    let length = cursor.vec3("BOX length")?;
                    let width = cursor.vec3("BOX width")?;
                    let height = cursor.vec3("BOX height")?;
                    let material = read_material(&mut cursor)?;
                    primitives.push(Primitive::Cuboid(Cuboid::new(corner, length, width, height, material)));
                }
                "POLYGON" => {
                    let count = cursor.int("POLYGON vertex count")?;
                    let mut vertices = Vec::with_capacity(count);
                    for _ in 0..count {
                        vertices.push(cursor.vec3("POLYGON vertex")?);
                    }
                    let material = read_material(&mut cursor)?;
                    match Polygon::new(vertices, material) {
                        Some(polygon) => primitives.push(Primitive::Polygon(polygon)),
                        None => warn!("skipping degenerate POLYGON record"),
                    }
                }
                "ELLIPSOID" => {
                    let pos = cursor.vec3("ELLIPSOID pos")?;
                    let u = cursor.vec3("ELLIPSOID u")?;
                    let v = cursor.vec3("ELLIPSOID v")?;
                    let w = cursor.vec3("ELLIPSOID w")?;
                    let material = read_material(&mut cursor)?;
                    match Ellipsoid::new(pos, u, v, w, material) {
                        Some(ellipsoid) => primitives.push(Primitive::Ellipsoid(ellipsoid)),
                        None => warn!("skipping ELLIPSOID record with singular axes"),
                    }
                }
                "MESH" => {
                    let path = cursor.word("MESH path")?.to_string();
                    let pos = cursor.vec3("MESH pos")?;
                    let rot = cursor.vec3("MESH rotation")?;
                    let scale = cursor.float("MESH scale")?;
                    let material = read_material(&mut cursor)?;

                    let mut mesh = Mesh::load_obj(Path::new(&path), material)?;
                    let rotation = Mat3::rotation_x(rot.0.to_radians())
                        * Mat3::rotation_y(rot.1.to_radians())
                        * Mat3::rotation_z(rot.2.to_radians());
                    mesh.transform(|v| pos + rotation.mul_vec(v.scale(scale)));
                    primitives.push(Primitive::Mesh(mesh));
                }
                "LIGHT" => {
                    let pos = cursor.vec3("LIGHT pos")?;
                    let color = cursor.vec3("LIGHT color")?;
                    let radius = cursor.float("LIGHT radius")?;
                    lights.push(PointLight { pos, color, radius });
                }
                "AMBIENT" => {
                    ambient = Ambient { color: cursor.vec3("AMBIENT color")? };
                }
                "AIR" => {
                    air = Medium {
                        electric_permittivity: cursor.float("AIR permittivity")?,
                        magnetic_permeability: cursor.float("AIR permeability")?,
                        attenuation: cursor.vec3("AIR attenuation")?,
                    };
                }
                "CAMERA" => {
                    camera = Some(read_camera(&mut cursor)?);
                }
                other => {
                    return Err(SceneError::Parse(format!("unknown record tag '{other}'")));
                }
            }
        }

        let camera = camera.ok_or_else(|| SceneError::Parse("scene defines no CAMERA".into()))?;
        Ok(Scene { primitives, lights, ambient, air, camera })
    }
}

fn read_material(cursor: &mut Cursor) -> Result<Material, SceneError> {
    Ok(Material {
        diffuse_color: cursor.vec3("material diffuse color")?,
        specular_reflection: cursor.float("material specular reflection")?,
        specular_exponent: cursor.float("material specular exponent")?,
        attenuation: cursor.vec3("material attenuation")?,
        electric_permittivity: cursor.float("material permittivity")?,
        magnetic_permeability: cursor.float("material permeability")?,
        roughness: cursor.float("material roughness")?,
    })
}

fn read_camera(cursor: &mut Cursor) -> Result<Camera, SceneError> {
    let center = cursor.vec3("CAMERA center")?;
    let u = cursor.vec3("CAMERA u")?;
    let v = cursor.vec3("CAMERA v")?;
    let r = cursor.float("CAMERA r")?;
    let aperture = cursor.float("CAMERA aperture")?;
    let focal_point = cursor.float("CAMERA focal point")?;
    let refraction_index = cursor.float("CAMERA refraction index")?;
    let r1 = cursor.float("CAMERA r1")?;
    let r2 = cursor.float("CAMERA r2")?;

    // optional polygonal lens shape, in aperture units
    let mut lens_shape = Vec::new();
    if cursor.peek() == Some("LENSE") {
        cursor.next();
        let count = cursor.int("LENSE triangle count")?;
        for _ in 0..count {
            let a = cursor.vec2("LENSE vertex")?.scale(aperture);
            let b = cursor.vec2("LENSE vertex")?.scale(aperture);
            let c = cursor.vec2("LENSE vertex")?.scale(aperture);
            lens_shape.push((a, b, c));
        }
    }

    Ok(Camera::new(center, u, v, r, aperture, focal_point, refraction_index, r1, r2, lens_shape))
}

/// Token cursor over the scene text. Comment lines are stripped and the
/// vector punctuation `(`, `,`, `)` separates like whitespace, so every
/// record grammar is purely positional.
struct Cursor<'a> {
    tokens: Vec<&'a str>,
    next: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(|line| {
                line.split(|c: char| c.is_whitespace() || c == '(' || c == ')' || c == ',')
            })
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens, next: 0 }
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.next).copied();
        if token.is_some() {
            self.next += 1;
        }
        token
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.next).copied()
    }

    fn word(&mut self, what: &str) -> Result<&'a str, SceneError> {
        self.next()
            .ok_or_else(|| SceneError::Parse(format!("unexpected end of file reading {what}")))
    }

    fn float(&mut self, what: &str) -> Result<f32, SceneError> {
        let token = self.word(what)?;
        token
            .parse()
            .map_err(|_| SceneError::Parse(format!("expected a number for {what}, found '{token}'")))
    }

    fn int(&mut self, what: &str) -> Result<usize, SceneError> {
        let token = self.word(what)?;
        token
            .parse()
            .map_err(|_| SceneError::Parse(format!("expected an integer for {what}, found '{token}'")))
    }

    fn vec3(&mut self, what: &str) -> Result<Vec3, SceneError> {
        Ok(Vec3(self.float(what)?, self.float(what)?, self.float(what)?))
    }

    fn vec2(&mut self, what: &str) -> Result<Vec2, SceneError> {
        Ok(Vec2(self.float(what)?, self.float(what)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATERIAL: &str = "(0.8,0.2,0.1) 0.5 20 (1,1,1) 2.0 1.0 0.0";

    #[test]
    fn parses_a_sphere_scene() {
        let text = format!(
            "# a comment line\n\
             SPHERE (0,1,2) 1.5 {MATERIAL}\n\
             LIGHT (0,10,0) (1,1,1) 0.5\n\
             AMBIENT (0.1,0.1,0.1)\n\
             AIR 1.0 1.0 (1,1,1)\n\
             CAMERA (0,0,4) (1,0,0) (0,1,0) 1 0.1 5 0 1 -1\n"
        );
        let scene = Scene::parse(&text).unwrap();
        assert_eq!(scene.primitives.len(), 1);
        let Primitive::Sphere(s) = &scene.primitives[0] else { panic!("expected a sphere") };
        assert_eq!(s.pos, Vec3(0.0, 1.0, 2.0));
        assert_eq!(s.radius, 1.5);
        assert_eq!(s.material.diffuse_color, Vec3(0.8, 0.2, 0.1));
        assert_eq!(s.material.specular_reflection, 0.5);
        assert_eq!(s.material.attenuation, Vec3(1.0, 1.0, 1.0));
        assert_eq!(s.material.electric_permittivity, 2.0);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.ambient.color, Vec3(0.1, 0.1, 0.1));
        // loader formula: pos = center + normalize(cross(u, v)) * r
        assert!((scene.camera.pos - Vec3(0.0, 0.0, 5.0)).norm() < 1e-6);
    }

    #[test]
    fn parses_polygon_and_box() {
        let text = format!(
            "POLYGON 4 (-1,-1,0) (1,-1,0) (1,1,0) (-1,1,0) {MATERIAL}\n\
             BOX (0,0,0) (0,0,1) (1,0,0) (0,1,0) {MATERIAL}\n\
             CAMERA (0,0,4) (1,0,0) (0,1,0) 1 0.1 5 0 1 -1\n"
        );
        let scene = Scene::parse(&text).unwrap();
        assert_eq!(scene.primitives.len(), 2);
        assert!(matches!(scene.primitives[0], Primitive::Polygon(_)));
        assert!(matches!(scene.primitives[1], Primitive::Cuboid(_)));
    }

    #[test]
    fn degenerate_records_are_skipped() {
        let text = format!(
            "POLYGON 3 (0,0,0) (1,0,0) (2,0,0) {MATERIAL}\n\
             ELLIPSOID (0,0,0) (1,0,0) (2,0,0) (0,0,1) {MATERIAL}\n\
             CAMERA (0,0,4) (1,0,0) (0,1,0) 1 0.1 5 0 1 -1\n"
        );
        let scene = Scene::parse(&text).unwrap();
        assert!(scene.primitives.is_empty());
    }

    #[test]
    fn camera_lens_shape_is_scaled_and_weighted() {
        let text = "CAMERA (0,0,4) (1,0,0) (0,1,0) 1 2.0 5 0 1 -1\n\
                    LENSE 2 (0,0) (1,0) (0,1) (0,0) (-1,0) (0,-1)\n";
        let scene = Scene::parse(text).unwrap();
        let tris = &scene.camera.lens_triangles;
        assert_eq!(tris.len(), 2);
        // vertices are multiplied by the aperture
        assert_eq!(tris[0].b, Vec2(2.0, 0.0));
        let total: f32 = tris.iter().map(|t| t.weight).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_tag_is_fatal() {
        assert!(matches!(Scene::parse("GARBAGE 1 2 3"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn missing_camera_is_fatal() {
        assert!(matches!(Scene::parse("AMBIENT (1,1,1)"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn truncated_record_is_fatal() {
        assert!(matches!(Scene::parse("SPHERE (0,0,0)"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn raycast_keeps_the_closest_hit() {
        let text = format!(
            "SPHERE (0,0,0) 1 {MATERIAL}\n\
             SPHERE (0,0,-5) 1 {MATERIAL}\n\
             CAMERA (0,0,4) (1,0,0) (0,1,0) 1 0.1 5 0 1 -1\n"
        );
        let scene = Scene::parse(&text).unwrap();
        let ray = Ray::new(Vec3(0.0, 0.0, 5.0), Vec3(0.0, 0.0, -1.0));
        let c = scene.raycast(&ray).unwrap();
        assert!((c.time - 4.0).abs() < 1e-4);
    }
}
