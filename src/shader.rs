use crate::algebra::{reflect, refract, Vec3};
use crate::config::Config;
use crate::material::Material;
use crate::ray::Ray;
use crate::sampling::sample_in_sphere;
use crate::scene::Scene;
use rand::Rng;

const BLACK: Vec3 = Vec3(0.0, 0.0, 0.0);

/// Recursive color of a ray cast into the scene from inside the medium
/// with the given permittivity and permeability. Returned unclamped; the
/// sampler clamps once per pixel.
pub fn shade(
    scene: &Scene,
    config: &Config,
    ray: &Ray,
    depth: u32,
    permittivity: f32,
    permeability: f32,
    rng: &mut impl Rng,
) -> Vec3 {
    if depth >= config.depth {
        return BLACK;
    }

    let Some(contact) = scene.raycast(ray) else {
        return BLACK;
    };

    let incident = ray.dir.normalize();
    let mut normal = contact.normal.normalize();
    let mut cos_i = -incident.dot(normal);

    let (next_permittivity, next_permeability) = if cos_i > 0.0 {
        // entering the surface
        (
            contact.material.electric_permittivity,
            contact.material.magnetic_permeability,
        )
    } else {
        // exiting: revert to the scene medium. Nested media are not
        // tracked, so leaving an object embedded in another resolves
        // against air rather than the enclosing object.
        normal = -normal;
        cos_i = -cos_i;
        (scene.air.electric_permittivity, scene.air.magnetic_permeability)
    };

    // contact points nudged off the surface on either side
    let point_out = contact.point + normal.scale(config.epsilon);
    let point_in = contact.point - normal.scale(config.epsilon);

    let reflectance = reflection_coeff(
        permittivity,
        permeability,
        next_permittivity,
        next_permeability,
        cos_i,
    );
    let k = contact.material.specular_reflection;
    let reflected = reflectance * k;
    let transmitted = (1.0 - reflectance) * k;
    let absorbed = 1.0 - k;

    let mut color = raycast_lights(
        scene,
        incident,
        config.shadow_samples,
        point_out,
        contact.normal,
        &contact.material,
        rng,
    )
    .scale(absorbed);

    if transmitted > 0.0 {
        let n_i = (permittivity * permeability).sqrt();
        let n_t = (next_permittivity * next_permeability).sqrt();
        let refr_dir = refract(incident, normal, n_i / n_t);

        let refr_ray = Ray::new(point_in, refr_dir.normalize());
        color += shade(
            scene,
            config,
            &refr_ray,
            depth + 1,
            next_permittivity,
            next_permeability,
            rng,
        )
        .scale(transmitted);
    }

    if reflected > 0.0 {
        let mirror = reflect(incident, normal);
        // with zero roughness every sample would repeat the mirror direction
        let samples = if contact.material.roughness == 0.0 {
            1
        } else {
            config.reflection_samples.max(1)
        };

        let mut reflection_color = BLACK;
        for sample in 0..samples {
            let target = if sample == 0 {
                point_out + mirror
            } else {
                sample_in_sphere(rng, point_out + mirror, contact.material.roughness)
            };
            let new_ray = Ray::new(point_out, (target - point_out).normalize());
            reflection_color += shade(
                scene,
                config,
                &new_ray,
                depth + 1,
                permittivity,
                permeability,
                rng,
            )
            .scale(reflected);
        }
        color += reflection_color.scale(1.0 / samples as f32);
    }

    // homogeneous loss in the enclosing medium between contacts
    let traversed = (contact.point - ray.origin).norm();
    color * scene.air.attenuation.map(|a| a.powf(traversed))
}

/// Phong shading with stochastic soft shadows. The first shadow ray per
/// light targets the light center, the rest sample its sphere.
fn raycast_lights(
    scene: &Scene,
    incident: Vec3,
    samples: u32,
    point: Vec3,
    normal: Vec3,
    material: &Material,
    rng: &mut impl Rng,
) -> Vec3 {
    let ambient = scene.ambient.color * material.diffuse_color;
    let mut diffuse = BLACK;
    let mut specular = BLACK;

    for light in &scene.lights {
        let to_center = light.pos - point;
        let light_dist2 = to_center.dot(to_center);

        let mut occlusions = 0u32;
        for sample in 0..samples {
            let target = if sample == 0 {
                light.pos
            } else {
                sample_in_sphere(rng, light.pos, light.radius)
            };
            let shadow_ray = Ray::new(point, (target - point).normalize());

            if let Some(occluder) = scene.raycast(&shadow_ray) {
                let blocked = occluder.point - point;
                if blocked.dot(blocked) < light_dist2 {
                    occlusions += 1;
                }
            }
        }
        let shadow = if samples == 0 {
            1.0
        } else {
            1.0 - occlusions as f32 / samples as f32
        };

        let l = to_center.normalize();
        diffuse += (light.color * material.diffuse_color).scale(l.dot(normal).max(0.0) * shadow);

        let r = reflect(incident, normal);
        let phong = r.dot(l).powf(material.specular_exponent).max(0.0);
        specular += material.diffuse_color.scale(material.specular_reflection * phong * shadow);
    }

    ambient + diffuse + specular
}

/// Unpolarized Fresnel reflectance at the interface between two media
/// given by their electric permittivity and magnetic permeability.
/// Returns 1 under total internal reflection.
pub fn reflection_coeff(eps_i: f32, mu_i: f32, eps_t: f32, mu_t: f32, cos_i: f32) -> f32 {
    let n_i = (eps_i * mu_i).sqrt();
    let n_t = (eps_t * mu_t).sqrt();
    let ior = n_i / n_t;

    let radicand = 1.0 - ior * ior * (1.0 - cos_i * cos_i);
    if radicand < 0.0 {
        return 1.0;
    }
    let cos_t = radicand.sqrt();

    let mu_ratio = mu_i / mu_t;
    let perpendicular = (ior * cos_i - mu_ratio * cos_t) / (ior * cos_i + mu_ratio * cos_t);
    let parallel = (mu_ratio * cos_i - ior * cos_t) / (mu_ratio * cos_i + ior * cos_t);

    0.5 * (perpendicular * perpendicular + parallel * parallel)
}
