use glam::Vec3;

use super::SceneError;

/// Size of the per-sphere uniform array the ray tracer declares.
pub const MAX_SPHERES: usize = 32;

/// Surface response. The discriminant is the value the shader receives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(i32)]
pub enum MaterialKind {
    Metal = 0,
    Lambertian = 1,
}

impl MaterialKind {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub kind: MaterialKind,
    pub radius: f32,
    pub center: Vec3,
    pub albedo: Vec3,
}

impl Sphere {
    pub const fn new(kind: MaterialKind, radius: f32, center: Vec3, albedo: Vec3) -> Self {
        Self {
            kind,
            radius,
            center,
            albedo,
        }
    }
}

/// Sphere list that fits the uniform array.
///
/// Built wholesale; there is no incremental editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneList {
    spheres: Vec<Sphere>,
}

impl SceneList {
    pub fn new(spheres: Vec<Sphere>) -> Result<Self, SceneError> {
        if spheres.len() > MAX_SPHERES {
            return Err(SceneError::CapacityExceeded {
                len: spheres.len(),
                capacity: MAX_SPHERES,
            });
        }
        Ok(Self { spheres })
    }

    #[inline]
    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

/// Ground, two diffuse spheres and a metal one.
pub fn demo_scene() -> SceneList {
    SceneList {
        spheres: vec![
            Sphere::new(
                MaterialKind::Lambertian,
                100.0,
                Vec3::new(0.0, -100.5, -1.0),
                Vec3::new(0.8, 0.8, 0.0),
            ),
            Sphere::new(
                MaterialKind::Lambertian,
                0.5,
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::new(0.7, 0.3, 0.3),
            ),
            Sphere::new(
                MaterialKind::Metal,
                0.5,
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(0.8, 0.8, 0.8),
            ),
            Sphere::new(
                MaterialKind::Lambertian,
                0.5,
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(0.1, 0.2, 0.5),
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Sphere {
        Sphere::new(MaterialKind::Metal, 1.0, Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn material_discriminants_match_shader_values() {
        assert_eq!(MaterialKind::Metal.as_i32(), 0);
        assert_eq!(MaterialKind::Lambertian.as_i32(), 1);
    }

    #[test]
    fn capacity_is_inclusive() {
        assert_eq!(SceneList::new(vec![sphere(); MAX_SPHERES]).unwrap().len(), 32);
        assert_eq!(
            SceneList::new(vec![sphere(); MAX_SPHERES + 1]),
            Err(SceneError::CapacityExceeded {
                len: 33,
                capacity: 32
            })
        );
    }

    #[test]
    fn demo_scene_has_four_spheres() {
        let scene = demo_scene();
        assert_eq!(scene.len(), 4);
        assert!(scene.spheres().iter().all(|s| s.radius > 0.0));
    }
}
