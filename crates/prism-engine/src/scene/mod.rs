//! Scene data: a fixed, compiled-in list of spheres.

mod error;
mod sphere;

pub use error::SceneError;
pub use sphere::{demo_scene, MaterialKind, SceneList, Sphere, MAX_SPHERES};
