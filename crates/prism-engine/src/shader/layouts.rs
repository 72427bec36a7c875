//! Uniform layouts of the two shipped programs.

use crate::gfx::{ColorFormat, ImageAccess, UniformLayout, UniformType};
use crate::scene::MAX_SPHERES;

pub mod names {
    pub const FRAME_INDEX: &str = "FrameIndex";
    pub const SPHERE_NUM: &str = "SphereNum";
    pub const SPHERE: &str = "Sphere";
    pub const OUTPUT: &str = "Output";
    pub const MODEL_VIEW_PROJECTION: &str = "ModelViewProjectionMatrix";
    pub const BASE_TEXTURE: &str = "BaseTexture";
    pub const USE_TEXTURE: &str = "UseTexture";

    /// `Sphere[index].member`
    pub fn sphere_member(index: usize, member: &str) -> String {
        format!("{SPHERE}[{index}].{member}")
    }
}

/// Members of one element of the `Sphere` uniform array, in declaration order.
pub const SPHERE_MEMBERS: [(&str, UniformType); 4] = [
    ("Type", UniformType::Int),
    ("Radius", UniformType::Float),
    ("Center", UniformType::Vec3),
    ("Albedo", UniformType::Vec3),
];

/// Interface of `raytracer.wgsl`.
pub fn ray_uniform_layout() -> UniformLayout {
    UniformLayout::builder()
        .field(names::FRAME_INDEX, UniformType::UInt)
        .field(names::SPHERE_NUM, UniformType::Int)
        .struct_array(names::SPHERE, MAX_SPHERES as u32, &SPHERE_MEMBERS)
        .storage_image(names::OUTPUT, ColorFormat::Rgba8, ImageAccess::WriteOnly)
        .build()
}

/// Interface of `screen.vert.wgsl` + `screen.frag.wgsl`.
pub fn screen_uniform_layout() -> UniformLayout {
    UniformLayout::builder()
        .field(names::MODEL_VIEW_PROJECTION, UniformType::Mat4)
        .sampler(names::BASE_TEXTURE)
        .build()
}
