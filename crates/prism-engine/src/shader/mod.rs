//! GPU programs.
//!
//! A [`Shader`] compiles its stage sources through the graphics context, links
//! them against a [`UniformLayout`](crate::gfx::UniformLayout), and caches the
//! uniform locations it uploads to every frame.

mod error;
mod layouts;
mod program;
mod source;
mod value;

pub use error::ShaderError;
pub use layouts::{
    names, ray_uniform_layout, screen_uniform_layout, SPHERE_MEMBERS,
};
pub use program::{GraphicsStages, LinkPolicy, Shader};
pub use source::{FileSourceLoader, MemorySources, ShaderSourceLoader};
pub use value::UniformValue;
