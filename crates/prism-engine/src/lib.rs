//! Prism engine crate.
//!
//! A compute-shader sphere ray tracer: a compute pass traces the scene into an
//! off-screen canvas, and a screen pass blits that canvas with a textured quad.
//! This crate owns the frame pipeline, the GPU resource lifecycle, and the
//! platform glue (window host, wgpu context) around it.

pub mod camera;
pub mod canvas;
pub mod core;
pub mod device;
pub mod gfx;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod time;
pub mod window;
