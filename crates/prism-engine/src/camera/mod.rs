//! Projection provider for the screen pass.

mod ortho;

pub use ortho::Camera;
