use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::{GfxError, ShaderStage, UniformType};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("cannot open shader file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no shader source registered for {0}")]
    MissingSource(PathBuf),

    #[error("{stage} failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("program failed to link:\n{0}")]
    Link(String),

    #[error("uniform `{0}` was never registered")]
    UnknownUniform(String),

    #[error("uniform `{name}` is {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: UniformType,
        found: UniformType,
    },

    #[error("{len} spheres exceed the uniform capacity of {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },

    #[error(transparent)]
    Gfx(#[from] GfxError),
}
