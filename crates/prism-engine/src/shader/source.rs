use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::ShaderError;
use crate::gfx::ShaderStage;

/// Supplies stage source text by path.
pub trait ShaderSourceLoader {
    fn load(&self, stage: ShaderStage, path: &Path) -> Result<String, ShaderError>;
}

/// Reads sources from the filesystem.
#[derive(Debug, Default, Copy, Clone)]
pub struct FileSourceLoader;

impl ShaderSourceLoader for FileSourceLoader {
    fn load(&self, stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
        log::debug!("loading {stage} from {}", path.display());
        fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory sources keyed by path.
#[derive(Debug, Default, Clone)]
pub struct MemorySources {
    sources: HashMap<PathBuf, String>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> &mut Self {
        self.sources.insert(path.into(), source.into());
        self
    }

    pub fn with(mut self, path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl ShaderSourceLoader for MemorySources {
    fn load(&self, _stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| ShaderError::MissingSource(path.to_path_buf()))
    }
}
