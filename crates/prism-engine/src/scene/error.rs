use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has {len} spheres, capacity is {capacity}")]
    CapacityExceeded { len: usize, capacity: usize },
}
