//! Core engine-facing contracts.
//!
//! This module defines the interface between the window host (platform loop)
//! and the frame orchestrator, so neither side needs to know the other's type.

mod app;

pub use app::{AppControl, WindowEvents};
