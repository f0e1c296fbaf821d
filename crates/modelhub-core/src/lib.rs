//! Modelhub Core - Shared types for the modelhub asset pipeline
//!
//! This crate provides the value types used across the pipeline crates:
//! - Mathematical primitives (re-exported from glam)
//! - Axis-aligned bounding boxes computed from mesh vertices
//! - Transform and color types used when composing a converted scene

pub mod bounds;
pub mod types;

pub use bounds::BoundingBox;
pub use glam::{Mat4, Quat, Vec3};
pub use types::{Color, Transform};
