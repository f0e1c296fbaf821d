//! Modelhub Assets - Mesh upload conversion
//!
//! Converts uploaded STL and OBJ files into a single origin-centered GLB
//! scene, and hands out revocable object URLs for local previews.

mod converter;
mod error;
mod format;
mod glb;
mod mesh;
mod obj;
mod object_url;
mod scene;
mod stl;

pub use converter::{compose_scene, ConvertMode, ConvertedAsset, MeshConverter};
pub use error::ConvertError;
pub use format::{MeshFormat, RawAsset, UploadPolicy};
pub use glb::{validate_glb, write_glb, GLB_MIME};
pub use mesh::ParsedGeometry;
pub use obj::parse_obj;
pub use object_url::{Blob, ObjectUrl, ObjectUrlRegistry};
pub use scene::{AmbientLight, DirectionalLight, Material, MeshNode, SceneGraph};
pub use stl::parse_stl;
