use modelhub_core::BoundingBox;
use tracing::info;

use crate::error::ConvertError;
use crate::format::{MeshFormat, RawAsset};
use crate::glb::{self, GLB_MIME};
use crate::object_url::{Blob, ObjectUrl, ObjectUrlRegistry};
use crate::scene::SceneGraph;
use crate::{obj, stl};

/// What the conversion result is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertMode {
    /// Local preview: the blob is also exposed through an object URL.
    Preview,
    /// Upload: only the blob is returned.
    Final,
}

/// Output of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConvertedAsset {
    pub blob: Blob,
    /// Present in preview mode only. The caller owns it and must revoke it
    /// through the converter's registry once the preview is gone.
    pub object_url: Option<ObjectUrl>,
    /// Bounding box of the source geometry before centering
    pub source_bounds: BoundingBox,
}

/// Converts uploaded STL/OBJ files into GLB blobs.
///
/// Each call is a single attempt; failed conversions are not retried.
#[derive(Debug, Clone, Default)]
pub struct MeshConverter {
    urls: ObjectUrlRegistry,
}

impl MeshConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the preview URLs handed out by this converter.
    pub fn registry(&self) -> &ObjectUrlRegistry {
        &self.urls
    }

    /// Convert an uploaded mesh to a GLB blob.
    pub async fn convert(&self, asset: &RawAsset, mode: ConvertMode) -> Result<ConvertedAsset, ConvertError> {
        let (bytes, source_bounds) = convert_to_glb(asset)?;
        let blob = Blob::new(bytes, GLB_MIME);

        let object_url = match mode {
            ConvertMode::Preview => Some(self.urls.create(blob.clone())),
            ConvertMode::Final => None,
        };

        info!(
            "Converted '{}' to GLB ({} bytes, {:?})",
            asset.filename,
            blob.len(),
            mode
        );

        Ok(ConvertedAsset {
            blob,
            object_url,
            source_bounds,
        })
    }

    /// Revoke a preview URL previously returned by [`MeshConverter::convert`].
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        self.urls.revoke(url)
    }
}

/// Parse, compose, and serialize `asset` without touching any registry.
pub fn compose_scene(asset: &RawAsset) -> Result<SceneGraph, ConvertError> {
    let format = MeshFormat::from_filename(&asset.filename)?;
    let geometry = match format {
        MeshFormat::Stl => stl::parse_stl(&asset.filename, &asset.bytes)?,
        MeshFormat::Obj => obj::parse_obj(&asset.filename, &asset.bytes)?,
    };
    SceneGraph::compose(&asset.filename, geometry)
}

fn convert_to_glb(asset: &RawAsset) -> Result<(Vec<u8>, BoundingBox), ConvertError> {
    let scene = compose_scene(asset)?;
    let bytes = glb::write_glb(&scene)?;
    glb::validate_glb(&bytes)?;
    Ok((bytes, scene.source_bounds))
}
