use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::mesh::ParsedGeometry;

/// Parse a Wavefront OBJ buffer.
///
/// The buffer is decoded as UTF-8 here, so callers pass raw bytes. All objects
/// and groups in the file are merged into a single mesh. Material libraries
/// are never loaded; the converter always applies its own neutral material.
pub fn parse_obj(filename: &str, bytes: &[u8]) -> Result<ParsedGeometry, ConvertError> {
    let text = String::from_utf8_lossy(bytes);

    let load_opts = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj_buf(&mut text.as_bytes(), &load_opts, |path| {
        debug!("Ignoring material library '{}' referenced by OBJ", path.display());
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|e| ConvertError::parse(filename, e.to_string()))?;

    let mut geometry = ParsedGeometry::default();
    for model in models {
        let mesh = model.mesh;
        if mesh.material_id.is_some() {
            warn!("OBJ '{}' object '{}' references a material; it will be ignored", filename, model.name);
        }

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let normals: Vec<[f32; 3]> = if mesh.normals.len() == mesh.positions.len() {
            mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect()
        } else {
            Vec::new()
        };
        let indices = if mesh.indices.is_empty() {
            (0..positions.len() as u32).collect()
        } else {
            mesh.indices
        };

        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(ConvertError::parse(filename, format!("face index {} out of range", bad)));
        }

        let mut part = ParsedGeometry {
            positions,
            normals,
            indices,
        };
        part.indices.truncate(part.indices.len() - part.indices.len() % 3);
        if part.normals.is_empty() {
            part.fill_missing_normals();
        }
        geometry.merge(part);
    }

    debug!(
        "OBJ '{}': {} vertices, {} triangles",
        filename,
        geometry.vertex_count(),
        geometry.triangle_count()
    );

    Ok(geometry)
}
