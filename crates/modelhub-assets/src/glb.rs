//! Binary glTF (GLB) serialization of converted scenes.

use modelhub_core::{Quat, Vec3};
use serde_json::json;
use tracing::{debug, error};

use crate::error::ConvertError;
use crate::scene::SceneGraph;

/// MIME type of the converter output.
pub const GLB_MIME: &str = "model/gltf-binary";

/// GLB magic number: "glTF"
const GLB_MAGIC: u32 = 0x46546C67;
const GLB_VERSION: u32 = 2;
const CHUNK_TYPE_JSON: u32 = 0x4E4F534A;
const CHUNK_TYPE_BIN: u32 = 0x004E4942;
const GLB_HEADER_LEN: usize = 12;

/// glTF component types
const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;

/// glTF buffer view targets
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;

const TRIANGLES: u32 = 4;

// Buffer contents are cast straight from memory; GLB is little-endian.
const _: () = assert!(cfg!(target_endian = "little"));

/// Serialize a scene to a single GLB blob.
///
/// The directional light is written with `KHR_lights_punctual`. glTF has no
/// ambient light, so it and the background color go in the scene `extras`.
pub fn write_glb(scene: &SceneGraph) -> Result<Vec<u8>, ConvertError> {
    let geometry = &scene.mesh.geometry;

    // ── Binary buffer: positions, normals, indices ───────────
    let mut bin: Vec<u8> = Vec::new();

    let pos_offset = bin.len();
    bin.extend_from_slice(bytemuck::cast_slice(&geometry.positions));
    let pos_length = bin.len() - pos_offset;

    let norm_offset = bin.len();
    bin.extend_from_slice(bytemuck::cast_slice(&geometry.normals));
    let norm_length = bin.len() - norm_offset;

    let idx_offset = bin.len();
    bin.extend_from_slice(bytemuck::cast_slice(&geometry.indices));
    let idx_length = bin.len() - idx_offset;

    pad_to_four(&mut bin, 0);

    let local_bounds = scene.source_bounds;
    let light = &scene.directional_light;
    let light_rotation = Quat::from_rotation_arc(Vec3::NEG_Z, light.direction());
    let material = &scene.mesh.material;

    // ── JSON document ────────────────────────────────────────
    let document = json!({
        "asset": {
            "version": "2.0",
            "generator": "modelhub"
        },
        "extensionsUsed": ["KHR_lights_punctual"],
        "extensions": {
            "KHR_lights_punctual": {
                "lights": [{
                    "name": "Key",
                    "type": "directional",
                    "color": light.color.to_rgb_array(),
                    "intensity": light.intensity
                }]
            }
        },
        "scene": 0,
        "scenes": [{
            "name": "Scene",
            "nodes": [0, 1],
            "extras": {
                "background": scene.background.to_rgb_array(),
                "ambientLight": {
                    "color": scene.ambient_light.color.to_rgb_array(),
                    "intensity": scene.ambient_light.intensity
                }
            }
        }],
        "nodes": [
            {
                "name": scene.mesh.name,
                "mesh": 0,
                "translation": scene.mesh.transform.translation.to_array()
            },
            {
                "name": "DirectionalLight",
                "translation": light.position.to_array(),
                "rotation": light_rotation.to_array(),
                "extensions": {
                    "KHR_lights_punctual": { "light": 0 }
                }
            }
        ],
        "meshes": [{
            "name": scene.mesh.name,
            "primitives": [{
                "attributes": {
                    "POSITION": 0,
                    "NORMAL": 1
                },
                "indices": 2,
                "material": 0,
                "mode": TRIANGLES
            }]
        }],
        "materials": [{
            "name": "Neutral",
            "pbrMetallicRoughness": {
                "baseColorFactor": material.base_color.to_array(),
                "metallicFactor": material.metallic,
                "roughnessFactor": material.roughness
            },
            "doubleSided": true
        }],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": FLOAT,
                "count": geometry.vertex_count(),
                "type": "VEC3",
                "min": local_bounds.min.to_array(),
                "max": local_bounds.max.to_array()
            },
            {
                "bufferView": 1,
                "componentType": FLOAT,
                "count": geometry.normals.len(),
                "type": "VEC3"
            },
            {
                "bufferView": 2,
                "componentType": UNSIGNED_INT,
                "count": geometry.indices.len(),
                "type": "SCALAR"
            }
        ],
        "bufferViews": [
            {
                "buffer": 0,
                "byteOffset": pos_offset,
                "byteLength": pos_length,
                "target": ARRAY_BUFFER
            },
            {
                "buffer": 0,
                "byteOffset": norm_offset,
                "byteLength": norm_length,
                "target": ARRAY_BUFFER
            },
            {
                "buffer": 0,
                "byteOffset": idx_offset,
                "byteLength": idx_length,
                "target": ELEMENT_ARRAY_BUFFER
            }
        ],
        "buffers": [{
            "byteLength": bin.len()
        }]
    });

    let mut json_bytes = serde_json::to_vec(&document)
        .map_err(|e| serialize_failure(format!("glTF JSON encoding failed: {}", e)))?;
    pad_to_four(&mut json_bytes, b' ');

    // ── Assemble GLB ─────────────────────────────────────────
    let total_length = GLB_HEADER_LEN + 8 + json_bytes.len() + 8 + bin.len();
    let total_length_u32 = u32::try_from(total_length)
        .map_err(|_| serialize_failure(format!("GLB of {} bytes exceeds 4 GiB", total_length)))?;

    let mut glb = Vec::with_capacity(total_length);
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&total_length_u32.to_le_bytes());

    glb.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_JSON.to_le_bytes());
    glb.extend_from_slice(&json_bytes);

    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_TYPE_BIN.to_le_bytes());
    glb.extend_from_slice(&bin);

    debug!(
        "GLB '{}': {} bytes (json {}, bin {})",
        scene.mesh.name,
        glb.len(),
        json_bytes.len(),
        bin.len()
    );

    Ok(glb)
}

/// Check that `bytes` is a well-formed GLB holding exactly one mesh and a
/// binary chunk. A failure here means the writer broke its own output.
pub fn validate_glb(bytes: &[u8]) -> Result<gltf::Gltf, ConvertError> {
    let fail = |reason: String| serialize_failure(format!("invalid GLB: {}", reason));

    if bytes.len() < GLB_HEADER_LEN {
        return Err(fail(format!("output is {} bytes, shorter than a GLB header", bytes.len())));
    }
    let word = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    if word(0) != GLB_MAGIC {
        return Err(fail(format!("bad magic 0x{:08x}", word(0))));
    }
    if word(4) != GLB_VERSION {
        return Err(fail(format!("unexpected GLB version {}", word(4))));
    }
    if word(8) as usize != bytes.len() {
        return Err(fail(format!("header length {} does not match {} bytes", word(8), bytes.len())));
    }

    let parsed = gltf::Gltf::from_slice(bytes).map_err(|e| fail(format!("glTF parse failed: {}", e)))?;

    if parsed.blob.as_ref().map_or(true, |b| b.is_empty()) {
        return Err(fail("missing BIN chunk".to_string()));
    }
    let mesh_count = parsed.document.meshes().count();
    if mesh_count != 1 {
        return Err(fail(format!("expected 1 mesh, found {}", mesh_count)));
    }

    Ok(parsed)
}

/// Every serialization failure is logged here, once, with full detail.
fn serialize_failure(reason: String) -> ConvertError {
    error!("GLB serialization failed: {}", reason);
    ConvertError::SerializeFailure(reason)
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::ParsedGeometry;

    fn sample_scene() -> SceneGraph {
        let mut geometry = ParsedGeometry::default();
        geometry.push_triangle([[2.0, 2.0, 2.0], [4.0, 2.0, 2.0], [2.0, 4.0, 2.0]], None);
        SceneGraph::compose("sample", geometry).unwrap()
    }

    #[test]
    fn test_header_and_chunks() {
        let glb = write_glb(&sample_scene()).unwrap();
        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes(glb[8..12].try_into().unwrap()) as usize, glb.len());
        assert_eq!(&glb[16..20], b"JSON");
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_output_validates_and_carries_lights() {
        let glb = write_glb(&sample_scene()).unwrap();
        let parsed = validate_glb(&glb).unwrap();

        let lights: Vec<_> = parsed.document.lights().map(|l| l.collect()).unwrap_or_default();
        assert_eq!(lights.len(), 1);
        assert!(matches!(lights[0].kind(), gltf::khr_lights_punctual::Kind::Directional));

        let scene = parsed.document.default_scene().unwrap();
        let extras = scene.extras().as_ref().unwrap().get();
        assert!(extras.contains("ambientLight"));
        assert!(extras.contains("background"));

        let material = parsed.document.materials().next().unwrap();
        assert!(material.pbr_metallic_roughness().base_color_texture().is_none());
    }

    #[test]
    fn test_validate_rejects_truncated_output() {
        let glb = write_glb(&sample_scene()).unwrap();
        match validate_glb(&glb[..glb.len() - 4]) {
            Err(ConvertError::SerializeFailure(reason)) => {
                assert!(reason.starts_with("invalid GLB: header length"), "{}", reason)
            }
            other => panic!("expected serialize failure, got {:?}", other.map(|_| ())),
        }
        assert!(matches!(validate_glb(b"glTF"), Err(ConvertError::SerializeFailure(_))));
    }

    #[test]
    fn test_validate_rejects_json_gltf() {
        let result = validate_glb(br#"{"asset":{"version":"2.0"}}"#);
        assert!(matches!(result, Err(ConvertError::SerializeFailure(_))));
    }
}
