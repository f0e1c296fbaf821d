//! Scene composition for converted uploads.
//!
//! Every conversion produces the same shape of scene: one centered mesh with a
//! neutral material, one directional light, one ambient light, and a fixed
//! background color.

use modelhub_core::{BoundingBox, Color, Transform, Vec3};

use crate::error::ConvertError;
use crate::mesh::ParsedGeometry;

/// Non-textured material applied to every converted mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: Color,
    pub metallic: f32,
    pub roughness: f32,
}

impl Material {
    pub const NEUTRAL: Material = Material {
        base_color: Color::MATERIAL_GRAY,
        metallic: 0.1,
        roughness: 0.7,
    };
}

/// Directional light placed on the +X+Y+Z diagonal, aimed at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    pub const PREVIEW: DirectionalLight = DirectionalLight {
        color: Color::WHITE,
        intensity: 1.0,
        position: Vec3::new(1.0, 1.0, 1.0),
    };

    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (-self.position).normalize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub const PREVIEW: AmbientLight = AmbientLight {
        color: Color::WHITE,
        intensity: 0.5,
    };
}

/// The single mesh node of a converted scene.
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    pub geometry: ParsedGeometry,
    pub material: Material,
    pub transform: Transform,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub background: Color,
    pub mesh: MeshNode,
    pub directional_light: DirectionalLight,
    pub ambient_light: AmbientLight,
    /// Bounding box of the geometry as it was in the source file
    pub source_bounds: BoundingBox,
}

impl SceneGraph {
    /// Compose the scene around parsed geometry, translating the mesh so its
    /// bounding-box center sits at the world origin.
    pub fn compose(name: &str, geometry: ParsedGeometry) -> Result<Self, ConvertError> {
        if geometry.triangle_count() == 0 {
            return Err(ConvertError::parse(name, "mesh contains no triangles"));
        }
        let source_bounds = geometry
            .bounding_box()
            .ok_or_else(|| ConvertError::parse(name, "bounding box is undefined"))?;
        if source_bounds.is_point() || !geometry.has_surface() {
            return Err(ConvertError::parse(name, "mesh is degenerate"));
        }

        let mesh = MeshNode {
            name: name.to_string(),
            geometry,
            material: Material::NEUTRAL,
            transform: Transform::from_translation(-source_bounds.center()),
        };

        Ok(Self {
            background: Color::NEUTRAL_GRAY,
            mesh,
            directional_light: DirectionalLight::PREVIEW,
            ambient_light: AmbientLight::PREVIEW,
            source_bounds,
        })
    }

    /// Bounding box of the mesh after its node transform is applied.
    pub fn world_bounds(&self) -> Option<BoundingBox> {
        let moved: Vec<[f32; 3]> = self
            .mesh
            .geometry
            .positions
            .iter()
            .map(|p| self.mesh.transform.transform_point(Vec3::from_array(*p)).to_array())
            .collect();
        BoundingBox::from_points(&moved)
    }
}
