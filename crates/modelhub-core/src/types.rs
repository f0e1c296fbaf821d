//! Scene composition types used by the converter

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform of a scene node: translation, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a transform that only translates
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Compute the model matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix().transform_point3(point)
    }

    /// Whether this transform is a pure translation
    pub fn is_translation_only(&self) -> bool {
        self.rotation == Quat::IDENTITY && self.scale == Vec3::ONE
    }
}

/// RGBA color with floating point components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Scene background behind converted models
    pub const NEUTRAL_GRAY: Color = Color::rgb(0.94, 0.94, 0.94);
    /// Base color of the material applied to every converted mesh
    pub const MATERIAL_GRAY: Color = Color::rgb(0.8, 0.8, 0.8);

    /// Create a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Convert to an array [r, g, b, a]
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert to an array [r, g, b], dropping alpha
    pub fn to_rgb_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_matrix() {
        let transform = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let translation = transform.matrix().col(3).truncate();
        assert_eq!(translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.is_translation_only());
    }

    #[test]
    fn test_transform_point() {
        let transform = Transform::from_translation(Vec3::new(-5.0, 0.0, 2.0));
        let moved = transform.transform_point(Vec3::new(5.0, 1.0, -2.0));
        assert!((moved - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_preview_palette() {
        assert_eq!(Color::NEUTRAL_GRAY.to_rgb_array(), [0.94; 3]);
        assert_eq!(Color::MATERIAL_GRAY.to_array(), [0.8, 0.8, 0.8, 1.0]);
        assert_eq!(Color::default(), Color::WHITE);
    }
}
