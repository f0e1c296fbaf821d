//! Axis-aligned bounding boxes

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box given by its min and max corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    /// Compute the bounding box of a set of points from their per-axis extrema.
    ///
    /// Returns `None` when there are no points or when any coordinate is not
    /// finite, since the box would be undefined.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a [f32; 3]>,
    {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut any = false;

        for p in points {
            let v = Vec3::from_array(*p);
            if !v.is_finite() {
                return None;
            }
            min = min.min(v);
            max = max.max(v);
            any = true;
        }

        any.then_some(Self { min, max })
    }

    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent of the box along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Whether every axis has zero extent (a single point)
    pub fn is_point(&self) -> bool {
        self.size() == Vec3::ZERO
    }
}
