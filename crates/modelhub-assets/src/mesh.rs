use modelhub_core::{BoundingBox, Vec3};

/// Triangle mesh produced by one of the format parsers. Owned by a single
/// conversion and never shared.
#[derive(Debug, Clone, Default)]
pub struct ParsedGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ParsedGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounding box recomputed from the current positions.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.positions)
    }

    /// Whether at least one triangle encloses a non-zero area.
    pub fn has_surface(&self) -> bool {
        self.indices.chunks_exact(3).any(|tri| {
            let corner = |i: u32| self.positions.get(i as usize).copied().map(Vec3::from_array);
            match (corner(tri[0]), corner(tri[1]), corner(tri[2])) {
                (Some(a), Some(b), Some(c)) => {
                    let n = (b - a).cross(c - a);
                    n.is_finite() && n.length_squared() > 0.0
                }
                _ => false,
            }
        })
    }

    /// Append one un-indexed triangle with a flat normal.
    ///
    /// Falls back to the winding-order normal when `normal` is zero or not finite.
    pub(crate) fn push_triangle(&mut self, corners: [[f32; 3]; 3], normal: Option<[f32; 3]>) {
        let n = normal
            .map(Vec3::from_array)
            .filter(|n| n.is_finite() && n.length_squared() > 0.0)
            .map(|n| n.normalize())
            .unwrap_or_else(|| face_normal(&corners));

        let base = self.positions.len() as u32;
        for corner in corners {
            self.positions.push(corner);
            self.normals.push(n.to_array());
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Replace missing or zero normals with flat face normals.
    pub(crate) fn fill_missing_normals(&mut self) {
        if self.normals.len() != self.positions.len() {
            self.normals = vec![[0.0; 3]; self.positions.len()];
        }

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let corners = [self.positions[a], self.positions[b], self.positions[c]];
            let n = face_normal(&corners).to_array();
            for i in [a, b, c] {
                let existing = Vec3::from_array(self.normals[i]);
                if !existing.is_finite() || existing.length_squared() == 0.0 {
                    self.normals[i] = n;
                }
            }
        }
    }

    /// Append another mesh, rebasing its indices.
    pub(crate) fn merge(&mut self, other: ParsedGeometry) {
        let base = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }
}

fn face_normal(corners: &[[f32; 3]; 3]) -> Vec3 {
    let [a, b, c] = corners.map(Vec3::from_array);
    let n = (b - a).cross(c - a);
    if n.length_squared() > 0.0 && n.is_finite() {
        n.normalize()
    } else {
        Vec3::Z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_triangle_computes_normal() {
        let mut geometry = ParsedGeometry::default();
        geometry.push_triangle(
            [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            Some([0.0, 0.0, 0.0]),
        );
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn test_merge_rebases_indices() {
        let mut a = ParsedGeometry::default();
        a.push_triangle([[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None);
        let mut b = ParsedGeometry::default();
        b.push_triangle([[0.0; 3], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]], None);
        a.merge(b);
        assert_eq!(a.indices, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(a.vertex_count(), 6);
    }

    #[test]
    fn test_has_surface() {
        let mut geometry = ParsedGeometry::default();
        geometry.push_triangle([[1.0; 3]; 3], None);
        geometry.push_triangle([[0.0; 3], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]], None);
        assert!(!geometry.has_surface());

        geometry.push_triangle([[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None);
        assert!(geometry.has_surface());
    }

    #[test]
    fn test_fill_missing_normals() {
        let mut geometry = ParsedGeometry {
            positions: vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            normals: Vec::new(),
            indices: vec![0, 1, 2],
        };
        geometry.fill_missing_normals();
        assert_eq!(geometry.normals, vec![[1.0, 0.0, 0.0]; 3]);
    }
}
