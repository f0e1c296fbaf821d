use std::borrow::Cow;
use std::io::Cursor;

use tracing::debug;

use crate::error::ConvertError;
use crate::mesh::ParsedGeometry;

/// Parse an STL buffer. Binary and ASCII files are both accepted; `stl_io`
/// detects which one it is.
///
/// Every facet becomes its own three vertices so the stored facet normal
/// shades it flat.
pub fn parse_stl(filename: &str, bytes: &[u8]) -> Result<ParsedGeometry, ConvertError> {
    let source = name_bare_solid(bytes);
    let mut cursor = Cursor::new(source.as_ref());
    let mesh = stl_io::read_stl(&mut cursor).map_err(|e| ConvertError::parse(filename, e.to_string()))?;

    let mut geometry = ParsedGeometry::default();
    for face in &mesh.faces {
        let mut corners = [[0.0f32; 3]; 3];
        for (corner, &vi) in corners.iter_mut().zip(face.vertices.iter()) {
            let v = mesh
                .vertices
                .get(vi)
                .ok_or_else(|| ConvertError::parse(filename, format!("vertex index {} out of range", vi)))?;
            *corner = [v[0], v[1], v[2]];
        }
        let n = face.normal;
        geometry.push_triangle(corners, Some([n[0], n[1], n[2]]));
    }

    debug!(
        "STL '{}': {} facets, {} unique vertices",
        filename,
        mesh.faces.len(),
        mesh.vertices.len()
    );

    Ok(geometry)
}

/// `stl_io` only recognizes ASCII files whose first line starts with
/// `"solid "`, but the solid name is optional. Give a bare `solid` line the
/// separator it expects so such files are not read as binary.
fn name_bare_solid(bytes: &[u8]) -> Cow<'_, [u8]> {
    match bytes.strip_prefix(b"solid") {
        Some(rest) if matches!(rest.first(), Some(b'\n' | b'\r')) => {
            let mut named = Vec::with_capacity(bytes.len() + 1);
            named.extend_from_slice(b"solid ");
            named.extend_from_slice(rest);
            Cow::Owned(named)
        }
        _ => Cow::Borrowed(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_io::{Normal, Triangle, Vertex};

    const ASCII_TRIANGLE: &str = "solid tri
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 2 0 0
      vertex 0 2 0
    endloop
  endfacet
endsolid tri
";

    #[test]
    fn test_parse_ascii() {
        let geometry = parse_stl("tri.stl", ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.positions[1], [2.0, 0.0, 0.0]);
        assert_eq!(geometry.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_ascii_without_solid_name() {
        let source = "solid\n facet normal 0 0 1\n outer loop\n vertex 0 0 0\n vertex 1 0 0\n \
                      vertex 0 1 0\n endloop\n endfacet\nendsolid\n";
        let geometry = parse_stl("a.stl", source.as_bytes()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.positions[2], [0.0, 1.0, 0.0]);

        let crlf = source.replace('\n', "\r\n");
        let geometry = parse_stl("a.stl", crlf.as_bytes()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn test_binary_header_starting_with_solid() {
        let triangles = vec![Triangle {
            normal: Normal::new([0.0, 0.0, 1.0]),
            vertices: [
                Vertex::new([0.0, 0.0, 0.0]),
                Vertex::new([1.0, 0.0, 0.0]),
                Vertex::new([0.0, 1.0, 0.0]),
            ],
        }];
        let mut cursor = Cursor::new(Vec::new());
        stl_io::write_stl(&mut cursor, triangles.iter()).unwrap();
        let mut bytes = cursor.into_inner();
        bytes[..10].copy_from_slice(b"solid part");

        let geometry = parse_stl("part.stl", &bytes).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn test_parse_binary() {
        let triangles = vec![Triangle {
            normal: Normal::new([0.0, 0.0, 0.0]),
            vertices: [
                Vertex::new([0.0, 0.0, 0.0]),
                Vertex::new([0.0, 0.0, 3.0]),
                Vertex::new([3.0, 0.0, 0.0]),
            ],
        }];
        let mut cursor = Cursor::new(Vec::new());
        stl_io::write_stl(&mut cursor, triangles.iter()).unwrap();

        let geometry = parse_stl("tri.stl", cursor.get_ref()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        // Zero normal in the file, recomputed from winding.
        assert_eq!(geometry.normals[0], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_garbage_is_parse_failure() {
        let result = parse_stl("junk.stl", b"not a mesh");
        assert!(matches!(result, Err(ConvertError::ParseFailure { .. })));
    }
}
