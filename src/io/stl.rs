//! STL (stereolithography) format support.
//!
//! Both binary and ASCII files are read through `stl_io`. Files are always
//! written as binary STL.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::Point3;

use crate::algo::normals::face_normal_from_positions;
use crate::error::{MeshError, Result};
use crate::geometry::ShadingBuffers;
use crate::mesh::{HalfEdgeMesh, TriangleSoup};

/// Read a triangle soup from any STL source.
///
/// `stl_io` already shares bit-identical corners between facets; welding
/// within a distance is left to the mesh builder.
pub fn read_soup<R: Read + Seek>(reader: &mut R) -> std::io::Result<TriangleSoup> {
    let stl = stl_io::read_stl(reader)?;

    let positions = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let cells = stl.faces.iter().map(|tri| tri.vertices).collect();

    Ok(TriangleSoup::new(positions, cells))
}

/// Load a triangle soup from an STL file.
///
/// # Example
///
/// ```no_run
/// use softshade::io::stl;
///
/// let soup = stl::load("model.stl").unwrap();
/// println!("{} triangles", soup.num_triangles());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let soup = read_soup(&mut reader).map_err(|e| MeshError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if soup.cells.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "STL file contains no triangles".to_string(),
        });
    }

    Ok(soup)
}

/// Save a welded mesh to a binary STL file.
///
/// Each facet carries its face normal.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let triangles = mesh
        .face_ids()
        .map(|f| triangle(&mesh.face_positions(f)))
        .collect::<Vec<_>>();
    write_file(&triangles, path.as_ref())
}

/// Save shading buffers to a binary STL file.
///
/// STL has no per-corner normals, so only the positions survive; facet
/// normals are recomputed from them.
pub fn save_buffers<P: AsRef<Path>>(buffers: &ShadingBuffers, path: P) -> Result<()> {
    let triangles = buffers
        .positions
        .chunks_exact(9)
        .map(|t| {
            triangle(&[
                Point3::new(t[0] as f64, t[1] as f64, t[2] as f64),
                Point3::new(t[3] as f64, t[4] as f64, t[5] as f64),
                Point3::new(t[6] as f64, t[7] as f64, t[8] as f64),
            ])
        })
        .collect::<Vec<_>>();
    write_file(&triangles, path.as_ref())
}

/// Write triangles to any sink as binary STL.
pub fn write_triangles<W: Write>(writer: &mut W, triangles: &[[Point3<f64>; 3]]) -> std::io::Result<()> {
    let triangles = triangles.iter().map(triangle).collect::<Vec<_>>();
    stl_io::write_stl(writer, triangles.iter())
}

fn write_file(triangles: &[stl_io::Triangle], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| MeshError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    writer.flush()?;

    Ok(())
}

fn triangle(p: &[Point3<f64>; 3]) -> stl_io::Triangle {
    let n = face_normal_from_positions(&p[0], &p[1], &p[2]);
    stl_io::Triangle {
        normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
        vertices: [
            stl_io::Vertex::new([p[0].x as f32, p[0].y as f32, p[0].z as f32]),
            stl_io::Vertex::new([p[1].x as f32, p[1].y as f32, p[1].z as f32]),
            stl_io::Vertex::new([p[2].x as f32, p[2].y as f32, p[2].z as f32]),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::cube_soup;
    use crate::mesh::{build_from_soup, LoadOptions};
    use std::io::Cursor;

    fn cube_triangles() -> Vec<[Point3<f64>; 3]> {
        let soup = cube_soup();
        soup.cells
            .iter()
            .map(|c| [soup.positions[c[0]], soup.positions[c[1]], soup.positions[c[2]]])
            .collect()
    }

    #[test]
    fn test_read_binary() {
        let mut bytes = Vec::new();
        write_triangles(&mut bytes, &cube_triangles()).unwrap();
        // 80-byte header, count, 50 bytes per facet.
        assert_eq!(bytes.len(), 84 + 12 * 50);

        let soup = read_soup(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(soup.num_triangles(), 12);

        let mesh = build_from_soup(&soup, &LoadOptions::default()).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_read_ascii() {
        let text = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
endsolid tri
";
        let soup = read_soup(&mut Cursor::new(text.as_bytes())).unwrap();
        assert_eq!(soup.num_triangles(), 1);
        assert_eq!(soup.positions.len(), 3);
        assert_eq!(soup.positions[soup.cells[0][1]], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_triangle_normal() {
        let t = triangle(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        assert_eq!(t.normal[2], 1.0);
    }
}
