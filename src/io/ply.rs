//! PLY (Stanford polygon) format support.
//!
//! Loading goes through `ply-rs` and accepts ASCII and binary files with
//! any numeric vertex property type. Polygons are fan-triangulated.
//! Shaded output is written as ASCII PLY with one vertex per corner.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{MeshError, Result};
use crate::geometry::ShadingBuffers;
use crate::mesh::TriangleSoup;

/// Read a triangle soup from any PLY source.
///
/// Errors are plain messages; [`load`] attaches the path.
pub fn read_soup<R: Read>(reader: &mut R) -> std::result::Result<TriangleSoup, String> {
    let mut reader = BufReader::new(reader);
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader).map_err(|e| e.to_string())?;

    let vertex_element = ply.payload.get("vertex").ok_or("PLY file has no vertex element")?;
    let positions = vertex_element
        .iter()
        .map(|vertex| {
            Ok(Point3::new(
                coordinate(vertex, "x")?,
                coordinate(vertex, "y")?,
                coordinate(vertex, "z")?,
            ))
        })
        .collect::<std::result::Result<Vec<_>, String>>()?;

    let face_element = ply.payload.get("face").ok_or("PLY file has no face element")?;
    let mut cells = Vec::with_capacity(face_element.len());
    for face in face_element {
        let polygon = corner_indices(face)?;
        for i in 1..polygon.len().saturating_sub(1) {
            cells.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    Ok(TriangleSoup::new(positions, cells))
}

/// Load a triangle soup from a PLY file.
///
/// # Example
///
/// ```no_run
/// use softshade::io::ply;
///
/// let soup = ply::load("model.ply").unwrap();
/// println!("{} triangles", soup.num_triangles());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);

    let soup = read_soup(&mut reader).map_err(|message| MeshError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;

    if soup.cells.is_empty() {
        return Err(MeshError::LoadError {
            path: path.to_path_buf(),
            message: "PLY file contains no faces".to_string(),
        });
    }

    Ok(soup)
}

/// A scalar vertex property of any numeric type, widened to `f64`.
fn coordinate(vertex: &DefaultElement, axis: &str) -> std::result::Result<f64, String> {
    let value = match vertex.get(axis) {
        Some(Property::Float(v)) => *v as f64,
        Some(Property::Double(v)) => *v,
        Some(Property::Int(v)) => *v as f64,
        Some(Property::UInt(v)) => *v as f64,
        Some(Property::Short(v)) => *v as f64,
        Some(Property::UShort(v)) => *v as f64,
        Some(Property::Char(v)) => *v as f64,
        Some(Property::UChar(v)) => *v as f64,
        Some(_) => return Err(format!("vertex property {} is not a scalar", axis)),
        None => return Err(format!("vertex missing {} coordinate", axis)),
    };
    Ok(value)
}

/// The polygon's vertex indices, under either common property name.
fn corner_indices(face: &DefaultElement) -> std::result::Result<Vec<usize>, String> {
    let list = face
        .get("vertex_indices")
        .or_else(|| face.get("vertex_index"))
        .ok_or("face missing vertex_indices property")?;

    match list {
        Property::ListInt(v) => widen(v),
        Property::ListUInt(v) => widen(v),
        Property::ListShort(v) => widen(v),
        Property::ListUShort(v) => widen(v),
        Property::ListChar(v) => widen(v),
        Property::ListUChar(v) => widen(v),
        _ => Err("face vertex_indices is not an integer list".to_string()),
    }
}

fn widen<T: Copy>(values: &[T]) -> std::result::Result<Vec<usize>, String>
where
    usize: TryFrom<T>,
{
    values
        .iter()
        .map(|&i| usize::try_from(i).map_err(|_| "negative vertex index in face".to_string()))
        .collect()
}

/// Write shading buffers as ASCII PLY with per-corner normals.
pub fn write_shaded<W: Write>(writer: &mut W, buffers: &ShadingBuffers) -> std::io::Result<()> {
    let corners = buffers.num_corners();

    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "comment Generated by softshade")?;
    writeln!(writer, "element vertex {}", corners)?;
    writeln!(writer, "property float x")?;
    writeln!(writer, "property float y")?;
    writeln!(writer, "property float z")?;
    writeln!(writer, "property float nx")?;
    writeln!(writer, "property float ny")?;
    writeln!(writer, "property float nz")?;
    writeln!(writer, "element face {}", corners / 3)?;
    writeln!(writer, "property list uchar int vertex_indices")?;
    writeln!(writer, "end_header")?;

    for v in buffers.interleaved() {
        let [x, y, z] = v.position;
        let [nx, ny, nz] = v.normal;
        writeln!(writer, "{} {} {} {} {} {}", x, y, z, nx, ny, nz)?;
    }

    for tri in buffers.indices.chunks_exact(3) {
        writeln!(writer, "3 {} {} {}", tri[0], tri[1], tri[2])?;
    }

    Ok(())
}

/// Save shading buffers to an ASCII PLY file.
pub fn save_shaded<P: AsRef<Path>>(buffers: &ShadingBuffers, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write_shaded(&mut writer, buffers)?;

    writer.flush()?;
    Ok(())
}
