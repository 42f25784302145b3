//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII in, binary out; facet normals only |
//! | PLY | `.ply` | ✓ | ✓ | Any vertex type in, ASCII out with per-corner normals |
//!
//! Loading yields a [`TriangleSoup`]; welding and topology happen in
//! [`build_from_soup`](crate::mesh::build_from_soup).
//!
//! # Usage
//!
//! ```no_run
//! use softshade::geometry::SoftShadingGeometry;
//! use softshade::io::{load, save_shaded};
//!
//! let soup = load("model.stl").unwrap();
//! let geometry = SoftShadingGeometry::new(&soup, Default::default(), Default::default()).unwrap();
//! save_shaded(geometry.buffers(), "shaded.ply").unwrap();
//! ```

pub mod ply;
pub mod stl;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::geometry::ShadingBuffers;
use crate::mesh::{HalfEdgeMesh, TriangleSoup};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    fn detect(path: &Path) -> Result<Format> {
        Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        })
    }
}

/// Load a triangle soup with automatic format detection.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriangleSoup> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::Stl => stl::load(path),
        Format::Ply => ply::load(path),
    }
}

/// Save a welded mesh. Only STL is supported.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::Stl => stl::save(mesh, path),
        Format::Ply => Err(MeshError::SaveError {
            path: path.to_path_buf(),
            message: "welded meshes are saved as STL; use save_shaded for PLY".to_string(),
        }),
    }
}

/// Save shading buffers with automatic format detection.
///
/// PLY keeps the per-corner normals; STL keeps only positions.
pub fn save_shaded<P: AsRef<Path>>(buffers: &ShadingBuffers, path: P) -> Result<()> {
    let path = path.as_ref();
    match Format::detect(path)? {
        Format::Stl => stl::save_buffers(buffers, path),
        Format::Ply => ply::save_shaded(buffers, path),
    }
}
