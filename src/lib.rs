//! # Softshade
//!
//! Crease-aware soft shading for triangle meshes.
//!
//! Softshade welds a triangle soup into a half-edge mesh and computes one
//! normal per face corner. Around each vertex, neighbouring face normals are
//! averaged until an edge whose dihedral angle exceeds a threshold is
//! reached, so smooth regions shade smoothly while hard edges stay sharp.
//!
//! ## Features
//!
//! - **Half-edge data structure**: flat arrays with type-safe indices
//! - **Vertex welding**: merge positions closer than a distance
//! - **Crease-aware normals**: per-corner normals with an angle threshold
//! - **GPU-ready buffers**: per-corner positions, normals and indices
//! - **File formats**: STL and PLY
//!
//! ## Quick Start
//!
//! ```no_run
//! use softshade::prelude::*;
//!
//! let soup = softshade::io::load("model.stl").unwrap();
//! let options = NormalOptions::default().with_threshold_degrees(45.0);
//! let geometry = SoftShadingGeometry::new(&soup, LoadOptions::default(), options).unwrap();
//!
//! println!("Faces: {}", geometry.mesh().num_faces());
//! softshade::io::save_shaded(geometry.buffers(), "shaded.ply").unwrap();
//! ```
//!
//! ## Corner Normals
//!
//! ```
//! use softshade::prelude::*;
//! use softshade::algo::normals::corner_normals;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! let normals = corner_normals(&mesh, &NormalOptions::default()).unwrap();
//!
//! // Every tetrahedron edge is sharper than 30 degrees: flat shading.
//! let f = FaceId::new(1);
//! for n in &normals[f.index()] {
//!     assert!((n - mesh.face_normal(f)).norm() < 1e-12);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod geometry;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use softshade::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{NormalOptions, ShadingMode};
    pub use crate::error::{MeshError, Result};
    pub use crate::geometry::{ShadingBuffers, SoftShadingGeometry};
    pub use crate::mesh::{
        build_from_soup, build_from_triangles, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh,
        LoadOptions, TriangleSoup, Vertex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
