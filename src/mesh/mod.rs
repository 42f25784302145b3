//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the steps that
//! turn a triangle soup into one.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`]. Vertices, half-edges and faces are
//! stored in flat arrays and refer to each other through the type-safe
//! indices [`VertexId`], [`HalfEdgeId`] and [`FaceId`].
//!
//! # Construction
//!
//! Soups are welded with [`merge_by_distance`], degenerate triangles are
//! dropped, and the remaining triangles are linked into a half-edge graph:
//!
//! ```
//! use softshade::mesh::{build_from_soup, LoadOptions, TriangleSoup};
//! use nalgebra::Point3;
//!
//! let soup = TriangleSoup::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.5, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! );
//!
//! let mesh = build_from_soup(&soup, &LoadOptions::default()).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

mod builder;
mod halfedge;
mod index;
mod merge;

#[cfg(test)]
pub(crate) mod test_meshes;

pub use builder::{
    build_from_soup, build_from_soup_with_stats, build_from_triangles, to_face_vertex, LoadOptions, TriangleSoup,
    WeldStats,
};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
pub use index::{FaceId, HalfEdgeId, VertexId};
pub use merge::{merge_by_distance, remap_triangles, MergedVertices, DEFAULT_MERGE_DISTANCE};
