//! Crease detection.
//!
//! An edge is a crease when the normals of its two faces differ by more than
//! a threshold angle. These are the edges along which
//! [`corner_normals`](super::normals::corner_normals) stops smoothing.

use crate::mesh::{HalfEdgeId, HalfEdgeMesh};

/// Angle in radians between the normals of the two faces along `he`.
///
/// Returns `None` when either side of the edge has no face.
pub fn dihedral_angle(mesh: &HalfEdgeMesh, he: HalfEdgeId) -> Option<f64> {
    let f0 = mesh.face_of(he);
    let f1 = mesh.face_of(mesh.opposite(he));
    if !f0.is_valid() || !f1.is_valid() {
        return None;
    }
    Some(mesh.face_normal(f0).angle(mesh.face_normal(f1)))
}

/// All edges whose dihedral angle exceeds `threshold` radians.
///
/// Each edge is reported once, by the lower-numbered of its two half-edges.
pub fn crease_edges(mesh: &HalfEdgeMesh, threshold: f64) -> Vec<HalfEdgeId> {
    mesh.halfedge_ids()
        .filter(|&he| he < mesh.opposite(he))
        .filter(|&he| dihedral_angle(mesh, he).is_some_and(|angle| angle > threshold))
        .collect()
}
