//! Half-edge mesh data structure.
//!
//! This module provides the half-edge representation used for soft shading.
//!
//! # Structure
//!
//! - Every edge is stored as two **half-edges** pointing in opposite
//!   directions. They are always created as a pair, so each half-edge has
//!   exactly one **opposite**.
//! - A half-edge knows its **origin** vertex and the **face** that owns it.
//!   The side of an edge that no triangle has claimed (yet) has an invalid
//!   face ID; after construction these are the boundary half-edges.
//! - Each face stores its three half-edges in cycle order together with its
//!   unit normal.
//! - Each vertex stores all of its outgoing half-edges, faceless ones
//!   included, and its smoothed normal.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// All half-edges originating at this vertex, in creation order.
    pub halfedges: Vec<HalfEdgeId>,

    /// The normalized sum of the normals of all incident faces.
    pub normal: Vector3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedges: Vec::new(),
            normal: Vector3::zeros(),
        }
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge originates from.
    pub origin: VertexId,

    /// The half-edge running along the same edge in reverse direction.
    pub opposite: HalfEdgeId,

    /// The face this half-edge belongs to.
    /// Invalid while no triangle owns this side of the edge.
    pub face: FaceId,
}

impl HalfEdge {
    /// Create a faceless half-edge.
    pub fn new(origin: VertexId, opposite: HalfEdgeId) -> Self {
        Self {
            origin,
            opposite,
            face: FaceId::invalid(),
        }
    }

    /// Check if this half-edge is on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// A triangular face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// The three half-edges of the face, in cycle order.
    pub halfedges: [HalfEdgeId; 3],

    /// The unit face normal.
    pub normal: Vector3<f64>,
}

/// A half-edge mesh of triangles.
///
/// All elements are stored in flat arrays and reference each other by index.
/// Meshes are normally created with [`build_from_soup`](super::build_from_soup)
/// or [`build_from_triangles`](super::build_from_triangles).
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // A closed mesh has 3F half-edges; open meshes need some more.
        let num_halfedges = num_faces * 3 + num_faces / 2;

        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges, faceless ones included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Get the unit normal of a face.
    #[inline]
    pub fn face_normal(&self, f: FaceId) -> &Vector3<f64> {
        &self.face(f).normal
    }

    /// Get the smoothed normal of a vertex.
    #[inline]
    pub fn vertex_normal(&self, v: VertexId) -> &Vector3<f64> {
        &self.vertex(v).normal
    }

    // ==================== Topology Queries ====================

    /// Get the opposite half-edge.
    #[inline]
    pub fn opposite(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).opposite
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).origin
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.opposite(he))
    }

    /// Get the face of a half-edge (invalid on the boundary side).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Get the three vertices of a face.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        self.face(f).halfedges.map(|he| self.origin(he))
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        self.face_triangle(f).map(|v| *self.position(v))
    }

    /// The half-edge of `f` that originates at `v`.
    pub fn corner_at(&self, f: FaceId, v: VertexId) -> Option<HalfEdgeId> {
        self.face(f)
            .halfedges
            .iter()
            .copied()
            .find(|&he| self.origin(he) == v)
    }

    /// The half-edge preceding `he` in its face (the one ending at `he`'s origin).
    pub fn prev_in_face(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        let f = self.face_of(he);
        if !f.is_valid() {
            return None;
        }
        let hes = &self.face(f).halfedges;
        let k = hes.iter().position(|&h| h == he)?;
        Some(hes[(k + 2) % 3])
    }

    /// Step to the next corner in the fan around `v`.
    ///
    /// Crosses the edge of `he` into the neighbouring face and returns the
    /// half-edge of that face which starts at `v`. Returns `None` when the
    /// edge is on the boundary or the neighbouring face does not contain `v`.
    pub fn next_around(&self, he: HalfEdgeId, v: VertexId) -> Option<HalfEdgeId> {
        let f = self.face_of(self.opposite(he));
        if !f.is_valid() {
            return None;
        }
        self.corner_at(f, v)
    }

    /// Step to the previous corner in the fan around the origin of `he`.
    ///
    /// Inverse of [`next_around`](Self::next_around).
    pub fn prev_around(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        let across = self.opposite(self.prev_in_face(he)?);
        if self.is_boundary_halfedge(across) {
            None
        } else {
            Some(across)
        }
    }

    /// Count the faces reached by stepping around `v` from one of its corners.
    ///
    /// Equals the number of faces around `v` exactly when they form a single
    /// fan, open or closed.
    pub fn fan_size(&self, v: VertexId) -> usize {
        let outgoing = &self.vertex(v).halfedges;
        let Some(start) = outgoing.iter().copied().find(|&he| self.face_of(he).is_valid()) else {
            return 0;
        };
        let limit = outgoing.len();

        let mut count = 1;
        let mut current = start;
        while let Some(next) = self.next_around(current, v) {
            if next == start || count >= limit {
                return count;
            }
            count += 1;
            current = next;
        }

        // Open fan: pick up the faces behind the start as well.
        current = start;
        while let Some(prev) = self.prev_around(current) {
            if count >= limit {
                break;
            }
            count += 1;
            current = prev;
        }
        count
    }

    /// Check if a vertex touches a boundary edge.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        self.vertex(v).halfedges.iter().any(|&he| {
            self.is_boundary_halfedge(he) || self.is_boundary_halfedge(self.opposite(he))
        })
    }

    /// Check if every half-edge is owned by a face.
    pub fn is_closed(&self) -> bool {
        self.halfedges.iter().all(|he| !he.is_boundary())
    }

    /// Count the half-edges without a face.
    pub fn num_boundary_halfedges(&self) -> usize {
        self.halfedges.iter().filter(|he| he.is_boundary()).count()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over the faces owning the outgoing half-edges of a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex(v)
            .halfedges
            .iter()
            .map(|&he| self.face_of(he))
            .filter(|f| f.is_valid())
    }

    // ==================== Geometry ====================

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let (mut min, mut max) = (first, first);

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check if the connectivity is consistent.
    ///
    /// Opposites must be mutual and run between the same vertices in reverse,
    /// faces must own their three half-edges and both sides of an edge must
    /// not belong to the same face.
    pub fn is_valid(&self) -> bool {
        for (i, he) in self.halfedges.iter().enumerate() {
            let id = HalfEdgeId::new(i);
            let opp = self.halfedge(he.opposite);
            if opp.opposite != id || opp.origin == he.origin {
                return false;
            }
            if he.face.is_valid() && he.face == opp.face {
                return false;
            }
            if !self.vertex(he.origin).halfedges.contains(&id) {
                return false;
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            let id = FaceId::new(i);
            for k in 0..3 {
                let he = face.halfedges[k];
                let next = face.halfedges[(k + 1) % 3];
                if self.face_of(he) != id || self.dest(he) != self.origin(next) {
                    return false;
                }
            }
        }

        true
    }
}
