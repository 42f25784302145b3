//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from triangle soups, as produced by
//! STL parsers, and from indexed triangle lists.

use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::{Point3, Vector3};

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use super::merge::{merge_by_distance, remap_triangles, DEFAULT_MERGE_DISTANCE};
use crate::algo::normals::{face_normal_from_positions, smoothed_vertex_normal};
use crate::error::{MeshError, Result};

/// A parsed triangle mesh: positions plus one index triple per triangle.
///
/// Positions may repeat; they are welded by [`build_from_soup`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,

    /// Triangles as indices into `positions`.
    pub cells: Vec<[usize; 3]>,
}

impl TriangleSoup {
    /// Create a soup from positions and triangles.
    pub fn new(positions: Vec<Point3<f64>>, cells: Vec<[usize; 3]>) -> Self {
        Self { positions, cells }
    }

    /// Create a soup where every triangle has its own three positions.
    pub fn from_triangles(triangles: &[[Point3<f64>; 3]]) -> Self {
        let positions = triangles.iter().flatten().copied().collect();
        let cells = (0..triangles.len())
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        Self { positions, cells }
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.cells.len()
    }
}

/// Options controlling how a soup is turned into a mesh.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Positions closer than this distance are welded into one vertex.
    pub merge_distance: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            merge_distance: DEFAULT_MERGE_DISTANCE,
        }
    }
}

impl LoadOptions {
    /// Set the welding distance.
    pub fn with_merge_distance(mut self, distance: f64) -> Self {
        self.merge_distance = distance;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.merge_distance.is_finite() || self.merge_distance < 0.0 {
            return Err(MeshError::invalid_param(
                "merge_distance",
                self.merge_distance,
                "must be a finite, non-negative distance",
            ));
        }
        Ok(())
    }
}

/// Build a half-edge mesh from a triangle soup.
///
/// Positions are welded with [`merge_by_distance`], triangles that collapse
/// are dropped, then connectivity, face normals and vertex normals are
/// computed.
///
/// # Example
///
/// ```
/// use softshade::mesh::{build_from_soup, LoadOptions, TriangleSoup};
/// use nalgebra::Point3;
///
/// // Two triangles sharing an edge, stored STL-style.
/// let soup = TriangleSoup::from_triangles(&[
///     [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
///     [Point3::new(1.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
/// ]);
///
/// let mesh = build_from_soup(&soup, &LoadOptions::default()).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_faces(), 2);
/// ```
pub fn build_from_soup(soup: &TriangleSoup, options: &LoadOptions) -> Result<HalfEdgeMesh> {
    build_from_soup_with_stats(soup, options).map(|(mesh, _)| mesh)
}

/// What welding did to a soup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeldStats {
    /// Positions in the input soup.
    pub input_positions: usize,
    /// Unique positions left after welding.
    pub welded_positions: usize,
    /// Triangles dropped because welding collapsed them.
    pub dropped_triangles: usize,
}

/// Like [`build_from_soup`], also reporting what welding did.
pub fn build_from_soup_with_stats(soup: &TriangleSoup, options: &LoadOptions) -> Result<(HalfEdgeMesh, WeldStats)> {
    options.validate()?;

    let merged = merge_by_distance(&soup.positions, options.merge_distance);
    let (faces, dropped) = remap_triangles(&soup.cells, &merged.remap)?;
    if dropped > 0 {
        debug!("dropped {} degenerate triangles", dropped);
    }

    let stats = WeldStats {
        input_positions: soup.positions.len(),
        welded_positions: merged.positions.len(),
        dropped_triangles: dropped,
    };
    let mesh = build_from_triangles(&merged.positions, &faces)?;
    Ok((mesh, stats))
}

/// Build a half-edge mesh from vertices and triangle faces.
///
/// Triangles with repeated indices are skipped. Vertices are used as given;
/// no welding takes place. Fails with [`MeshError::NonManifoldEdge`] when an
/// edge is claimed twice in the same direction and with
/// [`MeshError::NonManifoldVertex`] when the faces around a vertex split into
/// several fans.
///
/// # Example
///
/// ```
/// use softshade::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_halfedges(), 6);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<HalfEdgeMesh> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    mesh.vertices
        .extend(vertices.iter().map(|&p| Vertex::new(p)));

    // Every directed edge created so far, faceless or not.
    let mut edges: HashMap<(usize, usize), HalfEdgeId> = HashMap::new();

    for face in faces {
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            continue;
        }

        let mut hes = [HalfEdgeId::invalid(); 3];
        for i in 0..3 {
            let (v0, v1) = (face[i], face[(i + 1) % 3]);
            hes[i] = match edges.get(&(v0, v1)).copied() {
                Some(he) if mesh.is_boundary_halfedge(he) => he,
                Some(_) => return Err(MeshError::NonManifoldEdge { v0, v1 }),
                None => {
                    let (he, opp) = add_edge_pair(&mut mesh, v0, v1);
                    edges.insert((v0, v1), he);
                    edges.insert((v1, v0), opp);
                    he
                }
            };
        }

        add_face(&mut mesh, hes);
    }

    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }

    // The faces around each vertex must form one fan.
    if let Some(v) = mesh
        .vertex_ids()
        .find(|&v| mesh.fan_size(v) != mesh.vertex_faces(v).count())
    {
        return Err(MeshError::NonManifoldVertex { vertex: v.index() });
    }

    let isolated = compute_vertex_normals(&mut mesh);
    if isolated > 0 {
        warn!("{} vertices are not referenced by any face", isolated);
    }

    debug!(
        "built half-edge mesh: {} vertices, {} faces, {} half-edges ({} on boundary)",
        mesh.num_vertices(),
        mesh.num_faces(),
        mesh.num_halfedges(),
        mesh.num_boundary_halfedges()
    );

    Ok(mesh)
}

/// Create a faceless half-edge `v0 -> v1` together with its opposite.
fn add_edge_pair(mesh: &mut HalfEdgeMesh, v0: usize, v1: usize) -> (HalfEdgeId, HalfEdgeId) {
    let he = HalfEdgeId::new(mesh.halfedges.len());
    let opp = HalfEdgeId::new(mesh.halfedges.len() + 1);

    mesh.halfedges.push(HalfEdge::new(VertexId::new(v0), opp));
    mesh.halfedges.push(HalfEdge::new(VertexId::new(v1), he));
    mesh.vertices[v0].halfedges.push(he);
    mesh.vertices[v1].halfedges.push(opp);

    (he, opp)
}

fn add_face(mesh: &mut HalfEdgeMesh, halfedges: [HalfEdgeId; 3]) {
    let id = FaceId::new(mesh.faces.len());
    for &he in &halfedges {
        mesh.halfedges[he.index()].face = id;
    }

    let [p0, p1, p2] = halfedges.map(|he| *mesh.position(mesh.origin(he)));
    mesh.faces.push(Face {
        halfedges,
        normal: face_normal_from_positions(&p0, &p1, &p2),
    });
}

/// Fill in `Vertex::normal`, returning the number of vertices without faces.
fn compute_vertex_normals(mesh: &mut HalfEdgeMesh) -> usize {
    let normals: Vec<Option<Vector3<f64>>> = mesh
        .vertex_ids()
        .map(|v| smoothed_vertex_normal(mesh, v))
        .collect();

    let mut isolated = 0;
    for (vertex, normal) in mesh.vertices.iter_mut().zip(normals) {
        match normal {
            Some(n) => vertex.normal = n,
            None => isolated += 1,
        }
    }
    isolated
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    let vertices: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();

    let faces: Vec<[usize; 3]> = mesh
        .face_ids()
        .map(|f| mesh.face_triangle(f).map(|v| v.index()))
        .collect();

    (vertices, faces)
}
