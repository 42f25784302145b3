//! Face, vertex and crease-aware corner normals.
//!
//! Three flavours of shading normal are available for every face corner:
//!
//! - **Flat**: the face's own normal.
//! - **Smooth**: the vertex normal, i.e. the normalized sum of the normals of
//!   all faces around the vertex.
//! - **Crease**: the normalized sum over the part of the vertex fan that
//!   contains the corner's face, where the fan is cut at every edge whose
//!   dihedral angle exceeds a threshold. Flat regions shade smoothly while
//!   sharp edges stay sharp.
//!
//! # Example
//!
//! ```
//! use softshade::algo::normals::{corner_normals, NormalOptions};
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
//! let mesh = build_from_soup(&soup, &LoadOptions::default()).unwrap();
//!
//! let options = NormalOptions::default().with_threshold_degrees(45.0);
//! let normals = corner_normals(&mesh, &options).unwrap();
//! assert!((normals[0][0].z - 1.0).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use log::debug;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

/// Default crease threshold in degrees.
pub const DEFAULT_THRESHOLD_DEGREES: f64 = 30.0;

const NORMALIZE_EPSILON: f64 = 1e-12;

/// Which normal each face corner receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// Smooth within regions bounded by creases.
    #[default]
    Crease,
    /// Smooth everywhere (vertex normals).
    Smooth,
    /// Faceted (face normals).
    Flat,
}

/// Options for corner normal computation.
#[derive(Debug, Clone)]
pub struct NormalOptions {
    /// Dihedral angle in radians above which an edge is a crease.
    pub threshold_angle: f64,

    /// Whether to compute faces in parallel (default: false).
    pub parallel: bool,
}

impl Default for NormalOptions {
    fn default() -> Self {
        Self {
            threshold_angle: DEFAULT_THRESHOLD_DEGREES.to_radians(),
            parallel: false,
        }
    }
}

impl NormalOptions {
    /// Set the crease threshold in radians.
    pub fn with_threshold_angle(mut self, radians: f64) -> Self {
        self.threshold_angle = radians;
        self
    }

    /// Set the crease threshold in degrees.
    pub fn with_threshold_degrees(mut self, degrees: f64) -> Self {
        self.threshold_angle = degrees.to_radians();
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the threshold is a usable angle.
    pub fn validate(&self) -> Result<()> {
        let t = self.threshold_angle;
        // Allow a little slack so that 180° converted to radians passes.
        if !t.is_finite() || t < 0.0 || t > PI + 1e-9 {
            return Err(MeshError::invalid_param(
                "threshold_angle",
                t,
                "must be an angle within [0, pi] radians",
            ));
        }
        Ok(())
    }
}

/// Unit normal of the triangle `p0, p1, p2`, or zero if it has no area.
pub fn face_normal_from_positions(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    normalize_or_zero(&(p1 - p0).cross(&(p2 - p0)))
}

/// Normalize `v`, mapping (near) zero vectors to zero instead of NaN.
pub fn normalize_or_zero(v: &Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(NORMALIZE_EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// Normalized sum of the normals of all faces around `v`.
///
/// Returns `None` for a vertex that no face references.
pub fn smoothed_vertex_normal(mesh: &HalfEdgeMesh, v: VertexId) -> Option<Vector3<f64>> {
    let mut faces = mesh.vertex_faces(v).peekable();
    faces.peek()?;
    let sum = faces.fold(Vector3::zeros(), |acc, f| acc + mesh.face_normal(f));
    Some(normalize_or_zero(&sum))
}

/// The normal of every face, indexed by face.
pub fn face_normals(mesh: &HalfEdgeMesh) -> Vec<Vector3<f64>> {
    mesh.face_ids().map(|f| *mesh.face_normal(f)).collect()
}

/// The smoothed normal of every vertex, indexed by vertex.
pub fn vertex_normals(mesh: &HalfEdgeMesh) -> Vec<Vector3<f64>> {
    mesh.vertex_ids().map(|v| *mesh.vertex_normal(v)).collect()
}

/// Crease-aware normal of a single face corner.
///
/// `corner` is the half-edge of the face that starts at the corner's vertex.
/// The fan of faces around that vertex is walked starting at the corner's own
/// face, accumulating face normals. Edges whose dihedral angle exceeds
/// `threshold` (radians) cut the fan; the result is the normalized sum over
/// the run of faces that contains the corner's face.
///
/// Vertices on the boundary have an open fan. It is walked in both
/// directions from the corner's face until a crease or the boundary is hit.
pub fn corner_normal(mesh: &HalfEdgeMesh, corner: HalfEdgeId, threshold: f64) -> Result<Vector3<f64>> {
    let v = mesh.origin(corner);
    let malformed = || MeshError::MalformedFan { vertex: v.index() };

    let own = mesh.face_of(corner);
    if !own.is_valid() {
        return Err(malformed());
    }
    let limit = mesh.vertex(v).halfedges.len();

    // prefix[k] holds the sum of the first k face normals of the fan;
    // a break at k separates fan faces k - 1 and k.
    let mut prefix = vec![Vector3::zeros()];
    let mut breaks: Vec<usize> = Vec::new();
    let mut current = corner;

    loop {
        let n1 = mesh.face_normal(mesh.face_of(current));
        let sum = prefix[prefix.len() - 1] + n1;
        prefix.push(sum);

        let across = mesh.face_of(mesh.opposite(current));
        if !across.is_valid() {
            let forward = match breaks.first() {
                Some(&first) => prefix[first],
                None => sum,
            };
            let normal = open_fan_normal(mesh, corner, forward, threshold, limit)?;
            return Ok(finish(normal, mesh.face_normal(own)));
        }

        if n1.angle(mesh.face_normal(across)) > threshold {
            breaks.push(prefix.len() - 1);
        }

        current = mesh.next_around(current, v).ok_or_else(malformed)?;
        if current == corner {
            break;
        }
        if prefix.len() > limit {
            return Err(malformed());
        }
    }

    let total = prefix[prefix.len() - 1];
    let normal = match (breaks.first(), breaks.last()) {
        (Some(&first), Some(&last)) => prefix[first] + (total - prefix[last]),
        _ => total,
    };
    Ok(finish(normal, mesh.face_normal(own)))
}

/// Continue an open fan backwards from `corner`, adding faces to `sum`.
fn open_fan_normal(
    mesh: &HalfEdgeMesh,
    corner: HalfEdgeId,
    mut sum: Vector3<f64>,
    threshold: f64,
    limit: usize,
) -> Result<Vector3<f64>> {
    let mut current = corner;
    let mut steps = 0;

    while let Some(prev) = mesh.prev_around(current) {
        let n_current = mesh.face_normal(mesh.face_of(current));
        let n_prev = mesh.face_normal(mesh.face_of(prev));
        if n_current.angle(n_prev) > threshold {
            break;
        }

        sum += n_prev;
        current = prev;
        steps += 1;
        if steps > limit {
            return Err(MeshError::MalformedFan {
                vertex: mesh.origin(corner).index(),
            });
        }
    }

    Ok(sum)
}

fn finish(sum: Vector3<f64>, fallback: &Vector3<f64>) -> Vector3<f64> {
    sum.try_normalize(NORMALIZE_EPSILON).unwrap_or(*fallback)
}

/// Crease-aware normals of all face corners.
///
/// Element `f` holds the normals of the three corners of face `f`, in the
/// order of the face's half-edges.
pub fn corner_normals(mesh: &HalfEdgeMesh, options: &NormalOptions) -> Result<Vec<[Vector3<f64>; 3]>> {
    options.validate()?;
    let threshold = options.threshold_angle;

    let face_corners = |f: FaceId| -> Result<[Vector3<f64>; 3]> {
        let [h0, h1, h2] = mesh.face(f).halfedges;
        Ok([
            corner_normal(mesh, h0, threshold)?,
            corner_normal(mesh, h1, threshold)?,
            corner_normal(mesh, h2, threshold)?,
        ])
    };

    debug!(
        "computing corner normals for {} faces (threshold {:.2} deg)",
        mesh.num_faces(),
        threshold.to_degrees()
    );

    if options.parallel {
        (0..mesh.num_faces())
            .into_par_iter()
            .map(|i| face_corners(FaceId::new(i)))
            .collect()
    } else {
        mesh.face_ids().map(face_corners).collect()
    }
}

/// Per-corner normals for the requested shading mode.
pub fn shading_normals(
    mesh: &HalfEdgeMesh,
    mode: ShadingMode,
    options: &NormalOptions,
) -> Result<Vec<[Vector3<f64>; 3]>> {
    match mode {
        ShadingMode::Crease => corner_normals(mesh, options),
        ShadingMode::Smooth => Ok(mesh
            .face_ids()
            .map(|f| mesh.face_triangle(f).map(|v| *mesh.vertex_normal(v)))
            .collect()),
        ShadingMode::Flat => Ok(mesh
            .face_ids()
            .map(|f| [*mesh.face_normal(f); 3])
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::{coplanar_pair, cube_soup, folded_pair, tetrahedron, uv_sphere_soup};
    use crate::mesh::{build_from_soup, build_from_triangles, LoadOptions};
    use approx::assert_relative_eq;

    fn cube() -> HalfEdgeMesh {
        build_from_soup(&cube_soup(), &LoadOptions::default()).unwrap()
    }

    fn sphere() -> HalfEdgeMesh {
        build_from_soup(&uv_sphere_soup(36, 72), &LoadOptions::default()).unwrap()
    }

    fn degrees(d: f64) -> NormalOptions {
        NormalOptions::default().with_threshold_degrees(d)
    }

    #[test]
    fn test_face_normal() {
        let n = face_normal_from_positions(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(0.0, 3.0, 0.0),
        );
        assert_relative_eq!(n, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_collinear_face_normal_is_zero() {
        let n = face_normal_from_positions(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert_eq!(n, Vector3::zeros());
    }

    #[test]
    fn test_normals_have_unit_length() {
        for mesh in [cube(), sphere(), tetrahedron()] {
            for n in face_normals(&mesh).iter().chain(vertex_normals(&mesh).iter()) {
                assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
            }
            for deg in [0.0, 30.0, 90.0, 180.0] {
                for corners in corner_normals(&mesh, &degrees(deg)).unwrap() {
                    for n in corners {
                        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_cube_is_flat_shaded() {
        let mesh = cube();
        let normals = corner_normals(&mesh, &degrees(30.0)).unwrap();

        for (f, corners) in mesh.face_ids().zip(&normals) {
            for n in corners {
                assert_relative_eq!(*n, *mesh.face_normal(f), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_sphere_shares_normals() {
        let mesh = sphere();
        let normals = corner_normals(&mesh, &degrees(30.0)).unwrap();

        for (f, corners) in mesh.face_ids().zip(&normals) {
            for (k, n) in corners.iter().enumerate() {
                let v = mesh.face_triangle(f)[k];
                assert_relative_eq!(*n, *mesh.vertex_normal(v), epsilon = 1e-9);
                // On a unit sphere the smoothed normal is close to the position.
                assert!(n.dot(&mesh.position(v).coords) > 0.99);
            }
        }
    }

    #[test]
    fn test_sphere_differs_from_flat() {
        let mesh = sphere();
        let normals = corner_normals(&mesh, &degrees(30.0)).unwrap();

        let f = FaceId::new(mesh.num_faces() / 2);
        let differs = normals[f.index()]
            .iter()
            .any(|n| (n - mesh.face_normal(f)).norm() > 1e-3);
        assert!(differs);
    }

    #[test]
    fn test_full_threshold_matches_vertex_normals() {
        for mesh in [cube(), tetrahedron()] {
            let normals = corner_normals(&mesh, &degrees(180.0)).unwrap();
            for (f, corners) in mesh.face_ids().zip(&normals) {
                for (k, n) in corners.iter().enumerate() {
                    let v = mesh.face_triangle(f)[k];
                    assert_relative_eq!(*n, *mesh.vertex_normal(v), epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_zero_threshold_matches_face_normals() {
        for mesh in [sphere(), tetrahedron()] {
            let normals = corner_normals(&mesh, &degrees(0.0)).unwrap();
            for (f, corners) in mesh.face_ids().zip(&normals) {
                for n in corners {
                    // Coplanar neighbours may or may not register as a crease.
                    assert_relative_eq!(*n, *mesh.face_normal(f), epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_coplanar_pair_shares_edge_normals() {
        let mesh = coplanar_pair();
        let up = Vector3::new(0.0, 0.0, 1.0);

        for deg in [1.0, 30.0, 180.0] {
            let normals = corner_normals(&mesh, &degrees(deg)).unwrap();
            for (f, corners) in mesh.face_ids().zip(&normals) {
                for (k, n) in corners.iter().enumerate() {
                    let v = mesh.face_triangle(f)[k];
                    if v.index() <= 1 {
                        assert_relative_eq!(*n, up, epsilon = 1e-12);
                    }
                }
            }
        }
    }

    #[test]
    fn test_open_fan_respects_crease() {
        // Folded by 60 degrees along edge 0-1.
        let mesh = folded_pair(60f64.to_radians());
        let n0 = *mesh.face_normal(FaceId::new(0));
        let n1 = *mesh.face_normal(FaceId::new(1));

        let sharp = corner_normals(&mesh, &degrees(30.0)).unwrap();
        assert_relative_eq!(sharp[0][0], n0, epsilon = 1e-12);
        assert_relative_eq!(sharp[1][0], n1, epsilon = 1e-12);

        let soft = corner_normals(&mesh, &degrees(90.0)).unwrap();
        let average = (n0 + n1).normalize();
        // Corners on the folded edge are averaged, the far corners are not.
        assert_relative_eq!(soft[0][0], average, epsilon = 1e-12);
        assert_relative_eq!(soft[0][1], average, epsilon = 1e-12);
        assert_relative_eq!(soft[1][0], average, epsilon = 1e-12);
        assert_relative_eq!(soft[0][2], n0, epsilon = 1e-12);
        assert_relative_eq!(soft[1][2], n1, epsilon = 1e-12);
    }

    #[test]
    fn test_three_creases_at_cube_corner() {
        // Every cube corner joins three faces at 90 degrees; each corner
        // takes the normal of its own side only.
        let mesh = cube();
        let v = VertexId::new(0);
        for deg in [30.0f64, 60.0, 89.0] {
            for f in mesh.vertex_faces(v) {
                let corner = mesh.corner_at(f, v).unwrap();
                let n = corner_normal(&mesh, corner, deg.to_radians()).unwrap();
                assert_relative_eq!(n, *mesh.face_normal(f), epsilon = 1e-12);
            }
        }
    }

    fn lopsided_pyramid() -> HalfEdgeMesh {
        let vertices = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [0, 2, 3], [0, 3, 4], [0, 4, 1], [1, 4, 3], [1, 3, 2]];
        build_from_triangles(&vertices, &faces).unwrap()
    }

    #[test]
    fn test_single_crease_wraps_around() {
        // Around the apex the side faces meet at about 54.7, 70.5, 54.7 and
        // 83.6 degrees. At 75 degrees only one edge is sharp, which does not
        // split the closed fan.
        let mesh = lopsided_pyramid();
        assert!(mesh.is_closed());

        let apex = VertexId::new(0);
        for f in mesh.vertex_faces(apex) {
            let corner = mesh.corner_at(f, apex).unwrap();
            let n = corner_normal(&mesh, corner, 75f64.to_radians()).unwrap();
            assert_relative_eq!(n, *mesh.vertex_normal(apex), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_two_creases_split_fan() {
        // At 60 degrees the 70.5 and 83.6 degree edges are sharp, leaving
        // faces {0, 1} and {2, 3} as separate smooth regions.
        let mesh = lopsided_pyramid();
        let apex = VertexId::new(0);
        let n = |f: usize| *mesh.face_normal(FaceId::new(f));
        let threshold = 60f64.to_radians();

        let expected = [(n(0) + n(1)).normalize(), (n(2) + n(3)).normalize()];
        for f in 0..4 {
            let corner = mesh.corner_at(FaceId::new(f), apex).unwrap();
            let normal = corner_normal(&mesh, corner, threshold).unwrap();
            assert_relative_eq!(normal, expected[f / 2], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shading_modes() {
        let mesh = cube();
        let options = NormalOptions::default();

        let flat = shading_normals(&mesh, ShadingMode::Flat, &options).unwrap();
        let crease = shading_normals(&mesh, ShadingMode::Crease, &options).unwrap();
        for (a, b) in flat.iter().zip(&crease) {
            for k in 0..3 {
                assert_relative_eq!(a[k], b[k], epsilon = 1e-12);
            }
        }

        let smooth = shading_normals(&mesh, ShadingMode::Smooth, &options).unwrap();
        let diagonal = Vector3::new(1.0, 1.0, 1.0).normalize();
        let corner = mesh.face_triangle(FaceId::new(0)).iter().position(|v| {
            *mesh.position(*v) == Point3::new(0.0, 0.0, 0.0)
        });
        let k = corner.unwrap();
        assert_relative_eq!(smooth[0][k], -diagonal, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = sphere();
        let sequential = corner_normals(&mesh, &degrees(30.0)).unwrap();
        let parallel = corner_normals(&mesh, &degrees(30.0).with_parallel(true)).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_invalid_threshold() {
        let mesh = tetrahedron();
        for t in [-0.1, 4.0, f64::NAN] {
            let result = corner_normals(&mesh, &NormalOptions::default().with_threshold_angle(t));
            assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn test_faceless_corner_is_malformed() {
        let mesh = coplanar_pair();
        let boundary = mesh
            .halfedge_ids()
            .find(|&he| mesh.is_boundary_halfedge(he))
            .unwrap();

        let result = corner_normal(&mesh, boundary, 0.5);
        match result {
            Err(MeshError::MalformedFan { vertex }) => assert_eq!(vertex, mesh.origin(boundary).index()),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
