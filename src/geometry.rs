//! GPU-ready shading buffers.
//!
//! Once corners of the same vertex can carry different normals they can no
//! longer share an index, so every face corner is emitted separately: three
//! positions, three normals and three trivial indices per triangle.
//!
//! [`SoftShadingGeometry`] keeps the half-edge model around so the crease
//! threshold can be changed without rebuilding the topology.
//!
//! # Example
//!
//! ```
//! use softshade::geometry::SoftShadingGeometry;
//! use softshade::mesh::TriangleSoup;
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
//! let mut geometry = SoftShadingGeometry::new(&soup, Default::default(), Default::default()).unwrap();
//! assert_eq!(geometry.buffers().indices, vec![0, 1, 2]);
//!
//! geometry.set_threshold_angle(10f64.to_radians()).unwrap();
//! assert_eq!(geometry.buffers().normals.len(), 9);
//! ```

use bytemuck::{Pod, Zeroable};
use log::debug;
use nalgebra::Vector3;

use crate::algo::normals::{shading_normals, NormalOptions, ShadingMode};
use crate::error::Result;
use crate::mesh::{build_from_soup, HalfEdgeMesh, LoadOptions, TriangleSoup};

/// One face corner in interleaved layout.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct CornerVertex {
    /// Corner position.
    pub position: [f32; 3],
    /// Corner shading normal.
    pub normal: [f32; 3],
}

/// Flat vertex buffers with one entry per face corner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShadingBuffers {
    /// `x, y, z` per corner, three corners per triangle.
    pub positions: Vec<f32>,
    /// `x, y, z` per corner, same layout as `positions`.
    pub normals: Vec<f32>,
    /// `0, 1, 2, ...`, one per corner.
    pub indices: Vec<u32>,
}

impl ShadingBuffers {
    /// Emit the corner positions and sequential indices of `mesh`.
    ///
    /// Normals are left empty; see [`set_normals`](Self::set_normals).
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let positions = mesh
            .face_ids()
            .flat_map(|f| mesh.face_positions(f))
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect();
        let indices = (0..mesh.num_faces() as u32 * 3).collect();

        Self {
            positions,
            normals: Vec::new(),
            indices,
        }
    }

    /// Replace the normal buffer with per-face corner normals.
    pub fn set_normals(&mut self, normals: &[[Vector3<f64>; 3]]) {
        self.normals.clear();
        self.normals.extend(
            normals
                .iter()
                .flatten()
                .flat_map(|n| [n.x as f32, n.y as f32, n.z as f32]),
        );
    }

    /// Number of emitted corners.
    pub fn num_corners(&self) -> usize {
        self.indices.len()
    }

    /// Positions and normals interleaved per corner.
    pub fn interleaved(&self) -> Vec<CornerVertex> {
        self.positions
            .chunks_exact(3)
            .zip(self.normals.chunks_exact(3))
            .map(|(p, n)| CornerVertex {
                position: [p[0], p[1], p[2]],
                normal: [n[0], n[1], n[2]],
            })
            .collect()
    }

    /// Position buffer as raw bytes.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Normal buffer as raw bytes.
    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    /// Index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// A loaded mesh together with its current shading buffers.
#[derive(Debug, Clone)]
pub struct SoftShadingGeometry {
    mesh: HalfEdgeMesh,
    load_options: LoadOptions,
    normal_options: NormalOptions,
    mode: ShadingMode,
    buffers: ShadingBuffers,
}

impl SoftShadingGeometry {
    /// Build the half-edge model for `soup` and compute crease-shaded buffers.
    pub fn new(soup: &TriangleSoup, load_options: LoadOptions, normal_options: NormalOptions) -> Result<Self> {
        normal_options.validate()?;
        let mesh = build_from_soup(soup, &load_options)?;
        let mut geometry = Self {
            buffers: ShadingBuffers::from_mesh(&mesh),
            mesh,
            load_options,
            normal_options,
            mode: ShadingMode::default(),
        };
        geometry.update_normals()?;
        Ok(geometry)
    }

    /// Replace the mesh, keeping the current threshold and shading mode.
    ///
    /// On error the previous mesh and buffers are left untouched.
    pub fn load_soup(&mut self, soup: &TriangleSoup) -> Result<()> {
        let mesh = build_from_soup(soup, &self.load_options)?;
        let mut buffers = ShadingBuffers::from_mesh(&mesh);
        buffers.set_normals(&shading_normals(&mesh, self.mode, &self.normal_options)?);

        self.mesh = mesh;
        self.buffers = buffers;
        Ok(())
    }

    /// Change the crease threshold (radians) and recompute the normals.
    pub fn set_threshold_angle(&mut self, radians: f64) -> Result<()> {
        let options = self.normal_options.clone().with_threshold_angle(radians);
        options.validate()?;
        self.normal_options = options;
        self.update_normals()
    }

    /// Change the shading mode and recompute the normals.
    pub fn set_mode(&mut self, mode: ShadingMode) -> Result<()> {
        self.mode = mode;
        self.update_normals()
    }

    /// The current crease threshold in radians.
    pub fn threshold_angle(&self) -> f64 {
        self.normal_options.threshold_angle
    }

    /// The current shading mode.
    pub fn mode(&self) -> ShadingMode {
        self.mode
    }

    /// The half-edge model.
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// The current shading buffers.
    pub fn buffers(&self) -> &ShadingBuffers {
        &self.buffers
    }

    fn update_normals(&mut self) -> Result<()> {
        let normals = shading_normals(&self.mesh, self.mode, &self.normal_options)?;
        self.buffers.set_normals(&normals);
        debug!(
            "updated {} corner normals ({:?}, {:.1} deg)",
            self.buffers.num_corners(),
            self.mode,
            self.normal_options.threshold_angle.to_degrees()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::cube_soup;
    use crate::mesh::FaceId;
    use approx::assert_relative_eq;

    fn cube_geometry() -> SoftShadingGeometry {
        SoftShadingGeometry::new(&cube_soup(), LoadOptions::default(), NormalOptions::default()).unwrap()
    }

    fn normal_at(buffers: &ShadingBuffers, corner: usize) -> Vector3<f32> {
        let n = &buffers.normals[corner * 3..corner * 3 + 3];
        Vector3::new(n[0], n[1], n[2])
    }

    #[test]
    fn test_buffer_layout() {
        let geometry = cube_geometry();
        let buffers = geometry.buffers();

        assert_eq!(buffers.num_corners(), 36);
        assert_eq!(buffers.positions.len(), 108);
        assert_eq!(buffers.normals.len(), 108);
        assert_eq!(buffers.indices, (0..36).collect::<Vec<u32>>());
        assert_eq!(buffers.position_bytes().len(), 108 * 4);
        assert_eq!(buffers.index_bytes().len(), 36 * 4);
    }

    #[test]
    fn test_positions_follow_face_corners() {
        let geometry = cube_geometry();
        let mesh = geometry.mesh();
        let buffers = geometry.buffers();

        let f = FaceId::new(5);
        for (k, p) in mesh.face_positions(f).iter().enumerate() {
            let base = (f.index() * 3 + k) * 3;
            assert_eq!(buffers.positions[base], p.x as f32);
            assert_eq!(buffers.positions[base + 1], p.y as f32);
            assert_eq!(buffers.positions[base + 2], p.z as f32);
        }
    }

    #[test]
    fn test_threshold_change_keeps_topology() {
        let mut geometry = cube_geometry();
        let positions = geometry.buffers().positions.clone();

        // Flat at 30 degrees.
        let n0 = normal_at(geometry.buffers(), 0);
        assert_relative_eq!(n0.norm(), 1.0, epsilon = 1e-6);
        assert!(n0.iter().filter(|c| c.abs() > 0.5).count() == 1);

        // Fully smoothed at 180 degrees: every corner points diagonally.
        geometry.set_threshold_angle(std::f64::consts::PI).unwrap();
        assert_eq!(geometry.buffers().positions, positions);
        for corner in 0..geometry.buffers().num_corners() {
            let n = normal_at(geometry.buffers(), corner);
            for c in n.iter() {
                assert!(c.abs() > 0.3);
            }
        }
    }

    #[test]
    fn test_invalid_threshold_keeps_state() {
        let mut geometry = cube_geometry();
        let before = geometry.buffers().clone();

        assert!(geometry.set_threshold_angle(-1.0).is_err());
        assert_eq!(geometry.buffers(), &before);
        assert_relative_eq!(geometry.threshold_angle(), 30f64.to_radians());
    }

    #[test]
    fn test_reload_keeps_threshold() {
        let mut geometry = cube_geometry();
        geometry.set_threshold_angle(std::f64::consts::PI).unwrap();
        geometry.load_soup(&cube_soup()).unwrap();

        assert_relative_eq!(geometry.threshold_angle(), std::f64::consts::PI);
        let n = normal_at(geometry.buffers(), 0);
        assert!(n.iter().all(|c| c.abs() > 0.3));
    }

    #[test]
    fn test_failed_reload_keeps_mesh() {
        let mut geometry = cube_geometry();
        assert!(geometry.load_soup(&TriangleSoup::default()).is_err());
        assert_eq!(geometry.mesh().num_faces(), 12);
    }

    #[test]
    fn test_interleaved() {
        let mut geometry = cube_geometry();
        geometry.set_mode(ShadingMode::Flat).unwrap();
        let buffers = geometry.buffers();

        let vertices = buffers.interleaved();
        assert_eq!(vertices.len(), 36);
        assert_eq!(vertices[7].position, [
            buffers.positions[21],
            buffers.positions[22],
            buffers.positions[23]
        ]);
        assert_eq!(bytemuck::cast_slice::<CornerVertex, u8>(&vertices).len(), 36 * 24);
    }
}
