//! Mesh shading algorithms.
//!
//! - **Normals**: face normals, smoothed vertex normals and crease-aware
//!   per-corner normals
//! - **Creases**: dihedral angles and sharp-edge detection

pub mod creases;
pub mod normals;

pub use normals::{NormalOptions, ShadingMode};
