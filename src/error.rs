//! Error types for softshade.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while loading meshes and computing normals.
#[derive(Error, Debug)]
pub enum MeshError {
    /// No faces are left once degenerate triangles are dropped.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A triangle references a vertex that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A directed edge is claimed by a second face.
    ///
    /// Happens when three or more faces share an edge, or when two
    /// neighbouring faces have inconsistent winding.
    #[error("edge ({v0}, {v1}) is already owned by another face")]
    NonManifoldEdge {
        /// Origin vertex of the edge.
        v0: usize,
        /// Destination vertex of the edge.
        v1: usize,
    },

    /// The faces around a vertex form more than one fan.
    ///
    /// Happens when separate surface pieces touch at a single vertex
    /// without sharing an edge.
    #[error("faces around vertex {vertex} do not form a single fan")]
    NonManifoldVertex {
        /// The shared vertex.
        vertex: usize,
    },

    /// The face fan around a vertex could not be walked.
    #[error("face fan around vertex {vertex} is malformed")]
    MalformedFan {
        /// The vertex at the center of the fan.
        vertex: usize,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error saving mesh to file.
    #[error("failed to save mesh to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
