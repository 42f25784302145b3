//! Distance-based vertex welding.
//!
//! Triangle soups (STL files in particular) repeat every shared corner once
//! per triangle. Before connectivity can be built, positions that lie within
//! a small distance of each other must collapse into a single vertex.

use log::debug;
use nalgebra::Point3;

use crate::error::{MeshError, Result};

/// Default welding distance for [`merge_by_distance`].
pub const DEFAULT_MERGE_DISTANCE: f64 = 1e-7;

/// Result of [`merge_by_distance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedVertices {
    /// The unique positions, in order of first appearance.
    pub positions: Vec<Point3<f64>>,

    /// For every input position, the index of its unique position.
    pub remap: Vec<usize>,
}

/// Weld positions that are closer than `threshold` to each other.
///
/// Each position is compared against all unique positions accepted so far
/// and maps to the first one whose squared distance is below `threshold²`.
/// This is quadratic in the number of positions, which is fine at mesh-load
/// scale and keeps the first-match semantics exact.
///
/// # Example
///
/// ```
/// use softshade::mesh::merge_by_distance;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 0.0, 1e-9),
/// ];
/// let merged = merge_by_distance(&positions, 1e-7);
/// assert_eq!(merged.positions.len(), 2);
/// assert_eq!(merged.remap, vec![0, 1, 0]);
/// ```
pub fn merge_by_distance(positions: &[Point3<f64>], threshold: f64) -> MergedVertices {
    let threshold2 = threshold * threshold;
    let mut unique: Vec<Point3<f64>> = Vec::new();
    let mut remap = Vec::with_capacity(positions.len());

    for p in positions {
        match unique
            .iter()
            .position(|u| (u - p).norm_squared() < threshold2)
        {
            Some(i) => remap.push(i),
            None => {
                remap.push(unique.len());
                unique.push(*p);
            }
        }
    }

    debug!(
        "merged {} positions into {} vertices",
        positions.len(),
        unique.len()
    );

    MergedVertices {
        positions: unique,
        remap,
    }
}

/// Rewrite triangle indices through `remap` and drop degenerate triangles.
///
/// Returns the surviving triangles and the number of triangles dropped
/// because two or more of their corners collapsed onto the same vertex.
pub fn remap_triangles(cells: &[[usize; 3]], remap: &[usize]) -> Result<(Vec<[usize; 3]>, usize)> {
    let mut kept = Vec::with_capacity(cells.len());
    let mut dropped = 0;

    for (fi, cell) in cells.iter().enumerate() {
        let mut tri = [0usize; 3];
        for (k, &vi) in cell.iter().enumerate() {
            tri[k] = *remap
                .get(vi)
                .ok_or(MeshError::InvalidVertexIndex { face: fi, vertex: vi })?;
        }

        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            dropped += 1;
        } else {
            kept.push(tri);
        }
    }

    Ok((kept, dropped))
}
