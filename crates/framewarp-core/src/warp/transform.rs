use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    COMPACT_GRID_COLUMNS, COMPACT_GRID_ROWS, GRID_EXTRAPOLATE_CORNERS, MAX_GRID_COLUMNS,
    MAX_GRID_ROWS, MAX_PERSPECTIVE_MATRICES, PERSPECTIVE_MATRIX_PARAMS,
};

/// Pixel dimensions of an image or margin region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// One deformation-grid sample: a coordinate displacement pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSample {
    pub x: f32,
    pub y: f32,
}

/// Coordinate domain a transform is currently expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WarpDomain {
    /// Distorted sensor-input coordinates.
    #[default]
    DistortedInput,
    /// Margin-relative virtual (undistorted) coordinates.
    Virtual,
}

/// Anchor convention for perspective matrices. Hardware always uses
/// image-centered matrices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CenterType {
    #[default]
    Centered,
    TopLeft,
}

/// How samples outside the deformation grid are synthesized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExtrapolateType {
    #[default]
    None,
    ExtraPointAlongPerimeter,
    FourCorners,
}

/// Supported deformation-grid geometries (rows x columns).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridGeometry {
    #[default]
    Full51x67,
    Compact27x35,
}

impl GridGeometry {
    pub fn rows(self) -> usize {
        match self {
            Self::Full51x67 => MAX_GRID_ROWS,
            Self::Compact27x35 => COMPACT_GRID_ROWS,
        }
    }

    pub fn columns(self) -> usize {
        match self {
            Self::Full51x67 => MAX_GRID_COLUMNS,
            Self::Compact27x35 => COMPACT_GRID_COLUMNS,
        }
    }
}

/// Per-region perspective matrices of one transform.
///
/// Storage is fixed capacity; `rows x columns` gives the logical matrix
/// count. Enable state is independent of the grid's.
#[derive(Clone, Debug)]
pub struct PerspectiveSet {
    pub enable: bool,
    pub rows: u32,
    pub columns: u32,
    pub center_type: CenterType,
    pub confidence: u32,
    pub defined_on: Size,
    pub matrices: [[f32; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES],
}

impl Default for PerspectiveSet {
    fn default() -> Self {
        Self {
            enable: false,
            rows: 0,
            columns: 0,
            center_type: CenterType::Centered,
            confidence: 0,
            defined_on: Size::default(),
            matrices: [[0.0; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES],
        }
    }
}

impl PerspectiveSet {
    /// Logical number of matrices in use.
    pub fn count(&self) -> u32 {
        self.rows * self.columns
    }
}

/// Sparse deformation grid of one transform.
///
/// Sample storage is allocated once at the maximum supported geometry and
/// reused in place; `rows x columns` window the logical region.
#[derive(Clone, Debug)]
pub struct DeformationGrid {
    pub enable: bool,
    pub rows: u32,
    pub columns: u32,
    pub defined_on: Size,
    pub extrapolate: ExtrapolateType,
    pub samples: Array2<GridSample>,
    pub corners: [GridSample; GRID_EXTRAPOLATE_CORNERS],
}

impl Default for DeformationGrid {
    fn default() -> Self {
        Self {
            enable: false,
            rows: 0,
            columns: 0,
            defined_on: Size::default(),
            extrapolate: ExtrapolateType::None,
            samples: Array2::default((MAX_GRID_ROWS, MAX_GRID_COLUMNS)),
            corners: [GridSample::default(); GRID_EXTRAPOLATE_CORNERS],
        }
    }
}

impl DeformationGrid {
    /// True when the grid holds a logically non-empty sample window.
    pub fn is_populated(&self) -> bool {
        self.rows > 0 && self.columns > 0
    }
}

/// One frame's geometric correction: perspective matrices plus a
/// deformation grid, tagged with the coordinate domain both are
/// currently expressed in.
#[derive(Clone, Debug, Default)]
pub struct WarpTransform {
    pub domain: WarpDomain,
    pub matrices: PerspectiveSet,
    pub grid: DeformationGrid,
}

impl WarpTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transform participates in geometry computation when at least one
    /// of its parts is enabled.
    pub fn is_active(&self) -> bool {
        self.matrices.enable || self.grid.enable
    }

    /// Disable both parts without touching the backing storage. Used to
    /// reset scratch transforms before an external computation writes
    /// into them.
    pub fn reset_disabled(&mut self) {
        self.matrices.enable = false;
        self.grid.enable = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_requires_either_part() {
        let mut warp = WarpTransform::new();
        assert!(!warp.is_active());

        warp.matrices.enable = true;
        assert!(warp.is_active());

        warp.matrices.enable = false;
        warp.grid.enable = true;
        assert!(warp.is_active());
    }

    #[test]
    fn test_reset_disabled_keeps_storage() {
        let mut warp = WarpTransform::new();
        warp.matrices.enable = true;
        warp.matrices.rows = 1;
        warp.matrices.columns = 1;
        warp.grid.enable = true;

        warp.reset_disabled();
        assert!(!warp.is_active());
        // Logical dims survive; only enables are cleared.
        assert_eq!(warp.matrices.count(), 1);
    }

    #[test]
    fn test_grid_geometry_dims() {
        assert_eq!(GridGeometry::Full51x67.rows(), 51);
        assert_eq!(GridGeometry::Full51x67.columns(), 67);
        assert_eq!(GridGeometry::Compact27x35.rows(), 27);
        assert_eq!(GridGeometry::Compact27x35.columns(), 35);
    }
}
