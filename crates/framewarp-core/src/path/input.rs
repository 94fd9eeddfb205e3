//! Per-frame input bundle and staging of published transform blocks.

use tracing::debug;

use crate::cache::AecSnapshot;
use crate::consts::{MAX_PERSPECTIVE_MATRICES, PERSPECTIVE_MATRIX_PARAMS};
use crate::error::{FramewarpError, Result};
use crate::geometry::{FaceData, ZoomWindow};
use crate::path::module::WarpExports;
use crate::tuning::TuningRecord;
use crate::warp::{
    CenterType, DeformationGrid, ExtrapolateType, GridGeometry, GridSample, PerspectiveSet, Size,
};

/// Wire code for the full 51x67 grid geometry.
pub const GRID_GEOMETRY_FULL: u32 = 0;
/// Wire code for the compact 27x35 grid geometry.
pub const GRID_GEOMETRY_COMPACT: u32 = 1;

/// Frame-level configuration mode of the surrounding processing flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigMode {
    #[default]
    None,
    /// Motion-compensated temporal filtering: current frame aligned
    /// against the previous output frame.
    Mctf,
    /// Multi-frame noise reduction: transform recomputed by temporal
    /// anchor aggregation.
    MfnrTemporalAnchorAggregate,
}

/// Perspective matrices as published by the upstream producer.
#[derive(Clone, Debug, Default)]
pub struct PerspectiveBlock {
    pub enable: bool,
    /// Keep last frame's staged matrices instead of this block.
    pub reuse: bool,
    pub rows: u32,
    pub columns: u32,
    pub confidence: u32,
    pub defined_on: Size,
    pub matrices: [[f32; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES],
}

/// Deformation grid as published by the upstream producer. Geometry is
/// carried as a wire code and validated at staging time.
#[derive(Clone, Debug, Default)]
pub struct GridBlock {
    pub enable: bool,
    /// Keep last frame's staged grid instead of this block.
    pub reuse: bool,
    pub geometry: u32,
    pub defined_on: Size,
    pub samples: Vec<GridSample>,
}

/// Reference-alignment transform published by the stabilization block,
/// plus its bypass override.
#[derive(Clone, Debug, Default)]
pub struct AlignmentBlock {
    pub perspective: PerspectiveBlock,
    pub bypass_adjustment: bool,
}

/// Everything one `execute` call consumes for a frame.
pub struct FrameInput<'a> {
    pub frame_num: u64,
    pub image_size: Size,
    pub margins: Size,
    pub zoom_window: ZoomWindow,
    pub frontend_zoom_window: ZoomWindow,
    pub aec: AecSnapshot,
    /// Physical optical center in pixels.
    pub optical_center_x: f32,
    pub optical_center_y: f32,
    /// Upscaling applied between this pass and the display output.
    pub upscale_ratio: f32,
    pub mode: ConfigMode,
    /// MCTF with EIS is active for this stream.
    pub stabilization_mctf: bool,
    pub perspective: PerspectiveBlock,
    pub grid: GridBlock,
    pub alignment: AlignmentBlock,
    pub faces: FaceData,
    pub tuning: &'a TuningRecord,
    /// State exported by the input path, when this path composes
    /// against it.
    pub shared: Option<WarpExports<'a>>,
    /// Upstream change notification forcing recomputation.
    pub trigger: bool,
}

/// Stage a published perspective block into a transform's matrix set.
///
/// The anchor convention is forced to image-centered regardless of what
/// the producer published.
pub fn stage_perspective(block: &PerspectiveBlock, dest: &mut PerspectiveSet) -> Result<()> {
    if !block.enable {
        dest.enable = false;
        return Ok(());
    }
    let count = block.rows * block.columns;
    if count == 0 || count > MAX_PERSPECTIVE_MATRICES as u32 {
        return Err(FramewarpError::InvalidArgument {
            what: "perspective matrix count",
        });
    }
    dest.enable = true;
    dest.rows = block.rows;
    dest.columns = block.columns;
    dest.center_type = CenterType::Centered;
    dest.confidence = block.confidence;
    dest.defined_on = block.defined_on;
    dest.matrices = block.matrices;
    Ok(())
}

/// Stage a published grid block into a transform's deformation grid.
///
/// The wire geometry code must name a supported geometry and the sample
/// payload must match it exactly. Extrapolation is fixed to the
/// perimeter-point scheme the producer samples with.
pub fn stage_grid(block: &GridBlock, dest: &mut DeformationGrid) -> Result<()> {
    if !block.enable {
        dest.enable = false;
        return Ok(());
    }
    let geometry = match block.geometry {
        GRID_GEOMETRY_FULL => GridGeometry::Full51x67,
        GRID_GEOMETRY_COMPACT => GridGeometry::Compact27x35,
        other => {
            debug!(geometry = other, "unsupported grid geometry");
            return Err(FramewarpError::InvalidGeometry { geometry: other });
        }
    };
    let rows = geometry.rows();
    let columns = geometry.columns();
    if block.samples.len() != rows * columns {
        return Err(FramewarpError::InvalidArgument {
            what: "grid sample count",
        });
    }
    dest.enable = true;
    dest.rows = rows as u32;
    dest.columns = columns as u32;
    dest.defined_on = block.defined_on;
    dest.extrapolate = ExtrapolateType::ExtraPointAlongPerimeter;
    for r in 0..rows {
        for c in 0..columns {
            dest.samples[[r, c]] = block.samples[r * columns + c];
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective_block() -> PerspectiveBlock {
        PerspectiveBlock {
            enable: true,
            reuse: false,
            rows: 1,
            columns: 2,
            confidence: 128,
            defined_on: Size::new(1920, 1080),
            matrices: [[0.5; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES],
        }
    }

    fn grid_block(geometry: u32) -> GridBlock {
        let geo = match geometry {
            GRID_GEOMETRY_COMPACT => GridGeometry::Compact27x35,
            _ => GridGeometry::Full51x67,
        };
        GridBlock {
            enable: true,
            reuse: false,
            geometry,
            defined_on: Size::new(1920, 1080),
            samples: vec![GridSample { x: 1.0, y: -1.0 }; geo.rows() * geo.columns()],
        }
    }

    #[test]
    fn test_perspective_forces_centered_anchor() {
        let mut dest = PerspectiveSet {
            center_type: CenterType::TopLeft,
            ..PerspectiveSet::default()
        };
        stage_perspective(&perspective_block(), &mut dest).unwrap();
        assert!(dest.enable);
        assert_eq!(dest.center_type, CenterType::Centered);
        assert_eq!(dest.count(), 2);
    }

    #[test]
    fn test_perspective_rejects_bad_count() {
        let mut dest = PerspectiveSet::default();

        let mut block = perspective_block();
        block.rows = 0;
        assert!(matches!(
            stage_perspective(&block, &mut dest),
            Err(FramewarpError::InvalidArgument { .. })
        ));

        block.rows = 5;
        block.columns = 2;
        assert!(matches!(
            stage_perspective(&block, &mut dest),
            Err(FramewarpError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_disabled_perspective_clears_enable() {
        let mut dest = PerspectiveSet {
            enable: true,
            ..PerspectiveSet::default()
        };
        let block = PerspectiveBlock::default();
        stage_perspective(&block, &mut dest).unwrap();
        assert!(!dest.enable);
    }

    #[test]
    fn test_grid_stages_compact_geometry() {
        let mut dest = DeformationGrid::default();
        stage_grid(&grid_block(GRID_GEOMETRY_COMPACT), &mut dest).unwrap();
        assert!(dest.enable);
        assert_eq!(dest.rows, 27);
        assert_eq!(dest.columns, 35);
        assert_eq!(dest.extrapolate, ExtrapolateType::ExtraPointAlongPerimeter);
        assert_eq!(dest.samples[[26, 34]], GridSample { x: 1.0, y: -1.0 });
    }

    #[test]
    fn test_grid_rejects_unknown_geometry() {
        let mut dest = DeformationGrid::default();
        let mut block = grid_block(GRID_GEOMETRY_FULL);
        block.geometry = 7;
        assert!(matches!(
            stage_grid(&block, &mut dest),
            Err(FramewarpError::InvalidGeometry { geometry: 7 })
        ));
    }

    #[test]
    fn test_grid_rejects_sample_count_mismatch() {
        let mut dest = DeformationGrid::default();
        let mut block = grid_block(GRID_GEOMETRY_FULL);
        block.samples.pop();
        assert!(matches!(
            stage_grid(&block, &mut dest),
            Err(FramewarpError::InvalidArgument { .. })
        ));
    }
}
