use tracing::debug;

use crate::consts::{ASSIST_GRID_COLUMNS, ASSIST_GRID_ROWS};
use crate::engine::{check, AssistGridRequest, WarpEngine};
use crate::error::Result;
use crate::warp::transform::{DeformationGrid, WarpTransform};

/// Coarse deformation grid derived from a transform, used when direct
/// grid coverage is unavailable.
///
/// The grid is owned. Its source is always the transform stored in the
/// same frame slot; where the pairing crosses a module boundary it is
/// carried explicitly as an assist/source pair.
#[derive(Clone, Debug, Default)]
pub struct AssistGrid {
    pub enable: bool,
    pub grid: DeformationGrid,
}

impl AssistGrid {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether the assist grid should be derived for this transform.
///
/// With fewer than two perspective matrices and no flow-enabled grid
/// there is nothing meaningful to sample; the grid is disabled instead.
pub fn should_build_assist(transform: &WarpTransform, grid_enabled_by_flow: bool) -> bool {
    grid_enabled_by_flow || (transform.matrices.enable && transform.matrices.count() >= 2)
}

/// Derive a 16x16 assist grid from `source` via the external sampler.
///
/// On success the grid is enabled. Failure is non-fatal to callers,
/// which continue with prior assist-grid state.
pub fn build_assist_grid(
    engine: &dyn WarpEngine,
    source: &WarpTransform,
    assist: &mut AssistGrid,
) -> Result<()> {
    let request = AssistGridRequest {
        rows: ASSIST_GRID_ROWS,
        columns: ASSIST_GRID_COLUMNS,
    };
    check(engine.build_assist_grid(source, &request, assist), "build_assist_grid")?;
    assist.enable = true;
    debug!(
        rows = request.rows,
        columns = request.columns,
        "assist grid built"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_circuit_on_single_matrix_without_grid() {
        let mut warp = WarpTransform::new();
        warp.matrices.enable = true;
        warp.matrices.rows = 1;
        warp.matrices.columns = 1;

        assert!(!should_build_assist(&warp, false));
    }

    #[test]
    fn test_builds_when_grid_flow_enabled() {
        let mut warp = WarpTransform::new();
        warp.matrices.rows = 1;
        warp.matrices.columns = 1;

        assert!(should_build_assist(&warp, true));
    }

    #[test]
    fn test_builds_with_two_or_more_matrices() {
        let mut warp = WarpTransform::new();
        warp.matrices.enable = true;
        warp.matrices.rows = 1;
        warp.matrices.columns = 2;

        assert!(should_build_assist(&warp, false));
    }
}
