//! Consumed interface of the external warp-math engine.
//!
//! All numerical work (domain conversion, assist-grid construction,
//! geometry resolution, tuning-driven parameter computation, transform
//! packing) is owned by an opaque external library. This module pins
//! down its call contract: fully-populated inputs in, outputs written
//! through `&mut`, an integer status back, no I/O, synchronous.

use tracing::debug;

use crate::alignment::AlignmentInputs;
use crate::consts::{INTERPOLATION_LUT_ENTRIES, INTERPOLATION_LUT_SETS};
use crate::error::{FramewarpError, Result};
use crate::geometry::{GeometryInput, GeometryOutput};
use crate::tuning::TuningRecord;
use crate::warp::{AssistGrid, GridGeometry, Size, WarpTransform};

/// Raw status returned by every engine entry point.
pub type EngineStatus = i32;

/// The fixed success sentinel. Anything else is a failure.
pub const ENGINE_SUCCESS: EngineStatus = 0;

/// Requested resolution for a derived assist grid.
#[derive(Clone, Copy, Debug)]
pub struct AssistGridRequest {
    pub rows: u32,
    pub columns: u32,
}

/// Hardware-facing warp parameters for one path and frame. The
/// downstream register-packing layer translates this into bitfields.
#[derive(Clone, Debug, PartialEq)]
pub struct WarpParams {
    pub grid_enable: bool,
    pub perspective_enable: bool,
    pub perspective_rows: u32,
    pub perspective_columns: u32,
    pub grid_geometry: GridGeometry,
    pub shift_only_x_q16: i32,
    pub shift_only_y_q16: i32,
    pub eight_bit_output_alignment: bool,
    pub invalid_pixel_interpolation: bool,
    pub invalid_pixel_const_y: u16,
    pub invalid_pixel_const_cb: u16,
    pub invalid_pixel_const_cr: u16,
    pub y_interpolation_mode: u8,
    pub interpolation_coefficients: [[u16; INTERPOLATION_LUT_ENTRIES]; INTERPOLATION_LUT_SETS],
}

impl Default for WarpParams {
    // Output alignment and invalid-pixel interpolation stay on even when
    // both transform parts are disabled, so downstream blocks always see
    // a configured path.
    fn default() -> Self {
        Self {
            grid_enable: false,
            perspective_enable: false,
            perspective_rows: 0,
            perspective_columns: 0,
            grid_geometry: GridGeometry::default(),
            shift_only_x_q16: 0,
            shift_only_y_q16: 0,
            eight_bit_output_alignment: true,
            invalid_pixel_interpolation: true,
            invalid_pixel_const_y: 0,
            invalid_pixel_const_cb: 0x200,
            invalid_pixel_const_cr: 0x200,
            y_interpolation_mode: 0,
            interpolation_coefficients: [[0; INTERPOLATION_LUT_ENTRIES]; INTERPOLATION_LUT_SETS],
        }
    }
}

/// Per-pass geometric outputs consumed by the strip controller.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassGeometry {
    pub input_frame_size: Size,
    pub controller_valid_size: Size,
    pub output_size: Size,
    pub o2v_scale_x: f32,
    pub o2v_scale_y: f32,
    pub o2v_offset_x: i32,
    pub o2v_offset_y: i32,
    pub v2i_inv_scale_x: f32,
    pub v2i_inv_scale_y: f32,
    pub v2i_offset_x: i32,
    pub v2i_offset_y: i32,
    pub input_coord_precision: u32,
    pub force_warp_on: bool,
}

/// Intermediate working buffer handed to the motion-coprocessor
/// transform builder. Allocated by the coprocessor driver, opaque here.
#[derive(Clone, Debug, Default)]
pub struct CvpScratch {
    pub data: Vec<u32>,
}

/// Frame configuration produced for the motion coprocessor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CvpFrameConfig {
    pub grid_enable: bool,
    pub perspective_enable: bool,
    pub transform_defined_on: Size,
    pub scale_x: f32,
    pub scale_y: f32,
}

/// External math engine. Treated as a pure function over explicit
/// arguments: reentrant, no internal frame state.
pub trait WarpEngine {
    /// Convert a transform in place from the distorted-input domain to
    /// the virtual (margin-relative, undistorted) domain.
    fn convert_to_virtual_domain(&self, warp: &mut WarpTransform) -> EngineStatus;

    /// Recompute a transform by temporal anchor aggregation (MFNR).
    fn compute_temporal_transform(&self, warp: &mut WarpTransform) -> EngineStatus;

    /// Additional validity predicate over the alignment-adjustment
    /// inputs, evaluated after the structural preconditions hold.
    fn alignment_adjustment_valid(&self, inputs: &AlignmentInputs<'_>) -> bool;

    /// Compose the reference alignment transform with the current input
    /// transform into `out` for motion-compensated temporal filtering.
    fn compute_alignment_adjustment(
        &self,
        inputs: &AlignmentInputs<'_>,
        out: &mut WarpTransform,
    ) -> EngineStatus;

    /// Derive a coarse assist grid from `source` at the requested
    /// resolution, sampling and extrapolating as needed.
    fn build_assist_grid(
        &self,
        source: &WarpTransform,
        request: &AssistGridRequest,
        out: &mut AssistGrid,
    ) -> EngineStatus;

    /// Compute per-consumer geometric outputs. `out` arrives prefilled
    /// with the logical optical centers and face context.
    fn resolve_geometry(&self, input: &GeometryInput<'_>, out: &mut GeometryOutput)
        -> EngineStatus;

    /// Tuning-driven (chromatix) parameter computation.
    fn compute_tuning_params(
        &self,
        tuning: &TuningRecord,
        grid_enabled_by_flow: bool,
        grid_from_tuning: bool,
        params: &mut WarpParams,
    ) -> EngineStatus;

    /// Non-tuning geometry/parameter computation over the effective
    /// transform for the frame.
    fn compute_geometry_params(
        &self,
        warp: &WarpTransform,
        grid_enabled_by_flow: bool,
        params: &mut WarpParams,
        geometry: &mut PassGeometry,
    ) -> EngineStatus;

    /// Build the motion-coprocessor frame configuration from the
    /// transform, using the coprocessor's intermediate buffer.
    fn build_cvp_transform(
        &self,
        warp: &WarpTransform,
        scratch: &mut CvpScratch,
        out: &mut CvpFrameConfig,
    ) -> EngineStatus;
}

/// Map an engine status to `Result`, logging the entry point on failure.
pub fn check(status: EngineStatus, call: &'static str) -> Result<()> {
    if status == ENGINE_SUCCESS {
        Ok(())
    } else {
        debug!(call, status, "warp engine call failed");
        Err(FramewarpError::Engine { call, status })
    }
}

/// Minimal software stand-in for the external engine.
///
/// Used by the replay tool and tests; performs no real warp math. It
/// flips domain tags, fills assist grids with identity samples, and
/// copies tuning values into the parameter block.
#[derive(Debug, Default)]
pub struct PassthroughEngine;

impl WarpEngine for PassthroughEngine {
    fn convert_to_virtual_domain(&self, warp: &mut WarpTransform) -> EngineStatus {
        warp.domain = crate::warp::WarpDomain::Virtual;
        ENGINE_SUCCESS
    }

    fn compute_temporal_transform(&self, _warp: &mut WarpTransform) -> EngineStatus {
        ENGINE_SUCCESS
    }

    fn alignment_adjustment_valid(&self, _inputs: &AlignmentInputs<'_>) -> bool {
        true
    }

    fn compute_alignment_adjustment(
        &self,
        inputs: &AlignmentInputs<'_>,
        out: &mut WarpTransform,
    ) -> EngineStatus {
        out.matrices = inputs.alignment.matrices.clone();
        out.matrices.enable = true;
        out.domain = inputs.alignment.domain;
        ENGINE_SUCCESS
    }

    fn build_assist_grid(
        &self,
        source: &WarpTransform,
        request: &AssistGridRequest,
        out: &mut AssistGrid,
    ) -> EngineStatus {
        out.grid.rows = request.rows;
        out.grid.columns = request.columns;
        out.grid.defined_on = if source.grid.enable {
            source.grid.defined_on
        } else {
            source.matrices.defined_on
        };
        for r in 0..request.rows as usize {
            for c in 0..request.columns as usize {
                out.grid.samples[[r, c]] = crate::warp::GridSample::default();
            }
        }
        out.enable = true;
        ENGINE_SUCCESS
    }

    fn resolve_geometry(
        &self,
        _input: &GeometryInput<'_>,
        _out: &mut GeometryOutput,
    ) -> EngineStatus {
        ENGINE_SUCCESS
    }

    fn compute_tuning_params(
        &self,
        tuning: &TuningRecord,
        grid_enabled_by_flow: bool,
        grid_from_tuning: bool,
        params: &mut WarpParams,
    ) -> EngineStatus {
        params.grid_enable = grid_enabled_by_flow || (grid_from_tuning && tuning.grid_enable);
        params.y_interpolation_mode = tuning.y_interpolation_type;
        params.invalid_pixel_interpolation = tuning.invalid_pixel.interpolate;
        params.invalid_pixel_const_y = tuning.invalid_pixel.const_y;
        params.invalid_pixel_const_cb = tuning.invalid_pixel.const_cb;
        params.invalid_pixel_const_cr = tuning.invalid_pixel.const_cr;
        params.interpolation_coefficients = [
            tuning.interpolation_lut_0,
            tuning.interpolation_lut_1,
            tuning.interpolation_lut_2,
        ];
        ENGINE_SUCCESS
    }

    fn compute_geometry_params(
        &self,
        warp: &WarpTransform,
        grid_enabled_by_flow: bool,
        params: &mut WarpParams,
        geometry: &mut PassGeometry,
    ) -> EngineStatus {
        params.perspective_enable = warp.matrices.enable;
        params.perspective_rows = warp.matrices.rows;
        params.perspective_columns = warp.matrices.columns;
        params.grid_enable = params.grid_enable || grid_enabled_by_flow;
        geometry.input_frame_size = Size::new(
            warp.matrices.defined_on.width,
            warp.matrices.defined_on.height,
        );
        geometry.force_warp_on = warp.is_active();
        ENGINE_SUCCESS
    }

    fn build_cvp_transform(
        &self,
        warp: &WarpTransform,
        _scratch: &mut CvpScratch,
        out: &mut CvpFrameConfig,
    ) -> EngineStatus {
        out.grid_enable = warp.grid.enable;
        out.perspective_enable = warp.matrices.enable;
        out.transform_defined_on = if warp.grid.enable {
            warp.grid.defined_on
        } else {
            warp.matrices.defined_on
        };
        out.scale_x = 1.0;
        out.scale_y = 1.0;
        ENGINE_SUCCESS
    }
}
