#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use framewarp_core::alignment::AlignmentInputs;
use framewarp_core::cache::AecSnapshot;
use framewarp_core::consts::{MAX_PERSPECTIVE_MATRICES, PERSPECTIVE_MATRIX_PARAMS};
use framewarp_core::engine::{
    AssistGridRequest, CvpFrameConfig, CvpScratch, EngineStatus, PassGeometry, PassthroughEngine,
    WarpEngine, WarpParams,
};
use framewarp_core::geometry::{FaceData, GeometryInput, GeometryOutput, ZoomWindow};
use framewarp_core::path::{
    AlignmentBlock, ConfigMode, FrameInput, GridBlock, PerspectiveBlock, GRID_GEOMETRY_FULL,
};
use framewarp_core::tuning::TuningRecord;
use framewarp_core::warp::{AssistGrid, GridGeometry, GridSample, Size, WarpTransform};

/// Passthrough engine wrapper that records every call and can be
/// scripted to fail specific entry points.
pub struct StubEngine {
    inner: PassthroughEngine,
    calls: RefCell<Vec<&'static str>>,
    failures: RefCell<HashMap<&'static str, EngineStatus>>,
    pub reject_alignment: Cell<bool>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            inner: PassthroughEngine,
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(HashMap::new()),
            reject_alignment: Cell::new(false),
        }
    }

    pub fn fail_call(&self, call: &'static str, status: EngineStatus) {
        self.failures.borrow_mut().insert(call, status);
    }

    pub fn clear_failures(&self) {
        self.failures.borrow_mut().clear();
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }

    fn enter(&self, call: &'static str) -> Option<EngineStatus> {
        self.calls.borrow_mut().push(call);
        self.failures.borrow().get(call).copied()
    }
}

impl WarpEngine for StubEngine {
    fn convert_to_virtual_domain(&self, warp: &mut WarpTransform) -> EngineStatus {
        if let Some(status) = self.enter("convert_to_virtual_domain") {
            return status;
        }
        self.inner.convert_to_virtual_domain(warp)
    }

    fn compute_temporal_transform(&self, warp: &mut WarpTransform) -> EngineStatus {
        if let Some(status) = self.enter("compute_temporal_transform") {
            return status;
        }
        self.inner.compute_temporal_transform(warp)
    }

    fn alignment_adjustment_valid(&self, inputs: &AlignmentInputs<'_>) -> bool {
        self.calls.borrow_mut().push("alignment_adjustment_valid");
        !self.reject_alignment.get() && self.inner.alignment_adjustment_valid(inputs)
    }

    fn compute_alignment_adjustment(
        &self,
        inputs: &AlignmentInputs<'_>,
        out: &mut WarpTransform,
    ) -> EngineStatus {
        if let Some(status) = self.enter("compute_alignment_adjustment") {
            return status;
        }
        self.inner.compute_alignment_adjustment(inputs, out)
    }

    fn build_assist_grid(
        &self,
        source: &WarpTransform,
        request: &AssistGridRequest,
        out: &mut AssistGrid,
    ) -> EngineStatus {
        if let Some(status) = self.enter("build_assist_grid") {
            return status;
        }
        self.inner.build_assist_grid(source, request, out)
    }

    fn resolve_geometry(
        &self,
        input: &GeometryInput<'_>,
        out: &mut GeometryOutput,
    ) -> EngineStatus {
        if let Some(status) = self.enter("resolve_geometry") {
            return status;
        }
        self.inner.resolve_geometry(input, out)
    }

    fn compute_tuning_params(
        &self,
        tuning: &TuningRecord,
        grid_enabled_by_flow: bool,
        grid_from_tuning: bool,
        params: &mut WarpParams,
    ) -> EngineStatus {
        if let Some(status) = self.enter("compute_tuning_params") {
            return status;
        }
        self.inner
            .compute_tuning_params(tuning, grid_enabled_by_flow, grid_from_tuning, params)
    }

    fn compute_geometry_params(
        &self,
        warp: &WarpTransform,
        grid_enabled_by_flow: bool,
        params: &mut WarpParams,
        geometry: &mut PassGeometry,
    ) -> EngineStatus {
        if let Some(status) = self.enter("compute_geometry_params") {
            return status;
        }
        self.inner
            .compute_geometry_params(warp, grid_enabled_by_flow, params, geometry)
    }

    fn build_cvp_transform(
        &self,
        warp: &WarpTransform,
        scratch: &mut CvpScratch,
        out: &mut CvpFrameConfig,
    ) -> EngineStatus {
        if let Some(status) = self.enter("build_cvp_transform") {
            return status;
        }
        self.inner.build_cvp_transform(warp, scratch, out)
    }
}

pub fn tuning() -> TuningRecord {
    TuningRecord {
        generation: 1,
        ..TuningRecord::default()
    }
}

pub fn perspective_block(rows: u32, columns: u32) -> PerspectiveBlock {
    PerspectiveBlock {
        enable: true,
        reuse: false,
        rows,
        columns,
        confidence: 200,
        defined_on: Size::new(1920, 1080),
        matrices: [[1.0; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES],
    }
}

pub fn full_grid_block() -> GridBlock {
    let geo = GridGeometry::Full51x67;
    GridBlock {
        enable: true,
        reuse: false,
        geometry: GRID_GEOMETRY_FULL,
        defined_on: Size::new(1920, 1080),
        samples: vec![GridSample { x: 0.25, y: -0.25 }; geo.rows() * geo.columns()],
    }
}

pub fn base_input(frame_num: u64, tuning: &TuningRecord) -> FrameInput<'_> {
    let zoom = ZoomWindow {
        full: Size::new(1920, 1080),
        left: 0,
        top: 0,
        width: 1920,
        height: 1080,
    };
    FrameInput {
        frame_num,
        image_size: Size::new(1920, 1080),
        margins: Size::new(64, 48),
        zoom_window: zoom,
        frontend_zoom_window: zoom,
        aec: AecSnapshot {
            lux_index: 100.0,
            linear_gain: 1.0,
            lens_position: 0.5,
            lens_zoom: 1.0,
        },
        optical_center_x: 960.0,
        optical_center_y: 540.0,
        upscale_ratio: 1.0,
        mode: ConfigMode::None,
        stabilization_mctf: false,
        perspective: PerspectiveBlock::default(),
        grid: GridBlock::default(),
        alignment: AlignmentBlock::default(),
        faces: FaceData::default(),
        tuning,
        shared: None,
        trigger: false,
    }
}
