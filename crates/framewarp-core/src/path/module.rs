//! Per-path frame state machine.
//!
//! One `PathModule` instance exists per hardware warp path. Each frame
//! it stages the published transform blocks, runs the path's fixed
//! sequence of external computations, and commits the resulting
//! hardware parameters only when the whole sequence succeeded. A failed
//! frame leaves the last committed output in place.

use tracing::{debug, warn};

use crate::alignment::{compose_alignment, AlignmentContext, AlignmentPolicy};
use crate::cache::{DependencyCache, InputSnapshot};
use crate::engine::{
    check, CvpFrameConfig, CvpScratch, PassGeometry, WarpEngine, WarpParams, ENGINE_SUCCESS,
};
use crate::error::{FramewarpError, Result};
use crate::geometry::{
    logical_optical_center, needs_geometry, resolve_geometry, AssistPair, GeometryInput,
    GeometryOutput, ImageDomain,
};
use crate::path::input::{stage_grid, stage_perspective, ConfigMode, FrameInput};
use crate::path::slots::FrameSlots;
use crate::warp::{
    build_assist_grid, convert_if_enabled, convert_to_virtual, should_build_assist, AssistGrid,
    WarpDomain, WarpTransform,
};

/// The three hardware warp paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IcaPath {
    /// Warps the incoming frame.
    Input,
    /// Re-warps the previous output frame for temporal filtering.
    Reference,
    /// Produces the motion-coprocessor frame configuration.
    Cvp,
}

/// Committed per-frame output of one path.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    pub params: WarpParams,
    pub geometry: GeometryOutput,
    pub pass_geometry: PassGeometry,
}

/// Coprocessor-owned buffers handed in by the caller on the CVP path.
#[derive(Debug, Default)]
pub struct CvpBuffers {
    pub scratch: Option<CvpScratch>,
    pub config: Option<CvpFrameConfig>,
}

/// State the input path exports for the reference path to compose
/// against.
#[derive(Clone, Copy)]
pub struct WarpExports<'a> {
    pub current: &'a WarpTransform,
    pub previous: &'a WarpTransform,
    pub current_assist: &'a AssistGrid,
    pub previous_assist: &'a AssistGrid,
    pub geometry: &'a GeometryOutput,
}

/// Per-path frame state machine.
#[derive(Debug)]
pub struct PathModule {
    path: IcaPath,
    slots: FrameSlots,
    /// Reference alignment transform staged from the stabilization block.
    reference: WarpTransform,
    /// Scratch for the composed alignment adjustment.
    scratch: WarpTransform,
    cache: DependencyCache,
    output: FrameOutput,
    committed: bool,
    last_frame: u64,
    /// Tuning data may supply a deformation grid on this path.
    grid_from_tuning: bool,
    /// Emit state dumps after each frame.
    pub diagnostics: bool,
}

impl PathModule {
    pub fn new(path: IcaPath) -> Self {
        Self {
            path,
            slots: FrameSlots::new(),
            reference: WarpTransform::new(),
            scratch: WarpTransform::new(),
            cache: DependencyCache::new(),
            output: FrameOutput::default(),
            committed: false,
            last_frame: 0,
            grid_from_tuning: false,
            diagnostics: false,
        }
    }

    pub fn with_grid_from_tuning(path: IcaPath) -> Self {
        let mut module = Self::new(path);
        module.grid_from_tuning = true;
        module
    }

    pub fn path(&self) -> IcaPath {
        self.path
    }

    /// Last committed output, if any frame has been committed.
    pub fn committed_output(&self) -> Option<&FrameOutput> {
        self.committed.then_some(&self.output)
    }

    /// State the reference path composes against. Only meaningful on
    /// the input path after a committed frame.
    pub fn exports(&self) -> Option<WarpExports<'_>> {
        if !self.committed {
            return None;
        }
        let current = self.slots.current(self.last_frame);
        let previous = self.slots.previous(self.last_frame);
        Some(WarpExports {
            current: &current.transform,
            previous: &previous.transform,
            current_assist: &current.assist,
            previous_assist: &previous.assist,
            geometry: &self.output.geometry,
        })
    }

    /// Configure this path for one frame.
    ///
    /// Returns the committed output for the frame. When the dependency
    /// cache reports unchanged inputs, the previous output is returned
    /// without recomputation.
    pub fn execute(
        &mut self,
        engine: &dyn WarpEngine,
        input: &FrameInput<'_>,
        cvp: Option<&mut CvpBuffers>,
    ) -> Result<&FrameOutput> {
        if input.image_size.is_empty() {
            return Err(FramewarpError::InvalidArgument { what: "image size" });
        }
        if input.margins.is_empty() {
            return Err(FramewarpError::InvalidArgument { what: "margins" });
        }

        let snapshot = InputSnapshot {
            aec: input.aec,
            frame_num: input.frame_num,
            tuning_generation: input.tuning.generation,
            perspective_changed: input.perspective.enable && !input.perspective.reuse,
            grid_changed: input.grid.enable && !input.grid.reuse,
        };
        if !self.cache.update(snapshot, input.trigger) && self.committed {
            return Ok(&self.output);
        }

        let mut out = FrameOutput::default();
        let result = match self.path {
            IcaPath::Input => self.run_input(engine, input, &mut out),
            IcaPath::Reference => self.run_reference(engine, input, &mut out),
            IcaPath::Cvp => self.run_cvp(engine, input, cvp, &mut out),
        };
        if let Err(err) = result {
            // Force recomputation next frame; the committed output keeps
            // serving until one succeeds.
            self.cache.invalidate();
            return Err(err);
        }

        self.output = out;
        self.committed = true;
        self.last_frame = input.frame_num;
        debug!(path = ?self.path, frame_num = input.frame_num, "frame committed");
        Ok(&self.output)
    }

    fn stage_slot(&mut self, input: &FrameInput<'_>) -> Result<()> {
        let (current, previous) = self.slots.current_and_previous(input.frame_num);
        if input.perspective.reuse {
            current.transform.matrices = previous.transform.matrices.clone();
        } else {
            stage_perspective(&input.perspective, &mut current.transform.matrices)?;
        }
        if input.grid.reuse {
            current.transform.grid = previous.transform.grid.clone();
        } else {
            stage_grid(&input.grid, &mut current.transform.grid)?;
        }
        current.transform.domain = WarpDomain::DistortedInput;
        Ok(())
    }

    fn run_input(
        &mut self,
        engine: &dyn WarpEngine,
        input: &FrameInput<'_>,
        out: &mut FrameOutput,
    ) -> Result<()> {
        self.stage_slot(input)?;
        if input.stabilization_mctf {
            stage_perspective(&input.alignment.perspective, &mut self.reference.matrices)?;
            self.reference.grid.enable = false;
            self.reference.domain = WarpDomain::DistortedInput;
        }

        let (current, previous) = self.slots.current_and_previous(input.frame_num);
        // Grid-enabled-by-flow is the staged transform's own grid state.
        let grid_flow = current.transform.grid.enable;

        if current.transform.is_active() {
            let perspective_enabled = current.transform.matrices.enable;
            convert_if_enabled(engine, &mut current.transform, grid_flow, perspective_enabled)?;

            // MFNR anchor aggregation failure is recoverable: drop the
            // perspective part and continue with what remains.
            if input.mode == ConfigMode::MfnrTemporalAnchorAggregate
                && current.transform.matrices.enable
            {
                let status = engine.compute_temporal_transform(&mut current.transform);
                if status != ENGINE_SUCCESS {
                    warn!(status, "temporal transform failed, disabling perspective");
                    current.transform.matrices.enable = false;
                }
            }

            if should_build_assist(&current.transform, grid_flow) {
                if let Err(err) = build_assist_grid(engine, &current.transform, &mut current.assist)
                {
                    warn!(%err, "assist grid build failed, continuing without");
                    current.assist.enable = false;
                }
            } else {
                current.assist.enable = false;
            }

            let (alignment, domain, faces_from_prev, previous_grids) =
                if input.mode == ConfigMode::Mctf {
                    let prev = previous.assist.enable.then_some(AssistPair {
                        assist: &previous.assist,
                        source: &previous.transform,
                    });
                    (Some(&self.reference), ImageDomain::Output, true, prev)
                } else {
                    (None, ImageDomain::Input, false, None)
                };

            // Slot storage always exists, so the assist grid is present
            // here regardless of its enable state.
            let assist = Some(&current.assist);
            if needs_geometry(assist, &current.transform, &previous.transform, domain) {
                let geometry_input = GeometryInput {
                    image_size: input.image_size,
                    margins: input.margins,
                    zoom_window: input.zoom_window,
                    frontend_zoom_window: input.frontend_zoom_window,
                    alignment,
                    alignment_domain: domain,
                    faces_from_prev_frame: faces_from_prev,
                    current_grids: Some(AssistPair {
                        assist: &current.assist,
                        source: &current.transform,
                    }),
                    previous_grids,
                    faces: &input.faces,
                    upscale_ratio: input.upscale_ratio,
                    optical_center: logical_optical_center(
                        input.image_size,
                        input.optical_center_x,
                        input.optical_center_y,
                    ),
                };
                resolve_geometry(engine, &geometry_input, &mut out.geometry)?;
            }
        }

        let current = self.slots.current(input.frame_num);
        check(
            engine.compute_tuning_params(
                input.tuning,
                grid_flow,
                self.grid_from_tuning,
                &mut out.params,
            ),
            "compute_tuning_params",
        )?;
        check(
            engine.compute_geometry_params(
                &current.transform,
                grid_flow,
                &mut out.params,
                &mut out.pass_geometry,
            ),
            "compute_geometry_params",
        )
    }

    fn run_reference(
        &mut self,
        engine: &dyn WarpEngine,
        input: &FrameInput<'_>,
        out: &mut FrameOutput,
    ) -> Result<()> {
        if input.stabilization_mctf {
            stage_perspective(&input.alignment.perspective, &mut self.reference.matrices)?;
            self.reference.grid.enable = false;
        } else {
            stage_perspective(&input.perspective, &mut self.reference.matrices)?;
            stage_grid(&input.grid, &mut self.reference.grid)?;
        }
        self.reference.domain = WarpDomain::DistortedInput;
        let grid_flow = self.reference.grid.enable;
        convert_to_virtual(engine, &mut self.reference)?;

        let policy = AlignmentPolicy {
            mctf_eis: input.stabilization_mctf,
            bypass_adjustment: input.alignment.bypass_adjustment,
        };
        let shared = input.shared.as_ref();
        let ctx = AlignmentContext {
            alignment: Some(&self.reference),
            input: shared.map(|s| s.current),
            prev_assist: shared.map(|s| s.previous_assist),
            prev_source: shared.map(|s| s.previous),
            image_size: Some(input.image_size),
            margins: Some(input.margins),
            domain: ImageDomain::Output,
        };
        let composed = compose_alignment(engine, &ctx, policy, &mut self.scratch)?;
        let effective = if composed { &self.scratch } else { &self.reference };

        check(
            engine.compute_tuning_params(
                input.tuning,
                grid_flow,
                self.grid_from_tuning,
                &mut out.params,
            ),
            "compute_tuning_params",
        )?;
        check(
            engine.compute_geometry_params(
                effective,
                grid_flow,
                &mut out.params,
                &mut out.pass_geometry,
            ),
            "compute_geometry_params",
        )
    }

    fn run_cvp(
        &mut self,
        engine: &dyn WarpEngine,
        input: &FrameInput<'_>,
        cvp: Option<&mut CvpBuffers>,
        out: &mut FrameOutput,
    ) -> Result<()> {
        self.stage_slot(input)?;
        let current = self.slots.current_mut(input.frame_num);
        let grid_flow = current.transform.grid.enable;
        let perspective_enabled = current.transform.matrices.enable;
        convert_if_enabled(engine, &mut current.transform, grid_flow, perspective_enabled)?;

        check(
            engine.compute_tuning_params(
                input.tuning,
                grid_flow,
                self.grid_from_tuning,
                &mut out.params,
            ),
            "compute_tuning_params",
        )?;

        let Some(buffers) = cvp else {
            return Err(FramewarpError::InvalidArgument {
                what: "cvp buffers",
            });
        };
        let (Some(scratch), Some(config)) = (buffers.scratch.as_mut(), buffers.config.as_mut())
        else {
            return Err(FramewarpError::InvalidArgument {
                what: "cvp scratch and frame config",
            });
        };
        let current = self.slots.current(input.frame_num);
        check(
            engine.build_cvp_transform(&current.transform, scratch, config),
            "build_cvp_transform",
        )
    }
}
