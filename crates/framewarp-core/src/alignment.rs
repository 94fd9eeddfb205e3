//! Motion-compensated temporal-filter alignment composition.
//!
//! For MCTF the reference frame is re-warped by an alignment transform
//! composed against the current input transform. Composition only
//! happens when every input it needs is actually available; otherwise
//! the caller keeps the unadjusted reference transform. Falling back is
//! a routine outcome, not an error.

use tracing::debug;

use crate::engine::{check, WarpEngine};
use crate::error::Result;
use crate::geometry::ImageDomain;
use crate::warp::{AssistGrid, Size, WarpTransform};

/// Flow-level switches controlling whether alignment adjustment runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlignmentPolicy {
    /// MCTF with EIS enabled for this stream.
    pub mctf_eis: bool,
    /// Operator override: keep the raw alignment transform.
    pub bypass_adjustment: bool,
}

/// Everything alignment composition can draw on for one frame. Each
/// field is optional because upstream stages populate them
/// independently and any of them can legitimately be missing.
pub struct AlignmentContext<'a> {
    /// Reference alignment transform from the stabilization block.
    pub alignment: Option<&'a WarpTransform>,
    /// Current-frame input transform.
    pub input: Option<&'a WarpTransform>,
    /// Assist grid derived on the previous frame.
    pub prev_assist: Option<&'a AssistGrid>,
    /// Transform the previous assist grid was derived from.
    pub prev_source: Option<&'a WarpTransform>,
    pub image_size: Option<Size>,
    pub margins: Option<Size>,
    pub domain: ImageDomain,
}

/// Fully-resolved view handed to the external engine once the
/// preconditions hold.
pub struct AlignmentInputs<'a> {
    pub image_size: Size,
    pub margins: Size,
    pub alignment_domain: ImageDomain,
    pub alignment: &'a WarpTransform,
    pub input: &'a WarpTransform,
    pub prev_assist: &'a AssistGrid,
    pub prev_source: &'a WarpTransform,
}

/// Structural gate for alignment composition: every input present, the
/// alignment transform active, the previous assist grid populated, and
/// the flow switched on without a bypass override.
pub fn mctf_preconditions(ctx: &AlignmentContext<'_>, policy: AlignmentPolicy) -> bool {
    if !policy.mctf_eis || policy.bypass_adjustment {
        return false;
    }
    let Some(alignment) = ctx.alignment else {
        return false;
    };
    if !alignment.matrices.enable {
        return false;
    }
    let Some(prev_assist) = ctx.prev_assist else {
        return false;
    };
    if !prev_assist.grid.is_populated() {
        return false;
    }
    ctx.prev_source.is_some()
        && ctx.input.is_some()
        && ctx.image_size.is_some_and(|size| !size.is_empty())
        && ctx.margins.is_some()
}

/// Compose the alignment adjustment into `scratch`.
///
/// Returns `Ok(true)` when `scratch` holds the adjusted transform,
/// `Ok(false)` when composition was skipped and the caller should use
/// the unadjusted reference transform. Engine failures propagate.
pub fn compose_alignment(
    engine: &dyn WarpEngine,
    ctx: &AlignmentContext<'_>,
    policy: AlignmentPolicy,
    scratch: &mut WarpTransform,
) -> Result<bool> {
    if !mctf_preconditions(ctx, policy) {
        debug!("alignment adjustment skipped, preconditions not met");
        return Ok(false);
    }
    let (
        Some(alignment),
        Some(input),
        Some(prev_assist),
        Some(prev_source),
        Some(image_size),
        Some(margins),
    ) = (
        ctx.alignment,
        ctx.input,
        ctx.prev_assist,
        ctx.prev_source,
        ctx.image_size,
        ctx.margins,
    )
    else {
        return Ok(false);
    };

    let inputs = AlignmentInputs {
        image_size,
        margins,
        alignment_domain: ctx.domain,
        alignment,
        input,
        prev_assist,
        prev_source,
    };

    if !engine.alignment_adjustment_valid(&inputs) {
        debug!("alignment adjustment skipped, inputs rejected by engine");
        return Ok(false);
    }

    scratch.reset_disabled();
    check(
        engine.compute_alignment_adjustment(&inputs, scratch),
        "compute_alignment_adjustment",
    )?;
    debug!(domain = ?ctx.domain, "alignment adjustment composed");
    Ok(true)
}
