//! Per-subsystem optical-center / geometry resolution.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{MAX_FACES, OPTICAL_CENTER_LOGICAL_MAX};
use crate::engine::{check, WarpEngine};
use crate::error::Result;
use crate::warp::{AssistGrid, Size, WarpTransform};

/// Image domain an alignment transform is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageDomain {
    #[default]
    Input,
    Intermediate,
    Output,
}

/// A zoom selection: the full sensor rectangle plus the active window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub full: Size,
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Face-detection context forwarded to downstream consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceData {
    pub count: u32,
    pub center_x: [u32; MAX_FACES],
    pub center_y: [u32; MAX_FACES],
    pub radius: [u32; MAX_FACES],
}

impl Default for FaceData {
    fn default() -> Self {
        Self {
            count: 0,
            center_x: [0; MAX_FACES],
            center_y: [0; MAX_FACES],
            radius: [0; MAX_FACES],
        }
    }
}

/// Logical optical center in 15uQ14 fixed point per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpticalCenter {
    pub x: u32,
    pub y: u32,
}

/// An assist grid together with the transform it was derived from.
#[derive(Clone, Copy)]
pub struct AssistPair<'a> {
    pub assist: &'a AssistGrid,
    pub source: &'a WarpTransform,
}

/// Read-only request for geometry resolution.
pub struct GeometryInput<'a> {
    pub image_size: Size,
    pub margins: Size,
    /// Back-end (processing) zoom selection.
    pub zoom_window: ZoomWindow,
    /// Front-end zoom selection.
    pub frontend_zoom_window: ZoomWindow,
    pub alignment: Option<&'a WarpTransform>,
    pub alignment_domain: ImageDomain,
    /// Face context was captured on the previous frame (temporal-filter
    /// configurations).
    pub faces_from_prev_frame: bool,
    pub current_grids: Option<AssistPair<'a>>,
    pub previous_grids: Option<AssistPair<'a>>,
    pub faces: &'a FaceData,
    pub upscale_ratio: f32,
    /// Shared logical optical center for all consumers.
    pub optical_center: OpticalCenter,
}

/// Computed geometry for downstream consumers.
///
/// All consumers currently receive the identical center ratio; the
/// per-consumer fields are kept because the hardware programs them
/// independently.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeometryOutput {
    pub temporal_filter_center: OpticalCenter,
    pub noise_reduction_center: OpticalCenter,
    pub sharpening_center: OpticalCenter,
    pub freq_noise_reduction_center: OpticalCenter,
    pub faces: FaceData,
}

/// Convert a physical optical center (pixels) into the logical Q14
/// fraction of the image: 0 is the image start, the logical maximum is
/// the end.
pub fn logical_optical_center(image: Size, physical_x: f32, physical_y: f32) -> OpticalCenter {
    let ratio_x = image.width as f32 / physical_x;
    let ratio_y = image.height as f32 / physical_y;
    OpticalCenter {
        x: (OPTICAL_CENTER_LOGICAL_MAX / ratio_x).round() as u32,
        y: (OPTICAL_CENTER_LOGICAL_MAX / ratio_y).round() as u32,
    }
}

/// Precondition for geometry resolution.
///
/// Requires an assist grid, an active current transform, and — when the
/// alignment domain is not the input domain — an active previous-frame
/// transform, since intermediate/output-domain alignment composes
/// against last frame's geometry.
pub fn needs_geometry(
    assist: Option<&AssistGrid>,
    current: &WarpTransform,
    previous: &WarpTransform,
    domain: ImageDomain,
) -> bool {
    if assist.is_none() || !current.is_active() {
        return false;
    }
    match domain {
        ImageDomain::Input => true,
        ImageDomain::Intermediate | ImageDomain::Output => previous.is_active(),
    }
}

/// Run geometry resolution: broadcast the shared optical center to every
/// consumer, copy face context when faces were detected, then hand the
/// prefilled output to the external computation.
pub fn resolve_geometry(
    engine: &dyn WarpEngine,
    input: &GeometryInput<'_>,
    out: &mut GeometryOutput,
) -> Result<()> {
    let center = input.optical_center;
    out.temporal_filter_center = center;
    out.noise_reduction_center = center;
    out.sharpening_center = center;
    out.freq_noise_reduction_center = center;

    if input.faces.count > 0 {
        out.faces = *input.faces;
    }

    check(engine.resolve_geometry(input, out), "resolve_geometry")?;
    debug!(center_x = center.x, center_y = center.y, "geometry resolved");
    Ok(())
}
