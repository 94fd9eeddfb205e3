//! Conversion between the distorted-input and virtual (undistorted)
//! coordinate domains. The arithmetic is owned entirely by the external
//! engine; this module only gates the call and propagates its status.

use crate::engine::{check, WarpEngine};
use crate::error::Result;
use crate::warp::transform::WarpTransform;

/// Convert `warp` to the virtual domain, unconditionally.
pub fn convert_to_virtual(engine: &dyn WarpEngine, warp: &mut WarpTransform) -> Result<()> {
    check(
        engine.convert_to_virtual_domain(warp),
        "convert_to_virtual_domain",
    )
}

/// Convert `warp` to the virtual domain when the frame actually carries
/// a transform: grid enabled by flow, or perspective enabled.
pub fn convert_if_enabled(
    engine: &dyn WarpEngine,
    warp: &mut WarpTransform,
    grid_enabled_by_flow: bool,
    perspective_enabled: bool,
) -> Result<()> {
    if !grid_enabled_by_flow && !perspective_enabled {
        return Ok(());
    }
    convert_to_virtual(engine, warp)
}
