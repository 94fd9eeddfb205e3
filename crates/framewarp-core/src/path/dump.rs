//! Human-readable state dumps for field debugging.

use std::fmt::Write;

use crate::path::module::PathModule;

/// Render the path's committed state as text, when diagnostics are
/// enabled and a frame has been committed.
pub fn dump_state(module: &PathModule) -> Option<String> {
    if !module.diagnostics {
        return None;
    }
    let output = module.committed_output()?;

    let mut text = String::new();
    let _ = writeln!(text, "path: {:?}", module.path());
    let _ = writeln!(
        text,
        "params: grid={} perspective={} ({}x{}) geometry={:?}",
        output.params.grid_enable,
        output.params.perspective_enable,
        output.params.perspective_rows,
        output.params.perspective_columns,
        output.params.grid_geometry,
    );
    let _ = writeln!(
        text,
        "invalid pixel: interpolate={} y={} cb={:#x} cr={:#x}",
        output.params.invalid_pixel_interpolation,
        output.params.invalid_pixel_const_y,
        output.params.invalid_pixel_const_cb,
        output.params.invalid_pixel_const_cr,
    );
    let _ = writeln!(
        text,
        "centers: tf=({},{}) nr=({},{}) sharp=({},{}) fnr=({},{})",
        output.geometry.temporal_filter_center.x,
        output.geometry.temporal_filter_center.y,
        output.geometry.noise_reduction_center.x,
        output.geometry.noise_reduction_center.y,
        output.geometry.sharpening_center.x,
        output.geometry.sharpening_center.y,
        output.geometry.freq_noise_reduction_center.x,
        output.geometry.freq_noise_reduction_center.y,
    );
    let _ = writeln!(
        text,
        "pass: input={}x{} out={}x{} force_warp={}",
        output.pass_geometry.input_frame_size.width,
        output.pass_geometry.input_frame_size.height,
        output.pass_geometry.output_size.width,
        output.pass_geometry.output_size.height,
        output.pass_geometry.force_warp_on,
    );
    if let Some(exports) = module.exports() {
        let _ = writeln!(
            text,
            "transform: matrices={} grid={} assist={} faces={}",
            exports.current.matrices.enable,
            exports.current.grid.enable,
            exports.current_assist.enable,
            exports.geometry.faces.count,
        );
    }
    Some(text)
}
