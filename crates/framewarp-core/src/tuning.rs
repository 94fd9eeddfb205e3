use serde::{Deserialize, Serialize};

use crate::consts::INTERPOLATION_LUT_ENTRIES;

/// Treatment of pixels the warp maps outside the valid input region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidPixelPolicy {
    pub interpolate: bool,
    pub const_y: u16,
    pub const_cb: u16,
    pub const_cr: u16,
}

impl Default for InvalidPixelPolicy {
    fn default() -> Self {
        Self {
            interpolate: true,
            const_y: 0,
            const_cb: 0x200,
            const_cr: 0x200,
        }
    }
}

/// Per-frame resolved tuning record for the warp block.
///
/// Produced upstream by the tuning-tree lookup (out of scope here) and
/// consumed read-only. `generation` increments whenever the lookup
/// resolves a different record, so the dependency cache can detect
/// tuning changes without comparing tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TuningRecord {
    pub generation: u64,
    /// Grid enable as authored in tuning. Honored only when the static
    /// grid-from-tuning policy is set on the module.
    pub grid_enable: bool,
    pub y_interpolation_type: u8,
    #[serde(default)]
    pub invalid_pixel: InvalidPixelPolicy,
    #[serde(default = "zero_lut")]
    pub interpolation_lut_0: [u16; INTERPOLATION_LUT_ENTRIES],
    #[serde(default = "zero_lut")]
    pub interpolation_lut_1: [u16; INTERPOLATION_LUT_ENTRIES],
    #[serde(default = "zero_lut")]
    pub interpolation_lut_2: [u16; INTERPOLATION_LUT_ENTRIES],
}

fn zero_lut() -> [u16; INTERPOLATION_LUT_ENTRIES] {
    [0; INTERPOLATION_LUT_ENTRIES]
}

impl Default for TuningRecord {
    fn default() -> Self {
        Self {
            generation: 0,
            grid_enable: false,
            y_interpolation_type: 0,
            invalid_pixel: InvalidPixelPolicy::default(),
            interpolation_lut_0: zero_lut(),
            interpolation_lut_1: zero_lut(),
            interpolation_lut_2: zero_lut(),
        }
    }
}
