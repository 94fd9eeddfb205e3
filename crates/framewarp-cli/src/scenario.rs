//! TOML scenario format for replaying frame sequences.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use framewarp_core::cache::AecSnapshot;
use framewarp_core::consts::{MAX_PERSPECTIVE_MATRICES, PERSPECTIVE_MATRIX_PARAMS};
use framewarp_core::geometry::{FaceData, ZoomWindow};
use framewarp_core::path::{
    AlignmentBlock, ConfigMode, FrameInput, GridBlock, IcaPath, PerspectiveBlock,
    GRID_GEOMETRY_COMPACT, GRID_GEOMETRY_FULL,
};
use framewarp_core::tuning::TuningRecord;
use framewarp_core::warp::{GridGeometry, GridSample, Size};

#[derive(Deserialize)]
pub struct Scenario {
    pub stream: StreamConfig,
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PathKind {
    Input,
    Reference,
    Cvp,
}

impl PathKind {
    pub fn to_path(self) -> IcaPath {
        match self {
            Self::Input => IcaPath::Input,
            Self::Reference => IcaPath::Reference,
            Self::Cvp => IcaPath::Cvp,
        }
    }
}

#[derive(Deserialize)]
pub struct StreamConfig {
    pub path: PathKind,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_margin_width")]
    pub margin_width: u32,
    #[serde(default = "default_margin_height")]
    pub margin_height: u32,
    #[serde(default)]
    pub grid_from_tuning: bool,
    #[serde(default)]
    pub stabilization_mctf: bool,
}

fn default_margin_width() -> u32 {
    64
}

fn default_margin_height() -> u32 {
    48
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    #[default]
    None,
    Mctf,
    Mfnr,
}

impl ModeKind {
    fn to_mode(self) -> ConfigMode {
        match self {
            Self::None => ConfigMode::None,
            Self::Mctf => ConfigMode::Mctf,
            Self::Mfnr => ConfigMode::MfnrTemporalAnchorAggregate,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GeometryKind {
    #[default]
    Full,
    Compact,
}

#[derive(Deserialize)]
pub struct PerspectiveConfig {
    pub rows: u32,
    pub columns: u32,
    #[serde(default = "default_matrix_value")]
    pub value: f32,
    #[serde(default = "default_confidence")]
    pub confidence: u32,
    #[serde(default)]
    pub reuse: bool,
}

fn default_matrix_value() -> f32 {
    1.0
}

fn default_confidence() -> u32 {
    255
}

#[derive(Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub geometry: GeometryKind,
    #[serde(default)]
    pub shift_x: f32,
    #[serde(default)]
    pub shift_y: f32,
    #[serde(default)]
    pub reuse: bool,
}

#[derive(Deserialize)]
pub struct AlignmentConfig {
    #[serde(default = "default_one")]
    pub rows: u32,
    #[serde(default = "default_one")]
    pub columns: u32,
    #[serde(default = "default_matrix_value")]
    pub value: f32,
    #[serde(default)]
    pub bypass: bool,
}

fn default_one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct FrameConfig {
    pub frame_num: u64,
    #[serde(default)]
    pub mode: ModeKind,
    pub perspective: Option<PerspectiveConfig>,
    pub grid: Option<GridConfig>,
    pub alignment: Option<AlignmentConfig>,
    #[serde(default)]
    pub trigger: bool,
    #[serde(default = "default_lux")]
    pub lux_index: f32,
}

fn default_lux() -> f32 {
    100.0
}

pub fn load(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse scenario {}", path.display()))
}

fn matrices(value: f32) -> [[f32; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES] {
    let mut out = [[0.0; PERSPECTIVE_MATRIX_PARAMS]; MAX_PERSPECTIVE_MATRICES];
    for matrix in &mut out {
        // Scaled identity, row-major.
        matrix[0] = value;
        matrix[4] = value;
        matrix[8] = 1.0;
    }
    out
}

impl FrameConfig {
    pub fn to_input<'a>(&self, stream: &StreamConfig, tuning: &'a TuningRecord) -> FrameInput<'a> {
        let image = Size::new(stream.width, stream.height);
        let zoom = ZoomWindow {
            full: image,
            left: 0,
            top: 0,
            width: stream.width,
            height: stream.height,
        };

        let perspective = match &self.perspective {
            Some(p) => PerspectiveBlock {
                enable: true,
                reuse: p.reuse,
                rows: p.rows,
                columns: p.columns,
                confidence: p.confidence,
                defined_on: image,
                matrices: matrices(p.value),
            },
            None => PerspectiveBlock::default(),
        };

        let grid = match &self.grid {
            Some(g) => {
                let (geometry, code) = match g.geometry {
                    GeometryKind::Full => (GridGeometry::Full51x67, GRID_GEOMETRY_FULL),
                    GeometryKind::Compact => (GridGeometry::Compact27x35, GRID_GEOMETRY_COMPACT),
                };
                GridBlock {
                    enable: true,
                    reuse: g.reuse,
                    geometry: code,
                    defined_on: image,
                    samples: vec![
                        GridSample {
                            x: g.shift_x,
                            y: g.shift_y,
                        };
                        geometry.rows() * geometry.columns()
                    ],
                }
            }
            None => GridBlock::default(),
        };

        let alignment = match &self.alignment {
            Some(a) => AlignmentBlock {
                perspective: PerspectiveBlock {
                    enable: true,
                    reuse: false,
                    rows: a.rows,
                    columns: a.columns,
                    confidence: 255,
                    defined_on: image,
                    matrices: matrices(a.value),
                },
                bypass_adjustment: a.bypass,
            },
            None => AlignmentBlock::default(),
        };

        FrameInput {
            frame_num: self.frame_num,
            image_size: image,
            margins: Size::new(stream.margin_width, stream.margin_height),
            zoom_window: zoom,
            frontend_zoom_window: zoom,
            aec: AecSnapshot {
                lux_index: self.lux_index,
                linear_gain: 1.0,
                lens_position: 0.5,
                lens_zoom: 1.0,
            },
            optical_center_x: stream.width as f32 / 2.0,
            optical_center_y: stream.height as f32 / 2.0,
            upscale_ratio: 1.0,
            mode: self.mode.to_mode(),
            stabilization_mctf: stream.stabilization_mctf,
            perspective,
            grid,
            alignment,
            faces: FaceData::default(),
            tuning,
            shared: None,
            trigger: self.trigger,
        }
    }
}
