pub mod transform;
pub mod assist;
pub mod domain;

pub use assist::{build_assist_grid, should_build_assist, AssistGrid};
pub use domain::{convert_if_enabled, convert_to_virtual};
pub use transform::{
    CenterType, DeformationGrid, ExtrapolateType, GridGeometry, GridSample, PerspectiveSet, Size,
    WarpDomain, WarpTransform,
};
