//! Per-path frame configuration: input staging, double-buffered slots,
//! the per-frame state machine, and diagnostic dumps.

pub mod dump;
pub mod input;
pub mod module;
pub mod slots;

pub use dump::dump_state;
pub use input::{
    AlignmentBlock, ConfigMode, FrameInput, GridBlock, PerspectiveBlock, GRID_GEOMETRY_COMPACT,
    GRID_GEOMETRY_FULL,
};
pub use module::{CvpBuffers, FrameOutput, IcaPath, PathModule, WarpExports};
pub use slots::{FrameSlot, FrameSlots};
