pub mod error;
pub mod consts;
pub mod engine;
pub mod tuning;
pub mod cache;
pub mod warp;
pub mod alignment;
pub mod geometry;
pub mod path;
