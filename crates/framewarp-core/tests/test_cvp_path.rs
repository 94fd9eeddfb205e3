mod common;

use approx::assert_relative_eq;
use common::{base_input, full_grid_block, perspective_block, tuning, StubEngine};
use framewarp_core::engine::{CvpFrameConfig, CvpScratch};
use framewarp_core::error::FramewarpError;
use framewarp_core::path::{CvpBuffers, IcaPath, PathModule};
use framewarp_core::warp::Size;

fn buffers() -> CvpBuffers {
    CvpBuffers {
        scratch: Some(CvpScratch { data: vec![0; 64] }),
        config: Some(CvpFrameConfig::default()),
    }
}

#[test]
fn test_cvp_builds_frame_config() {
    let engine = StubEngine::new();
    let mut module = PathModule::new(IcaPath::Cvp);
    let tuning = tuning();

    let mut input = base_input(1, &tuning);
    input.grid = full_grid_block();
    let mut bufs = buffers();

    module.execute(&engine, &input, Some(&mut bufs)).unwrap();

    // The enabled grid alone makes the frame grid-enabled-by-flow.
    assert_eq!(engine.call_count("convert_to_virtual_domain"), 1);
    assert_eq!(engine.call_count("build_cvp_transform"), 1);
    let config = bufs.config.as_ref().unwrap();
    assert!(config.grid_enable);
    assert!(!config.perspective_enable);
    assert_eq!(config.transform_defined_on, Size::new(1920, 1080));
    assert_relative_eq!(config.scale_x, 1.0);
    assert_relative_eq!(config.scale_y, 1.0);
}

#[test]
fn test_cvp_requires_coprocessor_buffers() {
    let engine = StubEngine::new();
    let mut module = PathModule::new(IcaPath::Cvp);
    let tuning = tuning();

    let mut input = base_input(1, &tuning);
    input.grid = full_grid_block();

    let err = module.execute(&engine, &input, None).unwrap_err();
    assert!(matches!(err, FramewarpError::InvalidArgument { .. }));
    assert!(module.committed_output().is_none());

    // Scratch alone is not enough; the frame config must come with it.
    let mut bufs = CvpBuffers {
        scratch: Some(CvpScratch { data: vec![0; 64] }),
        config: None,
    };
    let err = module.execute(&engine, &input, Some(&mut bufs)).unwrap_err();
    assert!(matches!(err, FramewarpError::InvalidArgument { .. }));
    assert_eq!(engine.call_count("build_cvp_transform"), 0);
}

#[test]
fn test_cvp_skips_conversion_when_transform_absent() {
    let engine = StubEngine::new();
    let mut module = PathModule::new(IcaPath::Cvp);
    let tuning = tuning();

    let input = base_input(1, &tuning);
    let mut bufs = buffers();

    module.execute(&engine, &input, Some(&mut bufs)).unwrap();

    assert_eq!(engine.call_count("convert_to_virtual_domain"), 0);
    assert_eq!(engine.call_count("build_cvp_transform"), 1);
    let config = bufs.config.as_ref().unwrap();
    assert!(!config.grid_enable);
    assert!(!config.perspective_enable);
}

#[test]
fn test_cvp_converts_with_perspective_present() {
    let engine = StubEngine::new();
    let mut module = PathModule::new(IcaPath::Cvp);
    let tuning = tuning();

    let mut input = base_input(1, &tuning);
    input.perspective = perspective_block(1, 1);
    let mut bufs = buffers();

    module.execute(&engine, &input, Some(&mut bufs)).unwrap();

    assert_eq!(engine.call_count("convert_to_virtual_domain"), 1);
    assert!(bufs.config.as_ref().unwrap().perspective_enable);
}
