//! Per-module change detection.
//!
//! Every image-quality module keeps exactly one cached entry: the input
//! snapshot of the frame it last computed. When a new frame's snapshot
//! matches and the frame number is unchanged, the expensive derived
//! state and previously committed parameters are reused as-is.

use tracing::debug;

/// Read-only exposure/lens scalars sampled from the frame-control
/// snapshots. Used only for change detection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AecSnapshot {
    pub lux_index: f32,
    pub linear_gain: f32,
    pub lens_position: f32,
    pub lens_zoom: f32,
}

/// Value snapshot of everything a module's derived state depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub aec: AecSnapshot,
    pub frame_num: u64,
    pub tuning_generation: u64,
    /// Path-specific flag: perspective parameters newly supplied this
    /// frame (enabled and not marked for reuse).
    pub perspective_changed: bool,
    /// Same, for grid parameters.
    pub grid_changed: bool,
}

#[derive(Debug, Default)]
pub struct DependencyCache {
    last: Option<InputSnapshot>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether derived state must be recomputed for `snapshot`.
    ///
    /// `trigger` carries dynamic enablement flips (noise-reduction mode,
    /// hysteresis thresholds) and is OR'd into the decision. The
    /// snapshot is retained whenever recomputation is indicated.
    pub fn update(&mut self, snapshot: InputSnapshot, trigger: bool) -> bool {
        let changed = trigger
            || match &self.last {
                None => true,
                Some(prev) => snapshot_differs(prev, &snapshot),
            };

        if changed {
            self.last = Some(snapshot);
        } else {
            debug!(frame_num = snapshot.frame_num, "inputs unchanged, reusing derived state");
        }
        changed
    }

    /// Drop the retained snapshot, forcing recomputation next frame.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}

fn float_differs(a: f32, b: f32) -> bool {
    (a - b).abs() > f32::EPSILON
}

fn snapshot_differs(prev: &InputSnapshot, cur: &InputSnapshot) -> bool {
    float_differs(prev.aec.lux_index, cur.aec.lux_index)
        || float_differs(prev.aec.linear_gain, cur.aec.linear_gain)
        || float_differs(prev.aec.lens_position, cur.aec.lens_position)
        || float_differs(prev.aec.lens_zoom, cur.aec.lens_zoom)
        || prev.frame_num != cur.frame_num
        || prev.tuning_generation != cur.tuning_generation
        || prev.perspective_changed != cur.perspective_changed
        || prev.grid_changed != cur.grid_changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(frame_num: u64) -> InputSnapshot {
        InputSnapshot {
            aec: AecSnapshot {
                lux_index: 120.0,
                linear_gain: 2.0,
                lens_position: 0.4,
                lens_zoom: 1.0,
            },
            frame_num,
            tuning_generation: 7,
            perspective_changed: false,
            grid_changed: false,
        }
    }

    #[test]
    fn test_first_frame_always_recomputes() {
        let mut cache = DependencyCache::new();
        assert!(cache.update(snapshot(1), false));
    }

    #[test]
    fn test_identical_snapshot_skips() {
        let mut cache = DependencyCache::new();
        assert!(cache.update(snapshot(1), false));
        assert!(!cache.update(snapshot(1), false));
    }

    #[test]
    fn test_frame_advance_recomputes() {
        let mut cache = DependencyCache::new();
        cache.update(snapshot(1), false);
        assert!(cache.update(snapshot(2), false));
    }

    #[test]
    fn test_each_scalar_triggers_recompute() {
        let base = snapshot(1);

        let mut lux = base;
        lux.aec.lux_index += 1.0;
        let mut gain = base;
        gain.aec.linear_gain += 0.5;
        let mut lens = base;
        lens.aec.lens_position += 0.1;
        let mut zoom = base;
        zoom.aec.lens_zoom += 0.25;
        let mut tuning = base;
        tuning.tuning_generation += 1;
        let mut persp = base;
        persp.perspective_changed = true;
        let mut grid = base;
        grid.grid_changed = true;

        for variant in [lux, gain, lens, zoom, tuning, persp, grid] {
            let mut cache = DependencyCache::new();
            cache.update(base, false);
            assert!(cache.update(variant, false), "variant {variant:?} must recompute");
        }
    }

    #[test]
    fn test_dynamic_trigger_overrides_skip() {
        let mut cache = DependencyCache::new();
        cache.update(snapshot(1), false);
        assert!(cache.update(snapshot(1), true));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut cache = DependencyCache::new();
        cache.update(snapshot(1), false);
        cache.invalidate();
        assert!(cache.update(snapshot(1), false));
    }
}
