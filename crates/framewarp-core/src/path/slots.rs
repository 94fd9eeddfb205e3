//! Double-buffered per-frame transform storage.
//!
//! Each path keeps two frame slots and alternates between them by frame
//! parity, so the previous frame's transform and assist grid stay
//! addressable while the current frame is being configured.

use crate::warp::{AssistGrid, WarpTransform};

/// One frame's retained state: the staged transform and the assist grid
/// derived from it.
#[derive(Clone, Debug, Default)]
pub struct FrameSlot {
    pub transform: WarpTransform,
    pub assist: AssistGrid,
}

/// Ping-pong pair of frame slots, indexed by frame parity.
#[derive(Clone, Debug, Default)]
pub struct FrameSlots {
    slots: [FrameSlot; 2],
}

impl FrameSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(frame_num: u64) -> usize {
        (frame_num % 2) as usize
    }

    pub fn current(&self, frame_num: u64) -> &FrameSlot {
        &self.slots[Self::index(frame_num)]
    }

    pub fn current_mut(&mut self, frame_num: u64) -> &mut FrameSlot {
        &mut self.slots[Self::index(frame_num)]
    }

    pub fn previous(&self, frame_num: u64) -> &FrameSlot {
        &self.slots[Self::index(frame_num) ^ 1]
    }

    /// Split borrow of both slots: the current one mutably, the previous
    /// one shared. Used when deriving the current frame against last
    /// frame's retained state.
    pub fn current_and_previous(&mut self, frame_num: u64) -> (&mut FrameSlot, &FrameSlot) {
        let (left, right) = self.slots.split_at_mut(1);
        if Self::index(frame_num) == 0 {
            (&mut left[0], &right[0])
        } else {
            (&mut right[0], &left[0])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parity_alternates() {
        let mut slots = FrameSlots::new();
        slots.current_mut(4).transform.matrices.enable = true;
        slots.current_mut(5).transform.grid.enable = true;

        assert!(slots.current(4).transform.matrices.enable);
        assert!(!slots.current(4).transform.grid.enable);
        assert!(slots.current(5).transform.grid.enable);

        // Frame 6 lands back on frame 4's slot.
        assert!(slots.current(6).transform.matrices.enable);
        assert!(slots.previous(6).transform.grid.enable);
    }

    #[test]
    fn test_split_borrow_pairs_slots() {
        let mut slots = FrameSlots::new();
        slots.current_mut(0).transform.matrices.enable = true;
        slots.current_mut(1).transform.grid.enable = true;

        let (current, previous) = slots.current_and_previous(2);
        assert!(current.transform.matrices.enable);
        assert!(previous.transform.grid.enable);

        let (current, previous) = slots.current_and_previous(3);
        assert!(current.transform.grid.enable);
        assert!(previous.transform.matrices.enable);
    }
}
