use alloc::vec::Vec;

use crate::layout::main_axis_interval;
use crate::{Axis, Rect};

/// Frame storage with an `O(log n + k)` visible query.
///
/// Each frame is pushed with a *leading edge* on the scroll axis. Leading edges must be
/// non-decreasing and never exceed the frame's own minimum; for a stack that is the frame's
/// minimum, for a flow layout the top of its line.
///
/// The query binary-searches a prefix maximum of trailing edges to find the first candidate,
/// then scans forward until a leading edge reaches the end of the viewport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SortedFrames {
    axis: Axis,
    frames: Vec<Rect>,
    leading: Vec<f64>,
    trailing_max: Vec<f64>,
}

impl SortedFrames {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            frames: Vec::new(),
            leading: Vec::new(),
            trailing_max: Vec::new(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.leading.clear();
        self.trailing_max.clear();
    }

    pub fn reserve(&mut self, additional: usize) {
        self.frames.reserve(additional);
        self.leading.reserve(additional);
        self.trailing_max.reserve(additional);
    }

    /// Appends a frame whose leading edge is its own minimum.
    pub fn push(&mut self, frame: Rect) {
        let leading = frame.min(self.axis);
        self.push_with_leading(frame, leading);
    }

    pub fn push_with_leading(&mut self, frame: Rect, leading: f64) {
        if let Some(&prev) = self.leading.last() {
            if leading < prev {
                contract_violation!(
                    "leading edges must be non-decreasing",
                    prev = prev,
                    next = leading,
                );
            }
        }
        let trailing = frame.max(self.axis);
        let trailing_max = match self.trailing_max.last() {
            Some(&m) if m > trailing => m,
            _ => trailing,
        };
        self.frames.push(frame);
        self.leading.push(leading);
        self.trailing_max.push(trailing_max);
    }

    /// Overwrites a frame in place, keeping its leading edge.
    ///
    /// Used by align passes that shift frames inside an already-placed line. The new frame
    /// must not start before the stored leading edge.
    pub fn set_frame(&mut self, at: usize, frame: Rect) {
        let Some(slot) = self.frames.get_mut(at) else {
            contract_violation!("set_frame out of range", index = at);
            return;
        };
        *slot = frame;
        let mut running = if at == 0 {
            f64::NEG_INFINITY
        } else {
            self.trailing_max[at - 1]
        };
        for i in at..self.frames.len() {
            running = running.max(self.frames[i].max(self.axis));
            self.trailing_max[i] = running;
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Rect] {
        &self.frames
    }

    pub fn frame(&self, at: usize) -> Rect {
        match self.frames.get(at) {
            Some(frame) => *frame,
            None => {
                vtrace!(index = at, count = self.frames.len(), "frame before layout");
                Rect::ZERO
            }
        }
    }

    /// Indexes whose frames intersect `visible` on the scroll axis (half-open), ascending.
    pub fn visible_indexes(&self, visible: Rect) -> Vec<usize> {
        let (start, end) = main_axis_interval(&visible, self.axis);
        let first = self.trailing_max.partition_point(|&t| t <= start);
        let mut out = Vec::new();
        for i in first..self.frames.len() {
            if self.leading[i] >= end {
                break;
            }
            let (min, max) = main_axis_interval(&self.frames[i], self.axis);
            if min < end && max > start {
                out.push(i);
            }
        }
        out
    }
}
