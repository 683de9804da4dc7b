//! Pointer-driven frame selection
//!
//! While dragging, `length` is signed: dragging left of the anchor gives a
//! negative length. Finishing the drag normalizes it so the selection
//! always has `length >= 0` afterwards.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    start: i64,
    length: i64,
    dragging: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    /// Signed while dragging, non-negative otherwise
    pub fn length(&self) -> i64 {
        self.length
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Anchor a new selection at `frame`
    pub fn begin(&mut self, frame: i64) {
        log::trace!("Selection: begin at {}", frame);
        self.start = frame;
        self.length = 0;
        self.dragging = true;
    }

    /// Extend the selection to `frame`. Ignored when not dragging.
    pub fn update(&mut self, frame: i64) {
        if !self.dragging {
            return;
        }
        self.length = frame - self.start;
        log::trace!("Selection: start {} length {}", self.start, self.length);
    }

    /// End the drag, normalizing a backwards selection. Returns true when
    /// the selection is non-empty.
    pub fn finish(&mut self) -> bool {
        if !self.dragging {
            return false;
        }
        self.dragging = false;
        if self.length < 0 {
            self.start += self.length;
            self.length = -self.length;
        }
        log::trace!("Selection: finished at {} length {}", self.start, self.length);
        self.length != 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Normalized `[start, end)` clamped to `[0, frames]`; `None` when empty
    /// after clamping.
    pub fn range(&self, frames: usize) -> Option<(usize, usize)> {
        let (a, b) = if self.length < 0 {
            (self.start + self.length, self.start)
        } else {
            (self.start, self.start + self.length)
        };
        let clamp = |v: i64| v.clamp(0, frames as i64) as usize;
        let (start, end) = (clamp(a), clamp(b));
        (end > start).then_some((start, end))
    }
}
