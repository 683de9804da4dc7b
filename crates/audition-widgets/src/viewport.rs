//! Zoom and scroll state of the waveform view
//!
//! The waveform is laid out on a virtual strip `surface_width * zoom`
//! pixels wide (minus a fixed border inset), of which `surface_width`
//! pixels are visible starting at `start_frame`. The renderer and the
//! input handlers share [`ViewportState::frame_at`] /
//! [`ViewportState::x_at`] so a pixel always maps to the same frame in
//! both.

/// Pixels reserved by the widget border on the layout strip
pub const BORDER_INSET: u32 = 2;

/// Zoom step direction. Each step doubles or halves the zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Map a vertical wheel delta: wheel up (positive y) zooms in.
    pub fn from_wheel(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(ZoomDirection::In)
        } else if delta_y < 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    zoom: u32,
    start_frame: usize,
    surface_width: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ViewportState {
    pub fn new(surface_width: u32) -> Self {
        Self {
            zoom: 1,
            start_frame: 0,
            surface_width,
        }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn start_frame(&self) -> usize {
        self.start_frame
    }

    pub fn surface_width(&self) -> u32 {
        self.surface_width
    }

    /// Back to zoom 1 at the first frame, as for a freshly loaded sample
    pub fn reset(&mut self) {
        self.zoom = 1;
        self.start_frame = 0;
    }

    /// Width of the whole layout strip in pixels (at least 1)
    pub fn layout_width(&self) -> u32 {
        self.surface_width
            .saturating_mul(self.zoom)
            .saturating_sub(BORDER_INSET)
            .max(1)
    }

    /// Frames covered by one pixel column
    pub fn frames_per_pixel(&self, frames: usize) -> f64 {
        frames as f64 / self.layout_width() as f64
    }

    /// Frame under visible pixel `x` (may be negative or past the end)
    pub fn frame_at(&self, x: f32, frames: usize) -> i64 {
        let offset = (frames as f64 * x as f64 / self.layout_width() as f64).floor() as i64;
        self.start_frame as i64 + offset
    }

    /// Visible pixel of `frame`
    pub fn x_at(&self, frame: i64, frames: usize) -> f32 {
        let fpp = self.frames_per_pixel(frames);
        if fpp == 0.0 {
            return 0.0;
        }
        ((frame - self.start_frame as i64) as f64 / fpp) as f32
    }

    /// Last start frame that keeps the view inside the layout strip: 0
    /// when everything fits, never past `frames - 1`.
    pub fn max_start_frame(&self, frames: usize) -> usize {
        let visible = (self.frames_per_pixel(frames) * self.surface_width as f64).ceil() as usize;
        frames.saturating_sub(visible).min(frames.saturating_sub(1))
    }

    /// Scroll so `frame` is the first visible frame, clamped to
    /// `[0, max_start_frame]`.
    pub fn set_start_frame(&mut self, frame: i64, frames: usize) {
        let max = self.max_start_frame(frames) as i64;
        self.start_frame = frame.clamp(0, max) as usize;
    }

    /// Scroll by a pixel delta at the current zoom, inside the layout
    pub fn scroll_by_pixels(&mut self, dx: f32, frames: usize) {
        let delta = (dx as f64 * self.frames_per_pixel(frames)).round() as i64;
        self.set_start_frame(self.start_frame as i64 + delta, frames);
    }

    /// Track a new surface width, keeping the start frame.
    pub fn set_surface_width(&mut self, width: u32, frames: usize) {
        self.surface_width = width;
        self.set_start_frame(self.start_frame as i64, frames);
    }

    /// Zoom one step keeping `cursor_frame` at the same relative position
    /// in the view. Returns false when the step is refused: zooming in once
    /// the strip is at least one pixel per frame, or zooming out at 1.
    pub fn zoom_at_frame(&mut self, direction: ZoomDirection, cursor_frame: i64, frames: usize) -> bool {
        if frames == 0 {
            return false;
        }

        let new_zoom = match direction {
            ZoomDirection::In => {
                if self.layout_width() as usize >= frames {
                    return false;
                }
                self.zoom.saturating_mul(2)
            }
            ZoomDirection::Out => {
                if self.zoom == 1 {
                    return false;
                }
                self.zoom / 2
            }
        };

        let visible = frames as f64 / self.zoom as f64;
        let rel_pos = (cursor_frame - self.start_frame as i64) as f64 / visible;
        let new_visible = frames as f64 / new_zoom as f64;
        let new_start = (cursor_frame as f64 - rel_pos * new_visible).round() as i64;

        log::debug!(
            "ViewportState: zoom {} -> {} at frame {} (start {} -> {})",
            self.zoom,
            new_zoom,
            cursor_frame,
            self.start_frame,
            new_start
        );

        self.zoom = new_zoom;
        self.set_start_frame(new_start, frames);
        true
    }

    /// Zoom one step anchored at visible pixel `x`
    pub fn zoom_at(&mut self, direction: ZoomDirection, x: f32, frames: usize) -> bool {
        let cursor_frame = self.frame_at(x, frames);
        self.zoom_at_frame(direction, cursor_frame, frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_width_subtracts_border() {
        let viewport = ViewportState::new(500);
        assert_eq!(viewport.layout_width(), 498);
        assert_eq!(ViewportState::new(0).layout_width(), 1);
    }

    #[test]
    fn test_zoom_in_keeps_cursor_frame_in_place() {
        let mut viewport = ViewportState::new(500);
        let frames = 1000;
        let x_before = viewport.x_at(400, frames);

        assert!(viewport.zoom_at_frame(ZoomDirection::In, 400, frames));
        assert_eq!(viewport.zoom(), 2);
        assert_eq!(viewport.start_frame(), 200);

        let x_after = viewport.x_at(400, frames);
        assert!((x_after - x_before).abs() <= 1.0);
    }

    #[test]
    fn test_zoom_round_trip_restores_scroll() {
        let mut viewport = ViewportState::new(500);
        let frames = 1000;
        viewport.zoom_at_frame(ZoomDirection::In, 400, frames);
        viewport.zoom_at_frame(ZoomDirection::Out, 400, frames);
        assert_eq!(viewport.zoom(), 1);
        assert_eq!(viewport.start_frame(), 0);
    }

    #[test]
    fn test_zoom_in_refused_at_one_pixel_per_frame() {
        let mut viewport = ViewportState::new(500);
        let frames = 1000;
        assert!(viewport.zoom_at_frame(ZoomDirection::In, 0, frames));
        assert!(viewport.zoom_at_frame(ZoomDirection::In, 0, frames));
        assert_eq!(viewport.zoom(), 4);
        assert!(!viewport.zoom_at_frame(ZoomDirection::In, 0, frames));
        assert_eq!(viewport.zoom(), 4);
    }

    #[test]
    fn test_zoom_out_refused_at_one() {
        let mut viewport = ViewportState::new(500);
        assert!(!viewport.zoom_at_frame(ZoomDirection::Out, 10, 1000));
        assert_eq!(viewport, ViewportState::new(500));
    }

    #[test]
    fn test_zoom_on_empty_sample_is_refused() {
        let mut viewport = ViewportState::new(500);
        assert!(!viewport.zoom_at(ZoomDirection::In, 100.0, 0));
    }

    #[test]
    fn test_scroll_clamps() {
        let mut viewport = ViewportState::new(500);
        viewport.set_start_frame(-10, 1000);
        assert_eq!(viewport.start_frame(), 0);
        viewport.set_start_frame(5000, 0);
        assert_eq!(viewport.start_frame(), 0);

        // Zoom 2: 998 px strip, 500 px (just over 501 frames) visible
        viewport.zoom_at_frame(ZoomDirection::In, 0, 1000);
        viewport.set_start_frame(5000, 1000);
        assert_eq!(viewport.start_frame(), 498);
        assert!(viewport.x_at(999, 1000) < 500.0);
    }

    #[test]
    fn test_no_scrolling_at_zoom_one() {
        let mut viewport = ViewportState::new(500);
        viewport.scroll_by_pixels(1e6, 1000);
        assert_eq!(viewport.start_frame(), 0);
        viewport.set_start_frame(400, 1000);
        assert_eq!(viewport.start_frame(), 0);
        assert_eq!(viewport.max_start_frame(1000), 0);
    }

    #[test]
    fn test_unknown_width_keeps_outer_bound() {
        let mut viewport = ViewportState::new(0);
        viewport.set_start_frame(5000, 1000);
        assert_eq!(viewport.start_frame(), 999);
    }

    #[test]
    fn test_scroll_stays_inside_layout() {
        let mut viewport = ViewportState::new(500);
        viewport.zoom_at_frame(ZoomDirection::In, 0, 1000);
        viewport.zoom_at_frame(ZoomDirection::In, 0, 1000);
        viewport.scroll_by_pixels(1e6, 1000);
        let start = viewport.start_frame();
        // The last frame is still on screen.
        assert!(viewport.x_at(999, 1000) < 500.0);
        assert!(viewport.x_at(999, 1000) >= 498.0, "start {}", start);
    }

    #[test]
    fn test_frame_and_pixel_mapping_agree() {
        let mut viewport = ViewportState::new(300);
        let frames = 44100;
        viewport.zoom_at_frame(ZoomDirection::In, 20000, frames);
        for x in [0.0f32, 17.0, 150.0, 299.0] {
            let frame = viewport.frame_at(x, frames);
            assert!((viewport.x_at(frame, frames) - x).abs() <= 1.0);
        }
    }

    #[test]
    fn test_resize_keeps_start_frame() {
        let mut viewport = ViewportState::new(500);
        viewport.zoom_at_frame(ZoomDirection::In, 600, 1000);
        let start = viewport.start_frame();
        viewport.set_surface_width(800, 1000);
        assert_eq!(viewport.start_frame(), start);
        assert_eq!(viewport.layout_width(), 1598);
    }

    #[test]
    fn test_wheel_direction() {
        assert_eq!(ZoomDirection::from_wheel(1.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel(-3.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel(0.0), None);
    }
}
