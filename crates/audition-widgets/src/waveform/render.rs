//! Waveform rendering, independent of the drawing backend
//!
//! [`build_waveform`] walks the visible pixel columns of the locked sample
//! and reduces them to a [`WaveformImage`]. [`paint_waveform`] emits fills
//! and vertical strokes for an image through a [`WaveformPainter`], with
//! no lock held. The iced canvas implements the painter over a `Frame`;
//! tests implement it over a list.

use audition_core::sample::{SampleState, SharedSample};
use iced::Color;

use super::envelope::{column_envelope, ColumnEnvelope};
use crate::selection::Selection;
use crate::theme::WaveformStyle;
use crate::viewport::ViewportState;

/// Drawing surface for the waveform
pub trait WaveformPainter {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Vertical stroke at column `x` from `y0` to `y1`
    fn vertical_line(&mut self, x: f32, y0: f32, y1: f32, color: Color);
}

/// What a render pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub columns_drawn: u32,
    /// First column whose frames were not loaded yet
    pub stopped_at: Option<u32>,
}

/// Channel lanes: centers and amplitude scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLayout {
    pub mid_left: f32,
    pub mid_right: Option<f32>,
    /// Pixels per sample unit; negative so positive samples go up
    pub y_scale: f64,
}

impl LaneLayout {
    pub fn new(height: f32, stereo: bool) -> Self {
        let y_scale = height as f64 / i16::MIN as f64;
        if stereo {
            Self {
                mid_left: height * 0.25,
                mid_right: Some(height * 0.75),
                y_scale: y_scale * 0.25,
            }
        } else {
            Self {
                mid_left: height * 0.5,
                mid_right: None,
                y_scale: y_scale * 0.5,
            }
        }
    }

    fn y(&self, mid: f32, value: f64) -> f32 {
        (mid as f64 + value * self.y_scale) as f32
    }
}

/// One column of the waveform image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageColumn {
    pub x: u32,
    pub envelope: ColumnEnvelope,
}

/// The waveform reduced to per-column envelopes. Built while the sample
/// lock is held, painted after it is released.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformImage {
    pub stereo: bool,
    /// Selection overlay as `(x, width)`
    pub selection: Option<(f32, f32)>,
    pub columns: Vec<ImageColumn>,
    pub stats: RenderStats,
}

/// Reduce the loaded frames under `width` visible columns.
///
/// Columns covering no frame (high zoom) are skipped. The image ends at
/// the first column that reaches past the loaded frames.
pub fn build_waveform(
    sample: &SampleState,
    viewport: &ViewportState,
    selection: &Selection,
    width: u32,
) -> WaveformImage {
    let mut image = WaveformImage::default();

    let frames = sample.frames();
    if frames == 0 {
        return image;
    }

    let x_ratio = viewport.frames_per_pixel(frames);
    let start = viewport.start_frame();

    if !selection.is_empty() {
        let x_start = viewport.x_at(selection.start(), frames);
        let x_len = (selection.length() as f64 / x_ratio) as f32;
        image.selection = Some(if x_len < 0.0 {
            (x_start + x_len, -x_len)
        } else {
            (x_start, x_len)
        });
    }

    let channels = sample.channels() as usize;
    image.stereo = channels == 2;
    let loaded = sample.loaded();

    for i in 0..width {
        let x_frame = start as f64 + i as f64 * x_ratio;
        let first = x_frame as usize;
        let count = (x_frame + x_ratio) as usize - first;
        if count == 0 {
            continue;
        }

        let Some(envelope) = column_envelope(loaded, channels, frames, first, count) else {
            log::trace!("build_waveform: last available frame before column {}, stopping", i);
            image.stats.stopped_at = Some(i);
            break;
        };

        image.columns.push(ImageColumn { x: i, envelope });
        image.stats.columns_drawn += 1;
    }

    image
}

/// Paint background, selection and one envelope stroke per lane and column.
pub fn paint_waveform<P: WaveformPainter>(
    painter: &mut P,
    image: &WaveformImage,
    width: f32,
    height: f32,
    style: &WaveformStyle,
) {
    painter.fill_rect(0.0, 0.0, width, height, style.background);

    if let Some((x, w)) = image.selection {
        painter.fill_rect(x, 0.0, w, height, style.selection);
    }

    let lanes = LaneLayout::new(height, image.stereo);
    for column in &image.columns {
        let x = column.x as f32;
        let env = &column.envelope;
        painter.vertical_line(
            x,
            lanes.y(lanes.mid_left, env.left.positive),
            lanes.y(lanes.mid_left, env.left.negative),
            style.waveform,
        );
        if let Some(mid_right) = lanes.mid_right {
            painter.vertical_line(
                x,
                lanes.y(mid_right, env.right.positive),
                lanes.y(mid_right, env.right.negative),
                style.waveform,
            );
        }
    }
}

/// Build under a non-blocking lock, release it, then paint.
///
/// Returns `None` without painting when the lock is busy.
pub fn render_waveform<P: WaveformPainter>(
    painter: &mut P,
    sample: &SharedSample,
    viewport: &ViewportState,
    selection: &Selection,
    width: f32,
    height: f32,
    style: &WaveformStyle,
) -> Option<RenderStats> {
    let image = {
        let state = sample.try_lock()?;
        build_waveform(&state, viewport, selection, width.max(0.0) as u32)
    };
    paint_waveform(painter, &image, width, height, style);
    Some(image.stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use support::loaded_sample;

    mod support {
        use audition_core::audio_file::MemoryDecodeProvider;
        use audition_core::loader::{LoadRequest, SampleLoader};
        use audition_core::sample::SharedSample;
        use audition_core::LoadTarget;
        use std::path::PathBuf;
        use std::sync::Arc;

        /// Load `samples` fully into a fresh shared sample.
        pub fn loaded_sample(samples: Vec<i16>, channels: u16) -> Arc<SharedSample> {
            let shared = Arc::new(SharedSample::new());
            let mut loader = SampleLoader::new(Arc::clone(&shared));
            let provider = MemoryDecodeProvider::new(samples, channels, 48000);
            loader
                .start(
                    &provider,
                    LoadRequest {
                        path: PathBuf::from("memory"),
                        target: LoadTarget::new(channels, 48000),
                    },
                    Box::new(|_: f64| {}),
                )
                .unwrap();
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
            while shared.snapshot().active {
                assert!(std::time::Instant::now() < deadline);
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            loader.stop();
            shared
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Fill { x: f32, width: f32 },
        Line { x: f32, y0: f32, y1: f32 },
    }

    #[derive(Default)]
    struct RecordingPainter {
        ops: Vec<Op>,
    }

    impl WaveformPainter for RecordingPainter {
        fn fill_rect(&mut self, x: f32, _y: f32, width: f32, _height: f32, _color: Color) {
            self.ops.push(Op::Fill { x, width });
        }

        fn vertical_line(&mut self, x: f32, y0: f32, y1: f32, _color: Color) {
            self.ops.push(Op::Line { x, y0, y1 });
        }
    }

    impl RecordingPainter {
        fn lines(&self) -> Vec<&Op> {
            self.ops.iter().filter(|op| matches!(op, Op::Line { .. })).collect()
        }
    }

    #[test]
    fn test_empty_sample_paints_background_only() {
        let shared = audition_core::sample::SharedSample::new();
        let mut painter = RecordingPainter::default();
        let stats = render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(100),
            &Selection::new(),
            100.0,
            50.0,
            &WaveformStyle::default(),
        )
        .unwrap();
        assert_eq!(stats, RenderStats::default());
        assert_eq!(painter.ops, vec![Op::Fill { x: 0.0, width: 100.0 }]);
    }

    #[test]
    fn test_full_scale_mono_column_spans_lane() {
        let samples: Vec<i16> = [i16::MAX, i16::MIN].repeat(500);
        let shared = loaded_sample(samples, 1);
        let mut painter = RecordingPainter::default();
        let stats = render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(102),
            &Selection::new(),
            102.0,
            100.0,
            &WaveformStyle::default(),
        )
        .unwrap();

        // 1000 frames over a 100 px strip: 10 frames per column, the last
        // two columns fall past the end.
        assert_eq!(stats.columns_drawn, 100);
        assert_eq!(stats.stopped_at, Some(100));
        match painter.lines()[0] {
            Op::Line { x, y0, y1 } => {
                assert_eq!(*x, 0.0);
                assert!((*y0 - 0.0).abs() < 0.01, "top {}", y0);
                assert_eq!(*y1, 100.0);
            }
            op => panic!("unexpected {:?}", op),
        }
    }

    #[test]
    fn test_stereo_draws_two_lanes() {
        let shared = loaded_sample([1000, -1000].repeat(200), 2);
        let mut painter = RecordingPainter::default();
        let stats = render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(52),
            &Selection::new(),
            52.0,
            80.0,
            &WaveformStyle::default(),
        )
        .unwrap();
        assert_eq!(stats.columns_drawn, 50);
        assert_eq!(painter.lines().len(), 100);
        match (painter.lines()[0], painter.lines()[1]) {
            (Op::Line { y0: l0, y1: l1, .. }, Op::Line { y0: r0, y1: r1, .. }) => {
                // Left lane centered at 20 with a positive average only.
                assert!(*l0 < 20.0);
                assert_eq!(*l1, 20.0);
                // Right lane centered at 60 with a negative average only.
                assert_eq!(*r0, 60.0);
                assert!(*r1 > 60.0);
            }
            ops => panic!("unexpected {:?}", ops),
        }
    }

    #[test]
    fn test_selection_painted_under_waveform() {
        let shared = loaded_sample(vec![100; 1000], 1);
        let mut selection = Selection::new();
        selection.begin(500);
        selection.update(250);
        let mut painter = RecordingPainter::default();
        render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(102),
            &selection,
            102.0,
            40.0,
            &WaveformStyle::default(),
        )
        .unwrap();
        assert_eq!(painter.ops[1], Op::Fill { x: 25.0, width: 25.0 });
        assert!(matches!(painter.ops[2], Op::Line { .. }));
    }

    #[test]
    fn test_high_zoom_skips_empty_columns() {
        let shared = loaded_sample(vec![100; 10], 1);
        let mut viewport = ViewportState::new(11);
        assert!(viewport.zoom_at_frame(crate::viewport::ZoomDirection::In, 0, 10));
        // 20 px strip for 10 frames: every other column covers no frame.
        let mut painter = RecordingPainter::default();
        let stats = render_waveform(
            &mut painter,
            &shared,
            &viewport,
            &Selection::new(),
            11.0,
            40.0,
            &WaveformStyle::default(),
        )
        .unwrap();
        assert_eq!(stats.columns_drawn, 5);
        assert_eq!(stats.stopped_at, None);
    }

    /// Fails if any paint call happens while the sample lock is held
    struct LockCheckingPainter {
        shared: Arc<SharedSample>,
        calls: usize,
    }

    impl LockCheckingPainter {
        fn check(&mut self) {
            assert!(self.shared.try_lock().is_some(), "painted while holding the sample lock");
            self.calls += 1;
        }
    }

    impl WaveformPainter for LockCheckingPainter {
        fn fill_rect(&mut self, _x: f32, _y: f32, _width: f32, _height: f32, _color: Color) {
            self.check();
        }

        fn vertical_line(&mut self, _x: f32, _y0: f32, _y1: f32, _color: Color) {
            self.check();
        }
    }

    #[test]
    fn test_paints_after_releasing_the_lock() {
        let shared = loaded_sample([300, -300].repeat(400), 2);
        let mut selection = Selection::new();
        selection.begin(10);
        selection.update(90);
        let mut painter = LockCheckingPainter {
            shared: Arc::clone(&shared),
            calls: 0,
        };
        let stats = render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(42),
            &selection,
            42.0,
            60.0,
            &WaveformStyle::default(),
        )
        .unwrap();
        assert_eq!(stats.columns_drawn, 40);
        // Background, selection, two lanes per column
        assert_eq!(painter.calls, 2 + 80);
    }

    #[test]
    fn test_busy_lock_paints_nothing() {
        let shared = loaded_sample(vec![100; 100], 1);
        let _guard = shared.lock();
        let mut painter = RecordingPainter::default();
        let stats = render_waveform(
            &mut painter,
            &shared,
            &ViewportState::new(12),
            &Selection::new(),
            12.0,
            10.0,
            &WaveformStyle::default(),
        );
        assert_eq!(stats, None);
        assert!(painter.ops.is_empty());
    }

    #[test]
    fn test_image_is_independent_of_height() {
        let shared = loaded_sample(vec![100, -100, 0, 50], 1);
        let image = build_waveform(&shared.lock(), &ViewportState::new(4), &Selection::new(), 4);
        assert!(!image.stereo);
        assert_eq!(image.columns.len(), 2);
        assert_eq!(image.columns[1].x, 1);
        assert_eq!(image.columns[0].envelope.left.positive, 100.0);
        assert_eq!(image.columns[0].envelope.left.negative, -100.0);

        let mut tall = RecordingPainter::default();
        paint_waveform(&mut tall, &image, 4.0, 200.0, &WaveformStyle::default());
        let mut short = RecordingPainter::default();
        paint_waveform(&mut short, &image, 4.0, 20.0, &WaveformStyle::default());
        assert_eq!(tall.lines().len(), short.lines().len());
    }

    #[test]
    fn test_lane_layout() {
        let mono = LaneLayout::new(100.0, false);
        assert_eq!(mono.mid_left, 50.0);
        assert_eq!(mono.mid_right, None);
        let stereo = LaneLayout::new(100.0, true);
        assert_eq!(stereo.mid_left, 25.0);
        assert_eq!(stereo.mid_right, Some(75.0));
        assert!(stereo.y_scale < 0.0);
    }
}
