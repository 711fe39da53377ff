const TIME_PADDING_RATIO: f64 = 0.06;
const HEIGHT_PADDING_RATIO: f64 = 0.10;

/// Data bounds of a time/height plot: time on x, height on y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisWindow {
    pub max_time: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl AxisWindow {
    /// Maps a `(time, height)` point into a screen rectangle whose y axis
    /// grows downward.
    pub fn project(
        &self,
        time: f64,
        height: f64,
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    ) -> (f64, f64) {
        let plot_w = (right - left).max(1.0);
        let plot_h = (bottom - top).max(1.0);
        let span = (self.max_height - self.min_height).max(f64::EPSILON);
        let x = left + (time / self.max_time) * plot_w;
        let y = bottom - ((height - self.min_height) / span) * plot_h;
        (x, y)
    }
}

/// Pads raw extents so traces and the target line never touch the frame.
/// The window always covers `t = 0` and `height = 0`.
pub fn padded_axis_window(raw_max_time: f64, raw_min_height: f64, raw_max_height: f64) -> AxisWindow {
    let time_span = raw_max_time.max(1.0);
    let max_height = raw_max_height.max(1.0);
    let min_height = raw_min_height.min(0.0);
    let height_pad = (max_height - min_height) * HEIGHT_PADDING_RATIO;

    AxisWindow {
        max_time: time_span + (time_span * TIME_PADDING_RATIO),
        min_height: if min_height < 0.0 {
            min_height - height_pad
        } else {
            0.0
        },
        max_height: max_height + height_pad,
    }
}

/// Window covering every point plus the target time marker.
pub fn axis_window_for<I>(points: I, target_time: f64) -> AxisWindow
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (max_time, min_height, max_height) = points.into_iter().fold(
        (target_time.max(0.0), 0.0f64, 0.0f64),
        |(max_t, min_h, max_h), (t, h)| (max_t.max(t), min_h.min(h), max_h.max(h)),
    );
    padded_axis_window(max_time, min_height, max_height)
}
