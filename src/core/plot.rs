use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;

use crate::core::error::PlotError;
use crate::core::session::TrialTrace;
use crate::core::window::axis_window_for;

pub const PLOT_SIZE: (u32, u32) = (1200, 700);
const EARLIER_TRIAL_ALPHA: f64 = 0.2;

/// Draws every trial as height over time, the final trial solid and the
/// earlier ones faded, with a vertical marker at the target time.
pub fn render_svg(path: &Path, traces: &[TrialTrace], target_time: f64) -> Result<(), PlotError> {
    let (last, earlier) = traces.split_last().ok_or(PlotError::Empty)?;
    let window = axis_window_for(
        traces.iter().flat_map(|trace| trace.points.iter().copied()),
        target_time,
    );

    let root = SVGBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} trials, target t = {target_time} s", traces.len()),
            ("sans-serif", 24),
        )
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(0.0..window.max_time, window.min_height..window.max_height)
        .map_err(draw_error)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Height (m)")
        .draw()
        .map_err(draw_error)?;

    let faded = BLUE.mix(EARLIER_TRIAL_ALPHA);
    for trace in earlier {
        chart
            .draw_series(LineSeries::new(trace.points.iter().copied(), faded))
            .map_err(draw_error)?;
    }
    chart
        .draw_series(LineSeries::new(
            last.points.iter().copied(),
            BLUE.stroke_width(2),
        ))
        .map_err(draw_error)?;

    chart
        .draw_series(LineSeries::new(
            [
                (target_time, window.min_height),
                (target_time, window.max_height),
            ],
            RED.stroke_width(2),
        ))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

fn draw_error<E: Display>(err: E) -> PlotError {
    PlotError::Draw(err.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::render_svg;
    use crate::core::error::PlotError;

    #[test]
    fn refuses_empty_session() {
        let err = render_svg(Path::new("unused.svg"), &[], 2.0).expect_err("nothing to draw");
        assert!(matches!(err, PlotError::Empty));
        assert!(!Path::new("unused.svg").exists());
    }
}
