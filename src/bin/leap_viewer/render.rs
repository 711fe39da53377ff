use std::io::Write;

use macroquad::prelude::*;

use flight_solver::core::session::{SimulationSession, TrialTrace};
use flight_solver::core::window::AxisWindow;

use crate::app::ViewerState;
use crate::constants::{
    EARLIER_TRIAL_COLOR, GRID_COLOR, LABEL_COLOR, LATEST_TRIAL_COLOR, RESULT_Y, STATUS_Y,
    TARGET_COLOR, TITLE_Y, X_GRID_LINES, Y_GRID_LINES,
};

pub(crate) struct PlotArea {
    pub(crate) left: f32,
    pub(crate) right: f32,
    pub(crate) top: f32,
    pub(crate) bottom: f32,
}

impl PlotArea {
    fn to_screen(&self, window: &AxisWindow, time: f64, height: f64) -> Vec2 {
        let (x, y) = window.project(
            time,
            height,
            f64::from(self.left),
            f64::from(self.right),
            f64::from(self.top),
            f64::from(self.bottom),
        );
        vec2(x as f32, y as f32)
    }
}

fn format_axis_value(value: f64, axis_span: f64) -> String {
    if axis_span >= 100.0 {
        format!("{value:.0}")
    } else if axis_span >= 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

pub(crate) fn draw_grid(area: &PlotArea) {
    for i in 0..=X_GRID_LINES {
        let t = i as f32 / X_GRID_LINES as f32;
        let x = area.left + t * (area.right - area.left);
        draw_line(x, area.top, x, area.bottom, 1.0, GRID_COLOR);
    }
    for i in 0..=Y_GRID_LINES {
        let t = i as f32 / Y_GRID_LINES as f32;
        let y = area.bottom - t * (area.bottom - area.top);
        draw_line(area.left, y, area.right, y, 1.0, GRID_COLOR);
    }
}

pub(crate) fn draw_axis_tick_labels(area: &PlotArea, window: &AxisWindow) {
    let tick_font_size = 16.0;
    let height_span = window.max_height - window.min_height;

    for i in 0..=X_GRID_LINES {
        let t = i as f64 / X_GRID_LINES as f64;
        let label = format_axis_value(t * window.max_time, window.max_time);
        let size = measure_text(&label, None, tick_font_size as u16, 1.0);
        let x = area.left + (t as f32) * (area.right - area.left);
        draw_text(
            &label,
            x - (size.width * 0.5),
            area.bottom + 22.0,
            tick_font_size,
            LABEL_COLOR,
        );
    }

    for i in 0..=Y_GRID_LINES {
        let t = i as f64 / Y_GRID_LINES as f64;
        let label = format_axis_value(window.min_height + t * height_span, height_span);
        let size = measure_text(&label, None, tick_font_size as u16, 1.0);
        let y = area.bottom - (t as f32) * (area.bottom - area.top);
        draw_text(
            &label,
            (area.left - 8.0) - size.width,
            y + (size.height * 0.35),
            tick_font_size,
            LABEL_COLOR,
        );
    }

    draw_text("Time (s)", area.right - 80.0, area.bottom + 48.0, 18.0, LABEL_COLOR);
    draw_text("Height (m)", area.left + 10.0, area.top - 8.0, 18.0, LABEL_COLOR);
}

pub(crate) fn draw_target(area: &PlotArea, window: &AxisWindow, target_time: f64) {
    let top = area.to_screen(window, target_time, window.max_height);
    let bottom = area.to_screen(window, target_time, window.min_height);
    draw_line(top.x, top.y, bottom.x, bottom.y, 2.0, TARGET_COLOR);
    draw_text(
        &format!("t = {target_time}"),
        top.x + 5.0,
        top.y + 24.0,
        16.0,
        TARGET_COLOR,
    );
}

fn draw_trace(area: &PlotArea, window: &AxisWindow, trace: &TrialTrace, thickness: f32, color: Color) {
    for pair in trace.points.windows(2) {
        let a = area.to_screen(window, pair[0].0, pair[0].1);
        let b = area.to_screen(window, pair[1].0, pair[1].1);
        draw_line(a.x, a.y, b.x, b.y, thickness, color);
    }
}

pub(crate) fn draw_traces<W: Write>(area: &PlotArea, window: &AxisWindow, session: &SimulationSession<W>) {
    let traces = session.traces();
    let latest = match session.current_trace() {
        Some(current) => Some(current),
        None => traces.last(),
    };
    for trace in traces {
        draw_trace(area, window, trace, 1.5, EARLIER_TRIAL_COLOR);
    }
    if let Some(trace) = latest {
        draw_trace(area, window, trace, 2.5, LATEST_TRIAL_COLOR);
    }
}

pub(crate) fn draw_hud(state: &ViewerState) {
    let header_color = Color::from_rgba(30, 30, 35, 255);
    draw_text("Flight Solver - Leap Search", 24.0, TITLE_Y, 30.0, header_color);

    let params = &state.params;
    draw_text(
        &format!(
            "{} | trials: {} | target {} s, dt {} s, v0 {} m/s, leap {} m/s x{}",
            state.status_line,
            state.session.trial_count(),
            params.target_time,
            params.delta,
            params.initial_v_init,
            params.initial_leap,
            params.leap_reduction_factor,
        ),
        24.0,
        STATUS_Y,
        18.0,
        DARKGRAY,
    );

    if let Some(result) = state.session.result() {
        draw_text(
            &format!(
                "v0 = {:.6} ± {:.6} m/s | time of flight {:.4} s | final leap |{:.6}| m/s",
                result.velocity_guess,
                result.uncertainty,
                result.time_of_flight,
                result.final_leap.abs(),
            ),
            24.0,
            RESULT_Y,
            20.0,
            DARKGREEN,
        );
    }
}
