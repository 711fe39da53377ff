use macroquad::prelude::Color;

pub const INITIAL_WINDOW_WIDTH: i32 = 1280;
pub const INITIAL_WINDOW_HEIGHT: i32 = 760;
pub const MSAA_SAMPLES: i32 = 4;

pub const LEFT_MARGIN: f32 = 90.0;
pub const RIGHT_MARGIN: f32 = 30.0;
pub const TOP_MARGIN: f32 = 130.0;
pub const BOTTOM_MARGIN: f32 = 70.0;

pub const TITLE_Y: f32 = 40.0;
pub const STATUS_Y: f32 = 72.0;
pub const RESULT_Y: f32 = 100.0;
pub const X_GRID_LINES: usize = 10;
pub const Y_GRID_LINES: usize = 8;

pub const BACKGROUND: Color = Color::new(0.97, 0.97, 0.98, 1.0);
pub const GRID_COLOR: Color = Color::new(0.85, 0.86, 0.89, 1.0);
pub const LABEL_COLOR: Color = Color::new(0.41, 0.44, 0.49, 1.0);
pub const TARGET_COLOR: Color = Color::new(1.0, 0.27, 0.0, 1.0);
pub const EARLIER_TRIAL_COLOR: Color = Color::new(0.0, 0.0, 1.0, 0.2);
pub const LATEST_TRIAL_COLOR: Color = Color::new(0.0, 0.0, 1.0, 0.9);
