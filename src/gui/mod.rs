//! GUI module - chart window

mod app;
mod chart_viewer;

pub use app::show_chart;
pub use chart_viewer::ChartViewer;
