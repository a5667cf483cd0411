//! Charts module - bar chart model and drawing

mod bar_chart;
mod plotter;

pub use bar_chart::{BarChartData, ChartLayout, SeriesSpec};
pub use plotter::ChartPlotter;
