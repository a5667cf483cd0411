//! Chart Plotter Module
//! Draws the bar chart with egui_plot: grouped bars with black edges, value
//! labels, dashed y gridlines and 45° x tick labels.

use crate::charts::BarChartData;
use egui::epaint::TextShape;
use egui::{Align2, Color32, FontId, RichText, Stroke};
use egui_plot::{Bar, BarChart, HLine, Legend, LineStyle, Plot, PlotPoint, Text};

/// Series fills in layout order; the first series is always the green.
pub const SERIES_COLORS: [Color32; 3] = [
    Color32::from_rgb(0x4C, 0xAF, 0x50), // Green
    Color32::from_rgb(243, 156, 18),     // Orange
    Color32::from_rgb(52, 152, 219),     // Blue
];

const EDGE_COLOR: Color32 = Color32::BLACK;
const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(150, 150, 150, 180);
const LABEL_FONT_SIZE: f32 = 9.0;
const TICK_FONT_SIZE: f32 = 10.0;
/// Space below the plot frame for rotated tick labels.
const TICK_LABEL_MARGIN: f32 = 90.0;
const TICK_ANGLE: f32 = -std::f32::consts::FRAC_PI_4;

/// Draws a `BarChartData` into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Get fill color for the series at `index`.
    pub fn series_color(index: usize) -> Color32 {
        SERIES_COLORS[index % SERIES_COLORS.len()]
    }

    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &BarChartData) {
        let n = chart.categories.len() as f64;
        let y_ticks = chart.y_ticks();
        let y_top = y_ticks.last().copied().unwrap_or(1.0).max(chart.y_max() * 1.08);
        let height = (ui.available_height() - TICK_LABEL_MARGIN - 24.0).max(150.0);

        let mut plot = Plot::new("order_bar_chart")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_grid(false)
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(|_mark, _range| String::new())
            .include_x(-0.5)
            .include_x(n - 0.5)
            .include_y(0.0)
            .include_y(y_top);

        if chart.series.len() > 1 {
            plot = plot.legend(Legend::default());
        }

        let bars = chart.bars();
        let response = plot.show(ui, |plot_ui| {
            for y in &y_ticks {
                plot_ui.hline(
                    HLine::new(*y)
                        .color(GRID_COLOR)
                        .width(0.8)
                        .style(LineStyle::Dashed { length: 6.0 }),
                );
            }

            for (s, series) in chart.series.iter().enumerate() {
                let color = Self::series_color(s);
                let series_bars: Vec<Bar> = bars
                    .iter()
                    .filter(|b| b.series == s)
                    .map(|b| {
                        Bar::new(b.center, b.height)
                            .width(b.width)
                            .fill(color)
                            .stroke(Stroke::new(1.0, EDGE_COLOR))
                    })
                    .collect();

                plot_ui.bar_chart(
                    BarChart::new(series_bars)
                        .color(color)
                        .name(&series.name),
                );
            }

            for bar in &bars {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(bar.center, bar.height),
                        RichText::new(&bar.label)
                            .size(LABEL_FONT_SIZE)
                            .color(Color32::BLACK),
                    )
                    .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });

        // egui_plot cannot rotate axis text, so tick labels are painted here
        // with their right end on the tick.
        let (label_rect, _) = ui.allocate_exact_size(
            egui::vec2(ui.available_width(), TICK_LABEL_MARGIN),
            egui::Sense::hover(),
        );
        let painter = ui.painter_at(label_rect.expand2(egui::vec2(200.0, 0.0)));
        let transform = response.transform;
        let text_color = ui.visuals().text_color();

        for (i, category) in chart.categories.iter().enumerate() {
            let tick = transform.position_from_point(&PlotPoint::new(i as f64, 0.0));
            let galley = painter.layout_no_wrap(
                category.clone(),
                FontId::proportional(TICK_FONT_SIZE),
                text_color,
            );
            let w = galley.size().x;
            let anchor = egui::pos2(
                tick.x - w * TICK_ANGLE.cos(),
                label_rect.top() + 4.0 - w * TICK_ANGLE.sin(),
            );
            painter.add(TextShape::new(anchor, galley, text_color).with_angle(TICK_ANGLE));
        }

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&chart.x_label).size(12.0));
        });
    }
}
