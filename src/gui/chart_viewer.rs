//! Chart Viewer Widget
//! Central panel content: title above the bar chart, or a placeholder when the
//! query returned nothing.

use crate::charts::{BarChartData, ChartPlotter};
use egui::RichText;

pub struct ChartViewer {
    chart: BarChartData,
}

impl ChartViewer {
    pub fn new(chart: BarChartData) -> Self {
        Self { chart }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        if self.chart.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&self.chart.title).size(16.0).strong());
        });
        ui.add_space(6.0);

        ChartPlotter::draw_bar_chart(ui, &self.chart);
    }
}
