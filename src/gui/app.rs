//! Order Chart Application
//! Single window holding the chart; closing it ends the process.

use crate::charts::BarChartData;
use crate::gui::ChartViewer;
use eframe::egui;

/// Window size in points, matching a 10x6 inch figure.
const WINDOW_SIZE: [f32; 2] = [1000.0, 600.0];

pub struct OrderChartApp {
    chart_viewer: ChartViewer,
}

impl OrderChartApp {
    pub fn new(cc: &eframe::CreationContext<'_>, chart: BarChartData) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        Self {
            chart_viewer: ChartViewer::new(chart),
        }
    }
}

impl eframe::App for OrderChartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

/// Open the chart window and block until it is closed.
pub fn show_chart(chart: BarChartData) -> eframe::Result<()> {
    let title = chart.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(OrderChartApp::new(cc, chart)))),
    )
}
