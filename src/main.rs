//! Order Charts - Completed-order analytics with interactive bar charts
//!
//! Reads database settings from the environment, runs one fixed report query
//! and shows the result as a bar chart until the window is closed.

mod charts;
mod config;
mod data;
mod gui;

use anyhow::{anyhow, Context};
use charts::BarChartData;
use config::{AppConfig, OrdersSource};
use data::{DataLoader, OrdersProcessor, Report};
use polars::prelude::DataFrame;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    let table = load_table(&config)?;

    let chart = BarChartData::from_dataframe(&table, &config.report.chart_layout())
        .context("Failed to shape result for charting")?;
    if chart.is_empty() {
        log::warn!("Report '{}' returned no rows", config.report);
    }

    gui::show_chart(chart).map_err(|e| anyhow!("Chart window failed: {}", e))
}

fn load_table(config: &AppConfig) -> anyhow::Result<DataFrame> {
    match &config.source {
        OrdersSource::Postgres(db) => {
            log::info!(
                "Running report '{}' against {}",
                config.report,
                db.redacted_target()
            );
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime
                .block_on(data::fetch_report(&db.connection_url(), config.report))
                .with_context(|| format!("Report '{}' failed", config.report))
        }
        OrdersSource::Csv(path) => {
            log::info!(
                "Computing report '{}' from {}",
                config.report,
                path.display()
            );
            let orders = DataLoader::load_csv(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            run_offline(&orders, config.report)
        }
    }
}

fn run_offline(orders: &DataFrame, report: Report) -> anyhow::Result<DataFrame> {
    OrdersProcessor::run_report(orders, report)
        .with_context(|| format!("Report '{}' failed", report))
}
