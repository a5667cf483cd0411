//! Bar Chart Model
//! Shapes a result table into categories, series and bar geometry.

use polars::prelude::*;
use thiserror::Error;

/// Width of one category slot shared by all series.
pub const GROUP_WIDTH: f64 = 0.5;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Result has no column '{0}'")]
    MissingColumn(String),
    #[error("Column '{column}' holds non-numeric value '{value}'")]
    NotNumeric { column: String, value: String },
}

/// One y column to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSpec {
    pub column: String,
}

impl SeriesSpec {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

/// Fixed presentation of a report: which columns go where and the captions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLayout {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_column: String,
    pub series: Vec<SeriesSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub name: String,
    /// One entry per category; `None` draws no bar.
    pub values: Vec<Option<f64>>,
}

/// A single rendered bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGeometry {
    pub series: usize,
    pub center: f64,
    pub width: f64,
    pub height: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<BarSeries>,
}

impl BarChartData {
    pub fn from_dataframe(df: &DataFrame, layout: &ChartLayout) -> Result<Self, ChartError> {
        let categories = Self::category_labels(df, &layout.x_column)?;

        let series = layout
            .series
            .iter()
            .map(|spec| {
                Ok(BarSeries {
                    name: spec.column.clone(),
                    values: Self::numeric_values(df, &spec.column)?,
                })
            })
            .collect::<Result<Vec<_>, ChartError>>()?;

        Ok(Self {
            title: layout.title.clone(),
            x_label: layout.x_label.clone(),
            y_label: layout.y_label.clone(),
            categories,
            series,
        })
    }

    fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ChartError> {
        df.column(name)
            .map_err(|_| ChartError::MissingColumn(name.to_string()))
    }

    fn category_labels(df: &DataFrame, name: &str) -> Result<Vec<String>, ChartError> {
        let as_text = Self::column(df, name)?.cast(&DataType::String)?;
        let labels = as_text
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect();
        Ok(labels)
    }

    /// Numeric columns are cast; text columns are parsed with empty text as no value.
    fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ChartError> {
        let column = Self::column(df, name)?;

        if column.dtype() == &DataType::String {
            return column
                .str()?
                .into_iter()
                .map(|v| match v.map(str::trim) {
                    None | Some("") => Ok(None),
                    Some(text) => text.parse::<f64>().map(Some).map_err(|_| {
                        ChartError::NotNumeric {
                            column: name.to_string(),
                            value: text.to_string(),
                        }
                    }),
                })
                .collect();
        }

        let as_f64 = column.cast(&DataType::Float64)?;
        Ok(as_f64.f64()?.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every bar that will be drawn, grouped side by side within each category.
    pub fn bars(&self) -> Vec<BarGeometry> {
        let n_series = self.series.len().max(1);
        let width = GROUP_WIDTH / n_series as f64;

        let mut bars = Vec::new();
        for (s, series) in self.series.iter().enumerate() {
            let offset = (s as f64 - (n_series as f64 - 1.0) / 2.0) * width;
            for (i, value) in series.values.iter().enumerate() {
                if let Some(height) = value.filter(|v| v.is_finite()) {
                    bars.push(BarGeometry {
                        series: s,
                        center: i as f64 + offset,
                        width,
                        height,
                        label: format_bar_label(height),
                    });
                }
            }
        }
        bars
    }

    pub fn y_max(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten())
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    /// Y values of the horizontal gridlines, from zero up past the tallest bar.
    pub fn y_ticks(&self) -> Vec<f64> {
        let max = self.y_max();
        if max <= 0.0 {
            return vec![0.0];
        }

        let step = nice_step(max, 6);
        let count = (max / step).ceil() as usize;
        (0..=count).map(|i| i as f64 * step).collect()
    }
}

/// The bar height as text with no added formatting.
pub fn format_bar_label(height: f64) -> String {
    if height.fract() == 0.0 && height.abs() < i64::MAX as f64 {
        (height as i64).to_string()
    } else {
        height.to_string()
    }
}

/// Round a raw step to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(range: f64, target_steps: usize) -> f64 {
    if range <= 0.0 || target_steps == 0 {
        return 1.0;
    }

    let raw_step = range / target_steps as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    // Counts never need fractional gridlines
    (nice * magnitude).max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(series: &[&str]) -> ChartLayout {
        ChartLayout {
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            x_column: "day".into(),
            series: series.iter().map(|c| SeriesSpec::new(c)).collect(),
        }
    }

    fn peak_days_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("day".into(), vec!["2024-01-03", "2024-01-09"]),
            Column::new("dailyOrders".into(), vec![1i64, 3]),
            Column::new("monthlyOrders".into(), vec!["", "4"]),
        ])
        .unwrap()
    }

    #[test]
    fn labels_are_plain_heights() {
        assert_eq!(format_bar_label(7.0), "7");
        assert_eq!(format_bar_label(0.0), "0");
        assert_eq!(format_bar_label(2.5), "2.5");
    }

    #[test]
    fn every_bar_is_labelled_with_its_height() {
        let chart =
            BarChartData::from_dataframe(&peak_days_frame(), &layout(&["dailyOrders", "monthlyOrders"]))
                .unwrap();

        let bars = chart.bars();
        assert_eq!(bars.len(), 3);
        for bar in &bars {
            assert_eq!(bar.label, format_bar_label(bar.height));
        }
        assert_eq!(
            bars.iter().map(|b| b.label.as_str()).collect::<Vec<_>>(),
            vec!["1", "3", "4"]
        );
    }

    #[test]
    fn empty_text_means_no_bar() {
        let chart =
            BarChartData::from_dataframe(&peak_days_frame(), &layout(&["dailyOrders", "monthlyOrders"]))
                .unwrap();

        assert_eq!(chart.categories, vec!["2024-01-03", "2024-01-09"]);
        assert_eq!(chart.series[1].values, vec![None, Some(4.0)]);
        assert_eq!(chart.y_max(), 4.0);
    }

    #[test]
    fn grouped_bars_share_the_slot() {
        let chart =
            BarChartData::from_dataframe(&peak_days_frame(), &layout(&["dailyOrders", "monthlyOrders"]))
                .unwrap();

        let bars = chart.bars();
        let daily = &bars[1];
        let monthly = &bars[2];
        assert_eq!(daily.width, GROUP_WIDTH / 2.0);
        assert!((daily.center - (1.0 - GROUP_WIDTH / 4.0)).abs() < 1e-9);
        assert!((monthly.center - (1.0 + GROUP_WIDTH / 4.0)).abs() < 1e-9);
    }

    #[test]
    fn single_series_is_centered() {
        let chart =
            BarChartData::from_dataframe(&peak_days_frame(), &layout(&["dailyOrders"])).unwrap();

        let centers: Vec<f64> = chart.bars().iter().map(|b| b.center).collect();
        assert_eq!(centers, vec![0.0, 1.0]);
    }

    #[test]
    fn garbage_text_is_rejected() {
        let df = DataFrame::new(vec![
            Column::new("day".into(), vec!["2024-01-03"]),
            Column::new("monthlyOrders".into(), vec!["many"]),
        ])
        .unwrap();

        let err = BarChartData::from_dataframe(&df, &layout(&["monthlyOrders"])).unwrap_err();
        assert!(matches!(err, ChartError::NotNumeric { value, .. } if value == "many"));
    }

    #[test]
    fn missing_column_is_reported() {
        let err = BarChartData::from_dataframe(&peak_days_frame(), &layout(&["weekly"])).unwrap_err();
        assert!(matches!(err, ChartError::MissingColumn(c) if c == "weekly"));
    }

    #[test]
    fn ticks_cover_tallest_bar() {
        assert_eq!(nice_step(12.0, 6), 2.0);
        assert_eq!(nice_step(3.0, 6), 1.0);

        let chart =
            BarChartData::from_dataframe(&peak_days_frame(), &layout(&["dailyOrders"])).unwrap();
        assert_eq!(chart.y_ticks(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_report_result_has_nothing_to_draw() {
        use crate::data::{OrdersProcessor, Report};

        let no_orders = DataFrame::new(vec![
            Column::new("order_date".into(), Vec::<String>::new()),
            Column::new("order_status".into(), Vec::<String>::new()),
            Column::new("product_category".into(), Vec::<String>::new()),
        ])
        .unwrap();

        for report in [
            Report::MonthlyCompleted,
            Report::PeakDays,
            Report::CategoryStatus,
        ] {
            let table = OrdersProcessor::run_report(&no_orders, report).unwrap();
            let chart = BarChartData::from_dataframe(&table, &report.chart_layout()).unwrap();

            assert!(chart.is_empty(), "{}", report);
            assert!(chart.bars().is_empty(), "{}", report);
            assert_eq!(chart.y_ticks(), vec![0.0], "{}", report);
            assert_eq!(chart.series.len(), report.chart_layout().series.len());
        }
    }
}
