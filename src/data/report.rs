//! Report definitions
//! Each report is one fixed SQL statement plus the shape of its result.

use crate::charts::{ChartLayout, SeriesSpec};
use crate::config::ConfigError;
use std::fmt;
use std::str::FromStr;

const MONTHLY_COMPLETED_SQL: &str = r#"
SELECT
    CAST(DATE(DATE_TRUNC('month', order_date)) AS TEXT) AS months,
    COUNT(CASE WHEN order_status = 'Completed' THEN 1 END) AS "monthlyOrders"
FROM orders
WHERE order_date IS NOT NULL
GROUP BY DATE(DATE_TRUNC('month', order_date))
ORDER BY DATE(DATE_TRUNC('month', order_date)) ASC
"#;

const PEAK_DAYS_SQL: &str = r#"
WITH daily AS (
    SELECT
        DATE(order_date) AS day,
        COUNT(CASE WHEN order_status = 'Completed' THEN 1 END) AS daily_orders
    FROM orders
    WHERE order_date IS NOT NULL
    GROUP BY DATE(order_date)
),
monthly AS (
    SELECT
        DATE(DATE_TRUNC('month', day)) AS month,
        SUM(daily_orders) AS monthly_orders
    FROM daily
    GROUP BY DATE(DATE_TRUNC('month', day))
),
ranked AS (
    SELECT
        d.day,
        d.daily_orders,
        m.month,
        m.monthly_orders,
        ROW_NUMBER() OVER (
            PARTITION BY m.month
            ORDER BY d.daily_orders DESC, d.day ASC
        ) AS day_rank
    FROM daily d
    JOIN monthly m ON m.month = DATE(DATE_TRUNC('month', d.day))
)
SELECT
    CAST(day AS TEXT) AS day,
    daily_orders AS "dailyOrders",
    COALESCE(CASE WHEN day_rank = 1 THEN CAST(month AS TEXT) END, '') AS month,
    COALESCE(CASE WHEN day_rank = 1 THEN CAST(monthly_orders AS TEXT) END, '') AS "monthlyOrders"
FROM ranked
ORDER BY day ASC
"#;

const CATEGORY_STATUS_SQL: &str = r#"
SELECT
    COALESCE(product_category, 'Unknown') AS product_category,
    COUNT(CASE WHEN order_status = 'Cancelled' THEN 1 END) AS cancelled_orders,
    COUNT(CASE WHEN order_status = 'Completed' THEN 1 END) AS completed_orders,
    COUNT(CASE WHEN order_status != 'Pending' THEN 1 END) AS total_orders
FROM orders
GROUP BY COALESCE(product_category, 'Unknown')
ORDER BY cancelled_orders DESC, product_category ASC
"#;

/// How a result column is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Text, including date-like values cast to text by the query.
    Text,
    /// A `COUNT(...)` as a 64-bit integer.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Text,
    }
}

const fn count(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: ColumnKind::Count,
    }
}

/// The fixed analytical queries this tool can chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    /// Completed orders per calendar month.
    #[default]
    MonthlyCompleted,
    /// Completed orders per day, with the monthly total on each month's peak day.
    PeakDays,
    /// Cancelled, completed and non-pending orders per product category.
    CategoryStatus,
}

impl Report {
    pub fn name(&self) -> &'static str {
        match self {
            Report::MonthlyCompleted => "monthly",
            Report::PeakDays => "peak-days",
            Report::CategoryStatus => "categories",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Report::MonthlyCompleted => MONTHLY_COMPLETED_SQL,
            Report::PeakDays => PEAK_DAYS_SQL,
            Report::CategoryStatus => CATEGORY_STATUS_SQL,
        }
    }

    /// Result columns in query order.
    pub fn columns(&self) -> &'static [ColumnSpec] {
        const MONTHLY: [ColumnSpec; 2] = [text("months"), count("monthlyOrders")];
        const PEAK_DAYS: [ColumnSpec; 4] = [
            text("day"),
            count("dailyOrders"),
            text("month"),
            text("monthlyOrders"),
        ];
        const CATEGORIES: [ColumnSpec; 4] = [
            text("product_category"),
            count("cancelled_orders"),
            count("completed_orders"),
            count("total_orders"),
        ];

        match self {
            Report::MonthlyCompleted => &MONTHLY,
            Report::PeakDays => &PEAK_DAYS,
            Report::CategoryStatus => &CATEGORIES,
        }
    }

    pub fn chart_layout(&self) -> ChartLayout {
        match self {
            Report::MonthlyCompleted => ChartLayout {
                title: "Monthly Completed Orders".into(),
                x_label: "Month".into(),
                y_label: "Orders".into(),
                x_column: "months".into(),
                series: vec![SeriesSpec::new("monthlyOrders")],
            },
            Report::PeakDays => ChartLayout {
                title: "Daily Completed Orders (Monthly Peak Highlighted)".into(),
                x_label: "Day".into(),
                y_label: "Orders".into(),
                x_column: "day".into(),
                series: vec![
                    SeriesSpec::new("dailyOrders"),
                    SeriesSpec::new("monthlyOrders"),
                ],
            },
            Report::CategoryStatus => ChartLayout {
                title: "Orders by Product Category".into(),
                x_label: "Product Category".into(),
                y_label: "Orders".into(),
                x_column: "product_category".into(),
                series: vec![
                    SeriesSpec::new("cancelled_orders"),
                    SeriesSpec::new("completed_orders"),
                    SeriesSpec::new("total_orders"),
                ],
            },
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Report {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Report::MonthlyCompleted),
            "peak-days" | "peak_days" => Ok(Report::PeakDays),
            "categories" => Ok(Report::CategoryStatus),
            _ => Err(ConfigError::UnknownReport(s.trim().to_string())),
        }
    }
}
