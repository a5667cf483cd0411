//! Orders Processor Module
//! Computes the report tables from a loaded orders export, matching the SQL
//! results column for column.

use crate::data::report::Report;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Orders table is missing column '{0}'")]
    MissingColumn(String),
}

const COMPLETED: &str = "Completed";
const CANCELLED: &str = "Cancelled";
const PENDING: &str = "Pending";
const UNKNOWN_CATEGORY: &str = "Unknown";

/// One usable row of the orders export.
#[derive(Debug, Clone)]
struct OrderRecord {
    /// Only the category report keeps rows without a date.
    date: Option<NaiveDate>,
    status: Option<String>,
    category: Option<String>,
}

impl OrderRecord {
    fn is(&self, status: &str) -> bool {
        self.status.as_deref() == Some(status)
    }
}

/// Parse the leading `YYYY-MM-DD` of a date or timestamp string.
pub fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let date = value.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Builds report tables from raw orders.
pub struct OrdersProcessor;

impl OrdersProcessor {
    pub fn run_report(orders: &DataFrame, report: Report) -> Result<DataFrame, ProcessorError> {
        let records = Self::records(orders, report)?;

        match report {
            Report::MonthlyCompleted => Self::monthly_completed(&records),
            Report::PeakDays => Self::peak_days(&records),
            Report::CategoryStatus => Self::category_status(&records),
        }
    }

    fn string_values(
        df: &DataFrame,
        name: &str,
    ) -> Result<Vec<Option<String>>, ProcessorError> {
        let column = df
            .column(name)
            .map_err(|_| ProcessorError::MissingColumn(name.to_string()))?;
        let as_text = column.cast(&DataType::String)?;
        let values = as_text
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect();
        Ok(values)
    }

    /// Date-grouped reports drop undated rows, as the SQL filters
    /// `order_date IS NOT NULL`. The category report counts every row.
    fn records(df: &DataFrame, report: Report) -> Result<Vec<OrderRecord>, ProcessorError> {
        let with_category = report == Report::CategoryStatus;
        let dates = Self::string_values(df, "order_date")?;
        let statuses = Self::string_values(df, "order_status")?;
        let categories = if with_category {
            Self::string_values(df, "product_category")?
        } else {
            vec![None; df.height()]
        };

        let mut records = Vec::with_capacity(df.height());
        let mut skipped = 0usize;

        for ((date, status), category) in dates.into_iter().zip(statuses).zip(categories) {
            let date = date.as_deref().and_then(parse_order_date);
            if date.is_none() && !with_category {
                skipped += 1;
                continue;
            }
            records.push(OrderRecord {
                date,
                status,
                category,
            });
        }

        if skipped > 0 {
            log::warn!("Skipped {} orders without a usable order_date", skipped);
        }
        Ok(records)
    }

    fn dated(records: &[OrderRecord]) -> impl Iterator<Item = (NaiveDate, &OrderRecord)> {
        records.iter().filter_map(|r| r.date.map(|d| (d, r)))
    }

    /// Completed orders per month, ascending by month.
    fn monthly_completed(records: &[OrderRecord]) -> Result<DataFrame, ProcessorError> {
        let mut per_month: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for (date, record) in Self::dated(records) {
            *per_month.entry(month_start(date)).or_default() +=
                i64::from(record.is(COMPLETED));
        }

        let months: Vec<String> = per_month.keys().map(|m| m.to_string()).collect();
        let counts: Vec<i64> = per_month.values().copied().collect();

        let df = DataFrame::new(vec![
            Column::new("months".into(), months),
            Column::new("monthlyOrders".into(), counts),
        ])?;
        Ok(df)
    }

    /// One row per day; the month's busiest day (earliest on ties) carries the
    /// month label and monthly total, other days carry empty strings.
    fn peak_days(records: &[OrderRecord]) -> Result<DataFrame, ProcessorError> {
        let mut per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for (date, record) in Self::dated(records) {
            *per_day.entry(date).or_default() += i64::from(record.is(COMPLETED));
        }

        // month -> (peak day, peak count, total)
        let mut per_month: BTreeMap<NaiveDate, (NaiveDate, i64, i64)> = BTreeMap::new();
        for (&day, &count) in &per_day {
            let entry = per_month
                .entry(month_start(day))
                .or_insert((day, count, 0));
            // Days arrive in ascending order, so only a strictly higher count
            // moves the peak.
            if count > entry.1 {
                entry.0 = day;
                entry.1 = count;
            }
            entry.2 += count;
        }

        let mut days = Vec::with_capacity(per_day.len());
        let mut daily_orders = Vec::with_capacity(per_day.len());
        let mut month_labels = Vec::with_capacity(per_day.len());
        let mut monthly_orders = Vec::with_capacity(per_day.len());

        for (&day, &count) in &per_day {
            let month = month_start(day);
            days.push(day.to_string());
            daily_orders.push(count);

            match per_month.get(&month) {
                Some(&(peak, _, total)) if peak == day => {
                    month_labels.push(month.to_string());
                    monthly_orders.push(total.to_string());
                }
                _ => {
                    month_labels.push(String::new());
                    monthly_orders.push(String::new());
                }
            }
        }

        let df = DataFrame::new(vec![
            Column::new("day".into(), days),
            Column::new("dailyOrders".into(), daily_orders),
            Column::new("month".into(), month_labels),
            Column::new("monthlyOrders".into(), monthly_orders),
        ])?;
        Ok(df)
    }

    /// Status counts per category, most cancellations first.
    fn category_status(records: &[OrderRecord]) -> Result<DataFrame, ProcessorError> {
        let mut per_category: BTreeMap<String, [i64; 3]> = BTreeMap::new();
        for record in records {
            let category = record
                .category
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
            let counts = per_category.entry(category).or_default();
            counts[0] += i64::from(record.is(CANCELLED));
            counts[1] += i64::from(record.is(COMPLETED));
            // NULL status is neither pending nor counted, as in SQL.
            counts[2] += i64::from(record.status.is_some() && !record.is(PENDING));
        }

        let mut rows: Vec<(String, [i64; 3])> = per_category.into_iter().collect();
        rows.sort_by(|a, b| b.1[0].cmp(&a.1[0]).then_with(|| a.0.cmp(&b.0)));

        let df = DataFrame::new(vec![
            Column::new(
                "product_category".into(),
                rows.iter().map(|(c, _)| c.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                "cancelled_orders".into(),
                rows.iter().map(|(_, n)| n[0]).collect::<Vec<_>>(),
            ),
            Column::new(
                "completed_orders".into(),
                rows.iter().map(|(_, n)| n[1]).collect::<Vec<_>>(),
            ),
            Column::new(
                "total_orders".into(),
                rows.iter().map(|(_, n)| n[2]).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(df)
    }
}
