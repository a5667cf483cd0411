//! Query Executor Module
//! Runs a report's SQL against PostgreSQL and materializes the rows with Polars.

use crate::data::report::{ColumnKind, ColumnSpec, Report};
use polars::prelude::*;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Connection, Row};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to build result table: {0}")]
    Frame(#[from] PolarsError),
}

/// Column values accumulated while decoding rows.
enum ColumnBuffer {
    Text(Vec<String>),
    Count(Vec<Option<i64>>),
}

impl ColumnBuffer {
    fn for_kind(kind: ColumnKind, capacity: usize) -> Self {
        match kind {
            ColumnKind::Text => ColumnBuffer::Text(Vec::with_capacity(capacity)),
            ColumnKind::Count => ColumnBuffer::Count(Vec::with_capacity(capacity)),
        }
    }

    fn push(&mut self, row: &PgRow, name: &str) -> Result<(), sqlx::Error> {
        match self {
            ColumnBuffer::Text(values) => {
                let value: Option<String> = row.try_get(name)?;
                values.push(value.unwrap_or_default());
            }
            ColumnBuffer::Count(values) => values.push(row.try_get(name)?),
        }
        Ok(())
    }

    fn into_column(self, name: &str) -> Column {
        match self {
            ColumnBuffer::Text(values) => Column::new(name.into(), values),
            ColumnBuffer::Count(values) => Column::new(name.into(), values),
        }
    }
}

/// Decode rows into a DataFrame following the report's column list.
pub fn rows_to_dataframe(rows: &[PgRow], columns: &[ColumnSpec]) -> Result<DataFrame, QueryError> {
    let mut buffers: Vec<ColumnBuffer> = columns
        .iter()
        .map(|spec| ColumnBuffer::for_kind(spec.kind, rows.len()))
        .collect();

    for row in rows {
        for (buffer, spec) in buffers.iter_mut().zip(columns) {
            buffer.push(row, spec.name)?;
        }
    }

    let df = DataFrame::new(
        buffers
            .into_iter()
            .zip(columns)
            .map(|(buffer, spec)| buffer.into_column(spec.name))
            .collect(),
    )?;

    Ok(df)
}

/// Execute the report over an open connection, fetching every row.
pub async fn run_report(conn: &mut PgConnection, report: Report) -> Result<DataFrame, QueryError> {
    let rows = sqlx::query(report.sql()).fetch_all(&mut *conn).await?;
    log::info!("Report '{}' returned {} rows", report, rows.len());

    rows_to_dataframe(&rows, report.columns())
}

/// Open a single connection, run the report and close the connection.
pub async fn fetch_report(connection_url: &str, report: Report) -> Result<DataFrame, QueryError> {
    let mut conn = PgConnection::connect(connection_url).await?;
    let df = run_report(&mut conn, report).await?;
    conn.close().await?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    //! These run the real SQL against a scratch database from `DATABASE_URL`.
    //! Run with `cargo test -- --ignored`.

    use super::*;
    use sqlx::PgPool;

    async fn seed(pool: &PgPool, orders: &[(&str, &str, &str)]) -> sqlx::Result<()> {
        sqlx::query(
            "CREATE TABLE orders (
                id SERIAL PRIMARY KEY,
                order_date TIMESTAMP NOT NULL,
                order_status TEXT,
                product_category TEXT
            )",
        )
        .execute(pool)
        .await?;

        for (date, status, category) in orders {
            sqlx::query(
                "INSERT INTO orders (order_date, order_status, product_category)
                 VALUES (CAST($1 AS TIMESTAMP), $2, $3)",
            )
            .bind(*date)
            .bind(*status)
            .bind(*category)
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    async fn run(pool: &PgPool, report: Report) -> DataFrame {
        let mut conn = pool.acquire().await.unwrap();
        run_report(&mut conn, report).await.unwrap()
    }

    fn text_values(df: &DataFrame, name: &str) -> Vec<String> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect()
    }

    fn count_values(df: &DataFrame, name: &str) -> Vec<i64> {
        df.column(name)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect()
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server via DATABASE_URL"]
    async fn monthly_counts_only_completed_orders(pool: PgPool) -> sqlx::Result<()> {
        seed(
            &pool,
            &[
                ("2024-02-10 09:00:00", "Completed", "Books"),
                ("2024-01-05 10:00:00", "Completed", "Books"),
                ("2024-01-20 12:30:00", "Completed", "Toys"),
                ("2024-01-21 08:00:00", "Cancelled", "Toys"),
                ("2024-02-11 08:00:00", "Pending", "Books"),
            ],
        )
        .await?;

        let df = run(&pool, Report::MonthlyCompleted).await;

        assert_eq!(text_values(&df, "months"), vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(count_values(&df, "monthlyOrders"), vec![2, 1]);
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server via DATABASE_URL"]
    async fn peak_day_carries_month_total_with_earliest_tie(pool: PgPool) -> sqlx::Result<()> {
        seed(
            &pool,
            &[
                ("2024-01-03 10:00:00", "Completed", "Books"),
                ("2024-01-03 11:00:00", "Completed", "Books"),
                ("2024-01-07 10:00:00", "Completed", "Books"),
                ("2024-01-07 11:00:00", "Completed", "Toys"),
                ("2024-01-09 10:00:00", "Completed", "Toys"),
                ("2024-02-01 10:00:00", "Completed", "Toys"),
                ("2024-02-02 10:00:00", "Completed", "Toys"),
                ("2024-02-02 11:00:00", "Completed", "Toys"),
            ],
        )
        .await?;

        let df = run(&pool, Report::PeakDays).await;

        assert_eq!(
            text_values(&df, "day"),
            vec!["2024-01-03", "2024-01-07", "2024-01-09", "2024-02-01", "2024-02-02"]
        );
        assert_eq!(count_values(&df, "dailyOrders"), vec![2, 2, 1, 1, 2]);
        assert_eq!(
            text_values(&df, "month"),
            vec!["2024-01-01", "", "", "", "2024-02-01"]
        );
        assert_eq!(
            text_values(&df, "monthlyOrders"),
            vec!["5", "", "", "", "3"]
        );
        Ok(())
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server via DATABASE_URL"]
    async fn category_breakdown_orders_by_cancellations(pool: PgPool) -> sqlx::Result<()> {
        seed(
            &pool,
            &[
                ("2024-01-03 10:00:00", "Completed", "Books"),
                ("2024-01-03 11:00:00", "Pending", "Books"),
                ("2024-01-04 10:00:00", "Cancelled", "Toys"),
                ("2024-01-05 10:00:00", "Completed", "Toys"),
            ],
        )
        .await?;

        let df = run(&pool, Report::CategoryStatus).await;

        assert_eq!(text_values(&df, "product_category"), vec!["Toys", "Books"]);
        assert_eq!(count_values(&df, "cancelled_orders"), vec![1, 0]);
        assert_eq!(count_values(&df, "completed_orders"), vec![1, 1]);
        assert_eq!(count_values(&df, "total_orders"), vec![2, 1]);
        Ok(())
    }
}
