//! Data module - report queries, CSV loading and aggregation

mod loader;
mod processor;
mod query;
mod report;

pub use loader::DataLoader;
pub use processor::OrdersProcessor;
pub use query::fetch_report;
pub use report::Report;
