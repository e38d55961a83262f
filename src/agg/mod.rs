//! Aggregation module - per-department metric reduction

mod aggregator;

pub use aggregator::{Aggregator, DepartmentAggregate, Metric};
