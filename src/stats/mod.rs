//! Stats module - Descriptive statistics for the distribution view

mod calculator;

pub use calculator::{BucketStats, StatsCalculator};
