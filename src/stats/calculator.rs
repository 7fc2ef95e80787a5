//! Statistics Calculator Module
//! Per-severity descriptive statistics of log10 economic impact, shown as
//! box plots and in the hover table.

use rayon::prelude::*;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::data::DistributionRow;

/// Box statistics for a single severity bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    pub severity: i64,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
    pub std: f64,
}

impl BucketStats {
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for the values of one bucket.
    pub fn compute_bucket_stats(severity: i64, values: &[f64]) -> Option<BucketStats> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Some(BucketStats {
            severity,
            count: sorted.len(),
            min: sorted[0],
            q1: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            q3: Self::percentile(&sorted, 75.0),
            max: sorted[sorted.len() - 1],
            mean: values.iter().mean(),
            std: if values.len() > 1 {
                values.iter().std_dev()
            } else {
                0.0
            },
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Log impact values grouped by severity bucket, ascending.
    pub fn group_by_severity(rows: &[DistributionRow]) -> BTreeMap<i64, Vec<f64>> {
        let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.severity_bucket).or_default().push(row.log_impact);
        }
        groups
    }

    /// Statistics for every severity bucket, computed in parallel and
    /// returned in ascending severity order.
    pub fn summarize_by_severity(rows: &[DistributionRow]) -> Vec<BucketStats> {
        let groups: Vec<(i64, Vec<f64>)> = Self::group_by_severity(rows).into_iter().collect();

        groups
            .par_iter()
            .filter_map(|(severity, values)| Self::compute_bucket_stats(*severity, values))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(severity: i64, log_impact: f64) -> DistributionRow {
        DistributionRow {
            severity_bucket: severity,
            log_impact,
        }
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(StatsCalculator::percentile(&sorted, 50.0), 2.5);
        assert_eq!(StatsCalculator::percentile(&sorted, 25.0), 1.75);
        assert_eq!(StatsCalculator::percentile(&sorted, 100.0), 4.0);
        assert_eq!(StatsCalculator::percentile(&[7.0], 75.0), 7.0);
    }

    #[test]
    fn buckets_are_summarized_in_severity_order() {
        let rows = vec![
            row(5, 3.0),
            row(2, 1.0),
            row(5, 1.0),
            row(5, 2.0),
            row(2, 2.0),
        ];
        let stats = StatsCalculator::summarize_by_severity(&rows);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].severity, 2);
        assert_eq!(stats[1].severity, 5);

        let five = &stats[1];
        assert_eq!(five.count, 3);
        assert_eq!(five.min, 1.0);
        assert_eq!(five.median, 2.0);
        assert_eq!(five.max, 3.0);
        assert_eq!(five.q1, 1.5);
        assert_eq!(five.q3, 2.5);
        assert!((five.mean - 2.0).abs() < 1e-12);
        assert!((five.std - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_value_bucket_has_zero_spread() {
        let stats = StatsCalculator::summarize_by_severity(&[row(9, 4.0)]);
        assert_eq!(stats[0].iqr(), 0.0);
        assert_eq!(stats[0].std, 0.0);
    }
}
