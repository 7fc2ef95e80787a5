//! Distribution Transformer Module
//! Prepares severity vs economic impact rows: integer severity buckets and
//! log10 impact, one row per qualifying event.

use std::collections::BTreeSet;

use super::record::EventRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionRow {
    pub severity_bucket: i64,
    pub log_impact: f64,
}

/// Keep events with a severity and a strictly positive impact.
pub fn transform(events: &[EventRecord]) -> Vec<DistributionRow> {
    events
        .iter()
        .filter_map(|event| {
            let severity = event.severity.filter(|s| s.is_finite())?;
            let impact = event
                .economic_impact_million_usd
                .filter(|v| v.is_finite() && *v > 0.0)?;
            Some(DistributionRow {
                severity_bucket: severity.round() as i64,
                log_impact: impact.log10(),
            })
        })
        .collect()
}

/// Distinct severity buckets in ascending order.
pub fn severity_order(rows: &[DistributionRow]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.severity_bucket)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(severity: Option<f64>, impact: Option<f64>) -> EventRecord {
        EventRecord {
            event_type: Some("volcanic_eruption".into()),
            year: 2022,
            severity,
            economic_impact_million_usd: impact,
            ..Default::default()
        }
    }

    #[test]
    fn excludes_non_positive_and_missing_values() {
        let events = vec![
            event(Some(3.0), Some(100.0)),
            event(Some(4.0), Some(0.0)),
            event(None, Some(10.0)),
            event(Some(5.0), None),
        ];
        let rows = transform(&events);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].severity_bucket, 3);
        assert!((rows[0].log_impact - 2.0).abs() < 1e-12);
    }

    #[test]
    fn keeps_one_row_per_event() {
        let events = vec![
            event(Some(7.0), Some(1.0)),
            event(Some(7.0), Some(1000.0)),
            event(Some(2.0), Some(10.0)),
        ];
        let rows = transform(&events);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].log_impact, 0.0);
        assert_eq!(severity_order(&rows), vec![2, 7]);
    }

    #[test]
    fn severity_rounds_to_integer_bucket() {
        let rows = transform(&[event(Some(6.6), Some(10.0)), event(Some(6.2), Some(10.0))]);
        assert_eq!(rows[0].severity_bucket, 7);
        assert_eq!(rows[1].severity_bucket, 6);
    }
}
