//! Temporal Aggregator Module
//! Counts events per time bucket and series, pivoted to a wide matrix and
//! optionally normalized to per-bucket percentages.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::category::{Category, Classification};
use super::record::{pretty_event_label, EventRecord};
use super::selection::EmptySelectionError;

pub const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Abbreviated month name for 1..=12.
pub fn month_abbr(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_ABBR.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Row key of the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Year,
    /// Months 1..=12 of one year.
    MonthOfYear(i32),
}

/// Whether series are raw event types or categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesMode {
    #[default]
    EventType,
    Category,
}

impl SeriesMode {
    pub fn title(&self) -> &'static str {
        match self {
            SeriesMode::EventType => "Event Type",
            SeriesMode::Category => "Category",
        }
    }
}

/// The chosen series, carrying the data for its mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesSelection {
    EventTypes(BTreeSet<String>),
    Categories(BTreeSet<Category>),
}

impl SeriesSelection {
    pub fn mode(&self) -> SeriesMode {
        match self {
            SeriesSelection::EventTypes(_) => SeriesMode::EventType,
            SeriesSelection::Categories(_) => SeriesMode::Category,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SeriesSelection::EventTypes(s) => s.is_empty(),
            SeriesSelection::Categories(s) => s.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub time_unit: TimeUnit,
    pub selection: SeriesSelection,
    pub normalize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBucket {
    Year(i32),
    Month(u32),
}

impl TimeBucket {
    pub fn label(&self) -> String {
        match self {
            TimeBucket::Year(y) => y.to_string(),
            TimeBucket::Month(m) => month_abbr(*m).to_string(),
        }
    }
}

/// One cell of the long (melted) form.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub bucket: TimeBucket,
    pub series: String,
    pub value: f64,
}

/// Wide matrix: one row per bucket in canonical order, one column per series.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationMatrix {
    pub time_unit: TimeUnit,
    pub mode: SeriesMode,
    pub normalized: bool,
    pub buckets: Vec<TimeBucket>,
    pub series: Vec<String>,
    /// `values[bucket][series]`
    pub values: Vec<Vec<f64>>,
}

impl AggregationMatrix {
    pub fn value(&self, bucket: TimeBucket, series: &str) -> Option<f64> {
        let row = self.buckets.iter().position(|b| *b == bucket)?;
        let col = self.series.iter().position(|s| s == series)?;
        Some(self.values[row][col])
    }

    pub fn row(&self, bucket: TimeBucket) -> Option<&[f64]> {
        let row = self.buckets.iter().position(|b| *b == bucket)?;
        Some(&self.values[row])
    }

    pub fn column(&self, series_idx: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[series_idx]).collect()
    }

    pub fn bucket_labels(&self) -> Vec<String> {
        self.buckets.iter().map(TimeBucket::label).collect()
    }

    /// Melt to long form, bucket-major.
    pub fn to_long(&self) -> Vec<LongRow> {
        self.buckets
            .iter()
            .zip(&self.values)
            .flat_map(|(bucket, row)| {
                self.series.iter().zip(row).map(|(series, value)| LongRow {
                    bucket: *bucket,
                    series: series.clone(),
                    value: *value,
                })
            })
            .collect()
    }

    pub fn title(&self) -> String {
        let base = match self.time_unit {
            TimeUnit::Year => "Grouped comparison by year".to_string(),
            TimeUnit::MonthOfYear(y) => format!("Grouped comparison by month — {y}"),
        };
        if self.normalized {
            format!("{base} (normalized)")
        } else {
            base
        }
    }

    pub fn x_title(&self) -> &'static str {
        match self.time_unit {
            TimeUnit::Year => "Year",
            TimeUnit::MonthOfYear(_) => "Month",
        }
    }

    pub fn y_title(&self) -> &'static str {
        if self.normalized {
            "Percent (%)"
        } else {
            "Count"
        }
    }
}

/// Build the bucket x series matrix for the request.
pub fn aggregate(
    events: &[EventRecord],
    request: &AggregationRequest,
    classification: &Classification,
) -> Result<AggregationMatrix, EmptySelectionError> {
    if request.selection.is_empty() {
        return Err(EmptySelectionError::NoSeriesChosen);
    }

    // raw event type -> column index
    let (series, column_of): (Vec<String>, HashMap<String, usize>) = match &request.selection {
        SeriesSelection::EventTypes(types) => {
            let series = types.iter().map(|t| pretty_event_label(t)).collect();
            let column_of = types
                .iter()
                .enumerate()
                .map(|(i, t)| (t.clone(), i))
                .collect();
            (series, column_of)
        }
        SeriesSelection::Categories(selected) => {
            let ordered: Vec<Category> = classification
                .categories()
                .iter()
                .map(|c| c.category)
                .filter(|c| selected.contains(c))
                .collect();
            let mut column_of = HashMap::new();
            for (i, category) in ordered.iter().enumerate() {
                for member in classification.members(*category) {
                    if classification.owner_among(member, selected) == Some(*category) {
                        column_of.insert(member.clone(), i);
                    }
                }
            }
            if column_of.is_empty() {
                return Err(EmptySelectionError::NoMatchingEventTypes);
            }
            let series = ordered.iter().map(|c| c.name().to_string()).collect();
            (series, column_of)
        }
    };

    let mut counts: BTreeMap<TimeBucket, Vec<f64>> = BTreeMap::new();
    for event in events {
        let (Some(event_type), Some(month)) = (event.event_type.as_deref(), event.month) else {
            continue;
        };
        let Some(&col) = column_of.get(event_type) else {
            continue;
        };
        let bucket = match request.time_unit {
            TimeUnit::Year => TimeBucket::Year(event.year),
            TimeUnit::MonthOfYear(y) if event.year == y => TimeBucket::Month(month),
            TimeUnit::MonthOfYear(_) => continue,
        };
        counts.entry(bucket).or_insert_with(|| vec![0.0; series.len()])[col] += 1.0;
    }

    if counts.is_empty() {
        return Err(EmptySelectionError::NoMatchingEvents);
    }

    let buckets: Vec<TimeBucket> = match request.time_unit {
        TimeUnit::Year => counts.keys().copied().collect(),
        TimeUnit::MonthOfYear(_) => (1..=12).map(TimeBucket::Month).collect(),
    };

    let values = buckets
        .iter()
        .map(|b| {
            let row = counts
                .remove(b)
                .unwrap_or_else(|| vec![0.0; series.len()]);
            if request.normalize {
                normalize_row(row)
            } else {
                row
            }
        })
        .collect();

    Ok(AggregationMatrix {
        time_unit: request.time_unit,
        mode: request.selection.mode(),
        normalized: request.normalize,
        buckets,
        series,
        values,
    })
}

/// Percentages of the row total; an all-zero row stays all-zero.
fn normalize_row(row: Vec<f64>) -> Vec<f64> {
    let total: f64 = row.iter().sum();
    if total == 0.0 {
        return row;
    }
    row.into_iter().map(|v| v * 100.0 / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::category::{classify, CategoryTable};

    fn event(event_type: &str, year: i32, month: u32) -> EventRecord {
        EventRecord {
            event_type: Some(event_type.to_string()),
            year,
            month: Some(month),
            ..Default::default()
        }
    }

    fn repeat(event_type: &str, year: i32, month: u32, n: usize) -> Vec<EventRecord> {
        (0..n).map(|_| event(event_type, year, month)).collect()
    }

    fn types(names: &[&str]) -> SeriesSelection {
        SeriesSelection::EventTypes(names.iter().map(|s| s.to_string()).collect())
    }

    fn by_year(selection: SeriesSelection, normalize: bool) -> AggregationRequest {
        AggregationRequest {
            time_unit: TimeUnit::Year,
            selection,
            normalize,
        }
    }

    #[test]
    fn normalized_year_rows_are_percentages() {
        let mut events = repeat("flood", 2020, 1, 3);
        events.extend(repeat("storm", 2020, 2, 2));
        events.extend(repeat("storm", 2021, 5, 5));

        let m = aggregate(
            &events,
            &by_year(types(&["flood", "storm"]), true),
            &Classification::default(),
        )
        .unwrap();

        assert_eq!(m.buckets, vec![TimeBucket::Year(2020), TimeBucket::Year(2021)]);
        assert_eq!(m.series, vec!["Flood", "Storm"]);
        assert_eq!(m.row(TimeBucket::Year(2020)).unwrap(), [60.0, 40.0]);
        assert_eq!(m.row(TimeBucket::Year(2021)).unwrap(), [0.0, 100.0]);
    }

    #[test]
    fn zero_matches_are_zero_cells() {
        let mut events = repeat("flood", 2020, 1, 2);
        events.extend(repeat("drought", 2022, 1, 1));

        let m = aggregate(
            &events,
            &by_year(types(&["flood", "drought"]), false),
            &Classification::default(),
        )
        .unwrap();

        assert_eq!(m.value(TimeBucket::Year(2020), "Drought"), Some(0.0));
        assert_eq!(m.value(TimeBucket::Year(2022), "Flood"), Some(0.0));
        assert_eq!(m.value(TimeBucket::Year(2020), "Flood"), Some(2.0));
    }

    #[test]
    fn every_normalized_row_sums_to_100_or_zero() {
        let mut events = Vec::new();
        for (i, year) in (2020..2025).enumerate() {
            events.extend(repeat("flood", year, 1 + i as u32, i * 3 + 1));
            events.extend(repeat("heatwave", year, 7, i % 2));
            events.extend(repeat("tornado", year, 12, 7 - i));
        }

        let m = aggregate(
            &events,
            &AggregationRequest {
                time_unit: TimeUnit::MonthOfYear(2022),
                selection: types(&["flood", "heatwave", "tornado"]),
                normalize: true,
            },
            &Classification::default(),
        )
        .unwrap();

        assert_eq!(m.buckets.len(), 12);
        for row in &m.values {
            let sum: f64 = row.iter().sum();
            assert!(sum.abs() < 1e-9 || (sum - 100.0).abs() < 1e-9, "row sum {sum}");
            assert!(row.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn month_mode_keeps_only_the_chosen_year() {
        let mut events = repeat("flood", 2023, 3, 4);
        events.extend(repeat("flood", 2022, 3, 9));

        let m = aggregate(
            &events,
            &AggregationRequest {
                time_unit: TimeUnit::MonthOfYear(2023),
                selection: types(&["flood"]),
                normalize: false,
            },
            &Classification::default(),
        )
        .unwrap();

        assert_eq!(m.buckets.first(), Some(&TimeBucket::Month(1)));
        assert_eq!(m.buckets.last(), Some(&TimeBucket::Month(12)));
        assert_eq!(m.value(TimeBucket::Month(3), "Flood"), Some(4.0));
        assert_eq!(m.value(TimeBucket::Month(4), "Flood"), Some(0.0));
        assert_eq!(m.bucket_labels()[2], "Mar");
        assert_eq!(m.title(), "Grouped comparison by month — 2023");
    }

    #[test]
    fn year_buckets_come_from_filtered_events() {
        let mut events = repeat("flood", 2021, 1, 1);
        events.extend(repeat("drought", 2020, 1, 1));

        let m = aggregate(&events, &by_year(types(&["flood"]), false), &Classification::default())
            .unwrap();
        assert_eq!(m.buckets, vec![TimeBucket::Year(2021)]);
    }

    #[test]
    fn categories_sum_their_members() {
        let events: Vec<_> = [
            repeat("earthquake", 2021, 1, 2),
            repeat("Tsunami", 2021, 2, 1),
            repeat("flood", 2021, 3, 3),
            repeat("flood", 2022, 3, 1),
        ]
        .concat();
        let classification = classify(
            &CategoryTable::standard(),
            &["earthquake", "Tsunami", "flood"],
        );
        let selection =
            SeriesSelection::Categories([Category::Hydrological, Category::Geophysical].into());

        let m = aggregate(&events, &by_year(selection, false), &classification).unwrap();

        assert_eq!(m.mode, SeriesMode::Category);
        assert_eq!(m.series, vec!["Geophysical", "Hydrological"]);
        assert_eq!(m.row(TimeBucket::Year(2021)).unwrap(), [3.0, 3.0]);
        assert_eq!(m.row(TimeBucket::Year(2022)).unwrap(), [0.0, 1.0]);
    }

    #[test]
    fn empty_member_category_is_a_zero_column() {
        let events = repeat("flood", 2021, 1, 2);
        let classification = classify(&CategoryTable::standard(), &["flood"]);
        let selection =
            SeriesSelection::Categories([Category::Hydrological, Category::Ecological].into());

        let m = aggregate(&events, &by_year(selection, false), &classification).unwrap();
        assert_eq!(m.value(TimeBucket::Year(2021), "Ecological"), Some(0.0));
        assert_eq!(m.value(TimeBucket::Year(2021), "Hydrological"), Some(2.0));
    }

    #[test]
    fn only_empty_categories_selected_is_an_error() {
        let events = repeat("flood", 2021, 1, 2);
        let classification = classify(&CategoryTable::standard(), &["flood"]);
        let selection = SeriesSelection::Categories([Category::Ecological].into());

        let err = aggregate(&events, &by_year(selection, false), &classification).unwrap_err();
        assert_eq!(err, EmptySelectionError::NoMatchingEventTypes);
    }

    #[test]
    fn no_series_chosen_is_an_error() {
        let events = repeat("flood", 2021, 1, 2);
        let err = aggregate(&events, &by_year(types(&[]), false), &Classification::default())
            .unwrap_err();
        assert_eq!(err, EmptySelectionError::NoSeriesChosen);
    }

    #[test]
    fn month_of_year_without_events_is_an_error() {
        let events = repeat("flood", 2021, 1, 2);
        let err = aggregate(
            &events,
            &AggregationRequest {
                time_unit: TimeUnit::MonthOfYear(2020),
                selection: types(&["flood"]),
                normalize: true,
            },
            &Classification::default(),
        )
        .unwrap_err();
        assert_eq!(err, EmptySelectionError::NoMatchingEvents);
    }

    #[test]
    fn rows_without_month_are_skipped() {
        let mut events = repeat("flood", 2021, 1, 1);
        events.push(EventRecord {
            event_type: Some("flood".into()),
            year: 2021,
            month: None,
            ..Default::default()
        });
        let m = aggregate(&events, &by_year(types(&["flood"]), false), &Classification::default())
            .unwrap();
        assert_eq!(m.value(TimeBucket::Year(2021), "Flood"), Some(1.0));
    }

    #[test]
    fn long_form_is_bucket_major() {
        let mut events = repeat("flood", 2020, 1, 1);
        events.extend(repeat("storm", 2021, 1, 2));
        let m = aggregate(
            &events,
            &by_year(types(&["flood", "storm"]), false),
            &Classification::default(),
        )
        .unwrap();

        let long = m.to_long();
        assert_eq!(long.len(), 4);
        assert_eq!(long[0].bucket, TimeBucket::Year(2020));
        assert_eq!(long[0].series, "Flood");
        assert_eq!(long[3].bucket, TimeBucket::Year(2021));
        assert_eq!(long[3].series, "Storm");
        assert_eq!(long[3].value, 2.0);
    }
}
