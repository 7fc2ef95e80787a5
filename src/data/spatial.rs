//! Spatial Filter Module
//! Filters mappable events by type and severity, then slices a monthly time
//! window for the world map.

use std::collections::BTreeSet;
use std::fmt;

use super::record::{pretty_event_label, EventRecord};
use super::selection::EmptySelectionError;

/// Severity slider bounds used when no mappable row has a severity.
pub const DEFAULT_SEVERITY_BOUNDS: (f64, f64) = (0.0, 10.0);

/// A calendar month, ordered by (year, month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Months since year 0, used as a slider position.
    pub fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    pub fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive month range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: MonthKey,
    pub end: MonthKey,
}

impl MonthWindow {
    pub fn new(start: MonthKey, end: MonthKey) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, key: MonthKey) -> bool {
        self.start <= key && key <= self.end
    }

    /// Number of months covered.
    pub fn months(&self) -> usize {
        (self.end.index() - self.start.index() + 1) as usize
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// What the map colours points by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorBy {
    #[default]
    Severity,
    EventType,
    EconomicImpact,
}

impl ColorBy {
    pub const ALL: [ColorBy; 3] = [ColorBy::Severity, ColorBy::EventType, ColorBy::EconomicImpact];

    pub fn label(&self) -> &'static str {
        match self {
            ColorBy::Severity => "Severity",
            ColorBy::EventType => "Event Type",
            ColorBy::EconomicImpact => "Economic Impact (M USD)",
        }
    }
}

/// What the map sizes points by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeBy {
    #[default]
    EconomicImpact,
    Severity,
    None,
}

impl SizeBy {
    pub const ALL: [SizeBy; 3] = [SizeBy::EconomicImpact, SizeBy::Severity, SizeBy::None];

    pub fn label(&self) -> &'static str {
        match self {
            SizeBy::EconomicImpact => "Economic Impact (M USD)",
            SizeBy::Severity => "Severity",
            SizeBy::None => "None",
        }
    }
}

/// Value a point is coloured by.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorValue {
    Numeric(f64),
    Category(String),
    Missing,
}

/// An event that can be placed on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPoint<'a> {
    pub record: &'a EventRecord,
    pub latitude: f64,
    pub longitude: f64,
    pub key: MonthKey,
}

impl<'a> MapPoint<'a> {
    pub fn from_record(record: &'a EventRecord) -> Option<Self> {
        Some(Self {
            record,
            latitude: record.latitude?,
            longitude: record.longitude?,
            key: MonthKey::new(record.year, record.month?),
        })
    }

    pub fn color_value(&self, by: ColorBy) -> ColorValue {
        let numeric = |v: Option<f64>| v.map(ColorValue::Numeric).unwrap_or(ColorValue::Missing);
        match by {
            ColorBy::Severity => numeric(self.record.severity),
            ColorBy::EventType => ColorValue::Category(self.record.event_type_label()),
            ColorBy::EconomicImpact => numeric(self.record.economic_impact_million_usd),
        }
    }

    /// Marker size input; missing counts as 0 and negatives clip to 0.
    pub fn size_value(&self, by: SizeBy) -> Option<f64> {
        let raw = match by {
            SizeBy::EconomicImpact => self.record.economic_impact_million_usd,
            SizeBy::Severity => self.record.severity,
            SizeBy::None => return None,
        };
        Some(raw.unwrap_or(0.0).max(0.0))
    }

    /// Field/value pairs shown when the point is hovered.
    pub fn details(&self) -> Vec<(&'static str, String)> {
        let r = self.record;
        let text = |v: Option<&str>| v.unwrap_or("n/a").to_string();
        let number = |v: Option<f64>, digits: usize| {
            v.map(|x| format!("{x:.digits$}")).unwrap_or_else(|| "n/a".to_string())
        };
        vec![
            ("Year", r.year.to_string()),
            ("Month", self.key.month.to_string()),
            ("Country", text(r.country.as_deref())),
            ("Event type", r.event_type_label()),
            ("Severity", number(r.severity, 1)),
            ("Economic impact (M USD)", number(r.economic_impact_million_usd, 2)),
            ("Affected population", number(r.affected_population, 0)),
            ("Deaths", number(r.deaths, 0)),
            ("Injuries", number(r.injuries, 0)),
        ]
    }
}

/// Index of the point closest to `(longitude, latitude)`, if any lies within
/// `max_distance` degrees.
pub fn nearest_point(
    points: &[MapPoint<'_>],
    longitude: f64,
    latitude: f64,
    max_distance: f64,
) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p.longitude - longitude).hypot(p.latitude - latitude)))
        .filter(|(_, d)| *d <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialQuery {
    /// Empty means every type.
    pub event_types: BTreeSet<String>,
    /// Inclusive; `None` leaves severity unrestricted.
    pub severity_range: Option<(f64, f64)>,
    /// Defaults to the full range of the filtered rows.
    pub window: Option<MonthWindow>,
}

/// Summary of the type/severity-filtered mappable rows, before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickStats {
    pub events: usize,
    pub countries: usize,
    pub span: MonthWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpatialView<'a> {
    /// Filtered and windowed points.
    pub points: Vec<MapPoint<'a>>,
    /// Month range of the type/severity-filtered rows.
    pub full_range: MonthWindow,
    /// Window actually applied.
    pub window: MonthWindow,
    pub stats: QuickStats,
}

/// Apply type and severity filters, then the month window.
pub fn filter<'a>(
    events: &'a [EventRecord],
    query: &SpatialQuery,
) -> Result<SpatialView<'a>, EmptySelectionError> {
    let filtered: Vec<MapPoint<'a>> = events
        .iter()
        .filter_map(MapPoint::from_record)
        .filter(|p| {
            query.event_types.is_empty()
                || p.record
                    .event_type
                    .as_ref()
                    .is_some_and(|t| query.event_types.contains(t))
        })
        .filter(|p| match query.severity_range {
            Some((lo, hi)) => p.record.severity.is_some_and(|s| lo <= s && s <= hi),
            None => true,
        })
        .collect();

    let (Some(first), Some(last)) = (
        filtered.iter().map(|p| p.key).min(),
        filtered.iter().map(|p| p.key).max(),
    ) else {
        return Err(EmptySelectionError::NoRowsAfterFilters);
    };
    let full_range = MonthWindow::new(first, last);

    let countries = filtered
        .iter()
        .filter_map(|p| p.record.country.as_deref())
        .collect::<BTreeSet<_>>()
        .len();
    let stats = QuickStats {
        events: filtered.len(),
        countries,
        span: full_range,
    };

    let window = query.window.unwrap_or(full_range);
    let points = filtered
        .into_iter()
        .filter(|p| window.contains(p.key))
        .collect();

    Ok(SpatialView {
        points,
        full_range,
        window,
        stats,
    })
}

/// Severity slider bounds over the mappable rows.
pub fn severity_bounds(events: &[EventRecord]) -> (f64, f64) {
    events
        .iter()
        .filter_map(MapPoint::from_record)
        .filter_map(|p| p.record.severity)
        .fold(None, |acc: Option<(f64, f64)>, s| match acc {
            Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
            None => Some((s, s)),
        })
        .unwrap_or(DEFAULT_SEVERITY_BOUNDS)
}

/// Whether any mappable row of the selected types carries a severity.
/// An empty type set means every type.
pub fn has_severity(events: &[EventRecord], event_types: &BTreeSet<String>) -> bool {
    events
        .iter()
        .filter_map(MapPoint::from_record)
        .filter(|p| {
            event_types.is_empty()
                || p.record
                    .event_type
                    .as_ref()
                    .is_some_and(|t| event_types.contains(t))
        })
        .any(|p| p.record.severity.is_some())
}

/// `(raw, label)` pairs of mappable event types, sorted by label.
pub fn mappable_event_types(events: &[EventRecord]) -> Vec<(String, String)> {
    let raw: BTreeSet<&str> = events
        .iter()
        .filter_map(MapPoint::from_record)
        .filter_map(|p| p.record.event_type.as_deref())
        .collect();
    let mut pairs: Vec<(String, String)> = raw
        .into_iter()
        .map(|t| (t.to_string(), pretty_event_label(t)))
        .collect();
    pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}
