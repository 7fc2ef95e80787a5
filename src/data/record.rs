//! Event Record Module
//! Typed rows of the climate events table and the immutable dataset.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Column headers of the source CSV.
pub const COL_EVENT_TYPE: &str = "event_type";
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_SEVERITY: &str = "severity";
pub const COL_IMPACT: &str = "economic_impact_million_usd";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";
pub const COL_COUNTRY: &str = "country";
pub const COL_AFFECTED: &str = "affected_population";
pub const COL_DEATHS: &str = "deaths";
pub const COL_INJURIES: &str = "injuries";

/// A single climate event after type coercion.
///
/// Only `year` is guaranteed; every other field is `None` when the raw cell
/// was empty or failed to parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventRecord {
    pub event_type: Option<String>,
    pub year: i32,
    /// Calendar month, always within 1..=12 when present.
    pub month: Option<u32>,
    /// Non-negative when present.
    pub severity: Option<f64>,
    /// Non-negative when present.
    pub economic_impact_million_usd: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub country: Option<String>,
    pub affected_population: Option<f64>,
    pub deaths: Option<f64>,
    pub injuries: Option<f64>,
}

impl EventRecord {
    /// Human readable event type, e.g. `"volcanic_eruption"` -> `"Volcanic Eruption"`.
    pub fn event_type_label(&self) -> String {
        self.event_type
            .as_deref()
            .map(pretty_event_label)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Replace underscores with spaces and title-case every word.
pub fn pretty_event_label(raw: &str) -> String {
    raw.replace('_', " ")
        .trim()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-column count of cells that could not be coerced and became missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionWarning {
    pub column: &'static str,
    pub rows: usize,
}

/// What happened while loading: rows read, rows dropped and coercion losses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_unparsable_year: usize,
    pub dropped_incomplete_year: usize,
    pub warnings: Vec<CoercionWarning>,
}

/// The full loaded dataset. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct ClimateDataset {
    events: Vec<EventRecord>,
    source: PathBuf,
    summary: LoadSummary,
}

impl ClimateDataset {
    pub fn new(events: Vec<EventRecord>, source: PathBuf, summary: LoadSummary) -> Self {
        Self {
            events,
            source,
            summary,
        }
    }

    /// Build a dataset from in-memory records (tests and demos).
    pub fn from_events(events: Vec<EventRecord>) -> Self {
        let summary = LoadSummary {
            rows_read: events.len(),
            rows_kept: events.len(),
            ..Default::default()
        };
        Self::new(events, PathBuf::new(), summary)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sorted distinct raw event types.
    pub fn event_types(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| e.event_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct years.
    pub fn years(&self) -> Vec<i32> {
        self.events
            .iter()
            .map(|e| e.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
