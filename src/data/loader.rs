//! CSV Data Loader Module
//! Reads the climate events CSV with Polars, coerces every column into typed
//! records and memoizes the result per file.

use log::{debug, info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::record::{
    ClimateDataset, CoercionWarning, EventRecord, LoadSummary, COL_AFFECTED, COL_COUNTRY,
    COL_DEATHS, COL_EVENT_TYPE, COL_IMPACT, COL_INJURIES, COL_LATITUDE, COL_LONGITUDE, COL_MONTH,
    COL_SEVERITY, COL_YEAR,
};

/// First year treated as incomplete and dropped at load time.
pub const DEFAULT_CUTOFF_YEAR: i32 = 2025;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Options applied while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Rows with `year >= cutoff_year` are dropped.
    pub cutoff_year: i32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            cutoff_year: DEFAULT_CUTOFF_YEAR,
        }
    }
}

/// One coerced column plus the number of non-empty cells that were lost.
struct Coerced<T> {
    values: Vec<Option<T>>,
    failed: usize,
}

impl<T> Coerced<T> {
    fn missing(height: usize) -> Self {
        Self {
            values: (0..height).map(|_| None).collect(),
            failed: 0,
        }
    }

    fn take(&mut self, row: usize) -> Option<T> {
        self.values.get_mut(row).and_then(Option::take)
    }
}

/// Load and coerce the dataset at `path`.
pub fn load_dataset(path: &Path, options: &LoaderOptions) -> Result<ClimateDataset, DataLoadError> {
    if !path.is_file() {
        return Err(DataLoadError::NotFound(path.to_path_buf()));
    }

    // Read every column as text so that coercion stays under our control
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    let (events, summary) = coerce_frame(&df, options)?;

    info!(
        "Loaded {} of {} rows from {} ({} unparsable year, {} at or after {})",
        summary.rows_kept,
        summary.rows_read,
        path.display(),
        summary.dropped_unparsable_year,
        summary.dropped_incomplete_year,
        options.cutoff_year
    );
    for w in &summary.warnings {
        warn!("{} row(s) with unusable '{}' treated as missing", w.rows, w.column);
    }

    Ok(ClimateDataset::new(events, path.to_path_buf(), summary))
}

/// Turn a text-typed DataFrame into event records.
pub fn coerce_frame(
    df: &DataFrame,
    options: &LoaderOptions,
) -> Result<(Vec<EventRecord>, LoadSummary), DataLoadError> {
    let height = df.height();

    if df.column(COL_YEAR).is_err() {
        return Err(DataLoadError::MissingColumn(COL_YEAR));
    }
    let mut year = numeric_column(df, COL_YEAR)?;
    let mut month = numeric_column(df, COL_MONTH)?;
    let mut event_type = text_column(df, COL_EVENT_TYPE)?;
    let mut country = text_column(df, COL_COUNTRY)?;
    let mut severity = numeric_column(df, COL_SEVERITY)?;
    let mut impact = numeric_column(df, COL_IMPACT)?;
    let mut latitude = numeric_column(df, COL_LATITUDE)?;
    let mut longitude = numeric_column(df, COL_LONGITUDE)?;
    let mut affected = numeric_column(df, COL_AFFECTED)?;
    let mut deaths = numeric_column(df, COL_DEATHS)?;
    let mut injuries = numeric_column(df, COL_INJURIES)?;

    let mut summary = LoadSummary {
        rows_read: height,
        ..Default::default()
    };
    let mut bad_month = 0usize;
    let mut negative_severity = 0usize;
    let mut negative_impact = 0usize;

    let mut events = Vec::with_capacity(height);
    for row in 0..height {
        let Some(y) = year.take(row).and_then(as_integral) else {
            summary.dropped_unparsable_year += 1;
            continue;
        };
        let Ok(y) = i32::try_from(y) else {
            summary.dropped_unparsable_year += 1;
            continue;
        };
        if y >= options.cutoff_year {
            summary.dropped_incomplete_year += 1;
            continue;
        }

        let m = month.take(row);
        let valid_month = m
            .and_then(as_integral)
            .filter(|m| (1..=12).contains(m))
            .map(|m| m as u32);
        if m.is_some() && valid_month.is_none() {
            bad_month += 1;
        }

        events.push(EventRecord {
            event_type: event_type.take(row),
            year: y,
            month: valid_month,
            severity: non_negative(severity.take(row), &mut negative_severity),
            economic_impact_million_usd: non_negative(impact.take(row), &mut negative_impact),
            latitude: latitude.take(row),
            longitude: longitude.take(row),
            country: country.take(row),
            affected_population: affected.take(row),
            deaths: deaths.take(row),
            injuries: injuries.take(row),
        });
    }
    summary.rows_kept = events.len();

    let counts = [
        (COL_MONTH, month.failed + bad_month),
        (COL_SEVERITY, severity.failed + negative_severity),
        (COL_IMPACT, impact.failed + negative_impact),
        (COL_LATITUDE, latitude.failed),
        (COL_LONGITUDE, longitude.failed),
        (COL_AFFECTED, affected.failed),
        (COL_DEATHS, deaths.failed),
        (COL_INJURIES, injuries.failed),
    ];
    summary.warnings = counts
        .into_iter()
        .filter(|(_, rows)| *rows > 0)
        .map(|(column, rows)| CoercionWarning { column, rows })
        .collect();

    Ok((events, summary))
}

/// Trimmed non-empty strings; an absent column is all-missing.
fn text_column(df: &DataFrame, name: &str) -> Result<Coerced<String>, DataLoadError> {
    let Ok(column) = df.column(name) else {
        return Ok(Coerced::missing(df.height()));
    };
    let as_text = column.cast(&DataType::String)?;
    let values = as_text
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(Coerced { values, failed: 0 })
}

/// Non-strict parse to `f64` after trimming. Cells that held text but did not
/// parse are counted in `failed`.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Coerced<f64>, DataLoadError> {
    let Ok(column) = df.column(name) else {
        return Ok(Coerced::missing(df.height()));
    };
    let as_text = column.cast(&DataType::String)?;

    let mut failed = 0;
    let values = as_text
        .str()?
        .into_iter()
        .map(|text| {
            let text = text.map(str::trim).filter(|t| !t.is_empty())?;
            let value = text.parse::<f64>().ok().filter(|v| v.is_finite());
            if value.is_none() {
                failed += 1;
            }
            value
        })
        .collect();
    Ok(Coerced { values, failed })
}

fn as_integral(v: f64) -> Option<i64> {
    (v.fract() == 0.0).then_some(v as i64)
}

fn non_negative(v: Option<f64>, rejected: &mut usize) -> Option<f64> {
    match v {
        Some(x) if x < 0.0 => {
            *rejected += 1;
            None
        }
        other => other,
    }
}

/// Process-wide load-once store of datasets keyed by canonical file path.
///
/// Loading happens while the lock is held, so concurrent callers asking for
/// the same file never read it twice.
#[derive(Debug, Default)]
pub struct DatasetCache {
    options: LoaderOptions,
    entries: Mutex<HashMap<PathBuf, Arc<ClimateDataset>>>,
}

impl DatasetCache {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached dataset for `path`, loading it on first access.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<ClimateDataset>, DataLoadError> {
        let key = file_identity(path)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(dataset) = entries.get(&key) {
            debug!("Dataset cache hit: {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        debug!("Dataset cache miss: {}", key.display());
        let dataset = Arc::new(load_dataset(&key, &self.options)?);
        entries.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Forget the cached dataset for `path`. Returns whether one was cached.
    pub fn invalidate(&self, path: &Path) -> bool {
        let Ok(key) = file_identity(path) else {
            return false;
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&key)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn file_identity(path: &Path) -> Result<PathBuf, DataLoadError> {
    path.canonicalize()
        .map_err(|_| DataLoadError::NotFound(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "event_type,year,month,severity,economic_impact_million_usd,latitude,longitude,country,affected_population,deaths,injuries";

    fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_and_coerces_rows() {
        let file = write_csv(&[
            "flood,2021,3,7,120.5,10.0,20.0,Peru,1000,3,10",
            "wildfire,2022,abc,n/a,-5,,,Chile,,,",
        ]);
        let ds = load_dataset(file.path(), &LoaderOptions::default()).unwrap();
        assert_eq!(ds.len(), 2);

        let first = &ds.events()[0];
        assert_eq!(first.event_type.as_deref(), Some("flood"));
        assert_eq!(first.year, 2021);
        assert_eq!(first.month, Some(3));
        assert_eq!(first.severity, Some(7.0));
        assert_eq!(first.economic_impact_million_usd, Some(120.5));
        assert_eq!(first.country.as_deref(), Some("Peru"));

        let second = &ds.events()[1];
        assert_eq!(second.month, None);
        assert_eq!(second.severity, None);
        assert_eq!(second.economic_impact_million_usd, None);
        assert_eq!(second.latitude, None);

        let warned: Vec<_> = ds.summary().warnings.iter().map(|w| w.column).collect();
        assert!(warned.contains(&COL_MONTH));
        assert!(warned.contains(&COL_SEVERITY));
        assert!(warned.contains(&COL_IMPACT));
    }

    #[test]
    fn drops_unparsable_and_incomplete_years() {
        let file = write_csv(&[
            "flood,2024,1,5,10,0,0,A,,,",
            "flood,twenty,1,5,10,0,0,A,,,",
            "flood,2025,1,5,10,0,0,A,,,",
            "flood,2026,1,5,10,0,0,A,,,",
        ]);
        let ds = load_dataset(file.path(), &LoaderOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.summary().dropped_unparsable_year, 1);
        assert_eq!(ds.summary().dropped_incomplete_year, 2);
        assert!(ds.events().iter().all(|e| e.year < DEFAULT_CUTOFF_YEAR));
    }

    #[test]
    fn padded_numeric_cells_are_trimmed() {
        let file = write_csv(&["flood, 2022 , 4 , 5.5 ,10,0,0,A,,,"]);
        let ds = load_dataset(file.path(), &LoaderOptions::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.summary().dropped_unparsable_year, 0);

        let event = &ds.events()[0];
        assert_eq!(event.year, 2022);
        assert_eq!(event.month, Some(4));
        assert_eq!(event.severity, Some(5.5));
        assert!(ds.summary().warnings.is_empty());
    }

    #[test]
    fn out_of_range_month_becomes_missing() {
        let file = write_csv(&["flood,2023,13,5,10,0,0,A,,,", "flood,2023,0,5,10,0,0,A,,,"]);
        let ds = load_dataset(file.path(), &LoaderOptions::default()).unwrap();
        assert!(ds.events().iter().all(|e| e.month.is_none()));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_dataset(Path::new("/no/such/file.csv"), &LoaderOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn missing_year_column_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "event_type,month").unwrap();
        writeln!(file, "flood,3").unwrap();
        file.flush().unwrap();

        let err = load_dataset(file.path(), &LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn(COL_YEAR)));
    }

    #[test]
    fn cache_loads_once_until_invalidated() {
        let file = write_csv(&["flood,2021,3,7,120.5,10.0,20.0,Peru,1000,3,10"]);
        let cache = DatasetCache::default();

        let a = cache.get_or_load(file.path()).unwrap();
        let b = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate(file.path()));
        let c = cache.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn concurrent_callers_share_one_load() {
        let file = write_csv(&["flood,2021,3,7,120.5,10.0,20.0,Peru,1000,3,10"]);
        let cache = DatasetCache::default();

        let loaded: Vec<Arc<ClimateDataset>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get_or_load(file.path()).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(loaded.iter().all(|d| Arc::ptr_eq(d, &loaded[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cache = DatasetCache::default();
        assert!(cache.get_or_load(Path::new("/no/such/file.csv")).is_err());
        assert!(cache.is_empty());
    }
}
