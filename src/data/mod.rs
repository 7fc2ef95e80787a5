//! Data module - CSV loading and the per-view transforms

mod category;
mod distribution;
mod loader;
mod record;
mod selection;
pub mod spatial;
mod temporal;

pub use category::{
    classify, normalize_event_type, Category, CategoryMembers, CategoryTable, Classification,
    NO_MATCHING_EVENTS,
};
pub use distribution::{severity_order, transform, DistributionRow};
pub use loader::{
    coerce_frame, load_dataset, DataLoadError, DatasetCache, LoaderOptions, DEFAULT_CUTOFF_YEAR,
};
pub use record::{pretty_event_label, ClimateDataset, CoercionWarning, EventRecord, LoadSummary};
pub use selection::{suggest_series, EmptySelectionError, DEFAULT_SUGGEST_COUNT};
pub use spatial::{
    ColorBy, ColorValue, MapPoint, MonthKey, MonthWindow, QuickStats, SizeBy, SpatialQuery,
    SpatialView,
};
pub use temporal::{
    aggregate, month_abbr, AggregationMatrix, AggregationRequest, LongRow, SeriesMode,
    SeriesSelection, TimeBucket, TimeUnit,
};
