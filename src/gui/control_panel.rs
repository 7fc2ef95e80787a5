//! Control Panel Widgets
//! Sidebar navigation plus the per-view selection controls.

use climate_dash::data::{
    spatial, suggest_series, Category, ClimateDataset, Classification, ColorBy, MonthKey,
    MonthWindow, SeriesMode, SeriesSelection, SizeBy, SpatialQuery, TimeUnit,
};
use egui::{Color32, ComboBox, RichText, ScrollArea};
use rand::Rng;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Dashboard pages reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Overview,
    Temporal,
    Severity,
    WorldMap,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Temporal, Page::Severity, Page::WorldMap];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Overview => "🏠 Overview",
            Page::Temporal => "🕒 Temporal Patterns",
            Page::Severity => "💥 Severity vs Economic Impact",
            Page::WorldMap => "🗺 World Map",
        }
    }
}

/// Left side panel: navigation, data source and status.
pub struct ControlPanel {
    pub page: Page,
    pub data_path: Option<PathBuf>,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            page: Page::default(),
            data_path: None,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the sidebar
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🌍 Climate Events")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        ui.label(RichText::new("Navigate").size(14.0).strong());
        ui.add_space(5.0);
        for page in Page::ALL {
            ui.radio_value(&mut self.page, page, page.label());
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .data_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.data_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        if self.data_path.is_some() && ui.button("🔄 Reload").clicked() {
                            action = ControlPanelAction::Reload;
                        }
                    });
                });
            });

        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by the sidebar
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
}

/// Time axis radio choice; the year is kept separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeAxis {
    #[default]
    Year,
    Month,
}

/// Selection state of the temporal comparison view.
#[derive(Debug, Clone, Default)]
pub struct TemporalControls {
    pub axis: TimeAxis,
    pub mode: SeriesMode,
    pub normalize: bool,
    pub month_year: Option<i32>,
    pub event_types: BTreeSet<String>,
    pub categories: BTreeSet<Category>,
}

impl TemporalControls {
    /// Seed both pickers with random suggestions for a freshly loaded dataset.
    pub fn reset<R: Rng + ?Sized>(&mut self, dataset: &ClimateDataset, count: usize, rng: &mut R) {
        let types = dataset.event_types();
        self.event_types = suggest_series(&types, count, rng).into_iter().collect();
        self.categories = suggest_series(&Category::ALL, count, rng).into_iter().collect();
        self.month_year = dataset.years().last().copied();
    }

    /// Re-roll the picker of the active mode.
    pub fn randomize<R: Rng + ?Sized>(&mut self, dataset: &ClimateDataset, count: usize, rng: &mut R) {
        match self.mode {
            SeriesMode::EventType => {
                let types = dataset.event_types();
                self.event_types = suggest_series(&types, count, rng).into_iter().collect();
            }
            SeriesMode::Category => {
                self.categories = suggest_series(&Category::ALL, count, rng).into_iter().collect();
            }
        }
    }

    pub fn time_unit(&self) -> TimeUnit {
        match (self.axis, self.month_year) {
            (TimeAxis::Month, Some(year)) => TimeUnit::MonthOfYear(year),
            _ => TimeUnit::Year,
        }
    }

    pub fn selection(&self) -> SeriesSelection {
        match self.mode {
            SeriesMode::EventType => SeriesSelection::EventTypes(self.event_types.clone()),
            SeriesMode::Category => SeriesSelection::Categories(self.categories.clone()),
        }
    }

    /// Draw the control bar. Returns true when the random button was pressed.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        dataset: &ClimateDataset,
        classification: &Classification,
        suggest_count: usize,
    ) -> bool {
        let mut random_clicked = false;

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new("Time unit").strong());
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.axis, TimeAxis::Year, "Year");
                    ui.radio_value(&mut self.axis, TimeAxis::Month, "Month");
                });
            });
            ui.add_space(40.0);
            ui.vertical(|ui| {
                ui.label(RichText::new("Pick by").strong());
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.mode, SeriesMode::EventType, "Event types");
                    ui.radio_value(&mut self.mode, SeriesMode::Category, "Categories");
                });
            });
            ui.add_space(40.0);
            ui.vertical(|ui| {
                ui.label(RichText::new("Scale").strong());
                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.normalize, false, "Count");
                    ui.radio_value(&mut self.normalize, true, "Normalize (%)");
                });
            });
            ui.add_space(40.0);
            if ui.button(format!("🎲 Random {suggest_count}")).clicked() {
                random_clicked = true;
            }
        });

        ui.add_space(8.0);

        match self.mode {
            SeriesMode::EventType => {
                ui.label("Choose event types to compare");
                ScrollArea::vertical()
                    .id_salt("temporal_types")
                    .max_height(140.0)
                    .show(ui, |ui| {
                        ui.horizontal_wrapped(|ui| {
                            for event_type in dataset.event_types() {
                                let mut on = self.event_types.contains(&event_type);
                                let label = climate_dash::data::pretty_event_label(&event_type);
                                if ui.checkbox(&mut on, label).changed() {
                                    toggle(&mut self.event_types, event_type, on);
                                }
                            }
                        });
                    });
            }
            SeriesMode::Category => {
                ui.label("Choose categories to compare");
                ScrollArea::vertical()
                    .id_salt("temporal_categories")
                    .max_height(140.0)
                    .show(ui, |ui| {
                        for members in classification.categories() {
                            let mut on = self.categories.contains(&members.category);
                            if ui.checkbox(&mut on, members.label()).changed() {
                                toggle(&mut self.categories, members.category, on);
                            }
                        }
                    });
            }
        }

        if self.axis == TimeAxis::Month {
            let years = dataset.years();
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label("Year (for monthly comparison)");
                let selected = self
                    .month_year
                    .map(|y| y.to_string())
                    .unwrap_or_default();
                ComboBox::from_id_salt("month_year")
                    .width(100.0)
                    .selected_text(selected)
                    .show_ui(ui, |ui| {
                        for year in years {
                            ui.selectable_value(&mut self.month_year, Some(year), year.to_string());
                        }
                    });
            });
        }

        random_clicked
    }
}

/// Selection state of the world map view.
#[derive(Debug, Clone, Default)]
pub struct MapControls {
    pub event_types: BTreeSet<String>,
    pub severity: (f64, f64),
    pub bounds: (f64, f64),
    pub color_by: ColorBy,
    pub size_by: SizeBy,
    /// `None` until the user moves the time slider.
    pub window: Option<MonthWindow>,
}

impl MapControls {
    pub fn reset(&mut self, dataset: &ClimateDataset) {
        let bounds = spatial::severity_bounds(dataset.events());
        *self = Self {
            severity: bounds,
            bounds,
            ..Self::default()
        };
    }

    /// The severity range only applies when the selected types carry severity.
    pub fn query(&self, dataset: &ClimateDataset) -> SpatialQuery {
        let restrict = spatial::has_severity(dataset.events(), &self.event_types);
        SpatialQuery {
            event_types: self.event_types.clone(),
            severity_range: restrict.then_some(self.severity),
            window: self.window,
        }
    }

    /// Draw the filter row (everything except time).
    pub fn show_filters(&mut self, ui: &mut egui::Ui, dataset: &ClimateDataset) {
        let mut filters_changed = false;

        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(RichText::new("Event types (optional)").strong());
                ScrollArea::vertical()
                    .id_salt("map_types")
                    .max_height(110.0)
                    .show(ui, |ui| {
                        for (raw, label) in spatial::mappable_event_types(dataset.events()) {
                            let mut on = self.event_types.contains(&raw);
                            if ui.checkbox(&mut on, label).changed() {
                                toggle(&mut self.event_types, raw, on);
                                filters_changed = true;
                            }
                        }
                    });
            });

            ui.add_space(30.0);
            ui.vertical(|ui| {
                ui.label(RichText::new("Severity range").strong());
                let (lo, hi) = self.bounds;
                let min_changed = ui
                    .add(egui::Slider::new(&mut self.severity.0, lo..=hi).text("min"))
                    .changed();
                let max_changed = ui
                    .add(egui::Slider::new(&mut self.severity.1, lo..=hi).text("max"))
                    .changed();
                if self.severity.0 > self.severity.1 {
                    self.severity = (self.severity.1, self.severity.0);
                }
                filters_changed |= min_changed || max_changed;
            });

            ui.add_space(30.0);
            ui.vertical(|ui| {
                ui.label(RichText::new("Color by").strong());
                ComboBox::from_id_salt("map_color_by")
                    .selected_text(self.color_by.label())
                    .show_ui(ui, |ui| {
                        for option in ColorBy::ALL {
                            ui.selectable_value(&mut self.color_by, option, option.label());
                        }
                    });
                ui.add_space(5.0);
                ui.label(RichText::new("Size by").strong());
                ComboBox::from_id_salt("map_size_by")
                    .selected_text(self.size_by.label())
                    .show_ui(ui, |ui| {
                        for option in SizeBy::ALL {
                            ui.selectable_value(&mut self.size_by, option, option.label());
                        }
                    });
            });
        });

        // A new filter set gets its own full time range
        if filters_changed {
            self.window = None;
        }
    }

    /// Draw the month range slider below the map.
    pub fn show_time_slider(&mut self, ui: &mut egui::Ui, full_range: MonthWindow) {
        let lo = full_range.start.index();
        let hi = full_range.end.index();
        let current = self.window.unwrap_or(full_range);
        let mut start = current.start.index().clamp(lo, hi);
        let mut end = current.end.index().clamp(lo, hi);

        ui.label(RichText::new("Time range (monthly)").size(14.0).strong());
        let start_changed = ui
            .add(
                egui::Slider::new(&mut start, lo..=hi)
                    .text("from")
                    .custom_formatter(|v, _| MonthKey::from_index(v as i64).to_string()),
            )
            .changed();
        let end_changed = ui
            .add(
                egui::Slider::new(&mut end, lo..=hi)
                    .text("to")
                    .custom_formatter(|v, _| MonthKey::from_index(v as i64).to_string()),
            )
            .changed();

        if start_changed || end_changed {
            self.window = Some(MonthWindow::new(
                MonthKey::from_index(start),
                MonthKey::from_index(end),
            ));
        }

        let shown = self.window.unwrap_or(full_range);
        ui.label(format!(
            "Showing events from {} to {}.",
            shown.start, shown.end
        ));
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T, on: bool) {
    if on {
        set.insert(value);
    } else {
        set.remove(&value);
    }
}
