//! Climate Dashboard Main Application
//! Main window with sidebar navigation and the active view.

use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction, MapControls, Page, TemporalControls};
use climate_dash::config::DashboardConfig;
use climate_dash::data::{classify, CategoryTable, ClimateDataset, Classification, DatasetCache};
use egui::SidePanel;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

/// Main application window.
pub struct DashboardApp {
    cache: DatasetCache,
    table: CategoryTable,
    suggest_count: usize,
    rng: StdRng,

    dataset: Option<Arc<ClimateDataset>>,
    classification: Classification,

    control_panel: ControlPanel,
    temporal: TemporalControls,
    map: MapControls,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut app = Self {
            cache: DatasetCache::new(config.loader_options()),
            table: CategoryTable::standard(),
            suggest_count: config.suggest_count,
            rng,
            dataset: None,
            classification: Classification::default(),
            control_panel: ControlPanel::new(),
            temporal: TemporalControls::default(),
            map: MapControls::default(),
        };
        app.open(config.data_path);
        app
    }

    /// Load (or fetch from cache) the dataset at `path` and reset selections.
    fn open(&mut self, path: PathBuf) {
        self.control_panel.data_path = Some(path.clone());

        match self.cache.get_or_load(&path) {
            Ok(dataset) => {
                info!("Dashboard using {} events from {}", dataset.len(), path.display());
                self.classification = classify(&self.table, &dataset.event_types());
                self.temporal
                    .reset(&dataset, self.suggest_count, &mut self.rng);
                self.map.reset(&dataset);
                self.control_panel.set_status(format!(
                    "Loaded {} events ({} rows read)",
                    dataset.len(),
                    dataset.summary().rows_read
                ));
                self.dataset = Some(dataset);
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                self.control_panel.set_status(format!("Error: {}", e));
                self.dataset = None;
                self.classification = Classification::default();
            }
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.open(path);
        }
    }

    /// Drop the cached copy of the current file and read it again.
    fn handle_reload(&mut self) {
        if let Some(path) = self.control_panel.data_path.clone() {
            self.cache.invalidate(&path);
            self.open(path);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Navigation
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => self.handle_reload(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Active view
        egui::CentralPanel::default().show(ctx, |ui| {
            let page = self.control_panel.page;
            let Some(dataset) = self.dataset.clone() else {
                match page {
                    Page::Overview => ChartViewer::show_overview(ui, None),
                    _ => ChartViewer::show_empty(ui),
                }
                return;
            };

            match page {
                Page::Overview => ChartViewer::show_overview(ui, Some(&dataset)),
                Page::Temporal => {
                    ui.heading("🌪 Temporal Patterns");
                    ui.add_space(5.0);
                    let random = self.temporal.show(
                        ui,
                        &dataset,
                        &self.classification,
                        self.suggest_count,
                    );
                    if random {
                        self.temporal
                            .randomize(&dataset, self.suggest_count, &mut self.rng);
                    }
                    ui.add_space(10.0);
                    ChartViewer::show_temporal(ui, &dataset, &self.classification, &self.temporal);
                }
                Page::Severity => ChartViewer::show_severity(ui, &dataset),
                Page::WorldMap => ChartViewer::show_world_map(ui, &dataset, &mut self.map),
            }
        });
    }
}
