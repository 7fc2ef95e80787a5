//! Chart Viewer Widget
//! Central panel: runs the pipeline for the active page and draws its charts.

use crate::charts::ChartPlotter;
use crate::gui::{MapControls, TemporalControls};
use climate_dash::data::{
    aggregate, spatial, transform, AggregationRequest, ClimateDataset, Classification,
};
use climate_dash::stats::StatsCalculator;
use egui::{Color32, RichText, ScrollArea};

const WARNING_COLOR: Color32 = Color32::from_rgb(255, 193, 7);

/// Stateless renderer for the three analysis pages.
pub struct ChartViewer;

impl ChartViewer {
    pub fn show_empty(ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.label(RichText::new("No Data").size(20.0));
        });
    }

    fn warn(ui: &mut egui::Ui, message: impl Into<String>) {
        ui.add_space(10.0);
        ui.label(RichText::new(message).size(15.0).color(WARNING_COLOR));
    }

    fn show_point_details(ui: &mut egui::Ui, details: &[(&'static str, String)]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    for (field, value) in details {
                        ui.label(RichText::new(format!("{field}:")).strong().size(11.0));
                        ui.label(RichText::new(value).size(11.0));
                        ui.add_space(12.0);
                    }
                });
            });
    }

    pub fn show_overview(ui: &mut egui::Ui, dataset: Option<&ClimateDataset>) {
        ui.heading(RichText::new("🌍 Climate Events Dashboard").size(26.0));
        ui.add_space(10.0);
        ui.label("This dashboard explores global climate events using three analytical tasks:");
        ui.add_space(10.0);

        ui.label(RichText::new("🕒 Task 1 — Temporal Patterns").size(17.0).strong());
        ui.label("Explore how the frequency and composition of climate events change over time (yearly / monthly).");
        ui.add_space(8.0);
        ui.label(RichText::new("💥 Task 2 — Severity vs Economic Impact").size(17.0).strong());
        ui.label("Analyze the relationship between event severity and economic damage, identify trends and outliers.");
        ui.add_space(8.0);
        ui.label(RichText::new("🗺 Task 3 — World Map").size(17.0).strong());
        ui.label("Examine the spatial distribution of events worldwide, with filters for time, event type, severity and impact.");
        ui.add_space(12.0);
        ui.label("👉 Use the sidebar on the left to navigate between tasks.");

        if let Some(ds) = dataset {
            let summary = ds.summary();
            ui.add_space(16.0);
            ui.label(
                RichText::new(format!(
                    "{} events loaded from {} ({} rows read, {} dropped).",
                    summary.rows_kept,
                    ds.source().display(),
                    summary.rows_read,
                    summary.rows_read - summary.rows_kept
                ))
                .color(Color32::GRAY),
            );
        }
    }

    pub fn show_temporal(
        ui: &mut egui::Ui,
        dataset: &ClimateDataset,
        classification: &Classification,
        controls: &TemporalControls,
    ) {
        let request = AggregationRequest {
            time_unit: controls.time_unit(),
            selection: controls.selection(),
            normalize: controls.normalize,
        };

        match aggregate(dataset.events(), &request, classification) {
            Ok(matrix) => {
                ChartPlotter::draw_grouped_bars(ui, &matrix);
                ui.label(
                    RichText::new(
                        "Tip: switch to Categories to reduce clutter; use Normalize (%) to compare composition instead of raw volume.",
                    )
                    .size(11.0)
                    .color(Color32::GRAY),
                );
            }
            Err(e) => Self::warn(ui, e.to_string()),
        }
    }

    pub fn show_severity(ui: &mut egui::Ui, dataset: &ClimateDataset) {
        ui.heading("Distribution: Economic Impact by Severity");
        ui.label(
            RichText::new("Economic Impact Distribution by Severity (box, log10 scale)")
                .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        let rows = transform(dataset.events());
        if rows.is_empty() {
            Self::warn(ui, "No events with both a severity and a positive economic impact.");
            return;
        }

        let stats = StatsCalculator::summarize_by_severity(&rows);
        ScrollArea::vertical().show(ui, |ui| {
            ChartPlotter::draw_severity_boxes(ui, &stats);
            ui.add_space(10.0);
            ChartPlotter::draw_stats_table(ui, &stats);
        });
    }

    pub fn show_world_map(ui: &mut egui::Ui, dataset: &ClimateDataset, controls: &mut MapControls) {
        ui.heading("🗺 World Map");
        ui.label(
            RichText::new(
                "Explore where events happen globally. Filter by event type / severity / encoding, then use the month range slider (bottom) to move through time.",
            )
            .color(Color32::GRAY),
        );
        ui.add_space(8.0);

        ScrollArea::vertical().show(ui, |ui| {
            ui.label(RichText::new("Filters").size(16.0).strong());
            controls.show_filters(ui, dataset);
            ui.add_space(10.0);

            let view = match spatial::filter(dataset.events(), &controls.query(dataset)) {
                Ok(view) => view,
                Err(e) => {
                    Self::warn(ui, e.to_string());
                    return;
                }
            };

            ui.label(RichText::new("Quick stats (current filters)").size(16.0).strong());
            ui.horizontal(|ui| {
                ui.label(format!("Events (filtered): {}", view.stats.events));
                ui.add_space(30.0);
                ui.label(format!("Countries: {}", view.stats.countries));
                ui.add_space(30.0);
                ui.label(format!("Date span: {}", view.stats.span));
            });
            ui.add_space(10.0);

            ui.label(RichText::new(format!("World map — {}", view.window)).size(18.0).strong());
            let hovered =
                ChartPlotter::draw_world_map(ui, &view, controls.color_by, controls.size_by);
            if let Some(point) = hovered.and_then(|i| view.points.get(i)) {
                Self::show_point_details(ui, &point.details());
            }
            ui.add_space(10.0);

            controls.show_time_slider(ui, view.full_range);
        });
    }
}
