//! Chart Plotter Module
//! Draws the dashboard charts with egui_plot: grouped bars, severity box
//! plots and the world map scatter.

use climate_dash::data::{spatial, AggregationMatrix, ColorBy, ColorValue, SizeBy, SpatialView};
use climate_dash::stats::BucketStats;
use egui::{Color32, RichText};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Corner, GridMark, Legend, Plot, PlotPoints,
    Points,
};
use std::collections::BTreeMap;

/// Color palette for series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Low-to-high scale for numeric map colouring (plasma-like).
pub const SCALE: [Color32; 8] = [
    Color32::from_rgb(13, 8, 135),
    Color32::from_rgb(84, 2, 163),
    Color32::from_rgb(139, 10, 165),
    Color32::from_rgb(185, 50, 137),
    Color32::from_rgb(219, 92, 104),
    Color32::from_rgb(244, 136, 73),
    Color32::from_rgb(254, 188, 43),
    Color32::from_rgb(240, 249, 33),
];

const MISSING_COLOR: Color32 = Color32::GRAY;
const SIZE_LEVELS: usize = 5;
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 9.0;
/// Hover reach as a share of the visible longitude span.
const HOVER_FRACTION: f64 = 0.01;

/// Creates the dashboard charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Fixed tick marks at integer positions `0..n`.
    fn index_marks(n: usize) -> Vec<GridMark> {
        (0..n)
            .map(|i| GridMark {
                value: i as f64,
                step_size: 1.0,
            })
            .collect()
    }

    /// Grouped (side-by-side) bars, one group per bucket.
    pub fn draw_grouped_bars(ui: &mut egui::Ui, matrix: &AggregationMatrix) {
        let labels = matrix.bucket_labels();
        let n_buckets = labels.len();
        let n_series = matrix.series.len().max(1);
        let group_width = 0.8;
        let bar_width = group_width / n_series as f64;

        ui.label(RichText::new(matrix.title()).size(18.0).strong());
        ui.label(
            RichText::new(format!("Series: {}", matrix.mode.title()))
                .size(11.0)
                .color(Color32::GRAY),
        );

        Plot::new("temporal_bars")
            .height(480.0)
            .legend(Legend::default().position(Corner::RightTop))
            .x_axis_label(matrix.x_title())
            .y_axis_label(matrix.y_title())
            .allow_scroll(false)
            .include_y(0.0)
            .x_grid_spacer(move |_input| Self::index_marks(n_buckets))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (mark.value - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (j, series) in matrix.series.iter().enumerate() {
                    let offset = -group_width / 2.0 + bar_width * (j as f64 + 0.5);
                    let bars: Vec<Bar> = matrix
                        .column(j)
                        .into_iter()
                        .enumerate()
                        .map(|(i, value)| {
                            Bar::new(i as f64 + offset, value)
                                .width(bar_width * 0.95)
                                .name(format!("{} {}", series, matrix.buckets[i].label()))
                        })
                        .collect();

                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .color(Self::series_color(j))
                            .name(series),
                    );
                }
            });
    }

    /// One box per severity bucket over log10 impact.
    pub fn draw_severity_boxes(ui: &mut egui::Ui, stats: &[BucketStats]) {
        let labels: Vec<String> = stats.iter().map(|s| s.severity.to_string()).collect();
        let n = labels.len();
        let color = Color32::from_rgb(126, 200, 245);

        Plot::new("severity_boxes")
            .height(520.0)
            .x_axis_label("Severity")
            .y_axis_label("log10(Economic Impact in Million USD)")
            .allow_scroll(false)
            .x_grid_spacer(move |_input| Self::index_marks(n))
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                let boxes: Vec<BoxElem> = stats
                    .iter()
                    .enumerate()
                    .map(|(i, s)| {
                        BoxElem::new(i as f64, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
                            .name(format!("Severity {}", s.severity))
                            .box_width(0.5)
                            .whisker_width(0.3)
                            .fill(Color32::from_rgba_unmultiplied(255, 255, 255, 190))
                            .stroke(egui::Stroke::new(1.5, color))
                    })
                    .collect();

                plot_ui.box_plot(BoxPlot::new(boxes).name("log10 impact"));
            });
    }

    /// Summary table matching the box plot hover values.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &[BucketStats]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("severity_stats_table")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Severity", "N", "min", "q1", "median", "q3", "max", "mean"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in stats {
                            ui.label(RichText::new(s.severity.to_string()).size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for v in [s.min, s.q1, s.median, s.q3, s.max, s.mean] {
                                ui.label(RichText::new(format!("{:.2}", v)).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Scatter of event locations (x = longitude, y = latitude).
    ///
    /// Points are batched by (colour, size level) so the plot holds a bounded
    /// number of items regardless of row count. Returns the index of the point
    /// under the pointer.
    pub fn draw_world_map(
        ui: &mut egui::Ui,
        view: &SpatialView<'_>,
        color_by: ColorBy,
        size_by: SizeBy,
    ) -> Option<usize> {
        let colors: Vec<(Color32, String)> = Self::point_colors(view, color_by);
        let sizes: Vec<usize> = Self::size_levels(view, size_by);

        let mut batches: BTreeMap<(String, usize), (Color32, Vec<[f64; 2]>)> = BTreeMap::new();
        for ((point, (color, name)), level) in view.points.iter().zip(colors).zip(sizes) {
            batches
                .entry((name, level))
                .or_insert_with(|| (color, Vec::new()))
                .1
                .push([point.longitude, point.latitude]);
        }

        Plot::new("world_map")
            .height(600.0)
            .data_aspect(1.0)
            .include_x(-180.0)
            .include_x(180.0)
            .include_y(-90.0)
            .include_y(90.0)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .legend(Legend::default().position(Corner::LeftBottom))
            .show(ui, |plot_ui| {
                let pointer = plot_ui.pointer_coordinate();
                let tolerance = plot_ui.plot_bounds().width() * HOVER_FRACTION;

                for ((name, level), (color, coords)) in batches {
                    let radius = MIN_RADIUS
                        + (MAX_RADIUS - MIN_RADIUS) * level as f32 / (SIZE_LEVELS - 1) as f32;
                    plot_ui.points(
                        Points::new(PlotPoints::from(coords))
                            .radius(radius)
                            .color(color.gamma_multiply(0.75))
                            .name(name),
                    );
                }

                pointer.and_then(|p| spatial::nearest_point(&view.points, p.x, p.y, tolerance))
            })
            .inner
    }

    /// Colour and legend name per visible point.
    fn point_colors(view: &SpatialView<'_>, color_by: ColorBy) -> Vec<(Color32, String)> {
        let values: Vec<ColorValue> = view.points.iter().map(|p| p.color_value(color_by)).collect();

        if color_by == ColorBy::EventType {
            let mut index: BTreeMap<String, usize> = BTreeMap::new();
            for v in &values {
                if let ColorValue::Category(label) = v {
                    let next = index.len();
                    index.entry(label.clone()).or_insert(next);
                }
            }
            return values
                .into_iter()
                .map(|v| match v {
                    ColorValue::Category(label) => (Self::series_color(index[&label]), label),
                    _ => (MISSING_COLOR, "Unknown".to_string()),
                })
                .collect();
        }

        let numeric: Vec<f64> = values
            .iter()
            .filter_map(|v| match v {
                ColorValue::Numeric(x) => Some(*x),
                _ => None,
            })
            .collect();
        let lo = numeric.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = numeric.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;
        let step = if span > 0.0 { span / SCALE.len() as f64 } else { 1.0 };

        values
            .into_iter()
            .map(|v| match v {
                ColorValue::Numeric(x) => {
                    let bin = if span > 0.0 {
                        (((x - lo) / step) as usize).min(SCALE.len() - 1)
                    } else {
                        0
                    };
                    let from = lo + step * bin as f64;
                    let to = if span > 0.0 { from + step } else { hi };
                    (
                        SCALE[bin],
                        format!("{} {:.1}–{:.1}", color_by.label(), from, to),
                    )
                }
                _ => (MISSING_COLOR, format!("{} n/a", color_by.label())),
            })
            .collect()
    }

    /// Size level per visible point, square-root scaled to the largest value.
    fn size_levels(view: &SpatialView<'_>, size_by: SizeBy) -> Vec<usize> {
        let values: Vec<Option<f64>> = view.points.iter().map(|p| p.size_value(size_by)).collect();
        let max = values.iter().flatten().copied().fold(0.0, f64::max);

        values
            .into_iter()
            .map(|v| match v {
                Some(x) if max > 0.0 => {
                    let scaled = (x / max).sqrt();
                    ((scaled * (SIZE_LEVELS - 1) as f64).round() as usize).min(SIZE_LEVELS - 1)
                }
                Some(_) => 0,
                None => 1,
            })
            .collect()
    }
}
