//! Climate Events Dashboard - temporal, severity and world map views
//!
//! Desktop front end over the `climate_dash` pipeline.

mod charts;
mod gui;

use anyhow::Context;
use clap::Parser;
use climate_dash::config::DashboardConfig;
use eframe::egui;
use gui::DashboardApp;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "climate-dash", about = "Climate Events Dashboard")]
struct Args {
    /// Path to the climate events CSV (overrides the config file)
    data_path: Option<PathBuf>,

    /// TOML config file (defaults to ./climate_dash.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = DashboardConfig::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(path) = args.data_path {
        config.data_path = path;
    }
    log::info!("Starting dashboard with data file {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Climate Events Dashboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Climate Events Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("running dashboard: {e}"))
}
