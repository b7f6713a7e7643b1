mod app;
mod color;
mod config;
mod data;
mod export;
mod state;
mod ui;

use anyhow::{Context, Result, anyhow};
use app::BikeDashboardApp;
use clap::Parser;
use config::Config;
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();
    log::debug!("Starting with {config:?}");

    // The dataset is loaded exactly once up front; a missing or malformed
    // file is fatal.
    let dataset = data::loader::load_file(&config.data)
        .with_context(|| format!("cannot start without a dataset ({})", config.data.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let mut state = AppState::default();
    state.set_dataset(dataset, &config.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width, config.height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Bike Sharing Demand Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(BikeDashboardApp::new(state)))),
    )
    .map_err(|e| anyhow!("window error: {e}"))
}
