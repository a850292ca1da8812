mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::TitanicDashApp;
use config::Cli;
use data::aggregate::DashboardSummary;
use data::{filter, loader};
use state::AppState;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let path = cli.resolve_data_path()?;
    let dataset =
        loader::load_file(&path).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} passengers from {} (age {:?}, fare {:?})",
        dataset.len(),
        path.display(),
        dataset.age_bounds,
        dataset.fare_bounds
    );

    if cli.summary {
        let params = cli.filter_params(&dataset)?;
        let view = filter::apply(&dataset, &params);
        log::info!("{} passengers match: {params}", view.len());
        let summary = DashboardSummary::compute(&view);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    // The window starts from the dashboard's default selection unless flags
    // narrow it.
    let filters = if cli.has_filter_flags() {
        cli.filter_params(&dataset)?
    } else {
        filter::FilterParams::for_dataset(&dataset)
    };
    let state = AppState::new(dataset, filters);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Titanic Survival Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(TitanicDashApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running window: {e}"))
}
