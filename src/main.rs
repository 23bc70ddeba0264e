use anyhow::{Result, anyhow};
use eframe::egui;

use methane_dash::app::MethaneDashApp;
use methane_dash::config::{self, CliArgs, Mode};
use methane_dash::dashboard::load_dashboard;
use methane_dash::data::fetch::HttpPageSource;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = CliArgs::parse(std::env::args().skip(1))?;
    if cli.mode() == Mode::Help {
        println!("{}", config::usage());
        return Ok(());
    }

    let config = cli.resolve()?;
    log::debug!("Using config {config:?}");

    let source = HttpPageSource::new(&config.api_base_url, config.timeout())?;
    let dashboard = load_dashboard(&source, &config)?;

    if cli.mode() == Mode::FetchOnly {
        match dashboard.year_bounds {
            Some((lo, hi)) => log::info!(
                "{} emissions records for {lo}..={hi}, {} basins, {} facilities",
                dashboard.len(),
                dashboard.basin_options.len() - 2,
                dashboard.facilities.len()
            ),
            None => log::warn!("No emissions records available"),
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Methane Emissions Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(MethaneDashApp::new(dashboard)))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
