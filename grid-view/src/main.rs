//! Application entry point for the noise grid viewer.
//!
//! This binary sets up tracing and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use grid_core::config::Config;
use tracing::{error, info};
use viewer::Viewer;

/// Loads the configuration from the JSON file named by the first argument,
/// falling back to [`Config::default`] when absent or invalid.
fn load_config() -> Config {
    let Some(path) = std::env::args().nth(1) else {
        return Config::default();
    };

    let loaded = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|json| Config::from_json_str(&json).map_err(|err| err.to_string()));

    match loaded {
        Ok(cfg) => {
            info!(%path, "loaded configuration");
            cfg
        }
        Err(err) => {
            error!(%path, %err, "could not load configuration, using defaults");
            Config::default()
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    init_tracing();
    let cfg = load_config();
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Noise Grid",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(cfg)))),
    )
}
