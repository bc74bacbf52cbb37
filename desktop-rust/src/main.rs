mod app;
mod controller;
mod model;

use anyhow::Result;
use app::HeadcountApp;
use eframe::egui;
use headcount::config::Config;
use headcount::gateway::HostedInferenceClient;
use headcount::logging;

const TITLE: &str = "Headcount Detection";

fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(&config.log_level);

    let gateway = match HostedInferenceClient::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "inference client unavailable");
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title(TITLE)
                .set_description(e.to_string())
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
            return Err(e.into());
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([800.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        TITLE,
        options,
        Box::new(move |_cc| Box::new(HeadcountApp::new(config, gateway))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
