use clap::Parser;
use headcount::{cli, config, error, gateway, loader, logging, report};
use cli::{Cli, Commands};
use config::Config;
use error::{HeadcountError, Result};
use gateway::{HostedInferenceClient, InferenceGateway, InferenceInput};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    logging::init(if cli.verbose { "debug" } else { config.log_level.as_str() });

    match cli.command {
        Commands::Scan { image, output, model } => {
            if !image.exists() {
                return Err(HeadcountError::FileNotFound(image.display().to_string()));
            }
            if !loader::is_supported_image(&image) {
                return Err(HeadcountError::ImageLoad(format!(
                    "{}: expected one of {}",
                    image.display(),
                    loader::IMAGE_EXTENSIONS.join(", ")
                )));
            }

            let client = HostedInferenceClient::from_config(&config)?;
            let model_id = model.model_id(&config);
            println!("Scanning {} with {}...", image.display(), model_id);

            let result = client.infer(InferenceInput::Path(&image), model_id)?;

            let output = output.unwrap_or_else(|| config.result_file.clone());
            report::write_scan_result(&output, &result.raw)?;

            println!(
                "\n{}",
                headcount_common::scan_summary(result.count(), &output.display().to_string())
            );
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("API key saved to {}", Config::config_path()?.display());
            }

            if show {
                println!("Settings:");
                println!("  API URL: {}", config.api_url);
                println!("  Headcount model: {}", config.headcount_model);
                println!("  Head detection model: {}", config.head_detection_model);
                println!("  Display bound: {}x{}", config.display_width, config.display_height);
                println!("  Frame interval: {}ms", config.frame_interval_ms);
                println!("  Camera: {}", config.camera_index);
                println!("  Result file: {}", config.result_file.display());
                println!(
                    "  API key: {}",
                    match config.get_api_key() {
                        Ok(_) => "set",
                        Err(_) => "not set",
                    }
                );
            }
        }

        Commands::Cameras => {
            let cameras = headcount::capture::list_cameras()?;
            if cameras.is_empty() {
                println!("No cameras found");
            }
            for camera in cameras {
                println!("{:<5} | {:<30} | {}", camera.index, camera.name, camera.description);
            }
        }
    }

    Ok(())
}
