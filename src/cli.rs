use crate::inference_model::InferenceModel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "headcount")]
#[command(about = "Count people and heads with a hosted detection model", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan one image and save the raw service response
    Scan {
        /// Image file (.jpg, .jpeg, .png)
        #[arg(required = true)]
        image: PathBuf,

        /// Result file (default: from config, inference_result.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Hosted model to ask
        #[arg(short, long, default_value = "headcount")]
        model: InferenceModel,
    },

    /// Show or change settings
    Config {
        /// Store the API key in the config file
        #[arg(long)]
        set_api_key: Option<String>,

        /// Print current settings
        #[arg(long)]
        show: bool,
    },

    /// List camera devices
    Cameras,
}
