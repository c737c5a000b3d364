pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use app::state::{AppState, SharedState};
pub use config::cli::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use config::CliConfig;
pub use core::{engine::TrainingEngine, pipeline::PestPipeline, predictor::PestPredictor};
pub use utils::error::{PestError, Result};
