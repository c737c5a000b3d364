pub mod cli;
pub mod toml_config;

use crate::core::predictor::DEFAULT_THRESHOLD;
use crate::core::{ConfigProvider, ForestParams, HandleUnknown};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATASET_PATH: &str = "datasets/mock_weather_data.csv";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
/// 預設只保留一列作為驗證
pub const DEFAULT_TEST_SIZE: f64 = 1.0;

#[cfg_attr(feature = "cli", derive(Parser))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", command(name = "pest-predictor"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Serve pest infestation risk predictions from weather and crop data")
)]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[cfg_attr(feature = "cli", arg(short, long))]
    pub config: Option<String>,

    /// Training dataset (CSV)
    #[cfg_attr(feature = "cli", arg(long, env = "PEST_DATASET"))]
    pub dataset: Option<String>,

    #[cfg_attr(feature = "cli", arg(long, env = "PEST_HOST"))]
    pub host: Option<String>,

    #[cfg_attr(feature = "cli", arg(short, long, env = "PEST_PORT"))]
    pub port: Option<u16>,

    /// Likelihood percentage above which the risk is HIGH
    #[cfg_attr(feature = "cli", arg(long))]
    pub threshold: Option<f64>,

    /// Number of trees in the forest
    #[cfg_attr(feature = "cli", arg(long))]
    pub trees: Option<usize>,

    /// Random seed for the split and the forest
    #[cfg_attr(feature = "cli", arg(long))]
    pub seed: Option<u64>,

    /// Holdout rows (>= 1) or fraction (< 1)
    #[cfg_attr(feature = "cli", arg(long))]
    pub test_size: Option<f64>,

    /// Advisory catalog (TOML) replacing the built-in one
    #[cfg_attr(feature = "cli", arg(long))]
    pub advisory: Option<String>,

    #[cfg_attr(feature = "cli", arg(short, long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub json_logs: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU/memory per training stage"))]
    pub monitor: bool,

    #[cfg_attr(
        feature = "cli",
        arg(long, help = "Validate configuration and dataset, then exit")
    )]
    pub dry_run: bool,
}

impl ConfigProvider for CliConfig {
    fn dataset_path(&self) -> &str {
        self.dataset.as_deref().unwrap_or(DEFAULT_DATASET_PATH)
    }

    fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }

    fn forest_params(&self) -> ForestParams {
        let defaults = ForestParams::default();
        ForestParams {
            n_estimators: self.trees.unwrap_or(defaults.n_estimators),
            random_state: self.seed.unwrap_or(defaults.random_state),
            ..defaults
        }
    }

    fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }

    fn test_size(&self) -> f64 {
        self.test_size.unwrap_or(DEFAULT_TEST_SIZE)
    }

    fn handle_unknown(&self) -> HandleUnknown {
        HandleUnknown::Error
    }

    fn advisory_path(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitor
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("dataset", self.dataset_path())?;
        validation::validate_file_extensions("dataset", &[self.dataset_path().to_string()], &["csv"])?;
        if let Some(host) = &self.host {
            validation::validate_host("host", host)?;
        }
        validation::validate_range("threshold", self.threshold(), 0.0, 100.0)?;
        validation::validate_positive_number("trees", self.forest_params().n_estimators, 1)?;
        validation::validate_range("test_size", self.test_size(), 0.0, f64::INFINITY)?;
        if let Some(path) = &self.advisory {
            validation::validate_file_extensions("advisory", &[path.clone()], &["toml"])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.dataset_path(), DEFAULT_DATASET_PATH);
        assert_eq!(config.bind_address(), "127.0.0.1:5000");
        assert_eq!(config.threshold(), 50.0);
        assert_eq!(config.test_size(), 1.0);
        assert_eq!(config.forest_params(), ForestParams::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config = CliConfig {
            dataset: Some("data/weather.csv".to_string()),
            port: Some(8080),
            trees: Some(10),
            seed: Some(7),
            ..CliConfig::default()
        };
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.forest_params().n_estimators, 10);
        assert_eq!(config.forest_params().random_state, 7);
    }

    #[test]
    fn test_cli_validation_failures() {
        let bad_threshold = CliConfig {
            threshold: Some(150.0),
            ..CliConfig::default()
        };
        assert!(bad_threshold.validate().is_err());

        let bad_dataset = CliConfig {
            dataset: Some("weather.json".to_string()),
            ..CliConfig::default()
        };
        assert!(bad_dataset.validate().is_err());

        let no_trees = CliConfig {
            trees: Some(0),
            ..CliConfig::default()
        };
        assert!(no_trees.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_parse_arguments() {
        let config = CliConfig::parse_from([
            "pest-predictor",
            "--dataset",
            "weather.csv",
            "--port",
            "9000",
            "--threshold",
            "65",
            "--verbose",
        ]);
        assert_eq!(config.dataset_path(), "weather.csv");
        assert_eq!(config.port, Some(9000));
        assert_eq!(config.threshold(), 65.0);
        assert!(config.verbose);
        assert!(!config.dry_run);
    }
}
