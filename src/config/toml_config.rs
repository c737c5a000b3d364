use crate::config::{CliConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TEST_SIZE};
use crate::core::predictor::DEFAULT_THRESHOLD;
use crate::core::{ConfigProvider, ForestParams, HandleUnknown, MaxFeatures};
use crate::utils::error::{PestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub model: ModelConfig,
    pub prediction: Option<PredictionConfig>,
    pub advisory: Option<AdvisoryConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: String,
    pub test_size: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub n_estimators: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
    pub min_samples_leaf: Option<usize>,
    pub max_features: Option<MaxFeatures>,
    pub bootstrap: Option<bool>,
    pub random_state: Option<u64>,
    pub handle_unknown: Option<HandleUnknown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PestError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PEST_DATA_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PestError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 命令列參數優先於檔案設定
    pub fn apply_overrides(&mut self, cli: &CliConfig) {
        if let Some(dataset) = &cli.dataset {
            self.dataset.path = dataset.clone();
        }
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(test_size) = cli.test_size {
            self.dataset.test_size = Some(test_size);
        }
        if let Some(trees) = cli.trees {
            self.model.n_estimators = Some(trees);
        }
        if let Some(seed) = cli.seed {
            self.model.random_state = Some(seed);
        }
        if let Some(threshold) = cli.threshold {
            self.prediction = Some(PredictionConfig {
                threshold: Some(threshold),
            });
        }
        if let Some(path) = &cli.advisory {
            self.advisory = Some(AdvisoryConfig {
                path: Some(path.clone()),
            });
        }
        if cli.monitor {
            let json_logs = self.monitoring.as_ref().and_then(|m| m.json_logs);
            self.monitoring = Some(MonitoringConfig {
                enabled: true,
                json_logs,
            });
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_host("server.host", &self.server.host)?;

        if self.dataset.path.trim().is_empty() {
            return Err(PestError::MissingConfigError {
                field: "dataset.path".to_string(),
            });
        }
        validation::validate_path("dataset.path", &self.dataset.path)?;
        validation::validate_file_extensions("dataset.path", &[self.dataset.path.clone()], &["csv"])?;
        validation::validate_range("dataset.test_size", self.test_size(), 0.0, f64::INFINITY)?;

        let params = self.forest_params();
        validation::validate_positive_number("model.n_estimators", params.n_estimators, 1)?;
        validation::validate_positive_number("model.min_samples_split", params.min_samples_split, 2)?;
        validation::validate_positive_number("model.min_samples_leaf", params.min_samples_leaf, 1)?;
        if let Some(depth) = params.max_depth {
            validation::validate_positive_number("model.max_depth", depth, 1)?;
        }

        validation::validate_range("prediction.threshold", self.threshold(), 0.0, 100.0)?;

        if let Some(path) = self.advisory_path() {
            validation::validate_path("advisory.path", path)?;
            validation::validate_file_extensions("advisory.path", &[path.to_string()], &["toml"])?;
        }

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn dataset_path(&self) -> &str {
        &self.dataset.path
    }

    fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn forest_params(&self) -> ForestParams {
        let defaults = ForestParams::default();
        let model = &self.model;
        ForestParams {
            n_estimators: model.n_estimators.unwrap_or(defaults.n_estimators),
            max_depth: model.max_depth.or(defaults.max_depth),
            min_samples_split: model.min_samples_split.unwrap_or(defaults.min_samples_split),
            min_samples_leaf: model.min_samples_leaf.unwrap_or(defaults.min_samples_leaf),
            max_features: model.max_features.unwrap_or(defaults.max_features),
            bootstrap: model.bootstrap.unwrap_or(defaults.bootstrap),
            random_state: model.random_state.unwrap_or(defaults.random_state),
        }
    }

    fn threshold(&self) -> f64 {
        self.prediction
            .as_ref()
            .and_then(|p| p.threshold)
            .unwrap_or(DEFAULT_THRESHOLD)
    }

    fn test_size(&self) -> f64 {
        self.dataset.test_size.unwrap_or(DEFAULT_TEST_SIZE)
    }

    fn handle_unknown(&self) -> HandleUnknown {
        self.model.handle_unknown.unwrap_or_default()
    }

    fn advisory_path(&self) -> Option<&str> {
        self.advisory.as_ref().and_then(|a| a.path.as_deref())
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
