use crate::core::advisory::AdvisoryCatalog;
use crate::core::dataset::Dataset;
use crate::core::pipeline::PestPipeline;
use crate::core::predictor::PestPredictor;
use crate::core::{ConfigProvider, Storage, TrainingReport};
use crate::utils::error::{PestError, Result};
use crate::utils::monitor::ResourceMonitor;

/// 載入資料 → 切分 → 訓練 → 評估，產出可供請求使用的 predictor
pub struct TrainingEngine<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    monitor: ResourceMonitor,
}

impl<S: Storage, C: ConfigProvider> TrainingEngine<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::new_with_monitoring(storage, config, false)
    }

    pub fn new_with_monitoring(storage: S, config: C, monitor_enabled: bool) -> Self {
        Self {
            storage,
            config,
            monitor: ResourceMonitor::new(monitor_enabled),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub async fn load_dataset(&self) -> Result<Dataset> {
        let path = self.config.dataset_path();
        tracing::debug!("Reading dataset from: {}", path);
        let bytes = self.storage.read_file(path).await?;
        Dataset::from_csv_bytes(&bytes)
    }

    pub async fn load_catalog(&self) -> Result<AdvisoryCatalog> {
        match self.config.advisory_path() {
            Some(path) => {
                tracing::debug!("Reading advisory catalog from: {}", path);
                let bytes = self.storage.read_file(path).await?;
                let content = String::from_utf8(bytes).map_err(|e| PestError::ConfigError {
                    message: format!("advisory file '{}' is not UTF-8: {}", path, e),
                })?;
                AdvisoryCatalog::from_toml_str(&content)
            }
            None => Ok(AdvisoryCatalog::builtin()),
        }
    }

    pub async fn run(&self) -> Result<(PestPredictor, TrainingReport)> {
        tracing::info!("🌱 Loading training data...");
        let dataset = self.load_dataset().await?;
        tracing::info!("Loaded {} observations", dataset.len());
        self.monitor.log_stage("Load");

        let params = self.config.forest_params();
        let (train, test) = dataset.split(self.config.test_size(), params.random_state)?;
        let (train_rows, test_rows) = (train.len(), test.len());
        tracing::info!(
            "Split into {} training and {} holdout rows",
            train_rows,
            test_rows
        );

        tracing::info!("🌲 Training random forest ({} trees)...", params.n_estimators);
        let handle_unknown = self.config.handle_unknown();
        let threshold = self.config.threshold();
        let (pipeline, metrics) = tokio::task::spawn_blocking(move || {
            let mut pipeline = PestPipeline::random_forest(params, handle_unknown);
            pipeline.fit(&train)?;
            let metrics = pipeline.evaluate(&test, threshold);
            Ok::<_, PestError>((pipeline, metrics))
        })
        .await
        .map_err(|e| PestError::TrainingError {
            message: format!("training task failed: {}", e),
        })??;
        self.monitor.log_stage("Fit");

        let catalog = self.load_catalog().await?;
        tracing::info!("Advisory catalog covers {} crops", catalog.len());

        let report = TrainingReport {
            train_rows,
            test_rows,
            categories: pipeline.encoder().categories().to_vec(),
            n_trees: pipeline.classifier().n_trees(),
            accuracy: metrics.map(|m| m.accuracy),
            precision: metrics.and_then(|m| m.precision),
        };

        match (report.accuracy, report.precision) {
            (Some(accuracy), Some(precision)) => tracing::info!(
                "✅ Model ready - holdout accuracy {:.3}, precision {:.3}",
                accuracy,
                precision
            ),
            (Some(accuracy), None) => tracing::info!(
                "✅ Model ready - holdout accuracy {:.3}, no positive predictions",
                accuracy
            ),
            _ => tracing::info!("✅ Model ready - no holdout rows to score"),
        }

        Ok((PestPredictor::new(pipeline, catalog, threshold), report))
    }
}
