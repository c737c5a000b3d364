use crate::core::dataset::Dataset;
use crate::core::encoder::FeatureEncoder;
use crate::core::forest::RandomForest;
use crate::core::{Classifier, CropFeatures, ForestParams, HandleUnknown};
use crate::utils::error::{PestError, Result};

/// 正類 (有蟲害) 在 predict_proba 輸出中的位置
pub const POSITIVE_CLASS: usize = 1;

/// 前處理 + 分類器，啟動時訓練一次
#[derive(Debug, Clone)]
pub struct PestPipeline<C: Classifier = RandomForest> {
    encoder: FeatureEncoder,
    classifier: C,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutMetrics {
    pub accuracy: f64,
    /// 沒有任何正類預測時為 None
    pub precision: Option<f64>,
}

impl PestPipeline<RandomForest> {
    pub fn random_forest(params: ForestParams, handle_unknown: HandleUnknown) -> Self {
        Self::new(FeatureEncoder::new(handle_unknown), RandomForest::new(params))
    }
}

impl<C: Classifier> PestPipeline<C> {
    pub fn new(encoder: FeatureEncoder, classifier: C) -> Self {
        Self {
            encoder,
            classifier,
        }
    }

    pub fn fit(&mut self, train: &Dataset) -> Result<()> {
        if train.is_empty() {
            return Err(PestError::TrainingError {
                message: "training set is empty".to_string(),
            });
        }
        self.encoder.fit(train.rows())?;
        let features = self.encoder.transform_all(train.rows())?;
        self.classifier.fit(&features, &train.targets())
    }

    pub fn transform<R: CropFeatures>(&self, row: &R) -> Result<Vec<f64>> {
        self.encoder.transform(row)
    }

    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        self.classifier.predict_proba(features)
    }

    /// 正類機率乘 100
    pub fn likelihood<R: CropFeatures>(&self, row: &R) -> Result<f64> {
        let features = self.transform(row)?;
        let proba = self.predict_proba(&features);
        let positive = proba.get(POSITIVE_CLASS).copied().unwrap_or(0.0);
        Ok(positive * 100.0)
    }

    /// 保留集上的 accuracy / precision；類別未見過的列以 0 機率處理
    pub fn evaluate(&self, test: &Dataset, threshold: f64) -> Option<HoldoutMetrics> {
        if test.is_empty() {
            return None;
        }

        let mut correct = 0usize;
        let mut true_positive = 0usize;
        let mut predicted_positive = 0usize;

        for row in test.rows() {
            let likelihood = match self.likelihood(row) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("⚠️ Holdout row skipped in scoring: {}", e);
                    0.0
                }
            };
            let predicted = usize::from(likelihood > threshold);
            let actual = row.pest_infestation as usize;

            if predicted == actual {
                correct += 1;
            }
            if predicted == POSITIVE_CLASS {
                predicted_positive += 1;
                if actual == POSITIVE_CLASS {
                    true_positive += 1;
                }
            }
        }

        Some(HoldoutMetrics {
            accuracy: correct as f64 / test.len() as f64,
            precision: (predicted_positive > 0)
                .then(|| true_positive as f64 / predicted_positive as f64),
        })
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FeatureRecord, WeatherObservation};
    use chrono::NaiveDate;

    fn observation(crop: &str, temperature: f64, humidity: f64, label: u8) -> WeatherObservation {
        WeatherObservation {
            log_id: None,
            date: None,
            temperature,
            humidity,
            rainfall: 5.0,
            wind_speed: 3.0,
            crop_type: crop.to_string(),
            soil_moisture: 30.0,
            pest_infestation: label,
        }
    }

    fn dataset() -> Dataset {
        let mut rows = Vec::new();
        for i in 0..30 {
            let offset = i as f64 * 0.1;
            rows.push(observation("maize", 32.0 + offset, 85.0, 1));
            rows.push(observation("wheat", 12.0 + offset, 30.0, 0));
        }
        Dataset::new(rows)
    }

    fn record(crop: &str, temperature: f64, humidity: f64) -> FeatureRecord {
        FeatureRecord {
            crop_type: crop.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            temperature,
            humidity,
            rainfall: 5.0,
            wind_speed: 3.0,
            soil_moisture: 30.0,
        }
    }

    fn fitted() -> PestPipeline {
        let mut pipeline = PestPipeline::random_forest(
            ForestParams {
                n_estimators: 30,
                ..ForestParams::default()
            },
            HandleUnknown::Error,
        );
        pipeline.fit(&dataset()).unwrap();
        pipeline
    }

    #[test]
    fn test_likelihood_reflects_training_signal() {
        let pipeline = fitted();
        let high = pipeline.likelihood(&record("maize", 33.0, 85.0)).unwrap();
        let low = pipeline.likelihood(&record("wheat", 12.5, 30.0)).unwrap();
        assert!(high > 90.0, "high likelihood was {}", high);
        assert!(low < 10.0, "low likelihood was {}", low);
        assert!((0.0..=100.0).contains(&high));
    }

    #[test]
    fn test_unknown_crop_is_an_error() {
        let pipeline = fitted();
        assert!(matches!(
            pipeline.likelihood(&record("rice", 30.0, 80.0)),
            Err(PestError::UnknownCategoryError { .. })
        ));
    }

    #[test]
    fn test_evaluate_on_holdout() {
        let pipeline = fitted();
        let test = Dataset::new(vec![
            observation("maize", 33.5, 85.0, 1),
            observation("wheat", 13.0, 30.0, 0),
        ]);
        let metrics = pipeline.evaluate(&test, 50.0).unwrap();
        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, Some(1.0));

        assert!(pipeline.evaluate(&Dataset::default(), 50.0).is_none());
    }

    #[test]
    fn test_fit_rejects_empty_training_set() {
        let mut pipeline = PestPipeline::random_forest(ForestParams::default(), HandleUnknown::Error);
        assert!(pipeline.fit(&Dataset::default()).is_err());
    }
}
