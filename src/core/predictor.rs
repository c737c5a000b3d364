use crate::core::advisory::AdvisoryCatalog;
use crate::core::pipeline::PestPipeline;
use crate::core::{FeatureRecord, Prediction, RiskLevel};
use crate::utils::error::Result;

pub const DEFAULT_THRESHOLD: f64 = 50.0;

/// 已訓練的 pipeline、門檻與建議目錄，請求期間唯讀共用
#[derive(Debug, Clone)]
pub struct PestPredictor {
    pipeline: PestPipeline,
    catalog: AdvisoryCatalog,
    threshold: f64,
}

impl PestPredictor {
    pub fn new(pipeline: PestPipeline, catalog: AdvisoryCatalog, threshold: f64) -> Self {
        Self {
            pipeline,
            catalog,
            threshold,
        }
    }

    pub fn assess(&self, record: FeatureRecord) -> Result<Prediction> {
        let likelihood = self.pipeline.likelihood(&record)?;
        let risk = RiskLevel::from_likelihood(likelihood, self.threshold);

        // 只有 HIGH 才附上建議；目錄沒有此作物時為空
        let advisory = match risk {
            RiskLevel::High => self.catalog.lookup(&record.crop_type).cloned(),
            RiskLevel::Low => None,
        };

        tracing::debug!(
            crop = %record.crop_type,
            likelihood,
            risk = %risk,
            "Assessed pest risk"
        );

        Ok(Prediction {
            likelihood,
            risk,
            advisory,
            input: record,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn pipeline(&self) -> &PestPipeline {
        &self.pipeline
    }

    pub fn catalog(&self) -> &AdvisoryCatalog {
        &self.catalog
    }

    /// 表單下拉選單用：模型認得的作物
    pub fn known_crops(&self) -> &[String] {
        self.pipeline.encoder().categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dataset::Dataset;
    use crate::core::{ForestParams, HandleUnknown, WeatherObservation};
    use chrono::NaiveDate;

    fn observation(crop: &str, humidity: f64, label: u8) -> WeatherObservation {
        WeatherObservation {
            log_id: None,
            date: None,
            temperature: 25.0,
            humidity,
            rainfall: 5.0,
            wind_speed: 3.0,
            crop_type: crop.to_string(),
            soil_moisture: 30.0,
            pest_infestation: label,
        }
    }

    fn predictor(threshold: f64) -> PestPredictor {
        let mut rows = Vec::new();
        for i in 0..20 {
            let jitter = i as f64 * 0.5;
            rows.push(observation("maize", 85.0 + jitter, 1));
            rows.push(observation("maize", 20.0 + jitter, 0));
            rows.push(observation("sorghum", 85.0 + jitter, 1));
        }
        let mut pipeline = PestPipeline::random_forest(
            ForestParams {
                n_estimators: 20,
                ..ForestParams::default()
            },
            HandleUnknown::Error,
        );
        pipeline.fit(&Dataset::new(rows)).unwrap();
        PestPredictor::new(pipeline, AdvisoryCatalog::builtin(), threshold)
    }

    fn record(crop: &str, humidity: f64) -> FeatureRecord {
        FeatureRecord {
            crop_type: crop.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            temperature: 25.0,
            humidity,
            rainfall: 5.0,
            wind_speed: 3.0,
            soil_moisture: 30.0,
        }
    }

    #[test]
    fn test_high_risk_includes_advisory() {
        let prediction = predictor(DEFAULT_THRESHOLD).assess(record("maize", 90.0)).unwrap();
        assert_eq!(prediction.risk, RiskLevel::High);
        assert!(prediction.likelihood > DEFAULT_THRESHOLD);
        let advisory = prediction.advisory.unwrap();
        assert_eq!(advisory.pests[0], "Armyworms");
    }

    #[test]
    fn test_low_risk_has_no_advisory() {
        let prediction = predictor(DEFAULT_THRESHOLD).assess(record("maize", 22.0)).unwrap();
        assert_eq!(prediction.risk, RiskLevel::Low);
        assert!(prediction.advisory.is_none());
        assert_eq!(prediction.input.humidity, 22.0);
    }

    #[test]
    fn test_high_risk_for_crop_without_advisory() {
        let prediction = predictor(DEFAULT_THRESHOLD).assess(record("sorghum", 90.0)).unwrap();
        assert_eq!(prediction.risk, RiskLevel::High);
        assert!(prediction.advisory.is_none());
    }

    #[test]
    fn test_threshold_of_hundred_never_high() {
        let prediction = predictor(100.0).assess(record("sorghum", 90.0)).unwrap();
        assert_eq!(prediction.risk, RiskLevel::Low);
    }

    #[test]
    fn test_known_crops() {
        assert_eq!(predictor(DEFAULT_THRESHOLD).known_crops(), ["maize", "sorghum"]);
    }
}
