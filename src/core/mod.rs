pub mod advisory;
pub mod dataset;
pub mod encoder;
pub mod engine;
pub mod forest;
pub mod pipeline;
pub mod predictor;
pub mod tree;

pub use crate::domain::model::{
    AdvisoryEntry, AdvisorySection, CropAdvisory, CropFeatures, FeatureRecord, ForestParams,
    HandleUnknown, MaxFeatures, Prediction, RiskLevel, TrainingReport, WeatherObservation,
    NUMERIC_COLUMNS,
};
pub use crate::domain::ports::{Classifier, ConfigProvider, Storage};
pub use crate::utils::error::Result;
