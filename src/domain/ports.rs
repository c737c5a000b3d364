use crate::domain::model::{ForestParams, HandleUnknown};
use crate::utils::error::Result;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &str;
    fn bind_address(&self) -> String;
    fn forest_params(&self) -> ForestParams;
    fn threshold(&self) -> f64;
    fn test_size(&self) -> f64;
    fn handle_unknown(&self) -> HandleUnknown;
    fn advisory_path(&self) -> Option<&str>;
    fn monitoring_enabled(&self) -> bool;
}

/// 輸出各類別機率的分類器
pub trait Classifier: Send + Sync {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[usize]) -> Result<()>;
    fn predict_proba(&self, features: &[f64]) -> Vec<f64>;
    fn n_classes(&self) -> usize;

    fn predict(&self, features: &[f64]) -> usize {
        self.predict_proba(features)
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (class, &p)| if p > best.1 { (class, p) } else { best })
            .0
    }
}
