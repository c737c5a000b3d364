use crate::core::predictor::PestPredictor;
use crate::core::TrainingReport;
use std::sync::Arc;
use std::time::Instant;

/// 訓練完成後即不可變，handler 之間直接共用
pub struct AppState {
    pub predictor: PestPredictor,
    pub report: TrainingReport,
    started_at: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(predictor: PestPredictor, report: TrainingReport) -> Self {
        Self {
            predictor,
            report,
            started_at: Instant::now(),
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
