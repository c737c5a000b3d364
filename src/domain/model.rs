use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 訓練資料集中的一列觀測值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    #[serde(default)]
    pub log_id: Option<u64>,
    #[serde(default)]
    pub date: Option<String>,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub crop_type: String,
    pub soil_moisture: f64,
    pub pest_infestation: u8,
}

/// 從表單收集、送進模型的一筆特徵
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeatureRecord {
    pub crop_type: String,
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub soil_moisture: f64,
}

/// 與 WeatherObservation / FeatureRecord 共用的欄位存取
pub trait CropFeatures {
    fn crop_type(&self) -> &str;
    fn numeric_features(&self) -> [f64; 5];
}

/// 數值欄位依此順序接在 one-hot 區塊之後
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "temperature",
    "humidity",
    "rainfall",
    "wind_speed",
    "soil_moisture",
];

impl CropFeatures for WeatherObservation {
    fn crop_type(&self) -> &str {
        &self.crop_type
    }

    fn numeric_features(&self) -> [f64; 5] {
        [
            self.temperature,
            self.humidity,
            self.rainfall,
            self.wind_speed,
            self.soil_moisture,
        ]
    }
}

impl CropFeatures for FeatureRecord {
    fn crop_type(&self) -> &str {
        &self.crop_type
    }

    fn numeric_features(&self) -> [f64; 5] {
        [
            self.temperature,
            self.humidity,
            self.rainfall,
            self.wind_speed,
            self.soil_moisture,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    /// 可能性嚴格大於門檻才算 HIGH
    pub fn from_likelihood(likelihood: f64, threshold: f64) -> Self {
        if likelihood > threshold {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Low => "LOW",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisorySection {
    pub title: String,
    pub entries: Vec<AdvisoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvisoryEntry {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropAdvisory {
    pub pests: Vec<String>,
    #[serde(default)]
    pub sections: Vec<AdvisorySection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub likelihood: f64,
    pub risk: RiskLevel,
    pub advisory: Option<CropAdvisory>,
    pub input: FeatureRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub categories: Vec<String>,
    pub n_trees: usize,
    pub accuracy: Option<f64>,
    pub precision: Option<f64>,
}

/// 預測時遇到訓練集沒看過的作物類別的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    All,
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            random_state: 42,
        }
    }
}
