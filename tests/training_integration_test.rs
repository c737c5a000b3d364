use chrono::NaiveDate;
use pest_predictor::core::{FeatureRecord, RiskLevel};
use pest_predictor::utils::validation::Validate;
use pest_predictor::{CliConfig, LocalStorage, PestError, TomlConfig, TrainingEngine};
use tempfile::TempDir;

/// 溫度高於 28 度即有蟲害，其餘欄位固定
fn write_weather_csv(dir: &TempDir, name: &str) {
    let mut csv = String::from(
        "log_id,date,temperature,humidity,rainfall,wind_speed,crop_type,soil_moisture,pest_infestation\n",
    );
    for i in 0..40 {
        let crop = if i % 2 == 0 { "maize" } else { "Beans" };
        let temperature = if i < 20 { 10.0 + i as f64 * 0.5 } else { 30.0 + (i - 20) as f64 * 0.5 };
        let infested = u8::from(temperature > 28.0);
        csv.push_str(&format!(
            "{},2024-03-{:02},{},70,5,3,{},40,{}\n",
            i + 1,
            i % 28 + 1,
            temperature,
            crop,
            infested
        ));
    }
    std::fs::write(dir.path().join(name), csv).unwrap();
}

fn record(crop: &str, temperature: f64) -> FeatureRecord {
    FeatureRecord {
        crop_type: crop.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        temperature,
        humidity: 70.0,
        rainfall: 5.0,
        wind_speed: 3.0,
        soil_moisture: 40.0,
    }
}

#[tokio::test]
async fn test_train_from_cli_config() {
    let temp_dir = TempDir::new().unwrap();
    write_weather_csv(&temp_dir, "weather.csv");

    let config = CliConfig {
        dataset: Some("weather.csv".to_string()),
        trees: Some(15),
        ..CliConfig::default()
    };
    assert!(config.validate().is_ok());

    let engine = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config);
    let (predictor, report) = engine.run().await.unwrap();

    // 預設保留一筆做驗證
    assert_eq!(report.train_rows, 39);
    assert_eq!(report.test_rows, 1);
    assert_eq!(report.n_trees, 15);
    assert_eq!(report.categories, vec!["beans", "maize"]);
    assert!(report.accuracy.is_some());

    let hot = predictor.assess(record("maize", 38.0)).unwrap();
    assert_eq!(hot.risk, RiskLevel::High);
    assert!(hot.likelihood > 50.0);
    let advisory = hot.advisory.expect("maize has built-in advice");
    assert!(advisory.pests.contains(&"Armyworms".to_string()));

    let cold = predictor.assess(record("BEANS", 11.0)).unwrap();
    assert_eq!(cold.risk, RiskLevel::Low);
    assert!(cold.advisory.is_none());
}

#[tokio::test]
async fn test_unknown_crop_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    write_weather_csv(&temp_dir, "weather.csv");

    let config = CliConfig {
        dataset: Some("weather.csv".to_string()),
        trees: Some(5),
        ..CliConfig::default()
    };
    let engine = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config);
    let (predictor, _) = engine.run().await.unwrap();

    let err = predictor.assess(record("rice", 35.0)).unwrap_err();
    assert!(matches!(err, PestError::UnknownCategoryError { ref value, .. } if value == "rice"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn test_missing_dataset_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = CliConfig {
        dataset: Some("missing.csv".to_string()),
        ..CliConfig::default()
    };

    let engine = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config);
    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, PestError::IoError(_)));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_toml_config_with_custom_advisory() {
    let temp_dir = TempDir::new().unwrap();
    write_weather_csv(&temp_dir, "weather.csv");

    std::fs::write(
        temp_dir.path().join("advice.toml"),
        r#"
[crops.Maize]
pests = ["Fall armyworm"]

[[crops.Maize.sections]]
title = "Scouting"
entries = [{ label = "Weekly", text = "Check twenty plants in a W pattern" }]
"#,
    )
    .unwrap();

    let config = TomlConfig::from_toml_str(
        r#"
[dataset]
path = "weather.csv"
test_size = 0.25

[model]
n_estimators = 12
random_state = 7
max_features = "all"

[prediction]
threshold = 60.0

[advisory]
path = "advice.toml"
"#,
    )
    .unwrap();
    assert!(config.validate().is_ok());

    let engine = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config);
    let (predictor, report) = engine.run().await.unwrap();
    assert_eq!(report.test_rows, 10);
    assert_eq!(report.train_rows, 30);
    assert_eq!(report.n_trees, 12);
    assert_eq!(predictor.threshold(), 60.0);

    let hot = predictor.assess(record("maize", 39.0)).unwrap();
    assert_eq!(hot.risk, RiskLevel::High);
    assert_eq!(hot.advisory.unwrap().pests, vec!["Fall armyworm"]);

    // 自訂目錄沒有 beans，高風險時也不附建議
    let hot_beans = predictor.assess(record("beans", 39.0)).unwrap();
    assert_eq!(hot_beans.risk, RiskLevel::High);
    assert!(hot_beans.advisory.is_none());
}

#[tokio::test]
async fn test_training_is_deterministic_for_seed() {
    let temp_dir = TempDir::new().unwrap();
    write_weather_csv(&temp_dir, "weather.csv");

    let config = CliConfig {
        dataset: Some("weather.csv".to_string()),
        trees: Some(10),
        seed: Some(3),
        ..CliConfig::default()
    };

    let first = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config.clone());
    let second = TrainingEngine::new(LocalStorage::new(temp_dir.path()), config);
    let (a, _) = first.run().await.unwrap();
    let (b, _) = second.run().await.unwrap();

    for temperature in [12.0, 27.0, 29.0, 36.0] {
        let pa = a.assess(record("maize", temperature)).unwrap();
        let pb = b.assess(record("maize", temperature)).unwrap();
        assert_eq!(pa.likelihood, pb.likelihood);
    }
}
