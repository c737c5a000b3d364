use anyhow::Context;
use clap::Parser;
use pest_predictor::core::dataset::Dataset;
use pest_predictor::core::{ConfigProvider, HandleUnknown};
use pest_predictor::utils::{logger, validation::Validate};
use pest_predictor::{CliConfig, PestPipeline, TomlConfig};

#[derive(Parser)]
#[command(name = "evaluate")]
#[command(about = "Train the pest model on a holdout split and report its quality")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Training dataset (CSV), overrides the configuration
    #[arg(long)]
    dataset: Option<String>,

    /// Holdout rows (>= 1) or fraction (< 1); defaults to the config, then 0.2
    #[arg(long)]
    test_size: Option<f64>,

    #[arg(long)]
    trees: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

/// 未指定保留集大小時的預設比例
const DEFAULT_EVAL_TEST_SIZE: f64 = 0.2;

/// 命令列優先，其次是配置檔的 [dataset] test_size
fn holdout_size(cli: Option<f64>, configured: Option<f64>) -> f64 {
    cli.or(configured).unwrap_or(DEFAULT_EVAL_TEST_SIZE)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let overrides = CliConfig {
        dataset: args.dataset.clone(),
        trees: args.trees,
        seed: args.seed,
        test_size: args.test_size,
        ..CliConfig::default()
    };

    let (dataset_path, params, threshold, test_size) = match &args.config {
        Some(path) => {
            let mut config = TomlConfig::from_file(path)
                .with_context(|| format!("loading config file '{}'", path))?;
            config.apply_overrides(&overrides);
            config.validate()?;
            (
                config.dataset_path().to_string(),
                config.forest_params(),
                config.threshold(),
                holdout_size(args.test_size, config.dataset.test_size),
            )
        }
        None => {
            overrides.validate()?;
            (
                overrides.dataset_path().to_string(),
                overrides.forest_params(),
                overrides.threshold(),
                holdout_size(args.test_size, None),
            )
        }
    };

    let bytes = std::fs::read(&dataset_path)
        .with_context(|| format!("reading dataset '{}'", dataset_path))?;
    let dataset = Dataset::from_csv_bytes(&bytes)?;
    let (train, test) = dataset.split(test_size, params.random_state)?;

    tracing::info!(
        "🌲 Training {} trees on {} rows, scoring {} rows",
        params.n_estimators,
        train.len(),
        test.len()
    );

    // 評估時未見過的作物不中斷，直接以全零編碼
    let mut pipeline = PestPipeline::random_forest(params, HandleUnknown::Ignore);
    pipeline.fit(&train)?;
    let metrics = pipeline.evaluate(&test, threshold);

    let importances: Vec<(String, f64)> = pipeline
        .encoder()
        .feature_names()
        .into_iter()
        .zip(pipeline.classifier().feature_importances())
        .collect();

    if args.json {
        let report = serde_json::json!({
            "train_rows": train.len(),
            "test_rows": test.len(),
            "threshold": threshold,
            "accuracy": metrics.map(|m| m.accuracy),
            "precision": metrics.and_then(|m| m.precision),
            "feature_importances": importances
                .iter()
                .map(|(name, value)| serde_json::json!({ "feature": name, "importance": value }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📋 Evaluation Report:");
    println!("  Training rows: {}", train.len());
    println!("  Holdout rows: {}", test.len());
    println!("  Threshold: {}%", threshold);
    match metrics {
        Some(m) => {
            println!("  Accuracy: {:.3}", m.accuracy);
            match m.precision {
                Some(p) => println!("  Precision: {:.3}", p),
                None => println!("  Precision: n/a (no positive predictions)"),
            }
        }
        None => println!("  No holdout rows to score"),
    }

    println!();
    println!("🔎 Feature importances:");
    let mut sorted = importances;
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, value) in sorted {
        println!("  {:<24} {:.4}", name, value);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holdout_size_precedence() {
        assert_eq!(holdout_size(Some(5.0), Some(0.3)), 5.0);
        assert_eq!(holdout_size(None, Some(0.3)), 0.3);
        assert_eq!(holdout_size(None, None), DEFAULT_EVAL_TEST_SIZE);
    }

    #[test]
    fn test_config_test_size_reaches_holdout() {
        let mut config = TomlConfig::from_toml_str("[dataset]\npath = \"weather.csv\"\ntest_size = 0.4\n").unwrap();
        config.apply_overrides(&CliConfig::default());
        assert_eq!(holdout_size(None, config.dataset.test_size), 0.4);
    }
}
