use clap::Parser;
use pest_predictor::core::{ConfigProvider, Storage};
use pest_predictor::utils::{logger, validation::Validate};
use pest_predictor::{app, AppState, CliConfig, LocalStorage, PestError, TomlConfig, TrainingEngine};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.config.clone() {
        Some(path) => {
            // 載入 TOML 配置，再套用命令列覆蓋
            let mut config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            };
            config.apply_overrides(&cli);
            logger::init_logger(cli.verbose, cli.json_logs || config.json_logs());
            tracing::info!("📁 Loaded configuration from: {}", path);
            run(config, &cli).await
        }
        None => {
            logger::init_logger(cli.verbose, cli.json_logs);
            run(cli.clone(), &cli).await
        }
    }
}

async fn run<C: ConfigProvider + Validate>(config: C, cli: &CliConfig) -> anyhow::Result<()> {
    tracing::info!("🚀 Starting pest-predictor v{}", env!("CARGO_PKG_VERSION"));

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    display_config_summary(&config);

    let storage = LocalStorage::default();
    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the server will not be started");
        if !storage.exists(config.dataset_path()).await {
            eprintln!("❌ Dataset not found: {}", config.dataset_path());
            std::process::exit(1);
        }
        let engine = TrainingEngine::new(storage, config);
        perform_dry_run(&engine).await;
        return Ok(());
    }

    let bind_address = config.bind_address();
    let monitor_enabled = config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = TrainingEngine::new_with_monitoring(storage, config, monitor_enabled);
    let (predictor, report) = match engine.run().await {
        Ok(trained) => trained,
        Err(e) => exit_with(&e),
    };

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!("🌐 Serving on http://{}", listener.local_addr()?);
    println!(
        "✅ Model trained on {} rows, serving on http://{}",
        report.train_rows,
        listener.local_addr()?
    );

    app::serve(listener, AppState::new(predictor, report).shared()).await?;
    Ok(())
}

fn exit_with(e: &PestError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

fn display_config_summary<C: ConfigProvider>(config: &C) {
    let params = config.forest_params();
    println!("📋 Configuration Summary:");
    println!("  Dataset: {}", config.dataset_path());
    println!("  Listen: {}", config.bind_address());
    println!(
        "  Model: {} trees, max_features {:?}, seed {}",
        params.n_estimators, params.max_features, params.random_state
    );
    println!("  Threshold: {}%", config.threshold());
    println!("  Holdout: {}", config.test_size());
    println!(
        "  Advisory: {}",
        config.advisory_path().unwrap_or("built-in catalog")
    );
    println!();
}

async fn perform_dry_run<C: ConfigProvider>(engine: &TrainingEngine<LocalStorage, C>) {
    println!("🔍 Dry Run Analysis:");

    match engine.load_dataset().await {
        Ok(dataset) => {
            let positives = dataset.targets().iter().filter(|&&t| t == 1).count();
            println!("  📊 Rows: {} ({} with infestation)", dataset.len(), positives);
        }
        Err(e) => {
            println!("  ❌ Dataset: {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    match engine.load_catalog().await {
        Ok(catalog) => {
            let crops: Vec<&str> = catalog.crop_names().collect();
            println!("  📚 Advisory crops: {}", crops.join(", "));
        }
        Err(e) => {
            println!("  ❌ Advisory catalog: {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    println!();
    println!("✅ Dry run complete. Run without --dry-run to train and serve.");
}
