use clap::Parser;
use crop_yield_api::core::ConfigProvider;
use crop_yield_api::utils::{logger, validation::Validate};
use crop_yield_api::{ApiEngine, CliConfig, TomlConfig};

fn init_logging<C: ConfigProvider>(config: &C) {
    if config.json_logs() {
        logger::init_json_logger(config.verbose());
    } else {
        logger::init_logger(config.verbose());
    }
}

async fn run<C: ConfigProvider + Validate>(config: C) -> anyhow::Result<()> {
    init_logging(&config);
    tracing::info!("Starting crop-yield-api");
    tracing::debug!(
        "Settings: bind={} districts_csv={} weather_endpoint={} crop_profiles={:?}",
        config.bind_address(),
        config.districts_csv(),
        config.weather_endpoint(),
        config.crop_profiles()
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e.into());
    }

    let engine = ApiEngine::new(config);
    if let Err(e) = engine.run().await {
        tracing::error!("❌ Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let result = match cli.config.clone() {
        Some(path) => match TomlConfig::from_file(&path) {
            Ok(config) => run(config).await,
            Err(e) => Err(anyhow::anyhow!("failed to load config {}: {}", path, e)),
        },
        None => run(cli).await,
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
