#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url,
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_DISTRICTS_CSV: &str = "WestBengalCrops.csv";
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_COUNTRY_CODE: &str = "IN";
pub const DEFAULT_WEATHER_TIMEOUT_SECONDS: u64 = 10;

/// CLI 與 TOML 共用的設定檢查
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_non_empty_string("server.host", config.host())?;
    validate_range("server.port", config.port(), 1, u16::MAX)?;
    validate_path("data.districts_csv", config.districts_csv())?;
    validate_url("weather.endpoint", config.weather_endpoint())?;
    validate_range(
        "weather.timeout_seconds",
        config.weather_timeout_seconds(),
        1,
        300,
    )?;

    if let Some(path) = config.crop_profiles() {
        validate_path("model.crop_profiles", path)?;
    }

    Ok(())
}
