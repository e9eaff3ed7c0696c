use super::{
    validate_settings, DEFAULT_COUNTRY_CODE, DEFAULT_DISTRICTS_CSV, DEFAULT_HOST,
    DEFAULT_WEATHER_ENDPOINT,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "crop-yield-api")]
#[command(about = "HTTP API for crop yield prediction and district data")]
pub struct CliConfig {
    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    #[arg(long, default_value = "7860")]
    pub port: u16,

    #[arg(long, default_value = DEFAULT_DISTRICTS_CSV)]
    pub districts_csv: String,

    #[arg(long, default_value = DEFAULT_WEATHER_ENDPOINT)]
    pub weather_endpoint: String,

    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    #[serde(skip_serializing)]
    pub weather_api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_COUNTRY_CODE)]
    pub country_code: String,

    #[arg(long, default_value = "10")]
    pub weather_timeout_seconds: u64,

    #[arg(long, help = "TOML file with crop profiles (built-in profiles when omitted)")]
    pub crop_profiles: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl ConfigProvider for CliConfig {
    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn districts_csv(&self) -> &str {
        &self.districts_csv
    }

    fn weather_endpoint(&self) -> &str {
        &self.weather_endpoint
    }

    fn weather_api_key(&self) -> Option<&str> {
        self.weather_api_key.as_deref().filter(|k| !k.is_empty())
    }

    fn country_code(&self) -> &str {
        &self.country_code
    }

    fn weather_timeout_seconds(&self) -> u64 {
        self.weather_timeout_seconds
    }

    fn crop_profiles(&self) -> Option<&str> {
        self.crop_profiles.as_deref()
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn json_logs(&self) -> bool {
        self.json_logs
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::parse_from(["crop-yield-api"]);
        assert_eq!(config.port(), 7860);
        assert_eq!(config.bind_address(), "127.0.0.1:7860");
        assert_eq!(config.districts_csv(), "WestBengalCrops.csv");
        assert_eq!(config.country_code(), "IN");
        assert!(config.crop_profiles().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = CliConfig::parse_from([
            "crop-yield-api",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--weather-api-key",
            "abc123",
            "--crop-profiles",
            "profiles.toml",
        ]);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.weather_api_key(), Some("abc123"));
        assert_eq!(config.crop_profiles(), Some("profiles.toml"));
    }

    #[test]
    fn test_invalid_endpoint_fails_validation() {
        let config = CliConfig::parse_from([
            "crop-yield-api",
            "--weather-endpoint",
            "not a url",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = CliConfig::parse_from(["crop-yield-api", "--weather-timeout-seconds", "0"]);
        assert!(config.validate().is_err());
    }
}
