use super::{
    validate_settings, DEFAULT_COUNTRY_CODE, DEFAULT_DISTRICTS_CSV, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_WEATHER_ENDPOINT, DEFAULT_WEATHER_TIMEOUT_SECONDS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CropApiError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub weather: WeatherConfig,
    pub model: Option<ModelConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    pub districts_csv: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub country_code: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub crop_profiles: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CropApiError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CropApiError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OPENWEATHER_API_KEY})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CropApiError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn host(&self) -> &str {
        self.server.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    fn port(&self) -> u16 {
        self.server.port.unwrap_or(DEFAULT_PORT)
    }

    fn districts_csv(&self) -> &str {
        self.data
            .districts_csv
            .as_deref()
            .unwrap_or(DEFAULT_DISTRICTS_CSV)
    }

    fn weather_endpoint(&self) -> &str {
        self.weather
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_WEATHER_ENDPOINT)
    }

    /// 空字串或沒被替換的 `${VAR}` 視為未設定
    fn weather_api_key(&self) -> Option<&str> {
        self.weather
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty() && !k.starts_with("${"))
    }

    fn country_code(&self) -> &str {
        self.weather
            .country_code
            .as_deref()
            .unwrap_or(DEFAULT_COUNTRY_CODE)
    }

    fn weather_timeout_seconds(&self) -> u64 {
        self.weather
            .timeout_seconds
            .unwrap_or(DEFAULT_WEATHER_TIMEOUT_SECONDS)
    }

    fn crop_profiles(&self) -> Option<&str> {
        self.model.as_ref().and_then(|m| m.crop_profiles.as_deref())
    }

    fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8000

[data]
districts_csv = "data/WestBengalCrops.csv"

[weather]
endpoint = "https://weather.example.com/current"
api_key = "secret"
country_code = "IN"
timeout_seconds = 5

[model]
crop_profiles = "crop_profiles.toml"

[logging]
verbose = true
json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.districts_csv(), "data/WestBengalCrops.csv");
        assert_eq!(config.weather_endpoint(), "https://weather.example.com/current");
        assert_eq!(config.weather_api_key(), Some("secret"));
        assert_eq!(config.weather_timeout_seconds(), 5);
        assert_eq!(config.crop_profiles(), Some("crop_profiles.toml"));
        assert!(config.verbose());
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:7860");
        assert_eq!(config.districts_csv(), "WestBengalCrops.csv");
        assert_eq!(config.weather_endpoint(), DEFAULT_WEATHER_ENDPOINT);
        assert_eq!(config.country_code(), "IN");
        assert!(config.weather_api_key().is_none());
        assert!(!config.verbose());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CROP_API_TEST_WEATHER_KEY", "from-env");

        let toml_content = r#"
[weather]
api_key = "${CROP_API_TEST_WEATHER_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.weather_api_key(), Some("from-env"));

        std::env::remove_var("CROP_API_TEST_WEATHER_KEY");
    }

    #[test]
    fn test_unset_env_var_means_no_api_key() {
        let toml_content = r#"
[weather]
api_key = "${CROP_API_TEST_DEFINITELY_UNSET}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.weather_api_key().is_none());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[weather]
endpoint = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let bad_port = TomlConfig::from_toml_str("[server]\nport = 0\n").unwrap();
        assert!(bad_port.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[data]
districts_csv = "districts.csv"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.districts_csv(), "districts.csv");
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = TomlConfig::from_toml_str(include_str!("../../crop-yield.example.toml")).unwrap();
        assert_eq!(config.port(), 7860);
        assert!(config.crop_profiles().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_toml_is_rejected() {
        assert!(TomlConfig::from_toml_str("[server\nport = ").is_err());
    }
}
