use crate::domain::model::{PredictionRequest, ProductionEstimate, WeatherReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 天氣查詢。查無資料時回傳 `Ok(None)`。
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(&self, region: &str) -> Result<Option<WeatherReport>>;
}

pub trait YieldPredictor: Send + Sync {
    fn predict_production(
        &self,
        request: &PredictionRequest,
        weather: &WeatherReport,
    ) -> Result<ProductionEstimate>;
}

pub trait ConfigProvider: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn districts_csv(&self) -> &str;
    fn weather_endpoint(&self) -> &str;
    fn weather_api_key(&self) -> Option<&str>;
    fn country_code(&self) -> &str;
    fn weather_timeout_seconds(&self) -> u64;
    fn crop_profiles(&self) -> Option<&str>;
    fn verbose(&self) -> bool;
    fn json_logs(&self) -> bool;

    fn bind_address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}
