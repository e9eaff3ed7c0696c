use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 地區資料的一列：欄位名稱 -> 純量值，保留 CSV 的欄位順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictRecord {
    pub data: Map<String, Value>,
}

impl DistrictRecord {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

/// 經過驗證與正規化的預測請求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub crop: String,
    pub region: String,
    pub nitrogen: f64,
    pub phosphorous: f64,
    pub potassium: f64,
    pub ph: f64,
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// °C
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// mm, last hour
    pub rainfall: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionEstimate {
    pub crop: String,
    pub region: String,
    pub area: f64,
    pub yield_per_hectare: f64,
    pub predicted_production: f64,
    pub unit: String,
    pub suitability: f64,
}

/// `/predict` 成功時的回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub weather: WeatherReport,
    pub prediction: ProductionEstimate,
}
