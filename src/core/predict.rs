use crate::domain::model::{PredictionOutcome, PredictionRequest};
use crate::domain::ports::{WeatherProvider, YieldPredictor};
use crate::utils::error::{CropApiError, Result};
use crate::utils::validation::{normalize_crop, normalize_region};
use serde_json::{Map, Value};
use std::sync::Arc;

/// `/predict` 必要欄位，依檢查順序排列
pub const REQUIRED_FIELDS: [&str; 7] = [
    "crop",
    "region",
    "nitrogen",
    "phosphorous",
    "potassium",
    "ph",
    "area",
];

/// 依欄位順序逐一檢查、正規化並轉型；遇到第一個錯誤即停止
pub fn parse_prediction_request(body: &Value) -> Result<PredictionRequest> {
    let fields = body.as_object().ok_or(CropApiError::InvalidBody)?;

    let crop = normalize_crop(require_str(fields, "crop")?);
    let region = normalize_region(require_str(fields, "region")?);
    let nitrogen = require_number(fields, "nitrogen")?;
    let phosphorous = require_number(fields, "phosphorous")?;
    let potassium = require_number(fields, "potassium")?;
    let ph = require_number(fields, "ph")?;
    let area = require_number(fields, "area")?;

    Ok(PredictionRequest {
        crop,
        region,
        nitrogen,
        phosphorous,
        potassium,
        ph,
        area,
    })
}

fn require_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| CropApiError::missing_field(name))
}

fn require_str<'a>(fields: &'a Map<String, Value>, name: &str) -> Result<&'a str> {
    require_field(fields, name)?
        .as_str()
        .ok_or_else(|| CropApiError::invalid_field(name, "a string"))
}

/// 數值欄位可以是 JSON 數字或可解析的數字字串（表單送來的多半是字串）
fn require_number(fields: &Map<String, Value>, name: &str) -> Result<f64> {
    let parsed = match require_field(fields, name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| CropApiError::invalid_field(name, "a number"))
}

/// 預測流程：驗證輸入 -> 查天氣 -> 跑模型
#[derive(Clone)]
pub struct PredictionService {
    weather: Arc<dyn WeatherProvider>,
    predictor: Arc<dyn YieldPredictor>,
}

impl PredictionService {
    pub fn new(weather: Arc<dyn WeatherProvider>, predictor: Arc<dyn YieldPredictor>) -> Self {
        Self { weather, predictor }
    }

    pub async fn predict(&self, body: &Value) -> Result<PredictionOutcome> {
        let request = parse_prediction_request(body)?;
        tracing::debug!(
            "Prediction request: crop={} region={} area={}",
            request.crop,
            request.region,
            request.area
        );

        let weather = match self.weather.fetch_weather(&request.region).await {
            Ok(Some(report)) => report,
            Ok(None) => {
                tracing::warn!("No weather data for region {}", request.region);
                return Err(CropApiError::WeatherUnavailable);
            }
            Err(e) => {
                tracing::warn!("Weather lookup for {} failed: {}", request.region, e);
                return Err(CropApiError::WeatherUnavailable);
            }
        };

        let prediction = self.predictor.predict_production(&request, &weather)?;
        tracing::info!(
            "Predicted {:.2} {} of {} for {}",
            prediction.predicted_production,
            prediction.unit,
            prediction.crop,
            prediction.region
        );

        Ok(PredictionOutcome {
            weather,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ProductionEstimate, WeatherReport};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubWeather {
        report: Option<WeatherReport>,
        fail: bool,
        calls: AtomicUsize,
        last_region: Mutex<Option<String>>,
    }

    impl StubWeather {
        fn returning(report: Option<WeatherReport>) -> Self {
            Self {
                report,
                fail: false,
                calls: AtomicUsize::new(0),
                last_region: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(None)
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for StubWeather {
        async fn fetch_weather(&self, region: &str) -> Result<Option<WeatherReport>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_region.lock().unwrap() = Some(region.to_string());
            if self.fail {
                return Err(CropApiError::IoError(std::io::Error::other("connection reset")));
            }
            Ok(self.report.clone())
        }
    }

    #[derive(Default)]
    struct StubPredictor {
        calls: AtomicUsize,
        last_request: Mutex<Option<PredictionRequest>>,
    }

    impl YieldPredictor for StubPredictor {
        fn predict_production(
            &self,
            request: &PredictionRequest,
            _weather: &WeatherReport,
        ) -> Result<ProductionEstimate> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(ProductionEstimate {
                crop: request.crop.clone(),
                region: request.region.clone(),
                area: request.area,
                yield_per_hectare: 3.0,
                predicted_production: request.area * 3.0,
                unit: "tonnes".to_string(),
                suitability: 1.0,
            })
        }
    }

    fn sunny() -> WeatherReport {
        WeatherReport {
            temperature: 28.0,
            humidity: 70.0,
            rainfall: 0.0,
            description: "clear sky".to_string(),
            observed_at: None,
        }
    }

    fn valid_body() -> Value {
        json!({
            "crop": "Rice",
            "region": "bankura",
            "nitrogen": "80",
            "phosphorous": "40",
            "potassium": "40",
            "ph": "6.5",
            "area": "2.0"
        })
    }

    #[test]
    fn test_parse_normalizes_and_coerces() {
        let request = parse_prediction_request(&valid_body()).unwrap();
        assert_eq!(request.crop, "rice");
        assert_eq!(request.region, "Bankura");
        assert_eq!(request.nitrogen, 80.0);
        assert_eq!(request.phosphorous, 40.0);
        assert_eq!(request.potassium, 40.0);
        assert_eq!(request.ph, 6.5);
        assert_eq!(request.area, 2.0);
    }

    #[test]
    fn test_parse_accepts_json_numbers() {
        let body = json!({
            "crop": "wheat", "region": "Nadia", "nitrogen": 120, "phosphorous": 60.5,
            "potassium": 40, "ph": 7, "area": 1.25
        });
        let request = parse_prediction_request(&body).unwrap();
        assert_eq!(request.phosphorous, 60.5);
        assert_eq!(request.ph, 7.0);
    }

    #[test]
    fn test_each_missing_field_is_reported_by_name() {
        for field in REQUIRED_FIELDS {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            let err = parse_prediction_request(&body).unwrap_err();
            assert_eq!(err.to_string(), format!("Missing field: '{}'", field));
        }
    }

    #[test]
    fn test_only_first_missing_field_is_reported() {
        let body = json!({ "crop": "rice", "nitrogen": "80" });
        let err = parse_prediction_request(&body).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: 'region'");
    }

    #[test]
    fn test_non_numeric_value_is_client_error() {
        let mut body = valid_body();
        body["potassium"] = json!("lots");
        let err = parse_prediction_request(&body).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Invalid value for field 'potassium': expected a number"
        );

        body["potassium"] = json!(null);
        assert!(parse_prediction_request(&body).is_err());
    }

    #[test]
    fn test_invalid_value_before_missing_field_wins() {
        let body = json!({ "crop": "rice", "region": "Nadia", "nitrogen": "abc" });
        let err = parse_prediction_request(&body).unwrap_err();
        assert!(matches!(err, CropApiError::InvalidField { ref field, .. } if field == "nitrogen"));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = parse_prediction_request(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, CropApiError::InvalidBody));
    }

    #[tokio::test]
    async fn test_predict_returns_weather_and_prediction() {
        let weather = Arc::new(StubWeather::returning(Some(sunny())));
        let predictor = Arc::new(StubPredictor::default());
        let service = PredictionService::new(weather.clone(), predictor.clone());

        let outcome = service.predict(&valid_body()).await.unwrap();

        assert_eq!(outcome.weather, sunny());
        assert_eq!(outcome.prediction.predicted_production, 6.0);
        assert_eq!(weather.last_region.lock().unwrap().as_deref(), Some("Bankura"));
        let seen = predictor.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(seen.crop, "rice");
    }

    #[tokio::test]
    async fn test_missing_weather_skips_prediction() {
        let weather = Arc::new(StubWeather::returning(None));
        let predictor = Arc::new(StubPredictor::default());
        let service = PredictionService::new(weather.clone(), predictor.clone());

        let err = service.predict(&valid_body()).await.unwrap_err();

        assert!(matches!(err, CropApiError::WeatherUnavailable));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 1);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_weather_error_is_reported_as_unavailable() {
        let predictor = Arc::new(StubPredictor::default());
        let service = PredictionService::new(Arc::new(StubWeather::failing()), predictor.clone());

        let err = service.predict(&valid_body()).await.unwrap_err();

        assert_eq!(err.public_message(), "Failed to fetch weather data");
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_external_call() {
        let weather = Arc::new(StubWeather::returning(Some(sunny())));
        let predictor = Arc::new(StubPredictor::default());
        let service = PredictionService::new(weather.clone(), predictor.clone());

        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("area");
        assert!(service.predict(&body).await.is_err());

        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }
}
