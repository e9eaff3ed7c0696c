use crate::domain::model::{PredictionRequest, ProductionEstimate, WeatherReport};
use crate::domain::ports::YieldPredictor;
use crate::utils::error::{CropApiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// 超出最適範圍時的最低分
const MIN_FACTOR_SCORE: f64 = 0.3;

/// 最適範圍 `[min, max]`，TOML 中寫成兩個元素的陣列
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange(pub f64, pub f64);

impl OptimalRange {
    pub fn min(&self) -> f64 {
        self.0
    }

    pub fn max(&self) -> f64 {
        self.1
    }

    /// 範圍內為 1.0，範圍外依距離（相對於範圍寬度）線性遞減，最低 `MIN_FACTOR_SCORE`
    pub fn score(&self, value: f64) -> f64 {
        let distance = if value < self.0 {
            self.0 - value
        } else if value > self.1 {
            value - self.1
        } else {
            return 1.0;
        };

        let width = (self.1 - self.0).max(1.0);
        (1.0 - 0.5 * distance / width).max(MIN_FACTOR_SCORE)
    }

    fn is_valid(&self) -> bool {
        self.0.is_finite() && self.1.is_finite() && self.0 <= self.1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    /// t/ha under optimal conditions
    pub base_yield: f64,
    pub nitrogen: OptimalRange,
    pub phosphorous: OptimalRange,
    pub potassium: OptimalRange,
    pub ph: OptimalRange,
    pub temperature: OptimalRange,
    pub humidity: OptimalRange,
}

impl CropProfile {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CropApiError::ConfigValidationError {
                field: "crops.name".to_string(),
                message: "Crop name cannot be empty".to_string(),
            });
        }

        if !(self.base_yield.is_finite() && self.base_yield > 0.0) {
            return Err(CropApiError::InvalidConfigValueError {
                field: format!("crops.{}.base_yield", self.name),
                value: self.base_yield.to_string(),
                reason: "Base yield must be a positive number".to_string(),
            });
        }

        let ranges = [
            ("nitrogen", self.nitrogen),
            ("phosphorous", self.phosphorous),
            ("potassium", self.potassium),
            ("ph", self.ph),
            ("temperature", self.temperature),
            ("humidity", self.humidity),
        ];
        for (label, range) in ranges {
            if !range.is_valid() {
                return Err(CropApiError::InvalidConfigValueError {
                    field: format!("crops.{}.{}", self.name, label),
                    value: format!("[{}, {}]", range.min(), range.max()),
                    reason: "Range must be finite with min <= max".to_string(),
                });
            }
        }

        Ok(())
    }

    /// 各因子分數的幾何平均
    pub fn suitability(&self, request: &PredictionRequest, weather: &WeatherReport) -> f64 {
        let scores = [
            self.nitrogen.score(request.nitrogen),
            self.phosphorous.score(request.phosphorous),
            self.potassium.score(request.potassium),
            self.ph.score(request.ph),
            self.temperature.score(weather.temperature),
            self.humidity.score(weather.humidity),
        ];
        let product: f64 = scores.iter().product();
        product.powf(1.0 / scores.len() as f64)
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    crops: Vec<CropProfile>,
}

/// 以作物參數表估算產量的模型
#[derive(Debug, Clone)]
pub struct CropModel {
    profiles: HashMap<String, CropProfile>,
}

impl CropModel {
    /// 模型初始化：有指定檔案就讀檔，否則使用內建參數
    pub fn init(profiles_path: Option<&Path>) -> Result<Self> {
        let model = match profiles_path {
            Some(path) => {
                tracing::info!("Loading crop profiles from {}", path.display());
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)?
            }
            None => {
                tracing::info!("Using built-in crop profiles");
                Self::with_profiles(default_profiles())?
            }
        };

        let mut crops = model.crops();
        crops.sort_unstable();
        tracing::info!("Crop model ready: {}", crops.join(", "));
        Ok(model)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ProfileFile =
            toml::from_str(content).map_err(|e| CropApiError::ConfigValidationError {
                field: "model.crop_profiles".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        Self::with_profiles(file.crops)
    }

    pub fn with_profiles(profiles: Vec<CropProfile>) -> Result<Self> {
        if profiles.is_empty() {
            return Err(CropApiError::MissingConfigError {
                field: "crops".to_string(),
            });
        }

        let mut by_name = HashMap::with_capacity(profiles.len());
        for mut profile in profiles {
            profile.validate()?;
            profile.name = profile.name.trim().to_lowercase();
            if by_name.contains_key(&profile.name) {
                return Err(CropApiError::ConfigValidationError {
                    field: "crops.name".to_string(),
                    message: format!("Duplicate crop profile: {}", profile.name),
                });
            }
            by_name.insert(profile.name.clone(), profile);
        }

        Ok(Self { profiles: by_name })
    }

    pub fn crops(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profile(&self, crop: &str) -> Option<&CropProfile> {
        self.profiles.get(crop)
    }

    fn check_inputs(request: &PredictionRequest) -> Result<()> {
        if request.area <= 0.0 {
            return Err(CropApiError::InvalidPredictionInput {
                message: "area must be greater than zero".to_string(),
            });
        }
        if !(0.0..=14.0).contains(&request.ph) {
            return Err(CropApiError::InvalidPredictionInput {
                message: "ph must be between 0 and 14".to_string(),
            });
        }
        for (label, value) in [
            ("nitrogen", request.nitrogen),
            ("phosphorous", request.phosphorous),
            ("potassium", request.potassium),
        ] {
            if value < 0.0 {
                return Err(CropApiError::InvalidPredictionInput {
                    message: format!("{} cannot be negative", label),
                });
            }
        }
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl YieldPredictor for CropModel {
    fn predict_production(
        &self,
        request: &PredictionRequest,
        weather: &WeatherReport,
    ) -> Result<ProductionEstimate> {
        let profile = self
            .profile(&request.crop)
            .ok_or_else(|| CropApiError::UnsupportedCrop {
                crop: request.crop.clone(),
            })?;
        Self::check_inputs(request)?;

        let suitability = profile.suitability(request, weather);
        let yield_per_hectare = profile.base_yield * suitability;
        let predicted_production = yield_per_hectare * request.area;

        if !predicted_production.is_finite() {
            return Err(CropApiError::PredictionError {
                message: format!("non-finite production for {}", request.crop),
            });
        }

        Ok(ProductionEstimate {
            crop: request.crop.clone(),
            region: request.region.clone(),
            area: request.area,
            yield_per_hectare: round2(yield_per_hectare),
            predicted_production: round2(predicted_production),
            unit: "tonnes".to_string(),
            suitability: (suitability * 1000.0).round() / 1000.0,
        })
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    name: &str,
    base_yield: f64,
    nitrogen: (f64, f64),
    phosphorous: (f64, f64),
    potassium: (f64, f64),
    ph: (f64, f64),
    temperature: (f64, f64),
    humidity: (f64, f64),
) -> CropProfile {
    let range = |(min, max): (f64, f64)| OptimalRange(min, max);
    CropProfile {
        name: name.to_string(),
        base_yield,
        nitrogen: range(nitrogen),
        phosphorous: range(phosphorous),
        potassium: range(potassium),
        ph: range(ph),
        temperature: range(temperature),
        humidity: range(humidity),
    }
}

/// 西孟加拉常見作物的預設參數（N/P/K 單位 kg/ha）
#[rustfmt::skip]
pub fn default_profiles() -> Vec<CropProfile> {
    vec![
        profile("rice", 2.9, (80.0, 120.0), (40.0, 60.0), (40.0, 60.0), (5.5, 7.0), (20.0, 35.0), (60.0, 90.0)),
        profile("wheat", 2.8, (100.0, 150.0), (50.0, 70.0), (40.0, 60.0), (6.0, 7.5), (12.0, 25.0), (40.0, 70.0)),
        profile("jute", 2.6, (40.0, 80.0), (20.0, 40.0), (20.0, 40.0), (6.0, 7.5), (24.0, 37.0), (70.0, 90.0)),
        profile("potato", 25.0, (150.0, 200.0), (80.0, 120.0), (100.0, 150.0), (5.0, 6.5), (15.0, 25.0), (60.0, 80.0)),
        profile("maize", 3.5, (120.0, 160.0), (60.0, 80.0), (40.0, 60.0), (5.5, 7.5), (18.0, 32.0), (50.0, 80.0)),
        profile("mustard", 1.2, (60.0, 100.0), (30.0, 50.0), (30.0, 50.0), (6.0, 7.5), (10.0, 25.0), (40.0, 70.0)),
        profile("lentil", 1.0, (15.0, 25.0), (40.0, 60.0), (20.0, 40.0), (6.0, 7.5), (15.0, 28.0), (40.0, 70.0)),
        profile("sugarcane", 70.0, (150.0, 250.0), (60.0, 100.0), (60.0, 120.0), (6.0, 7.5), (20.0, 35.0), (60.0, 85.0)),
    ]
}
