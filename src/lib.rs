pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{crop_model::CropModel, weather::OpenWeatherClient};
pub use crate::config::TomlConfig;
pub use crate::core::{
    districts::DistrictCatalog,
    engine::ApiEngine,
    predict::PredictionService,
    server::{router, AppState},
};
pub use crate::utils::error::{CropApiError, Result};
