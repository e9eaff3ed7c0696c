pub mod districts;
pub mod engine;
pub mod predict;
pub mod server;

pub use crate::domain::model::{DistrictRecord, PredictionOutcome, PredictionRequest};
pub use crate::domain::ports::{ConfigProvider, WeatherProvider, YieldPredictor};
pub use crate::utils::error::Result;
