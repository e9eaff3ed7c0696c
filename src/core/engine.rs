use crate::adapters::crop_model::CropModel;
use crate::adapters::weather::{OpenWeatherClient, WeatherSettings};
use crate::core::districts::DistrictCatalog;
use crate::core::server::{self, AppState};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use std::path::Path;
use std::sync::Arc;

/// 組裝並啟動 API：載入地區資料、初始化模型、建立天氣客戶端，最後開始監聽
pub struct ApiEngine<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> ApiEngine<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    /// 啟動前的準備工作，任何一步失敗都不應開始服務
    pub fn prepare(&self) -> Result<AppState> {
        tracing::info!("Loading district data...");
        let districts = DistrictCatalog::from_path(self.config.districts_csv())?;

        tracing::info!("Initializing crop model...");
        let model = CropModel::init(self.config.crop_profiles().map(Path::new))?;

        if self.config.weather_api_key().is_none() {
            tracing::warn!("No weather API key configured; weather lookups will likely fail");
        }
        let weather = OpenWeatherClient::new(WeatherSettings {
            endpoint: self.config.weather_endpoint().to_string(),
            api_key: self.config.weather_api_key().map(str::to_string),
            country_code: self.config.country_code().to_string(),
            timeout_seconds: self.config.weather_timeout_seconds(),
        })?;

        Ok(AppState::new(districts, Arc::new(weather), Arc::new(model)))
    }

    pub async fn run(&self) -> Result<()> {
        let state = self.prepare()?;

        let addr = self.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        server::serve(listener, state).await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}
