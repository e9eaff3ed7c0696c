use crate::domain::model::WeatherReport;
use crate::domain::ports::WeatherProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WeatherSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub country_code: String,
    pub timeout_seconds: u64,
}

/// OpenWeatherMap "current weather" 回應中用得到的部分
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainReadings>,
    #[serde(default)]
    weather: Vec<Condition>,
    rain: Option<Precipitation>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct Precipitation {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl CurrentWeather {
    fn into_report(self) -> Option<WeatherReport> {
        let main = self.main?;
        Some(WeatherReport {
            temperature: main.temp?,
            humidity: main.humidity?,
            rainfall: self.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            description: self
                .weather
                .into_iter()
                .next()
                .map(|c| c.description)
                .unwrap_or_default(),
            observed_at: self.dt.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}

pub struct OpenWeatherClient {
    settings: WeatherSettings,
    client: Client,
}

impl OpenWeatherClient {
    pub fn new(settings: WeatherSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self { settings, client })
    }

    fn query_location(&self, region: &str) -> String {
        if self.settings.country_code.is_empty() {
            region.to_string()
        } else {
            format!("{},{}", region, self.settings.country_code)
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch_weather(&self, region: &str) -> Result<Option<WeatherReport>> {
        let location = self.query_location(region);
        let mut query = vec![("q", location.as_str()), ("units", "metric")];
        if let Some(key) = self.settings.api_key.as_deref() {
            query.push(("appid", key));
        }

        tracing::debug!("Requesting weather for {} from {}", location, self.settings.endpoint);
        let response = self
            .client
            .get(&self.settings.endpoint)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Weather API response status: {}", status);
        if !status.is_success() {
            tracing::warn!("Weather API returned {} for {}", status, location);
            return Ok(None);
        }

        let body: CurrentWeather = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Unreadable weather payload for {}: {}", location, e);
                return Ok(None);
            }
        };

        let report = body.into_report();
        if report.is_none() {
            tracing::warn!("Weather payload for {} lacks temperature or humidity", location);
        }
        Ok(report)
    }
}
