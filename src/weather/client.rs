use serde_json::Value;
use std::time::Duration;

use crate::config::WeatherConfig;

use super::error::WeatherError;

/// Current-conditions lookups against an Open-Meteo style forecast API.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    /// Current weather at `lat`/`lon`, or `None` if the coordinates are not
    /// finite or the lookup fails for any reason. Never retried.
    pub async fn current(&self, lat: f64, lon: f64) -> Option<Value> {
        if !lat.is_finite() || !lon.is_finite() {
            log::debug!("Skipping weather lookup for non-finite {},{}", lat, lon);
            return None;
        }

        match self.fetch_current(lat, lon).await {
            Ok(weather) => weather,
            Err(e) => {
                log::warn!("Weather lookup failed for {},{}: {}", lat, lon, e);
                None
            }
        }
    }

    async fn fetch_current(&self, lat: f64, lon: f64) -> Result<Option<Value>, WeatherError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(current_weather(body))
    }
}

fn current_weather(mut body: Value) -> Option<Value> {
    body.get_mut("current_weather")
        .map(Value::take)
        .filter(|weather| !weather.is_null())
}
