use serde_json::Value;
use std::future::Future;

use crate::feed::{FeedClient, HourCode};
use crate::weather::WeatherClient;

/// Where hourly snapshot documents come from.
///
/// The aggregator only talks to this trait, so tests can swap in
/// scripted sources.
pub trait FeedSource: Send + Sync + 'static {
    fn fetch_hour(&self, hour: HourCode) -> impl Future<Output = Option<Value>> + Send;
}

/// Where current weather for a coordinate pair comes from.
pub trait WeatherSource: Send + Sync + 'static {
    fn current_weather(&self, lat: f64, lon: f64) -> impl Future<Output = Option<Value>> + Send;
}

impl FeedSource for FeedClient {
    async fn fetch_hour(&self, hour: HourCode) -> Option<Value> {
        self.fetch(hour).await
    }
}

impl WeatherSource for WeatherClient {
    async fn current_weather(&self, lat: f64, lon: f64) -> Option<Value> {
        self.current(lat, lon).await
    }
}
