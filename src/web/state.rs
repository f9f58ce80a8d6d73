use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::feed::FeedClient;
use crate::weather::WeatherClient;

pub type LiveAggregator = Aggregator<FeedClient, WeatherClient>;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<LiveAggregator>,
}

impl AppState {
    /// Build the upstream clients described by `config`. Both clients share
    /// one connection pool.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::new();
        let feed = FeedClient::new(http.clone(), &config.feed);
        let weather = WeatherClient::new(http, &config.weather);

        AppState {
            aggregator: Arc::new(Aggregator::new(feed, weather, &config.aggregator)),
        }
    }
}
