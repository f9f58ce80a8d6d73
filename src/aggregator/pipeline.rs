use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::config::AggregatorConfig;
use crate::feed::HourCode;
use crate::positions::{extract_positions, CombinedResponse, EnrichedPosition, PositionRecord};

use super::error::AggregateError;
use super::source::{FeedSource, WeatherSource};

/// Positions extracted from one hour's snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct HourPositions {
    pub hour: HourCode,
    pub positions: Vec<PositionRecord>,
}

pub struct Aggregator<F, W> {
    feed: F,
    weather: Arc<W>,
    batch_size: usize,
    max_depth: usize,
}

impl<F: FeedSource, W: WeatherSource> Aggregator<F, W> {
    pub fn new(feed: F, weather: W, config: &AggregatorConfig) -> Self {
        Self {
            feed,
            weather: Arc::new(weather),
            batch_size: config.batch_size.max(1),
            max_depth: config.max_depth,
        }
    }

    /// Fetch every hour, one request at a time, and extract its positions.
    ///
    /// Hours that fail to load, fail extraction or hold no positions are
    /// left out.
    pub async fn collect_hours(&self) -> Vec<HourPositions> {
        let mut hours = Vec::new();

        for hour in HourCode::all() {
            let Some(payload) = self.feed.fetch_hour(hour).await else {
                continue;
            };

            match extract_positions(&payload, self.max_depth) {
                Ok(positions) if positions.is_empty() => {
                    log::debug!("Hour {} holds no positions", hour);
                }
                Ok(positions) => hours.push(HourPositions { hour, positions }),
                Err(e) => log::warn!("Skipping hour {}: {}", hour, e),
            }
        }

        hours
    }

    /// Attach weather to every position.
    ///
    /// Lookups run `batch_size` at a time; a batch must settle before the
    /// next one starts. Output order matches input order.
    pub async fn enrich(
        &self,
        positions: Vec<(HourCode, PositionRecord)>,
    ) -> Result<Vec<EnrichedPosition>, AggregateError> {
        let mut enriched = Vec::with_capacity(positions.len());
        let mut pending = positions.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<_> = pending.by_ref().take(self.batch_size).collect();
            let lookups: Vec<_> = batch
                .iter()
                .map(|(_, position)| self.spawn_lookup(position))
                .collect();

            for ((hour, position), weather) in batch.into_iter().zip(join_all(lookups).await) {
                enriched.push(EnrichedPosition {
                    hour,
                    position,
                    weather: weather?,
                });
            }
        }

        Ok(enriched)
    }

    /// Run a full aggregation and assemble the response.
    pub async fn combine(&self) -> Result<CombinedResponse, AggregateError> {
        let hours = self.collect_hours().await;
        let hour_count = hours.len();
        let data = self.enrich(flatten(hours)).await?;

        log::info!(
            "Aggregated {} positions from {} hours",
            data.len(),
            hour_count
        );

        Ok(CombinedResponse::assemble(data))
    }

    fn spawn_lookup(&self, position: &PositionRecord) -> JoinHandle<Option<Value>> {
        let weather = Arc::clone(&self.weather);
        let (lat, lon) = (position.lat, position.lon);
        let finite = position.has_finite_coordinates();

        tokio::spawn(async move {
            if finite {
                weather.current_weather(lat, lon).await
            } else {
                None
            }
        })
    }
}

/// Pair each position with its hour, hour-ascending then extraction order.
pub fn flatten(hours: Vec<HourPositions>) -> Vec<(HourCode, PositionRecord)> {
    hours
        .into_iter()
        .flat_map(|entry| {
            let hour = entry.hour;
            entry.positions.into_iter().map(move |p| (hour, p))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Serves scripted documents; hours without a script fail.
    struct ScriptedFeed {
        documents: HashMap<u8, Value>,
        calls: Mutex<Vec<u8>>,
    }

    impl ScriptedFeed {
        fn new(documents: Vec<(u8, Value)>) -> Self {
            Self {
                documents: documents.into_iter().collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl FeedSource for ScriptedFeed {
        async fn fetch_hour(&self, hour: HourCode) -> Option<Value> {
            self.calls.lock().unwrap().push(hour.value());
            self.documents.get(&hour.value()).cloned()
        }
    }

    /// Tracks how many lookups are in flight at once.
    #[derive(Default)]
    struct TrackingWeather {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
        fail_lat: Option<f64>,
    }

    impl WeatherSource for TrackingWeather {
        async fn current_weather(&self, lat: f64, lon: f64) -> Option<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            // Later positions (larger lat) finish first.
            let delay = 40u64.saturating_sub(lat as u64 * 2);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.fail_lat == Some(lat) {
                return None;
            }
            Some(json!({"temperature": lat, "windspeed": lon}))
        }
    }

    struct PanickingWeather;

    impl WeatherSource for PanickingWeather {
        async fn current_weather(&self, _lat: f64, _lon: f64) -> Option<Value> {
            panic!("weather source defect");
        }
    }

    fn positions_doc(ids: std::ops::Range<u32>) -> Value {
        Value::Array(
            ids.map(|i| json!({"id": format!("p{}", i), "lat": i, "lon": i + 100}))
                .collect(),
        )
    }

    fn config(batch_size: usize) -> AggregatorConfig {
        AggregatorConfig {
            batch_size,
            ..AggregatorConfig::default()
        }
    }

    #[tokio::test]
    async fn hours_are_fetched_sequentially_in_order() {
        let aggregator = Aggregator::new(
            ScriptedFeed::new(vec![]),
            TrackingWeather::default(),
            &config(8),
        );
        let hours = aggregator.collect_hours().await;
        assert!(hours.is_empty());
        let calls = aggregator.feed.calls.lock().unwrap().clone();
        assert_eq!(calls, (0..24).collect::<Vec<u8>>());
    }

    #[tokio::test]
    async fn failed_and_empty_hours_are_skipped() {
        let feed = ScriptedFeed::new(vec![
            (0, json!({"lat": 1, "lon": 2, "id": "a"})),
            (3, json!({"nothing": "here"})),
            (5, json!([{"lat": 3, "lon": 4}, {"lat": 5, "lon": 6}])),
        ]);
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &config(8));
        let hours = aggregator.collect_hours().await;

        let codes: Vec<String> = hours.iter().map(|h| h.hour.to_string()).collect();
        assert_eq!(codes, ["00", "05"]);
        assert_eq!(hours[1].positions.len(), 2);
    }

    #[tokio::test]
    async fn too_deep_hour_is_skipped() {
        let mut deep = json!({"lat": 1, "lon": 2});
        for _ in 0..5 {
            deep = json!([deep]);
        }
        let feed = ScriptedFeed::new(vec![(0, deep), (1, json!({"lat": 7, "lon": 8}))]);
        let settings = AggregatorConfig {
            batch_size: 8,
            max_depth: 3,
        };
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &settings);
        let hours = aggregator.collect_hours().await;
        assert_eq!(hours.len(), 1);
        assert_eq!(hours[0].hour.value(), 1);
    }

    #[test]
    fn flatten_keeps_hour_then_extraction_order() {
        let hour = |n| HourCode::new(n).unwrap();
        let record = |lat: f64| PositionRecord {
            id: None,
            lat,
            lon: 0.0,
            alt: None,
        };
        let flat = flatten(vec![
            HourPositions {
                hour: hour(0),
                positions: vec![record(1.0), record(2.0)],
            },
            HourPositions {
                hour: hour(4),
                positions: vec![record(3.0)],
            },
        ]);
        let order: Vec<(u8, f64)> = flat.iter().map(|(h, p)| (h.value(), p.lat)).collect();
        assert_eq!(order, [(0, 1.0), (0, 2.0), (4, 3.0)]);
    }

    #[tokio::test]
    async fn weather_lookups_never_exceed_batch_size() {
        let feed = ScriptedFeed::new(vec![(0, positions_doc(0..12)), (1, positions_doc(12..20))]);
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &config(8));
        let response = aggregator.combine().await.unwrap();

        assert_eq!(response.count, 20);
        assert_eq!(aggregator.weather.calls.load(Ordering::SeqCst), 20);
        assert_eq!(aggregator.weather.peak.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn smaller_batches_lower_the_bound() {
        let feed = ScriptedFeed::new(vec![(2, positions_doc(0..7))]);
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &config(3));
        aggregator.combine().await.unwrap();
        assert_eq!(aggregator.weather.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn output_order_ignores_completion_order() {
        let feed = ScriptedFeed::new(vec![(0, positions_doc(0..10)), (9, positions_doc(10..15))]);
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &config(8));
        let response = aggregator.combine().await.unwrap();

        let ids: Vec<String> = response
            .data
            .iter()
            .map(|e| e.position.id.clone().unwrap())
            .collect();
        let expected: Vec<String> = (0..15).map(|i| format!("p{}", i)).collect();
        assert_eq!(ids, expected);
        assert!(response.data[..10].iter().all(|e| e.hour.value() == 0));
        assert!(response.data[10..].iter().all(|e| e.hour.value() == 9));
        for entry in &response.data {
            assert_eq!(
                entry.weather,
                Some(json!({"temperature": entry.position.lat, "windspeed": entry.position.lon}))
            );
        }
    }

    #[tokio::test]
    async fn one_weather_failure_only_affects_its_record() {
        let feed = ScriptedFeed::new(vec![(0, positions_doc(0..4))]);
        let weather = TrackingWeather {
            fail_lat: Some(2.0),
            ..TrackingWeather::default()
        };
        let aggregator = Aggregator::new(feed, weather, &config(8));
        let response = aggregator.combine().await.unwrap();

        assert_eq!(response.count, 4);
        let missing: Vec<bool> = response.data.iter().map(|e| e.weather.is_none()).collect();
        assert_eq!(missing, [false, false, true, false]);
    }

    #[tokio::test]
    async fn non_finite_positions_skip_weather() {
        let feed = ScriptedFeed::new(vec![(
            0,
            json!([{"lat": "bad", "lon": 1}, {"lat": 1, "lon": 2}]),
        )]);
        let aggregator = Aggregator::new(feed, TrackingWeather::default(), &config(8));
        let response = aggregator.combine().await.unwrap();

        assert_eq!(response.count, 2);
        assert!(response.data[0].weather.is_none());
        assert!(response.data[1].weather.is_some());
        assert_eq!(aggregator.weather.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_hours_failing_yields_empty_response() {
        let aggregator = Aggregator::new(
            ScriptedFeed::new(vec![]),
            TrackingWeather::default(),
            &config(8),
        );
        let response = aggregator.combine().await.unwrap();
        assert_eq!(response.count, 0);
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn panicking_lookup_fails_the_aggregation() {
        let feed = ScriptedFeed::new(vec![(0, json!({"lat": 1, "lon": 2}))]);
        let aggregator = Aggregator::new(feed, PanickingWeather, &config(8));
        let err = aggregator.combine().await.unwrap_err();
        assert!(matches!(err, AggregateError::Task(_)));
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let aggregator = Aggregator::new(
            ScriptedFeed::new(vec![]),
            TrackingWeather::default(),
            &config(0),
        );
        assert_eq!(aggregator.batch_size, 1);
    }
}
