mod error;
mod pipeline;
mod source;

pub use error::AggregateError;
pub use pipeline::{flatten, Aggregator, HourPositions};
pub use source::{FeedSource, WeatherSource};
