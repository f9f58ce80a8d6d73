mod client;
mod error;

pub use client::WeatherClient;
pub use error::WeatherError;
