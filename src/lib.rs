//! Balloon positions from the hourly treasure feed, enriched with current
//! weather and served as a single JSON document.

pub mod aggregator;
pub mod config;
pub mod feed;
pub mod positions;
pub mod weather;
pub mod web;

pub use config::Config;
