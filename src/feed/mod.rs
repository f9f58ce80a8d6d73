mod client;
mod error;
mod hour;

pub use client::{decode_payload, FeedClient};
pub use error::FeedError;
pub use hour::HourCode;
